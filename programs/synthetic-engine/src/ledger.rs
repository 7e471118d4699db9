use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::EngineError;
use crate::registry::{CollateralRegistry, CollateralType};

/// Collateral and debt balances of a single participant
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionBalances {
    collateral: BTreeMap<Pubkey, u128>,
    debt: u128,
}

impl PositionBalances {
    pub fn collateral(&self, mint: &Pubkey) -> u128 {
        self.collateral.get(mint).copied().unwrap_or_default()
    }

    pub fn debt(&self) -> u128 {
        self.debt
    }

    /// Non-zero collateral balances
    pub fn collateral_balances(&self) -> impl Iterator<Item = (&Pubkey, &u128)> {
        self.collateral.iter().filter(|(_, amount)| **amount > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.debt == 0 && self.collateral.values().all(|amount| *amount == 0)
    }

    pub fn with_collateral(mut self, mint: Pubkey, amount: u128) -> Self {
        self.collateral.insert(mint, amount);
        self
    }

    pub fn with_debt(mut self, debt: u128) -> Self {
        self.debt = debt;
        self
    }
}

/// Per-participant balance bookkeeping.
/// Holds no opinion on solvency; the engine checks health factors on top of it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    positions: BTreeMap<Pubkey, PositionBalances>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty position for `user` if none exists yet
    pub fn open(&mut self, user: Pubkey) -> &mut PositionBalances {
        self.positions.entry(user).or_default()
    }

    pub fn exists(&self, user: &Pubkey) -> bool {
        self.positions.contains_key(user)
    }

    pub fn position(&self, user: &Pubkey) -> Option<&PositionBalances> {
        self.positions.get(user)
    }

    /// Replace the balances of `user`, used to load stored positions
    pub fn insert(&mut self, user: Pubkey, balances: PositionBalances) {
        self.positions.insert(user, balances);
    }

    pub fn collateral_balance(&self, user: &Pubkey, mint: &Pubkey) -> u128 {
        self.positions
            .get(user)
            .map(|position| position.collateral(mint))
            .unwrap_or_default()
    }

    pub fn debt_balance(&self, user: &Pubkey) -> u128 {
        self.positions
            .get(user)
            .map(PositionBalances::debt)
            .unwrap_or_default()
    }

    pub fn credit_collateral(&mut self, user: Pubkey, mint: Pubkey, amount: u128) -> Result<u128> {
        let balance = self.open(user).collateral.entry(mint).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(EngineError::MathOverflow)?;

        Ok(*balance)
    }

    /// Never creates a position; debiting a missing balance fails unless `amount` is zero
    pub fn debit_collateral(&mut self, user: Pubkey, mint: Pubkey, amount: u128) -> Result<u128> {
        let Some(balance) = self
            .positions
            .get_mut(&user)
            .and_then(|position| position.collateral.get_mut(&mint))
        else {
            require!(amount == 0, EngineError::InsufficientBalance);
            return Ok(0);
        };

        *balance = balance
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientBalance)?;

        Ok(*balance)
    }

    pub fn credit_debt(&mut self, user: Pubkey, amount: u128) -> Result<u128> {
        let position = self.open(user);
        position.debt = position
            .debt
            .checked_add(amount)
            .ok_or(EngineError::MathOverflow)?;

        Ok(position.debt)
    }

    pub fn debit_debt(&mut self, user: Pubkey, amount: u128) -> Result<u128> {
        let Some(position) = self.positions.get_mut(&user) else {
            require!(amount == 0, EngineError::InsufficientBalance);
            return Ok(0);
        };
        position.debt = position
            .debt
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientBalance)?;

        Ok(position.debt)
    }

    /// Sum the USD value of every registered collateral `user` holds.
    /// `usd_value` prices one collateral balance; zero balances are skipped.
    pub fn total_collateral_value_usd<F>(
        &self,
        user: &Pubkey,
        registry: &CollateralRegistry,
        mut usd_value: F,
    ) -> Result<u128>
    where
        F: FnMut(&CollateralType, u128) -> Result<u128>,
    {
        let Some(position) = self.positions.get(user) else {
            return Ok(0);
        };

        let mut total: u128 = 0;
        for collateral in registry.types() {
            let amount = position.collateral(&collateral.mint);
            if amount == 0 {
                continue;
            }

            total = total
                .checked_add(usd_value(collateral, amount)?)
                .ok_or(EngineError::MathOverflow)?;
        }

        Ok(total)
    }

    pub fn total_debt(&self) -> Result<u128> {
        self.positions.values().try_fold(0u128, |total, position| {
            total
                .checked_add(position.debt)
                .ok_or_else(|| error!(EngineError::MathOverflow))
        })
    }

    pub fn total_collateral(&self, mint: &Pubkey) -> Result<u128> {
        self.positions.values().try_fold(0u128, |total, position| {
            total
                .checked_add(position.collateral(mint))
                .ok_or_else(|| error!(EngineError::MathOverflow))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CollateralAsset;

    #[test]
    fn deposits_accumulate() {
        let user = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let mut split = Ledger::new();
        split.credit_collateral(user, mint, 40).unwrap();
        split.credit_collateral(user, mint, 2).unwrap();

        let mut whole = Ledger::new();
        whole.credit_collateral(user, mint, 42).unwrap();

        assert_eq!(split, whole);
        assert_eq!(split.collateral_balance(&user, &mint), 42);
    }

    #[test]
    fn debits_cannot_go_negative() {
        let user = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut ledger = Ledger::new();
        ledger.credit_collateral(user, mint, 10).unwrap();
        ledger.credit_debt(user, 5).unwrap();

        assert_eq!(
            ledger.debit_collateral(user, mint, 11).unwrap_err(),
            EngineError::InsufficientBalance.into()
        );
        assert_eq!(
            ledger.debit_debt(user, 6).unwrap_err(),
            EngineError::InsufficientBalance.into()
        );
        assert_eq!(ledger.collateral_balance(&user, &mint), 10);
        assert_eq!(ledger.debt_balance(&user), 5);

        assert_eq!(ledger.debit_collateral(user, mint, 10).unwrap(), 0);
        assert_eq!(ledger.debit_debt(user, 5).unwrap(), 0);
    }

    #[test]
    fn failed_debits_do_not_create_positions() {
        let user = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut ledger = Ledger::new();

        assert_eq!(
            ledger.debit_debt(user, 1).unwrap_err(),
            EngineError::InsufficientBalance.into()
        );
        assert_eq!(
            ledger.debit_collateral(user, mint, 1).unwrap_err(),
            EngineError::InsufficientBalance.into()
        );
        assert_eq!(ledger.debit_collateral(user, mint, 0).unwrap(), 0);
        assert!(!ledger.exists(&user));

        ledger.credit_debt(user, 3).unwrap();
        assert_eq!(
            ledger.debit_collateral(user, mint, 1).unwrap_err(),
            EngineError::InsufficientBalance.into()
        );
        assert_eq!(ledger.position(&user).unwrap().collateral(&mint), 0);
        assert_eq!(ledger.position(&user).unwrap().collateral_balances().count(), 0);
    }

    #[test]
    fn positions_exist_only_once_touched() {
        let user = Pubkey::new_unique();
        let mut ledger = Ledger::new();
        assert!(!ledger.exists(&user));
        assert_eq!(ledger.debt_balance(&user), 0);

        ledger.open(user);
        assert!(ledger.exists(&user));
        assert!(ledger.position(&user).unwrap().is_empty());
    }

    #[test]
    fn collateral_value_skips_zero_balances() {
        let user = Pubkey::new_unique();
        let weth = Pubkey::new_unique();
        let wbtc = Pubkey::new_unique();
        let registry = CollateralRegistry::new(
            &[CollateralAsset::new(weth, 18), CollateralAsset::new(wbtc, 8)],
            &[Pubkey::new_unique(), Pubkey::new_unique()],
        )
        .unwrap();

        let mut ledger = Ledger::new();
        ledger.credit_collateral(user, weth, 3).unwrap();

        let mut priced = Vec::new();
        let total = ledger
            .total_collateral_value_usd(&user, &registry, |collateral, amount| {
                priced.push(collateral.mint);
                Ok(amount * 100)
            })
            .unwrap();

        assert_eq!(total, 300);
        assert_eq!(priced, vec![weth]);
    }

    #[test]
    fn totals_span_all_positions() {
        let mint = Pubkey::new_unique();
        let mut ledger = Ledger::new();
        for (i, user) in [Pubkey::new_unique(), Pubkey::new_unique()].into_iter().enumerate() {
            ledger.credit_collateral(user, mint, 10 * (i as u128 + 1)).unwrap();
            ledger.credit_debt(user, i as u128 + 1).unwrap();
        }

        assert_eq!(ledger.total_collateral(&mint).unwrap(), 30);
        assert_eq!(ledger.total_debt().unwrap(), 3);
    }
}
