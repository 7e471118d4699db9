use std::cell::{Cell, Ref, RefCell};

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::EngineError;
use crate::events::*;
use crate::ledger::{Ledger, PositionBalances};
use crate::math::{calculate_health_factor, to_wad};
use crate::oracle::{OracleAdapter, PriceQuote, PriceSource};
use crate::registry::{CollateralRegistry, CollateralType};
use crate::token::{expect_success, CollateralTokens, SyntheticToken};
use crate::valuation::{self, SeizeAmount};

/// Position ledger plus the solvency rules enforced on every change to it.
///
/// Every mutating entry point runs as one transaction: it holds the in-flight flag for its
/// whole duration, so a collaborator calling back into the engine is refused with
/// `ReentrantCall`, and any failure restores the ledger and event buffer to their state
/// before the call.
pub struct SyntheticEngine<P, S, C> {
    /// Identity holding deposited collateral and synthetic tokens awaiting burn
    id: Pubkey,
    registry: CollateralRegistry,
    synthetic_decimals: u8,
    oracle: OracleAdapter<P>,
    synthetic: RefCell<S>,
    collateral: RefCell<C>,
    ledger: RefCell<Ledger>,
    events: RefCell<Vec<EngineEvent>>,
    in_flight: Cell<bool>,
    now: Cell<i64>,
}

/// Scoped hold on the engine's in-flight flag
struct OperationGuard<'a> {
    in_flight: &'a Cell<bool>,
}

impl<'a> OperationGuard<'a> {
    fn acquire(in_flight: &'a Cell<bool>) -> Result<Self> {
        if in_flight.replace(true) {
            msg!("Rejected re-entrant engine call");
            return err!(EngineError::ReentrantCall);
        }

        Ok(Self { in_flight })
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.set(false);
    }
}

impl<P, S, C> SyntheticEngine<P, S, C>
where
    P: PriceSource,
    S: SyntheticToken,
    C: CollateralTokens,
{
    pub fn new(
        id: Pubkey,
        registry: CollateralRegistry,
        synthetic_decimals: u8,
        price_source: P,
        synthetic: S,
        collateral: C,
        now: i64,
    ) -> Result<Self> {
        require!(
            synthetic_decimals <= WAD_DECIMALS,
            EngineError::UnsupportedDecimals
        );
        require!(!registry.is_empty(), EngineError::EmptyCollateralSet);

        Ok(Self {
            id,
            registry,
            synthetic_decimals,
            oracle: OracleAdapter::new(price_source),
            synthetic: RefCell::new(synthetic),
            collateral: RefCell::new(collateral),
            ledger: RefCell::new(Ledger::new()),
            events: RefCell::new(Vec::new()),
            in_flight: Cell::new(false),
            now: Cell::new(now),
        })
    }

    /// Make an empty position exist for `user`
    pub fn open_position(&self, user: Pubkey) -> Result<()> {
        self.transact("open_position", || {
            self.ledger.borrow_mut().open(user);
            Ok(())
        })
    }

    /// Lock `amount` of `mint` as collateral for `user`
    pub fn deposit_collateral(&self, user: Pubkey, mint: Pubkey, amount: u128) -> Result<()> {
        self.transact("deposit_collateral", || self.deposit(user, mint, amount))
    }

    /// Mint `amount` of the synthetic unit against `user`'s collateral
    pub fn mint_debt(&self, user: Pubkey, amount: u128) -> Result<()> {
        self.transact("mint_debt", || self.mint(user, amount))
    }

    /// Withdraw collateral; the remaining position must stay healthy
    pub fn redeem_collateral(&self, user: Pubkey, mint: Pubkey, amount: u128) -> Result<()> {
        self.transact("redeem_collateral", || {
            self.redeem(mint, amount, user, user)?;
            self.revert_if_health_factor_is_broken(&user)
        })
    }

    /// Pay back `amount` of `user`'s debt out of their synthetic balance
    pub fn burn_debt(&self, user: Pubkey, amount: u128) -> Result<()> {
        self.transact("burn_debt", || self.burn(amount, user, user))
    }

    pub fn deposit_and_mint(
        &self,
        user: Pubkey,
        mint: Pubkey,
        collateral_amount: u128,
        debt_amount: u128,
    ) -> Result<()> {
        self.transact("deposit_and_mint", || {
            self.deposit(user, mint, collateral_amount)?;
            self.mint(user, debt_amount)
        })
    }

    pub fn redeem_and_burn(
        &self,
        user: Pubkey,
        mint: Pubkey,
        collateral_amount: u128,
        debt_amount: u128,
    ) -> Result<()> {
        self.transact("redeem_and_burn", || {
            self.burn(debt_amount, user, user)?;
            self.redeem(mint, collateral_amount, user, user)?;
            self.revert_if_health_factor_is_broken(&user)
        })
    }

    /// Current health factor of `user`, priced with fresh quotes
    pub fn health_factor(&self, user: &Pubkey) -> Result<u128> {
        let (debt, collateral_value) = self.account_information(user)?;
        calculate_health_factor(to_wad(debt, self.synthetic_decimals)?, collateral_value)
    }

    /// Health factor for arbitrary balances; debt in synthetic units, collateral in USD
    pub fn calculate_health_factor(&self, debt: u128, collateral_value_usd: u128) -> Result<u128> {
        calculate_health_factor(to_wad(debt, self.synthetic_decimals)?, collateral_value_usd)
    }

    /// (debt, collateral value in USD) of `user`
    pub fn account_information(&self, user: &Pubkey) -> Result<(u128, u128)> {
        Ok((self.debt_balance(user), self.collateral_value_usd(user)?))
    }

    pub fn collateral_value_usd(&self, user: &Pubkey) -> Result<u128> {
        // Priced on a copy so no ledger borrow is held while the price source runs
        let ledger = match self.position(user) {
            Some(position) => {
                let mut ledger = Ledger::new();
                ledger.insert(*user, position);
                ledger
            }
            None => return Ok(0),
        };

        ledger.total_collateral_value_usd(user, &self.registry, |collateral, amount| {
            let quote = self.quote(collateral)?;
            valuation::usd_value(collateral, &quote, amount)
        })
    }

    pub fn usd_value(&self, mint: &Pubkey, amount: u128) -> Result<u128> {
        let collateral = self.registry.get(mint)?;
        let quote = self.quote(collateral)?;
        valuation::usd_value(collateral, &quote, amount)
    }

    pub fn token_amount_for_usd(&self, mint: &Pubkey, usd_amount: u128) -> Result<SeizeAmount> {
        let collateral = self.registry.get(mint)?;
        let quote = self.quote(collateral)?;
        valuation::token_amount_for_usd(collateral, &quote, usd_amount)
    }

    /// USD value of all collateral held by the engine
    pub fn total_collateral_value_usd(&self) -> Result<u128> {
        let mut total: u128 = 0;
        for collateral in self.registry.types() {
            let amount = self.total_collateral(&collateral.mint)?;
            if amount == 0 {
                continue;
            }

            let quote = self.quote(collateral)?;
            total = total
                .checked_add(valuation::usd_value(collateral, &quote, amount)?)
                .ok_or(EngineError::MathOverflow)?;
        }

        Ok(total)
    }

    /// Credit collateral and pull the tokens in. Callers hold the operation guard.
    pub(crate) fn deposit(&self, user: Pubkey, mint: Pubkey, amount: u128) -> Result<()> {
        require!(amount > 0, EngineError::InvalidAmount);
        self.registry.get(&mint)?;

        self.ledger
            .borrow_mut()
            .credit_collateral(user, mint, amount)?;
        self.record(EngineEvent::CollateralDeposited(CollateralDeposited {
            user,
            collateral: mint,
            amount,
        }));
        msg!("Deposited {} of {} for {}", amount, mint, user);

        let outcome = self
            .collateral
            .borrow_mut()
            .transfer_from(&mint, &user, &self.id, amount);
        expect_success(outcome, EngineError::TransferFailed)
    }

    pub(crate) fn mint(&self, user: Pubkey, amount: u128) -> Result<()> {
        require!(amount > 0, EngineError::InvalidAmount);

        self.ledger.borrow_mut().credit_debt(user, amount)?;
        self.revert_if_health_factor_is_broken(&user)?;
        self.record(EngineEvent::SyntheticMinted(SyntheticMinted { user, amount }));
        msg!("Minted {} for {}", amount, user);

        let outcome = self.synthetic.borrow_mut().mint(&user, amount);
        expect_success(outcome, EngineError::MintFailed)
    }

    /// Move `amount` of `from`'s collateral out of the engine to `to`
    pub(crate) fn redeem(&self, mint: Pubkey, amount: u128, from: Pubkey, to: Pubkey) -> Result<()> {
        require!(amount > 0, EngineError::InvalidAmount);
        self.registry.get(&mint)?;

        self.ledger
            .borrow_mut()
            .debit_collateral(from, mint, amount)?;
        self.record(EngineEvent::CollateralRedeemed(CollateralRedeemed {
            from,
            to,
            collateral: mint,
            amount,
        }));
        msg!("Redeemed {} of {} from {} to {}", amount, mint, from, to);

        let outcome = self.collateral.borrow_mut().transfer(&mint, &to, amount);
        expect_success(outcome, EngineError::TransferFailed)
    }

    /// Remove `amount` of `on_behalf_of`'s debt, paid with `payer`'s synthetic tokens
    pub(crate) fn burn(&self, amount: u128, on_behalf_of: Pubkey, payer: Pubkey) -> Result<()> {
        require!(amount > 0, EngineError::InvalidAmount);

        self.ledger.borrow_mut().debit_debt(on_behalf_of, amount)?;
        self.record(EngineEvent::SyntheticBurned(SyntheticBurned {
            on_behalf_of,
            payer,
            amount,
        }));
        msg!("Burned {} of debt for {} paid by {}", amount, on_behalf_of, payer);

        let outcome = self
            .synthetic
            .borrow_mut()
            .transfer_from(&payer, &self.id, amount);
        expect_success(outcome, EngineError::TransferFailed)?;

        let burned = self.synthetic.borrow_mut().burn(amount);
        expect_success(burned.map(|_| true), EngineError::TransferFailed)
    }

    pub(crate) fn revert_if_health_factor_is_broken(&self, user: &Pubkey) -> Result<()> {
        let health_factor = self.health_factor(user)?;
        if health_factor < MIN_HEALTH_FACTOR {
            msg!("Health factor of {} broken: {}", user, health_factor);
            return err!(EngineError::HealthFactorBroken);
        }

        Ok(())
    }

    pub(crate) fn quote(&self, collateral: &CollateralType) -> Result<PriceQuote> {
        self.oracle.get_price(collateral, self.now.get())
    }

    pub(crate) fn record(&self, event: EngineEvent) {
        self.events.borrow_mut().push(event);
    }

    /// Run `operation` under the in-flight guard, undoing every ledger change and
    /// recorded event if it fails
    pub(crate) fn transact<T>(&self, name: &str, operation: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = OperationGuard::acquire(&self.in_flight)?;

        let ledger_snapshot = self.ledger.borrow().clone();
        let recorded = self.events.borrow().len();

        let result = operation();
        if let Err(e) = &result {
            msg!("{} rejected: {}", name, e);
            *self.ledger.borrow_mut() = ledger_snapshot;
            self.events.borrow_mut().truncate(recorded);
        }

        result
    }

    pub fn id(&self) -> Pubkey {
        self.id
    }

    pub fn registry(&self) -> &CollateralRegistry {
        &self.registry
    }

    pub fn collateral_types(&self) -> Vec<Pubkey> {
        self.registry.mints()
    }

    pub fn price_feed(&self, mint: &Pubkey) -> Result<Pubkey> {
        Ok(self.registry.get(mint)?.price_feed)
    }

    pub fn synthetic_decimals(&self) -> u8 {
        self.synthetic_decimals
    }

    pub fn timestamp(&self) -> i64 {
        self.now.get()
    }

    pub fn set_timestamp(&self, now: i64) {
        self.now.set(now);
    }

    pub fn price_source(&self) -> &P {
        self.oracle.source()
    }

    pub fn price_timeout(&self) -> i64 {
        self.oracle.timeout()
    }

    /// Refused with `ReentrantCall` while the engine is calling into the synthetic token
    pub fn synthetic(&self) -> Result<Ref<'_, S>> {
        self.synthetic
            .try_borrow()
            .map_err(|_| error!(EngineError::ReentrantCall))
    }

    /// Refused with `ReentrantCall` while the engine is calling into a collateral token
    pub fn collateral_tokens(&self) -> Result<Ref<'_, C>> {
        self.collateral
            .try_borrow()
            .map_err(|_| error!(EngineError::ReentrantCall))
    }

    pub fn position_exists(&self, user: &Pubkey) -> bool {
        self.ledger.borrow().exists(user)
    }

    pub fn position(&self, user: &Pubkey) -> Option<PositionBalances> {
        self.ledger.borrow().position(user).cloned()
    }

    /// Load stored balances of `user` into the ledger
    pub fn load_position(&self, user: Pubkey, balances: PositionBalances) {
        self.ledger.borrow_mut().insert(user, balances);
    }

    pub fn collateral_balance(&self, user: &Pubkey, mint: &Pubkey) -> u128 {
        self.ledger.borrow().collateral_balance(user, mint)
    }

    pub fn debt_balance(&self, user: &Pubkey) -> u128 {
        self.ledger.borrow().debt_balance(user)
    }

    pub fn total_debt(&self) -> Result<u128> {
        self.ledger.borrow().total_debt()
    }

    pub fn total_collateral(&self, mint: &Pubkey) -> Result<u128> {
        self.ledger.borrow().total_collateral(mint)
    }

    pub fn is_operation_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Drain events recorded by successful operations
    pub fn take_events(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn liquidation_threshold(&self) -> u128 {
        LIQUIDATION_THRESHOLD
    }

    pub fn liquidation_bonus(&self) -> u128 {
        LIQUIDATION_BONUS
    }

    pub fn min_health_factor(&self) -> u128 {
        MIN_HEALTH_FACTOR
    }

    pub fn precision(&self) -> u128 {
        PRECISION
    }
}
