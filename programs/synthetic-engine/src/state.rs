use anchor_lang::prelude::*;

use crate::errors::EngineError;
use crate::ledger::PositionBalances;
use crate::oracle::PriceQuote;
use crate::registry::{CollateralRegistry, CollateralType};

/// Engine configuration, fixed at initialization
#[account]
#[derive(InitSpace)]
pub struct EngineConfig {
    /// Authority that initialized the engine
    pub authority: Pubkey,
    /// Synthetic unit mint; its mint authority is this account
    pub synthetic_mint: Pubkey,
    /// Decimals of the synthetic unit
    pub synthetic_decimals: u8,
    /// Accepted collateral, in registration order
    #[max_len(8)]
    pub collateral: Vec<CollateralType>,
    /// Collateral held for all positions, indexed like `collateral`
    #[max_len(8)]
    pub total_collateral: Vec<u128>,
    /// Outstanding synthetic debt across all positions
    pub total_debt: u128,
    /// Bump seed for the engine PDA
    pub bump: u8,
    /// Bump seed for the synthetic vault PDA
    pub synthetic_vault_bump: u8,
}

impl EngineConfig {
    pub fn initialize(
        &mut self,
        authority: Pubkey,
        synthetic_mint: Pubkey,
        synthetic_decimals: u8,
        registry: &CollateralRegistry,
        bump: u8,
        synthetic_vault_bump: u8,
    ) {
        self.authority = authority;
        self.synthetic_mint = synthetic_mint;
        self.synthetic_decimals = synthetic_decimals;
        self.collateral = registry.types().to_vec();
        self.total_collateral = vec![0; registry.len()];
        self.total_debt = 0;
        self.bump = bump;
        self.synthetic_vault_bump = synthetic_vault_bump;
    }

    pub fn registry(&self) -> Result<CollateralRegistry> {
        CollateralRegistry::from_types(self.collateral.clone())
    }

    /// Fold the change of one position into the protocol totals
    pub fn apply_position_change(
        &mut self,
        registry: &CollateralRegistry,
        before: &PositionBalances,
        after: &PositionBalances,
    ) -> Result<()> {
        for (total, collateral) in self.total_collateral.iter_mut().zip(registry.types()) {
            *total = total
                .checked_add(after.collateral(&collateral.mint))
                .and_then(|t| t.checked_sub(before.collateral(&collateral.mint)))
                .ok_or(EngineError::MathOverflow)?;
        }

        self.total_debt = self
            .total_debt
            .checked_add(after.debt())
            .and_then(|t| t.checked_sub(before.debt()))
            .ok_or(EngineError::MathOverflow)?;

        Ok(())
    }
}

/// A participant's stored position
#[account]
#[derive(InitSpace, Debug)]
pub struct Position {
    pub owner: Pubkey,
    /// Collateral balances, indexed like `EngineConfig::collateral`
    #[max_len(8)]
    pub collateral: Vec<u128>,
    /// Synthetic debt
    pub debt: u128,
    pub bump: u8,
}

impl Position {
    pub fn initialize(&mut self, owner: Pubkey, registry: &CollateralRegistry, bump: u8) {
        self.owner = owner;
        self.collateral = vec![0; registry.len()];
        self.debt = 0;
        self.bump = bump;
    }

    /// Initialize a freshly created position for `owner`, or check that an existing one is theirs.
    /// Returns whether the position was just opened.
    pub fn open_if_new(
        &mut self,
        owner: Pubkey,
        registry: &CollateralRegistry,
        bump: u8,
    ) -> Result<bool> {
        if self.owner == Pubkey::default() {
            self.initialize(owner, registry, bump);
            return Ok(true);
        }

        require_keys_eq!(self.owner, owner, EngineError::PositionOwnerMismatch);
        Ok(false)
    }

    pub fn balances(&self, registry: &CollateralRegistry) -> PositionBalances {
        registry
            .types()
            .iter()
            .zip(&self.collateral)
            .fold(
                PositionBalances::default().with_debt(self.debt),
                |balances, (collateral, amount)| balances.with_collateral(collateral.mint, *amount),
            )
    }

    pub fn store(&mut self, registry: &CollateralRegistry, balances: &PositionBalances) {
        self.collateral = registry
            .types()
            .iter()
            .map(|collateral| balances.collateral(&collateral.mint))
            .collect();
        self.debt = balances.debt();
    }
}

/// USD price feed for one collateral mint, pushed by its authority
#[account]
#[derive(InitSpace)]
pub struct PriceFeed {
    pub authority: Pubkey,
    pub mint: Pubkey,
    /// Price with `decimals` implied decimals
    pub price: i64,
    pub decimals: u8,
    pub updated_at: i64,
    pub bump: u8,
}

impl PriceFeed {
    pub fn quote(&self) -> PriceQuote {
        PriceQuote::new(self.price, self.decimals, self.updated_at)
    }
}
