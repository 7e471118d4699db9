use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod liquidation;
pub mod math;
pub mod oracle;
pub mod registry;
pub mod state;
pub mod token;
pub mod valuation;

use instructions::*;

declare_id!("C1CQiLW852eUP8RR4vV7QHYKhVZRt4nqPaDhqML7qbuZ");

#[program]
pub mod synthetic_engine {
    use super::*;

    /// Initialize the engine with its fixed collateral allow-list
    pub fn initialize_engine<'info>(
        ctx: Context<'_, '_, '_, 'info, InitializeEngine<'info>>,
        price_feeds: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, price_feeds)
    }

    /// Create the vault for a registered collateral mint
    pub fn initialize_vault(ctx: Context<InitializeVault>) -> Result<()> {
        instructions::initialize::vault_handler(ctx)
    }

    /// Create a USD price feed for a collateral mint
    pub fn initialize_price_feed(ctx: Context<InitializePriceFeed>, decimals: u8) -> Result<()> {
        instructions::price_feed::initialize_handler(ctx, decimals)
    }

    /// Publish a new price
    pub fn update_price(ctx: Context<UpdatePrice>, price: i64) -> Result<()> {
        instructions::price_feed::update_handler(ctx, price)
    }

    /// Create an empty position for the signer
    pub fn open_position(ctx: Context<OpenPosition>) -> Result<()> {
        instructions::open_position::handler(ctx)
    }

    /// Lock collateral in the engine
    pub fn deposit_collateral<'info>(
        ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::collateral::deposit_handler(ctx, amount)
    }

    /// Mint synthetic units against deposited collateral
    pub fn mint_synthetic<'info>(
        ctx: Context<'_, '_, '_, 'info, ManageDebt<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::debt::mint_handler(ctx, amount)
    }

    /// Withdraw collateral while staying healthy
    pub fn redeem_collateral<'info>(
        ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::collateral::redeem_handler(ctx, amount)
    }

    /// Repay debt by burning synthetic units
    pub fn burn_synthetic<'info>(
        ctx: Context<'_, '_, '_, 'info, ManageDebt<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::debt::burn_handler(ctx, amount)
    }

    /// Deposit collateral and mint in one step
    pub fn deposit_and_mint<'info>(
        ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>,
        collateral_amount: u64,
        debt_amount: u64,
    ) -> Result<()> {
        instructions::collateral::deposit_and_mint_handler(ctx, collateral_amount, debt_amount)
    }

    /// Burn debt and redeem collateral in one step
    pub fn redeem_and_burn<'info>(
        ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>,
        collateral_amount: u64,
        debt_amount: u64,
    ) -> Result<()> {
        instructions::collateral::redeem_and_burn_handler(ctx, collateral_amount, debt_amount)
    }

    /// Liquidate an unhealthy position
    pub fn liquidate<'info>(
        ctx: Context<'_, '_, '_, 'info, Liquidate<'info>>,
        debt_to_cover: u64,
    ) -> Result<()> {
        instructions::liquidate::handler(ctx, debt_to_cover)
    }
}

// Re-export for external use
pub use constants::*;
pub use engine::SyntheticEngine;
pub use errors::*;
pub use events::*;
pub use ledger::{Ledger, PositionBalances};
pub use liquidation::LiquidationOutcome;
pub use oracle::{OracleAdapter, PriceQuote, PriceSource};
pub use registry::{CollateralAsset, CollateralRegistry, CollateralType};
pub use state::*;
pub use token::{CollateralTokens, SyntheticToken};
pub use valuation::SeizeAmount;
