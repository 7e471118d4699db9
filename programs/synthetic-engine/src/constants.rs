use anchor_lang::prelude::*;

/// Fixed point scale shared by USD values and health factors (1e18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Decimals of the common USD fixed point scale
pub const WAD_DECIMALS: u8 = 18;

/// Decimals of the reference price feed (prices are quoted with 8 implied decimals)
pub const FEED_DECIMALS: u8 = 8;

/// Percentage of nominal collateral value that counts toward backing debt.
/// 50 out of 100 means positions must stay 200% over-collateralized.
pub const LIQUIDATION_THRESHOLD: u128 = 50;

/// Denominator for `LIQUIDATION_THRESHOLD` and `LIQUIDATION_BONUS`
pub const LIQUIDATION_PRECISION: u128 = 100;

/// Bonus paid to liquidators on top of the seized collateral (10%)
pub const LIQUIDATION_BONUS: u128 = 10;

/// Health factor below which a position is insolvent (1.0)
pub const MIN_HEALTH_FACTOR: u128 = PRECISION;

/// Health factor reported for positions without debt
pub const MAX_HEALTH_FACTOR: u128 = u128::MAX;

/// Oracle price staleness threshold (3 hours in seconds)
pub const MAX_PRICE_AGE: i64 = 3 * 60 * 60;

/// Maximum number of collateral types the engine can be configured with
pub const MAX_COLLATERAL_TYPES: usize = 8;

/// Largest token decimals the valuation math accepts
pub const MAX_TOKEN_DECIMALS: u8 = 18;

#[constant]
pub const ENGINE_SEED: &[u8] = b"engine";

#[constant]
pub const POSITION_SEED: &[u8] = b"position";

#[constant]
pub const VAULT_SEED: &[u8] = b"vault";

#[constant]
pub const SYNTHETIC_VAULT_SEED: &[u8] = b"synthetic_vault";

#[constant]
pub const PRICE_FEED_SEED: &[u8] = b"price_feed";
