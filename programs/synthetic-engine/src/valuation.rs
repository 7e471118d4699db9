//! Conversions between collateral token amounts and 18-decimal USD values.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::EngineError;
use crate::math::{calculate_liquidation_bonus, mul_div, pow10};
use crate::oracle::PriceQuote;
use crate::registry::CollateralType;

/// Collateral owed to a liquidator for a covered debt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeizeAmount {
    pub base: u128,
    pub bonus: u128,
}

impl SeizeAmount {
    pub fn total(&self) -> Result<u128> {
        let total = self
            .base
            .checked_add(self.bonus)
            .ok_or(EngineError::MathOverflow)?;

        Ok(total)
    }
}

/// USD value (18 decimals) of `amount` tokens of `collateral`.
/// usd = amount * price * 1e18 / (10^feed_decimals * 10^token_decimals)
pub fn usd_value(collateral: &CollateralType, quote: &PriceQuote, amount: u128) -> Result<u128> {
    let price = quote.positive_price()?;
    let (usd_scale, token_scale) = scales(collateral, quote)?;

    let scaled_price = price
        .checked_mul(usd_scale)
        .ok_or(EngineError::MathOverflow)?;
    mul_div(amount, scaled_price, token_scale)
}

/// Token amount of `collateral` worth `usd_amount` (18 decimals), plus the liquidation
/// bonus on top of it.
/// base = usd * 10^feed_decimals * 10^token_decimals / (price * 1e18)
pub fn token_amount_for_usd(
    collateral: &CollateralType,
    quote: &PriceQuote,
    usd_amount: u128,
) -> Result<SeizeAmount> {
    let price = quote.positive_price()?;
    let (usd_scale, token_scale) = scales(collateral, quote)?;

    let denominator = price
        .checked_mul(usd_scale)
        .ok_or(EngineError::MathOverflow)?;
    let base = mul_div(usd_amount, token_scale, denominator)?;
    let bonus = calculate_liquidation_bonus(base)?;

    Ok(SeizeAmount { base, bonus })
}

/// Returns (1e18, 10^(feed_decimals + token_decimals))
fn scales(collateral: &CollateralType, quote: &PriceQuote) -> Result<(u128, u128)> {
    require!(
        collateral.decimals <= MAX_TOKEN_DECIMALS,
        EngineError::UnsupportedDecimals
    );
    require!(
        quote.decimals <= MAX_TOKEN_DECIMALS,
        EngineError::UnsupportedDecimals
    );

    Ok((PRECISION, pow10(quote.decimals + collateral.decimals)?))
}
