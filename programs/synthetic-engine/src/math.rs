use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::constants::*;
use crate::errors::EngineError;

/// Calculate `a * b / denominator` with a 256-bit intermediate.
/// Multiplies before dividing so no precision is lost to early truncation.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, EngineError::MathOverflow);

    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(EngineError::MathOverflow)?;

    narrow(product / U256::from(denominator))
}

/// 10^decimals as u128
pub fn pow10(decimals: u8) -> Result<u128> {
    let factor = 10u128
        .checked_pow(decimals as u32)
        .ok_or(EngineError::MathOverflow)?;

    Ok(factor)
}

/// Rescale an amount expressed with `decimals` to the 18-decimal USD scale
pub fn to_wad(amount: u128, decimals: u8) -> Result<u128> {
    require!(decimals <= WAD_DECIMALS, EngineError::UnsupportedDecimals);

    let value = amount
        .checked_mul(pow10(WAD_DECIMALS - decimals)?)
        .ok_or(EngineError::MathOverflow)?;

    Ok(value)
}

/// Calculate health factor
/// Health Factor = (collateral_value * LIQUIDATION_THRESHOLD / LIQUIDATION_PRECISION) * PRECISION / debt
/// Both inputs are 18-decimal USD values. Returns an 18-decimal ratio (1e18 = 1.0).
pub fn calculate_health_factor(debt_value: u128, collateral_value_usd: u128) -> Result<u128> {
    if debt_value == 0 {
        // No debt = infinite health factor, return max
        return Ok(MAX_HEALTH_FACTOR);
    }

    let adjusted_collateral = mul_div(
        collateral_value_usd,
        LIQUIDATION_THRESHOLD,
        LIQUIDATION_PRECISION,
    )?;

    let health_factor = U256::from(adjusted_collateral)
        .checked_mul(U256::from(PRECISION))
        .ok_or(EngineError::MathOverflow)?
        / U256::from(debt_value);

    // A ratio too large for u128 is as safe as the zero-debt sentinel
    Ok(narrow(health_factor).unwrap_or(MAX_HEALTH_FACTOR))
}

/// Calculate liquidation bonus amount
/// bonus = amount * LIQUIDATION_BONUS / LIQUIDATION_PRECISION
pub fn calculate_liquidation_bonus(amount: u128) -> Result<u128> {
    mul_div(amount, LIQUIDATION_BONUS, LIQUIDATION_PRECISION)
}

fn narrow(value: U256) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        return err!(EngineError::MathOverflow);
    }

    Ok(value.low_u128())
}
