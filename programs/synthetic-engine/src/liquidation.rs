use anchor_lang::prelude::*;

use crate::constants::*;
use crate::engine::SyntheticEngine;
use crate::errors::EngineError;
use crate::events::{EngineEvent, PositionLiquidated};
use crate::math::to_wad;
use crate::oracle::PriceSource;
use crate::token::{CollateralTokens, SyntheticToken};
use crate::valuation;

/// Result of a successful liquidation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub debt_covered: u128,
    /// Collateral handed to the liquidator, bonus included
    pub collateral_seized: u128,
    pub bonus: u128,
    pub starting_health_factor: u128,
    pub ending_health_factor: u128,
}

impl<P, S, C> SyntheticEngine<P, S, C>
where
    P: PriceSource,
    S: SyntheticToken,
    C: CollateralTokens,
{
    /// Liquidate an unhealthy position
    ///
    /// The liquidator burns `debt_to_cover` of their own synthetic tokens to pay off part of
    /// `user`'s debt and receives the equivalent `mint` collateral plus a 10% bonus.
    /// Fails with `HealthFactorOk` on a healthy position and with
    /// `HealthFactorNotImproved` when the position is not strictly healthier afterwards.
    /// A position whose collateral no longer covers the seizure fails with
    /// `InsufficientBalance` rather than being partially seized.
    pub fn liquidate(
        &self,
        liquidator: Pubkey,
        mint: Pubkey,
        user: Pubkey,
        debt_to_cover: u128,
    ) -> Result<LiquidationOutcome> {
        self.transact("liquidate", || {
            require!(debt_to_cover > 0, EngineError::InvalidAmount);
            let collateral = *self.registry().get(&mint)?;

            let starting_health_factor = self.health_factor(&user)?;
            if starting_health_factor >= MIN_HEALTH_FACTOR {
                msg!("Position {} is healthy: {}", user, starting_health_factor);
                return err!(EngineError::HealthFactorOk);
            }

            let quote = self.quote(&collateral)?;
            let debt_value = to_wad(debt_to_cover, self.synthetic_decimals())?;
            let seized = valuation::token_amount_for_usd(&collateral, &quote, debt_value)?;
            let collateral_seized = seized.total()?;

            self.redeem(mint, collateral_seized, user, liquidator)?;
            self.burn(debt_to_cover, user, liquidator)?;

            let ending_health_factor = self.health_factor(&user)?;
            if ending_health_factor <= starting_health_factor {
                msg!(
                    "Liquidation of {} did not improve health factor: {} -> {}",
                    user,
                    starting_health_factor,
                    ending_health_factor
                );
                return err!(EngineError::HealthFactorNotImproved);
            }

            self.revert_if_health_factor_is_broken(&liquidator)?;

            msg!(
                "Liquidated {}: covered {}, seized {} (bonus {})",
                user,
                debt_to_cover,
                collateral_seized,
                seized.bonus
            );
            self.record(EngineEvent::PositionLiquidated(PositionLiquidated {
                liquidator,
                user,
                collateral: mint,
                debt_covered: debt_to_cover,
                collateral_seized,
                bonus: seized.bonus,
                starting_health_factor,
                ending_health_factor,
            }));

            Ok(LiquidationOutcome {
                debt_covered: debt_to_cover,
                collateral_seized,
                bonus: seized.bonus,
                starting_health_factor,
                ending_health_factor,
            })
        })
    }
}
