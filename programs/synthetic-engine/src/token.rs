use anchor_lang::prelude::*;

use crate::errors::EngineError;

/// The synthetic unit minted against collateral.
/// The engine holds the only capability allowed to mint and burn it.
pub trait SyntheticToken {
    /// Mint `amount` to `to`; `Ok(false)` reports a refused mint
    fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<bool>;

    /// Move `amount` from `from` to `to` on behalf of the engine
    fn transfer_from(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<bool>;

    /// Burn `amount` out of the engine's own balance
    fn burn(&mut self, amount: u128) -> Result<()>;
}

/// The fungible tokens accepted as collateral, addressed by mint
pub trait CollateralTokens {
    /// Pull `amount` of `mint` from `from` into `to`
    fn transfer_from(&mut self, mint: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128)
        -> Result<bool>;

    /// Send `amount` of `mint` held by the engine to `to`
    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u128) -> Result<bool>;
}

/// Collapse a collaborator answer into success or `failure`.
/// A `false` answer and an error are treated the same.
pub fn expect_success(outcome: Result<bool>, failure: EngineError) -> Result<()> {
    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => Err(failure.into()),
        Err(e) => {
            msg!("Token call failed: {}", e);
            Err(failure.into())
        }
    }
}
