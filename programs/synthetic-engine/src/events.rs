use anchor_lang::prelude::*;

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollateralDeposited {
    pub user: Pubkey,
    pub collateral: Pubkey,
    pub amount: u128,
}

/// `from` and `to` differ when collateral is seized by a liquidator
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollateralRedeemed {
    pub from: Pubkey,
    pub to: Pubkey,
    pub collateral: Pubkey,
    pub amount: u128,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticMinted {
    pub user: Pubkey,
    pub amount: u128,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticBurned {
    pub on_behalf_of: Pubkey,
    pub payer: Pubkey,
    pub amount: u128,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionLiquidated {
    pub liquidator: Pubkey,
    pub user: Pubkey,
    pub collateral: Pubkey,
    pub debt_covered: u128,
    pub collateral_seized: u128,
    pub bonus: u128,
    pub starting_health_factor: u128,
    pub ending_health_factor: u128,
}

/// Events recorded by the engine during an operation.
/// Discarded when the operation fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    CollateralDeposited(CollateralDeposited),
    CollateralRedeemed(CollateralRedeemed),
    SyntheticMinted(SyntheticMinted),
    SyntheticBurned(SyntheticBurned),
    PositionLiquidated(PositionLiquidated),
}

impl EngineEvent {
    /// Log the event for off-chain indexers
    pub fn emit(&self) {
        match self {
            EngineEvent::CollateralDeposited(event) => emit!(event.clone()),
            EngineEvent::CollateralRedeemed(event) => emit!(event.clone()),
            EngineEvent::SyntheticMinted(event) => emit!(event.clone()),
            EngineEvent::SyntheticBurned(event) => emit!(event.clone()),
            EngineEvent::PositionLiquidated(event) => emit!(event.clone()),
        }
    }
}
