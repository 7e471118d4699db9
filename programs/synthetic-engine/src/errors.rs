use anchor_lang::prelude::*;

#[error_code]
pub enum EngineError {
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Collateral tokens and price feeds must have the same length")]
    MismatchedConfigLengths,

    #[msg("At least one collateral type must be configured")]
    EmptyCollateralSet,

    #[msg("Collateral type registered twice")]
    DuplicateCollateral,

    #[msg("Too many collateral types")]
    TooManyCollateralTypes,

    #[msg("Token decimals not supported")]
    UnsupportedDecimals,

    #[msg("Collateral type is not registered with the engine")]
    UnknownCollateral,

    #[msg("Insufficient balance")]
    InsufficientBalance,

    #[msg("Oracle price is stale")]
    StalePrice,

    #[msg("Oracle price must be positive")]
    InvalidPrice,

    #[msg("Operation would break the health factor")]
    HealthFactorBroken,

    #[msg("Liquidation not needed - health factor is safe")]
    HealthFactorOk,

    #[msg("Liquidation did not improve the health factor")]
    HealthFactorNotImproved,

    #[msg("Token transfer failed")]
    TransferFailed,

    #[msg("Synthetic mint failed")]
    MintFailed,

    #[msg("Engine operation already in progress")]
    ReentrantCall,

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Amount does not fit in a token account")]
    AmountTooLarge,

    #[msg("Position does not belong to the expected owner")]
    PositionOwnerMismatch,

    #[msg("Price feed account does not match the registered feed")]
    PriceFeedMismatch,

    #[msg("Unauthorized")]
    Unauthorized,
}
