use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::EngineError;

/// A collateral token accepted by the engine and the feed that prices it
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollateralType {
    /// Token mint identifying the collateral
    pub mint: Pubkey,
    /// Price feed quoting the token in USD
    pub price_feed: Pubkey,
    /// Decimals of the token amounts
    pub decimals: u8,
}

/// Token half of a collateral registration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollateralAsset {
    pub mint: Pubkey,
    pub decimals: u8,
}

impl CollateralAsset {
    pub fn new(mint: Pubkey, decimals: u8) -> Self {
        Self { mint, decimals }
    }
}

/// Fixed allow-list of collateral types, in registration order.
/// Built once at construction and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollateralRegistry {
    types: Vec<CollateralType>,
}

impl CollateralRegistry {
    /// Pair every asset with the price feed at the same index
    pub fn new(assets: &[CollateralAsset], price_feeds: &[Pubkey]) -> Result<Self> {
        require!(
            assets.len() == price_feeds.len(),
            EngineError::MismatchedConfigLengths
        );

        let types = assets
            .iter()
            .zip(price_feeds)
            .map(|(asset, price_feed)| CollateralType {
                mint: asset.mint,
                price_feed: *price_feed,
                decimals: asset.decimals,
            })
            .collect();

        Self::from_types(types)
    }

    /// Rebuild a registry from stored collateral types
    pub fn from_types(types: Vec<CollateralType>) -> Result<Self> {
        require!(!types.is_empty(), EngineError::EmptyCollateralSet);
        require!(
            types.len() <= MAX_COLLATERAL_TYPES,
            EngineError::TooManyCollateralTypes
        );

        for (i, collateral) in types.iter().enumerate() {
            require!(
                collateral.decimals <= MAX_TOKEN_DECIMALS,
                EngineError::UnsupportedDecimals
            );
            require!(
                types[..i].iter().all(|other| other.mint != collateral.mint),
                EngineError::DuplicateCollateral
            );
        }

        Ok(Self { types })
    }

    pub fn get(&self, mint: &Pubkey) -> Result<&CollateralType> {
        self.types
            .iter()
            .find(|collateral| collateral.mint == *mint)
            .ok_or_else(|| error!(EngineError::UnknownCollateral))
    }

    pub fn contains(&self, mint: &Pubkey) -> bool {
        self.types.iter().any(|collateral| collateral.mint == *mint)
    }

    pub fn types(&self) -> &[CollateralType] {
        &self.types
    }

    pub fn mints(&self) -> Vec<Pubkey> {
        self.types.iter().map(|collateral| collateral.mint).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
