use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::EngineError;
use crate::registry::CollateralType;

/// Latest answer of a price feed. Never persisted by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceQuote {
    /// USD price with `decimals` implied decimals
    pub price: i64,
    pub decimals: u8,
    /// Unix timestamp of the last feed update
    pub updated_at: i64,
}

impl PriceQuote {
    pub fn new(price: i64, decimals: u8, updated_at: i64) -> Self {
        Self {
            price,
            decimals,
            updated_at,
        }
    }

    /// Price as an unsigned integer, rejecting zero and negative answers
    pub fn positive_price(&self) -> Result<u128> {
        require!(self.price > 0, EngineError::InvalidPrice);
        Ok(self.price as u128)
    }
}

/// External source of collateral prices. The engine only ever reads from it.
pub trait PriceSource {
    fn latest_quote(&self, price_feed: &Pubkey) -> Result<PriceQuote>;
}

impl<P: PriceSource + ?Sized> PriceSource for &P {
    fn latest_quote(&self, price_feed: &Pubkey) -> Result<PriceQuote> {
        (**self).latest_quote(price_feed)
    }
}

/// Wraps a `PriceSource` and refuses quotes older than `MAX_PRICE_AGE`.
/// Every price read of the engine goes through `get_price`.
pub struct OracleAdapter<P> {
    source: P,
}

impl<P: PriceSource> OracleAdapter<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }

    pub fn get_price(&self, collateral: &CollateralType, now: i64) -> Result<PriceQuote> {
        let quote = self.source.latest_quote(&collateral.price_feed)?;
        check_freshness(&quote, now)?;
        quote.positive_price()?;
        Ok(quote)
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn timeout(&self) -> i64 {
        MAX_PRICE_AGE
    }
}

/// Fail with `StalePrice` when the quote was never updated or is older than `MAX_PRICE_AGE`.
/// A timestamp ahead of `now` counts as age zero.
pub fn check_freshness(quote: &PriceQuote, now: i64) -> Result<()> {
    require!(quote.updated_at != 0, EngineError::StalePrice);

    let age = now.saturating_sub(quote.updated_at).max(0);
    if age > MAX_PRICE_AGE {
        msg!("Stale price: updated at {}, age {}s", quote.updated_at, age);
        return err!(EngineError::StalePrice);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedQuotes(HashMap<Pubkey, PriceQuote>);

    impl PriceSource for FixedQuotes {
        fn latest_quote(&self, price_feed: &Pubkey) -> Result<PriceQuote> {
            self.0
                .get(price_feed)
                .copied()
                .ok_or_else(|| error!(EngineError::PriceFeedMismatch))
        }
    }

    fn collateral() -> CollateralType {
        CollateralType {
            mint: Pubkey::new_unique(),
            price_feed: Pubkey::new_unique(),
            decimals: 18,
        }
    }

    fn adapter(collateral: &CollateralType, quote: PriceQuote) -> OracleAdapter<FixedQuotes> {
        OracleAdapter::new(FixedQuotes(HashMap::from([(collateral.price_feed, quote)])))
    }

    #[test]
    fn accepts_quotes_up_to_max_age() {
        let weth = collateral();
        let oracle = adapter(&weth, PriceQuote::new(2_000_00000000, FEED_DECIMALS, 1_000));

        let quote = oracle.get_price(&weth, 1_000 + MAX_PRICE_AGE).unwrap();
        assert_eq!(quote.price, 2_000_00000000);
        assert_eq!(
            oracle.get_price(&weth, 1_001 + MAX_PRICE_AGE).unwrap_err(),
            EngineError::StalePrice.into()
        );
    }

    #[test]
    fn never_updated_feed_is_stale() {
        let weth = collateral();
        let oracle = adapter(&weth, PriceQuote::new(2_000_00000000, FEED_DECIMALS, 0));
        assert_eq!(
            oracle.get_price(&weth, 10).unwrap_err(),
            EngineError::StalePrice.into()
        );
    }

    #[test]
    fn future_timestamps_count_as_fresh() {
        let weth = collateral();
        let oracle = adapter(&weth, PriceQuote::new(1, FEED_DECIMALS, 5_000));
        assert!(oracle.get_price(&weth, 10).is_ok());
    }

    #[test]
    fn rejects_non_positive_prices() {
        let weth = collateral();
        for price in [0, -1] {
            let oracle = adapter(&weth, PriceQuote::new(price, FEED_DECIMALS, 100));
            assert_eq!(
                oracle.get_price(&weth, 100).unwrap_err(),
                EngineError::InvalidPrice.into()
            );
        }
    }
}
