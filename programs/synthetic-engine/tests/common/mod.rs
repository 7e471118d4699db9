//! In-memory collaborators and fixtures shared by the engine tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use anchor_lang::prelude::*;
use synthetic_engine::constants::PRECISION;
use synthetic_engine::engine::SyntheticEngine;
use synthetic_engine::errors::EngineError;
use synthetic_engine::oracle::{PriceQuote, PriceSource};
use synthetic_engine::registry::{CollateralAsset, CollateralRegistry};
use synthetic_engine::token::{CollateralTokens, SyntheticToken};

pub const START: i64 = 1_700_000_000;
pub const FEED_DECIMALS: u8 = 8;
pub const WETH_DECIMALS: u8 = 18;
pub const WBTC_DECIMALS: u8 = 8;

/// One whole unit of an 18-decimal amount
pub const ONE: u128 = PRECISION;

pub fn eth(amount: u128) -> u128 {
    amount * ONE
}

pub fn btc(amount: u128) -> u128 {
    amount * 100_000_000
}

pub fn usd(amount: u128) -> u128 {
    amount * ONE
}

/// Price with the feed's 8 implied decimals
pub fn feed_price(usd: i64) -> i64 {
    usd * 100_000_000
}

// -------------------------------------------------------------------------
// Price source
// -------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockPrices {
    quotes: Rc<RefCell<HashMap<Pubkey, PriceQuote>>>,
}

impl MockPrices {
    pub fn set(&self, feed: Pubkey, price: i64, updated_at: i64) {
        self.quotes
            .borrow_mut()
            .insert(feed, PriceQuote::new(price, FEED_DECIMALS, updated_at));
    }
}

impl PriceSource for MockPrices {
    fn latest_quote(&self, price_feed: &Pubkey) -> Result<PriceQuote> {
        self.quotes
            .borrow()
            .get(price_feed)
            .copied()
            .ok_or_else(|| error!(EngineError::PriceFeedMismatch))
    }
}

// -------------------------------------------------------------------------
// Synthetic token
// -------------------------------------------------------------------------

/// Price change applied by the synthetic token when the engine burns
#[derive(Clone)]
pub struct PriceShock {
    pub prices: MockPrices,
    pub feed: Pubkey,
    pub price: i64,
    pub updated_at: i64,
}

#[derive(Default)]
pub struct SyntheticState {
    pub balances: HashMap<Pubkey, u128>,
    pub supply: u128,
    pub refuse_mint: bool,
    pub refuse_transfer: bool,
    pub shock_on_burn: Option<PriceShock>,
}

#[derive(Clone)]
pub struct MockSynthetic {
    engine: Pubkey,
    state: Rc<RefCell<SyntheticState>>,
}

impl MockSynthetic {
    pub fn new(engine: Pubkey) -> Self {
        Self {
            engine,
            state: Rc::default(),
        }
    }

    pub fn balance(&self, owner: &Pubkey) -> u128 {
        self.state
            .borrow()
            .balances
            .get(owner)
            .copied()
            .unwrap_or_default()
    }

    pub fn supply(&self) -> u128 {
        self.state.borrow().supply
    }

    pub fn give(&self, owner: Pubkey, amount: u128) {
        let mut state = self.state.borrow_mut();
        *state.balances.entry(owner).or_default() += amount;
        state.supply += amount;
    }

    pub fn state(&self) -> std::cell::RefMut<'_, SyntheticState> {
        self.state.borrow_mut()
    }
}

impl SyntheticToken for MockSynthetic {
    fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<bool> {
        if self.state.borrow().refuse_mint {
            return Ok(false);
        }
        self.give(*to, amount);
        Ok(true)
    }

    fn transfer_from(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        if state.refuse_transfer {
            return Ok(false);
        }

        let balance = state.balances.entry(*from).or_default();
        if *balance < amount {
            return Ok(false);
        }
        *balance -= amount;
        *state.balances.entry(*to).or_default() += amount;
        Ok(true)
    }

    fn burn(&mut self, amount: u128) -> Result<()> {
        let shock = {
            let mut state = self.state.borrow_mut();
            let balance = state.balances.entry(self.engine).or_default();
            if *balance < amount {
                return err!(EngineError::InsufficientBalance);
            }
            *balance -= amount;
            state.supply -= amount;
            state.shock_on_burn.clone()
        };

        if let Some(shock) = shock {
            shock.prices.set(shock.feed, shock.price, shock.updated_at);
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------
// Collateral tokens
// -------------------------------------------------------------------------

#[derive(Default)]
pub struct CollateralState {
    pub balances: HashMap<(Pubkey, Pubkey), u128>,
    pub refuse_transfers: bool,
}

#[derive(Clone)]
pub struct MockCollateral {
    engine: Pubkey,
    state: Rc<RefCell<CollateralState>>,
}

impl MockCollateral {
    pub fn new(engine: Pubkey) -> Self {
        Self {
            engine,
            state: Rc::default(),
        }
    }

    pub fn balance(&self, mint: &Pubkey, owner: &Pubkey) -> u128 {
        self.state
            .borrow()
            .balances
            .get(&(*mint, *owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn fund(&self, mint: Pubkey, owner: Pubkey, amount: u128) {
        *self
            .state
            .borrow_mut()
            .balances
            .entry((mint, owner))
            .or_default() += amount;
    }

    pub fn refuse_transfers(&self, refuse: bool) {
        self.state.borrow_mut().refuse_transfers = refuse;
    }

    fn move_tokens(&self, mint: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> bool {
        let mut state = self.state.borrow_mut();
        if state.refuse_transfers {
            return false;
        }

        let balance = state.balances.entry((*mint, *from)).or_default();
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        *state.balances.entry((*mint, *to)).or_default() += amount;
        true
    }
}

impl CollateralTokens for MockCollateral {
    fn transfer_from(
        &mut self,
        mint: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> Result<bool> {
        Ok(self.move_tokens(mint, from, to, amount))
    }

    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u128) -> Result<bool> {
        let engine = self.engine;
        Ok(self.move_tokens(mint, &engine, to, amount))
    }
}

/// Collateral token calling back into the engine from inside a transfer
pub struct ReentrantCollateral {
    pub inner: MockCollateral,
    pub engine: Weak<SyntheticEngine<MockPrices, MockSynthetic, ReentrantCollateral>>,
    pub attempts: Rc<RefCell<Vec<Result<()>>>>,
}

impl ReentrantCollateral {
    fn call_back(&self, mint: &Pubkey, user: &Pubkey, amount: u128) {
        if let Some(engine) = self.engine.upgrade() {
            let attempt = engine.redeem_collateral(*user, *mint, amount);
            self.attempts.borrow_mut().push(attempt);

            let view = engine.collateral_tokens().map(|_| ());
            self.attempts.borrow_mut().push(view);
        }
    }
}

impl CollateralTokens for ReentrantCollateral {
    fn transfer_from(
        &mut self,
        mint: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> Result<bool> {
        self.call_back(mint, from, amount);
        self.inner.transfer_from(mint, from, to, amount)
    }

    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u128) -> Result<bool> {
        self.call_back(mint, to, amount);
        self.inner.transfer(mint, to, amount)
    }
}

// -------------------------------------------------------------------------
// Fixture
// -------------------------------------------------------------------------

pub type TestEngine = SyntheticEngine<MockPrices, MockSynthetic, MockCollateral>;

pub struct Markets {
    pub weth: Pubkey,
    pub weth_feed: Pubkey,
    pub wbtc: Pubkey,
    pub wbtc_feed: Pubkey,
}

impl Markets {
    pub fn new() -> Self {
        Self {
            weth: Pubkey::new_unique(),
            weth_feed: Pubkey::new_unique(),
            wbtc: Pubkey::new_unique(),
            wbtc_feed: Pubkey::new_unique(),
        }
    }

    pub fn registry(&self) -> CollateralRegistry {
        CollateralRegistry::new(
            &[
                CollateralAsset::new(self.weth, WETH_DECIMALS),
                CollateralAsset::new(self.wbtc, WBTC_DECIMALS),
            ],
            &[self.weth_feed, self.wbtc_feed],
        )
        .unwrap()
    }

    /// WETH at $2000 and WBTC at $30000, both published at `START`
    pub fn prices(&self) -> MockPrices {
        let prices = MockPrices::default();
        prices.set(self.weth_feed, feed_price(2_000), START);
        prices.set(self.wbtc_feed, feed_price(30_000), START);
        prices
    }
}

pub struct Fixture {
    pub engine: TestEngine,
    pub markets: Markets,
    pub prices: MockPrices,
    pub synthetic: MockSynthetic,
    pub collateral: MockCollateral,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_synthetic_decimals(18)
    }

    pub fn with_synthetic_decimals(decimals: u8) -> Self {
        let markets = Markets::new();
        let prices = markets.prices();
        let id = Pubkey::new_unique();
        let synthetic = MockSynthetic::new(id);
        let collateral = MockCollateral::new(id);

        let engine = SyntheticEngine::new(
            id,
            markets.registry(),
            decimals,
            prices.clone(),
            synthetic.clone(),
            collateral.clone(),
            START,
        )
        .unwrap();

        Self {
            engine,
            markets,
            prices,
            synthetic,
            collateral,
        }
    }

    pub fn weth(&self) -> Pubkey {
        self.markets.weth
    }

    pub fn wbtc(&self) -> Pubkey {
        self.markets.wbtc
    }

    /// New participant holding `amount` WETH in their wallet
    pub fn user_with_weth(&self, amount: u128) -> Pubkey {
        let user = Pubkey::new_unique();
        self.collateral.fund(self.weth(), user, amount);
        user
    }

    pub fn set_weth_price(&self, usd: i64) {
        self.prices
            .set(self.markets.weth_feed, feed_price(usd), self.engine.timestamp());
    }
}
