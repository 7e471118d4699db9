//! Account-backed collaborators for running the engine inside an instruction.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{self, Burn, MintTo, Transfer};

use crate::constants::*;
use crate::engine::SyntheticEngine;
use crate::errors::EngineError;
use crate::oracle::{PriceQuote, PriceSource};
use crate::registry::CollateralRegistry;
use crate::state::{EngineConfig, Position, PriceFeed};
use crate::token::{CollateralTokens, SyntheticToken};

/// Quotes read from the `PriceFeed` accounts passed as remaining accounts
pub struct AccountPriceFeeds {
    quotes: BTreeMap<Pubkey, PriceQuote>,
}

impl AccountPriceFeeds {
    pub fn load(registry: &CollateralRegistry, accounts: &[AccountInfo]) -> Result<Self> {
        let mut quotes = BTreeMap::new();
        for info in accounts {
            require!(
                registry
                    .types()
                    .iter()
                    .any(|collateral| collateral.price_feed == *info.key),
                EngineError::PriceFeedMismatch
            );
            require_keys_eq!(*info.owner, crate::ID, EngineError::PriceFeedMismatch);

            let data = info.try_borrow_data()?;
            let feed = PriceFeed::try_deserialize(&mut &data[..])?;
            quotes.insert(*info.key, feed.quote());
        }

        Ok(Self { quotes })
    }
}

impl PriceSource for AccountPriceFeeds {
    fn latest_quote(&self, price_feed: &Pubkey) -> Result<PriceQuote> {
        self.quotes.get(price_feed).copied().ok_or_else(|| {
            msg!("Missing price feed account {}", price_feed);
            error!(EngineError::PriceFeedMismatch)
        })
    }
}

/// The SPL token accounts of one participant taking part in an instruction
#[derive(Clone)]
pub struct Holder<'info> {
    pub key: Pubkey,
    pub authority: AccountInfo<'info>,
    pub token_account: AccountInfo<'info>,
}

/// The engine PDA, signing for its vaults and the synthetic mint
#[derive(Clone)]
pub struct EngineSigner<'info> {
    pub account: AccountInfo<'info>,
    pub bump: u8,
}

impl<'info> EngineSigner<'info> {
    fn key(&self) -> Pubkey {
        *self.account.key
    }
}

/// Synthetic mint driven through the token program
pub struct SplSynthetic<'info> {
    pub token_program: AccountInfo<'info>,
    pub mint: AccountInfo<'info>,
    pub vault: AccountInfo<'info>,
    pub engine: EngineSigner<'info>,
    pub holder: Holder<'info>,
}

impl<'info> SyntheticToken for SplSynthetic<'info> {
    fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<bool> {
        if *to != self.holder.key {
            return Ok(false);
        }

        let bump = [self.engine.bump];
        let seeds = &[ENGINE_SEED, &bump[..]];
        let signer = &[&seeds[..]];

        let mint_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            MintTo {
                mint: self.mint.clone(),
                to: self.holder.token_account.clone(),
                authority: self.engine.account.clone(),
            },
            signer,
        );
        token::mint_to(mint_ctx, token_amount(amount)?)?;

        Ok(true)
    }

    fn transfer_from(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<bool> {
        if *from != self.holder.key || *to != self.engine.key() {
            return Ok(false);
        }

        let transfer_ctx = CpiContext::new(
            self.token_program.clone(),
            Transfer {
                from: self.holder.token_account.clone(),
                to: self.vault.clone(),
                authority: self.holder.authority.clone(),
            },
        );
        token::transfer(transfer_ctx, token_amount(amount)?)?;

        Ok(true)
    }

    fn burn(&mut self, amount: u128) -> Result<()> {
        let bump = [self.engine.bump];
        let seeds = &[ENGINE_SEED, &bump[..]];
        let signer = &[&seeds[..]];

        let burn_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            Burn {
                mint: self.mint.clone(),
                from: self.vault.clone(),
                authority: self.engine.account.clone(),
            },
            signer,
        );
        token::burn(burn_ctx, token_amount(amount)?)
    }
}

/// One collateral mint and its engine vault, driven through the token program
pub struct SplCollateral<'info> {
    pub token_program: AccountInfo<'info>,
    pub mint: Pubkey,
    pub vault: AccountInfo<'info>,
    pub engine: EngineSigner<'info>,
    pub holder: Holder<'info>,
}

impl<'info> CollateralTokens for SplCollateral<'info> {
    fn transfer_from(
        &mut self,
        mint: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> Result<bool> {
        if *mint != self.mint || *from != self.holder.key || *to != self.engine.key() {
            return Ok(false);
        }

        let transfer_ctx = CpiContext::new(
            self.token_program.clone(),
            Transfer {
                from: self.holder.token_account.clone(),
                to: self.vault.clone(),
                authority: self.holder.authority.clone(),
            },
        );
        token::transfer(transfer_ctx, token_amount(amount)?)?;

        Ok(true)
    }

    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u128) -> Result<bool> {
        if *mint != self.mint || *to != self.holder.key {
            return Ok(false);
        }

        let bump = [self.engine.bump];
        let seeds = &[ENGINE_SEED, &bump[..]];
        let signer = &[&seeds[..]];

        let transfer_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            Transfer {
                from: self.vault.clone(),
                to: self.holder.token_account.clone(),
                authority: self.engine.account.clone(),
            },
            signer,
        );
        token::transfer(transfer_ctx, token_amount(amount)?)?;

        Ok(true)
    }
}

/// Collateral side of instructions that never move collateral
pub struct NoCollateral;

impl CollateralTokens for NoCollateral {
    fn transfer_from(&mut self, _: &Pubkey, _: &Pubkey, _: &Pubkey, _: u128) -> Result<bool> {
        Ok(false)
    }

    fn transfer(&mut self, _: &Pubkey, _: &Pubkey, _: u128) -> Result<bool> {
        Ok(false)
    }
}

pub type AccountEngine<S, C> = SyntheticEngine<AccountPriceFeeds, S, C>;

/// Build an engine over the stored configuration, priced with `price_feeds`
pub fn load_engine<S, C>(
    config: &Account<EngineConfig>,
    price_feeds: &[AccountInfo],
    synthetic: S,
    collateral: C,
) -> Result<AccountEngine<S, C>>
where
    S: SyntheticToken,
    C: CollateralTokens,
{
    let registry = config.registry()?;
    let feeds = AccountPriceFeeds::load(&registry, price_feeds)?;

    SyntheticEngine::new(
        config.key(),
        registry,
        config.synthetic_decimals,
        feeds,
        synthetic,
        collateral,
        Clock::get()?.unix_timestamp,
    )
}

/// Load a stored position into the engine ledger
pub fn load_position<S, C>(engine: &AccountEngine<S, C>, position: &Position)
where
    S: SyntheticToken,
    C: CollateralTokens,
{
    engine.load_position(position.owner, position.balances(engine.registry()));
}

/// Read a position PDA that may never have been opened.
/// `None` only for an account still owned by the system program with no data.
pub fn load_stored_position(info: &AccountInfo) -> Result<Option<Position>> {
    if info.data_is_empty() && *info.owner == system_program::ID {
        return Ok(None);
    }

    require_keys_eq!(*info.owner, crate::ID, EngineError::PositionOwnerMismatch);
    let data = info.try_borrow_data()?;
    let position = Position::try_deserialize(&mut &data[..])?;

    Ok(Some(position))
}

/// Write the engine's view of `position` back to the account and update protocol totals
pub fn store_position<S, C>(
    engine: &AccountEngine<S, C>,
    config: &mut EngineConfig,
    position: &mut Position,
) -> Result<()>
where
    S: SyntheticToken,
    C: CollateralTokens,
{
    let registry = engine.registry();
    let before = position.balances(registry);
    let after = engine.position(&position.owner).unwrap_or_default();

    config.apply_position_change(registry, &before, &after)?;
    position.store(registry, &after);

    Ok(())
}

/// Emit every event recorded by the engine
pub fn emit_events<S, C>(engine: &AccountEngine<S, C>)
where
    S: SyntheticToken,
    C: CollateralTokens,
{
    for event in engine.take_events() {
        event.emit();
    }
}

fn token_amount(amount: u128) -> Result<u64> {
    u64::try_from(amount).map_err(|_| error!(EngineError::AmountTooLarge))
}
