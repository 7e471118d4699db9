use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::constants::*;
use crate::errors::EngineError;
use crate::state::*;

/// Create a USD price feed for a collateral mint
#[derive(Accounts)]
pub struct InitializePriceFeed<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = 8 + PriceFeed::INIT_SPACE,
        seeds = [PRICE_FEED_SEED, mint.key().as_ref()],
        bump
    )]
    pub price_feed: Account<'info, PriceFeed>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_handler(ctx: Context<InitializePriceFeed>, decimals: u8) -> Result<()> {
    require!(
        decimals <= MAX_TOKEN_DECIMALS,
        EngineError::UnsupportedDecimals
    );

    let price_feed = &mut ctx.accounts.price_feed;
    price_feed.authority = ctx.accounts.authority.key();
    price_feed.mint = ctx.accounts.mint.key();
    price_feed.price = 0;
    price_feed.decimals = decimals;
    price_feed.updated_at = 0;
    price_feed.bump = ctx.bumps.price_feed;

    Ok(())
}

/// Publish a new answer on a price feed
#[derive(Accounts)]
pub struct UpdatePrice<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        has_one = authority @ EngineError::Unauthorized
    )]
    pub price_feed: Account<'info, PriceFeed>,
}

pub fn update_handler(ctx: Context<UpdatePrice>, price: i64) -> Result<()> {
    let price_feed = &mut ctx.accounts.price_feed;
    price_feed.price = price;
    price_feed.updated_at = Clock::get()?.unix_timestamp;

    msg!(
        "Price of {} set to {} at {}",
        price_feed.mint,
        price,
        price_feed.updated_at
    );

    Ok(())
}
