use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::*;

/// Create the empty position of a participant
#[derive(Accounts)]
pub struct OpenPosition<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [ENGINE_SEED],
        bump = engine_config.bump
    )]
    pub engine_config: Account<'info, EngineConfig>,

    #[account(
        init,
        payer = owner,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, owner.key().as_ref()],
        bump
    )]
    pub position: Account<'info, Position>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<OpenPosition>) -> Result<()> {
    let registry = ctx.accounts.engine_config.registry()?;
    ctx.accounts.position.initialize(
        ctx.accounts.owner.key(),
        &registry,
        ctx.bumps.position,
    );

    msg!("Position opened for {}", ctx.accounts.owner.key());

    Ok(())
}
