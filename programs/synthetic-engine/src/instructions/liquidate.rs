use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::EngineError;
use crate::instructions::adapters::*;
use crate::state::*;

/// Liquidate an unhealthy position
///
/// The liquidator repays part of the position's debt with their own synthetic units and
/// receives the matching collateral plus the liquidation bonus.
///
/// The liquidator's position slot is always passed, so their own solvency is checked
/// whenever they hold a position.
///
/// Remaining accounts: the `PriceFeed` of every collateral type held by the position and
/// by the liquidator's own position.
#[derive(Accounts)]
pub struct Liquidate<'info> {
    #[account(mut)]
    pub liquidator: Signer<'info>,

    #[account(
        mut,
        seeds = [ENGINE_SEED],
        bump = engine_config.bump
    )]
    pub engine_config: Account<'info, EngineConfig>,

    /// Position being liquidated
    #[account(
        mut,
        seeds = [POSITION_SEED, position.owner.as_ref()],
        bump = position.bump,
        constraint = position.owner != liquidator.key() @ EngineError::Unauthorized
    )]
    pub position: Account<'info, Position>,

    /// CHECK: the liquidator's position slot, read by `load_stored_position`.
    /// Counts as an empty position only while it has never been opened.
    #[account(
        seeds = [POSITION_SEED, liquidator.key().as_ref()],
        bump
    )]
    pub liquidator_position: UncheckedAccount<'info>,

    pub collateral_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [VAULT_SEED, collateral_mint.key().as_ref()],
        bump,
        constraint = collateral_vault.mint == collateral_mint.key() @ EngineError::UnknownCollateral,
        constraint = collateral_vault.owner == engine_config.key() @ EngineError::Unauthorized
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    /// Liquidator's collateral token account (destination for seized collateral)
    #[account(
        mut,
        constraint = liquidator_collateral_account.owner == liquidator.key() @ EngineError::Unauthorized,
        constraint = liquidator_collateral_account.mint == collateral_mint.key() @ EngineError::UnknownCollateral
    )]
    pub liquidator_collateral_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        address = engine_config.synthetic_mint
    )]
    pub synthetic_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [SYNTHETIC_VAULT_SEED],
        bump = engine_config.synthetic_vault_bump
    )]
    pub synthetic_vault: Account<'info, TokenAccount>,

    /// Liquidator's synthetic token account (source of repayment)
    #[account(
        mut,
        constraint = liquidator_synthetic_account.owner == liquidator.key() @ EngineError::Unauthorized,
        constraint = liquidator_synthetic_account.mint == synthetic_mint.key() @ EngineError::Unauthorized
    )]
    pub liquidator_synthetic_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

impl<'info> Liquidate<'info> {
    fn engine_signer(&self) -> EngineSigner<'info> {
        EngineSigner {
            account: self.engine_config.to_account_info(),
            bump: self.engine_config.bump,
        }
    }

    fn synthetic(&self) -> SplSynthetic<'info> {
        SplSynthetic {
            token_program: self.token_program.to_account_info(),
            mint: self.synthetic_mint.to_account_info(),
            vault: self.synthetic_vault.to_account_info(),
            engine: self.engine_signer(),
            holder: Holder {
                key: self.liquidator.key(),
                authority: self.liquidator.to_account_info(),
                token_account: self.liquidator_synthetic_account.to_account_info(),
            },
        }
    }

    fn collateral(&self) -> SplCollateral<'info> {
        SplCollateral {
            token_program: self.token_program.to_account_info(),
            mint: self.collateral_mint.key(),
            vault: self.collateral_vault.to_account_info(),
            engine: self.engine_signer(),
            holder: Holder {
                key: self.liquidator.key(),
                authority: self.liquidator.to_account_info(),
                token_account: self.liquidator_collateral_account.to_account_info(),
            },
        }
    }
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Liquidate<'info>>,
    debt_to_cover: u64,
) -> Result<()> {
    let accounts = ctx.accounts;
    let engine = load_engine(
        &accounts.engine_config,
        ctx.remaining_accounts,
        accounts.synthetic(),
        accounts.collateral(),
    )?;

    load_position(&engine, &accounts.position);
    if let Some(liquidator_position) =
        load_stored_position(&accounts.liquidator_position.to_account_info())?
    {
        require_keys_eq!(
            liquidator_position.owner,
            accounts.liquidator.key(),
            EngineError::PositionOwnerMismatch
        );
        load_position(&engine, &liquidator_position);
    }

    let outcome = engine.liquidate(
        accounts.liquidator.key(),
        accounts.collateral_mint.key(),
        accounts.position.owner,
        debt_to_cover.into(),
    )?;
    msg!(
        "Health factor of {} moved {} -> {}",
        accounts.position.owner,
        outcome.starting_health_factor,
        outcome.ending_health_factor
    );

    store_position(&engine, &mut accounts.engine_config, &mut accounts.position)?;
    emit_events(&engine);

    Ok(())
}
