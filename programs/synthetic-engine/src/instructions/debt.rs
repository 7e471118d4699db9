use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::EngineError;
use crate::instructions::adapters::*;
use crate::state::*;

/// Mint or burn synthetic units against an existing position.
///
/// Remaining accounts: the `PriceFeed` of every collateral type the owner holds.
#[derive(Accounts)]
pub struct ManageDebt<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [ENGINE_SEED],
        bump = engine_config.bump
    )]
    pub engine_config: Account<'info, EngineConfig>,

    #[account(
        mut,
        seeds = [POSITION_SEED, owner.key().as_ref()],
        bump = position.bump,
        has_one = owner @ EngineError::PositionOwnerMismatch
    )]
    pub position: Account<'info, Position>,

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

    #[account(
        mut,
        constraint = owner_synthetic_account.owner == owner.key() @ EngineError::Unauthorized,
        constraint = owner_synthetic_account.mint == synthetic_mint.key() @ EngineError::Unauthorized
    )]
    pub owner_synthetic_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

impl<'info> ManageDebt<'info> {
    fn synthetic(&self) -> SplSynthetic<'info> {
        SplSynthetic {
            token_program: self.token_program.to_account_info(),
            mint: self.synthetic_mint.to_account_info(),
            vault: self.synthetic_vault.to_account_info(),
            engine: EngineSigner {
                account: self.engine_config.to_account_info(),
                bump: self.engine_config.bump,
            },
            holder: Holder {
                key: self.owner.key(),
                authority: self.owner.to_account_info(),
                token_account: self.owner_synthetic_account.to_account_info(),
            },
        }
    }
}

type DebtEngine<'info> = AccountEngine<SplSynthetic<'info>, NoCollateral>;

fn run<'info, F>(ctx: Context<'_, '_, '_, 'info, ManageDebt<'info>>, operation: F) -> Result<()>
where
    F: FnOnce(&DebtEngine<'info>, Pubkey) -> Result<()>,
{
    let accounts = ctx.accounts;
    let engine = load_engine(
        &accounts.engine_config,
        ctx.remaining_accounts,
        accounts.synthetic(),
        NoCollateral,
    )?;
    load_position(&engine, &accounts.position);

    operation(&engine, accounts.owner.key())?;

    store_position(&engine, &mut accounts.engine_config, &mut accounts.position)?;
    emit_events(&engine);

    Ok(())
}

pub fn mint_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, ManageDebt<'info>>,
    amount: u64,
) -> Result<()> {
    run(ctx, |engine, owner| engine.mint_debt(owner, amount.into()))
}

pub fn burn_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, ManageDebt<'info>>,
    amount: u64,
) -> Result<()> {
    run(ctx, |engine, owner| engine.burn_debt(owner, amount.into()))
}
