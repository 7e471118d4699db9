use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::EngineError;
use crate::instructions::adapters::*;
use crate::state::*;

/// Deposit or redeem collateral, optionally minting or burning synthetic units in the
/// same instruction.
///
/// Remaining accounts: the `PriceFeed` of every collateral type the owner holds.
#[derive(Accounts)]
pub struct ManagePosition<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [ENGINE_SEED],
        bump = engine_config.bump
    )]
    pub engine_config: Account<'info, EngineConfig>,

    /// Created on the owner's first deposit
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Position::INIT_SPACE,
        seeds = [POSITION_SEED, owner.key().as_ref()],
        bump
    )]
    pub position: Account<'info, Position>,

    pub collateral_mint: Account<'info, Mint>,

    /// Engine vault holding this collateral
    #[account(
        mut,
        seeds = [VAULT_SEED, collateral_mint.key().as_ref()],
        bump,
        constraint = collateral_vault.mint == collateral_mint.key() @ EngineError::UnknownCollateral,
        constraint = collateral_vault.owner == engine_config.key() @ EngineError::Unauthorized
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    /// Owner's collateral token account
    #[account(
        mut,
        constraint = owner_collateral_account.owner == owner.key() @ EngineError::Unauthorized,
        constraint = owner_collateral_account.mint == collateral_mint.key() @ EngineError::UnknownCollateral
    )]
    pub owner_collateral_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        address = engine_config.synthetic_mint
    )]
    pub synthetic_mint: Account<'info, Mint>,

    /// Engine account synthetic units pass through before being burned
    #[account(
        mut,
        seeds = [SYNTHETIC_VAULT_SEED],
        bump = engine_config.synthetic_vault_bump
    )]
    pub synthetic_vault: Account<'info, TokenAccount>,

    /// Owner's synthetic token account
    #[account(
        mut,
        constraint = owner_synthetic_account.owner == owner.key() @ EngineError::Unauthorized,
        constraint = owner_synthetic_account.mint == synthetic_mint.key() @ EngineError::Unauthorized
    )]
    pub owner_synthetic_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

impl<'info> ManagePosition<'info> {
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
                key: self.owner.key(),
                authority: self.owner.to_account_info(),
                token_account: self.owner_synthetic_account.to_account_info(),
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
                key: self.owner.key(),
                authority: self.owner.to_account_info(),
                token_account: self.owner_collateral_account.to_account_info(),
            },
        }
    }
}

type PositionEngine<'info> = AccountEngine<SplSynthetic<'info>, SplCollateral<'info>>;

/// Run `operation` against the owner's position and persist the result
fn run<'info, F>(ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>, operation: F) -> Result<()>
where
    F: FnOnce(&PositionEngine<'info>, Pubkey, Pubkey) -> Result<()>,
{
    let bump = ctx.bumps.position;
    let accounts = ctx.accounts;
    let registry = accounts.engine_config.registry()?;
    if accounts
        .position
        .open_if_new(accounts.owner.key(), &registry, bump)?
    {
        msg!("Position opened for {}", accounts.owner.key());
    }

    let engine = load_engine(
        &accounts.engine_config,
        ctx.remaining_accounts,
        accounts.synthetic(),
        accounts.collateral(),
    )?;
    load_position(&engine, &accounts.position);

    operation(&engine, accounts.owner.key(), accounts.collateral_mint.key())?;

    store_position(&engine, &mut accounts.engine_config, &mut accounts.position)?;
    emit_events(&engine);

    Ok(())
}

pub fn deposit_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>,
    amount: u64,
) -> Result<()> {
    run(ctx, |engine, owner, mint| {
        engine.deposit_collateral(owner, mint, amount.into())
    })
}

pub fn redeem_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>,
    amount: u64,
) -> Result<()> {
    run(ctx, |engine, owner, mint| {
        engine.redeem_collateral(owner, mint, amount.into())
    })
}

pub fn deposit_and_mint_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>,
    collateral_amount: u64,
    debt_amount: u64,
) -> Result<()> {
    run(ctx, |engine, owner, mint| {
        engine.deposit_and_mint(owner, mint, collateral_amount.into(), debt_amount.into())
    })
}

pub fn redeem_and_burn_handler<'info>(
    ctx: Context<'_, '_, '_, 'info, ManagePosition<'info>>,
    collateral_amount: u64,
    debt_amount: u64,
) -> Result<()> {
    run(ctx, |engine, owner, mint| {
        engine.redeem_and_burn(owner, mint, collateral_amount.into(), debt_amount.into())
    })
}
