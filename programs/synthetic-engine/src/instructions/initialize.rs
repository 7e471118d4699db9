use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::EngineError;
use crate::registry::{CollateralAsset, CollateralRegistry};
use crate::state::*;

/// Initialize the engine configuration
///
/// The synthetic mint must already name the engine PDA as its mint authority.
/// Remaining accounts: the collateral mints, in the same order as `price_feeds`.
#[derive(Accounts)]
pub struct InitializeEngine<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = 8 + EngineConfig::INIT_SPACE,
        seeds = [ENGINE_SEED],
        bump
    )]
    pub engine_config: Account<'info, EngineConfig>,

    #[account(
        mint::authority = engine_config,
    )]
    pub synthetic_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        seeds = [SYNTHETIC_VAULT_SEED],
        bump,
        token::mint = synthetic_mint,
        token::authority = engine_config,
    )]
    pub synthetic_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, InitializeEngine<'info>>,
    price_feeds: Vec<Pubkey>,
) -> Result<()> {
    let mut assets = Vec::with_capacity(ctx.remaining_accounts.len());
    for info in ctx.remaining_accounts {
        require_keys_eq!(*info.owner, token::ID, EngineError::UnknownCollateral);
        let data = info.try_borrow_data()?;
        let mint = Mint::try_deserialize(&mut &data[..])?;
        assets.push(CollateralAsset::new(*info.key, mint.decimals));
    }

    let registry = CollateralRegistry::new(&assets, &price_feeds)?;
    let synthetic_decimals = ctx.accounts.synthetic_mint.decimals;
    require!(
        synthetic_decimals <= WAD_DECIMALS,
        EngineError::UnsupportedDecimals
    );

    ctx.accounts.engine_config.initialize(
        ctx.accounts.authority.key(),
        ctx.accounts.synthetic_mint.key(),
        synthetic_decimals,
        &registry,
        ctx.bumps.engine_config,
        ctx.bumps.synthetic_vault,
    );

    msg!(
        "Engine initialized with {} collateral types",
        registry.len()
    );

    Ok(())
}

/// Create the vault holding one registered collateral
#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        seeds = [ENGINE_SEED],
        bump = engine_config.bump
    )]
    pub engine_config: Account<'info, EngineConfig>,

    pub collateral_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = payer,
        seeds = [VAULT_SEED, collateral_mint.key().as_ref()],
        bump,
        token::mint = collateral_mint,
        token::authority = engine_config,
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn vault_handler(ctx: Context<InitializeVault>) -> Result<()> {
    let registry = ctx.accounts.engine_config.registry()?;
    require!(
        registry.contains(&ctx.accounts.collateral_mint.key()),
        EngineError::UnknownCollateral
    );

    msg!(
        "Vault {} created for collateral {}",
        ctx.accounts.collateral_vault.key(),
        ctx.accounts.collateral_mint.key()
    );

    Ok(())
}
