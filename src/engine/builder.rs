//! Mint request builder.
//!
//! Composes the unsigned transaction for one mint attempt. The engine does
//! the network reads (does the receiving token account exist yet?) and passes
//! the answers in through [`BuildContext`]; composition itself is pure, so it
//! can be exercised exhaustively without a ledger.
//!
//! Instruction order is fixed: the receiving-account creation (when absent),
//! then the program mint instruction carrying the gatekeeper proof and the
//! conditional whitelist/payment accounts. The one-time mint identity is a
//! required signer of the mint instruction, which is what makes identity
//! reuse impossible to express accidentally.

use solana_sdk::hash::hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use solana_sdk::sysvar;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;

use crate::constants::{
    candy_machine_creator_address, gateway_token_address, master_edition_address,
    metadata_address, CANDY_MACHINE_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
};
use crate::errors::BuilderError;
use crate::types::{DerivedView, SaleConfig, WhitelistMode};

/// Everything the builder needs for one composition, read side already done.
pub struct BuildContext<'a> {
    /// Address of the sale-configuration account.
    pub candy_machine: Pubkey,
    pub sale: &'a SaleConfig,
    pub view: &'a DerivedView,
    /// Buyer identity; `None` when no wallet is connected.
    pub buyer: Option<Pubkey>,
    /// Freshly generated one-time mint identity for this attempt.
    pub mint: Pubkey,
    /// Whether the buyer's receiving associated-token account already exists.
    pub receiving_account_exists: bool,
}

/// Anchor global instruction discriminator for `mint_nft`.
fn mint_instruction_discriminator() -> [u8; 8] {
    let digest = hash(b"global:mint_nft").to_bytes();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

/// Builds the unsigned mint transaction for one attempt.
pub fn build_mint_transaction(ctx: &BuildContext<'_>) -> Result<Transaction, BuilderError> {
    let buyer = ctx.buyer.ok_or(BuilderError::MissingWallet)?;
    if !ctx.view.is_active {
        return Err(BuilderError::NotEligible);
    }

    let mut instructions = Vec::with_capacity(2);

    if !ctx.receiving_account_exists {
        instructions.push(create_associated_token_account(
            &buyer,
            &buyer,
            &ctx.mint,
            &spl_token::ID,
        ));
    }

    instructions.push(mint_instruction(ctx, &buyer));

    Ok(Transaction::new_with_payer(&instructions, Some(&buyer)))
}

fn mint_instruction(ctx: &BuildContext<'_>, buyer: &Pubkey) -> Instruction {
    let (creator, creator_bump) = candy_machine_creator_address(&ctx.candy_machine);

    let mut accounts = vec![
        AccountMeta::new(ctx.candy_machine, false),
        AccountMeta::new_readonly(creator, false),
        AccountMeta::new(*buyer, true),
        AccountMeta::new(ctx.sale.treasury_wallet, false),
        AccountMeta::new(metadata_address(&ctx.mint), false),
        AccountMeta::new(ctx.mint, true),
        AccountMeta::new_readonly(*buyer, true),
        AccountMeta::new_readonly(*buyer, true),
        AccountMeta::new(master_edition_address(&ctx.mint), false),
        AccountMeta::new_readonly(TOKEN_METADATA_PROGRAM_ID, false),
        AccountMeta::new_readonly(spl_token::ID, false),
        AccountMeta::new_readonly(system_program::ID, false),
        AccountMeta::new_readonly(sysvar::rent::ID, false),
        AccountMeta::new_readonly(sysvar::clock::ID, false),
        AccountMeta::new_readonly(sysvar::slot_hashes::ID, false),
        AccountMeta::new_readonly(sysvar::instructions::ID, false),
    ];

    // Gatekeeper proof rides along as the first conditional account.
    if let Some(network) = &ctx.sale.gatekeeper {
        accounts.push(AccountMeta::new_readonly(
            gateway_token_address(buyer, network),
            false,
        ));
    }

    if let Some(whitelist) = &ctx.sale.whitelist {
        let whitelist_token = get_associated_token_address(buyer, &whitelist.mint);
        accounts.push(AccountMeta::new(whitelist_token, false));
        if whitelist.mode == WhitelistMode::BurnEveryTime {
            // The buyer authorizes the burn directly; it already signs as
            // fee payer.
            accounts.push(AccountMeta::new(whitelist.mint, false));
            accounts.push(AccountMeta::new_readonly(*buyer, true));
        }
    }

    if let Some(payment_mint) = &ctx.sale.payment_mint {
        let payment_token = get_associated_token_address(buyer, payment_mint);
        accounts.push(AccountMeta::new(payment_token, false));
        accounts.push(AccountMeta::new_readonly(*buyer, true));
    }

    let mut data = mint_instruction_discriminator().to_vec();
    data.push(creator_bump);

    Instruction {
        program_id: CANDY_MACHINE_PROGRAM_ID,
        accounts,
        data,
    }
}
