//! SPL Token instructions and associated token account (ATA) derivation,
//! built directly without the `spl-token` crates.

use crate::error::SolError;
use crate::ids::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};
use crate::pda::find_program_address;
use crate::pubkey::Pubkey;
use crate::transaction::{AccountMeta, Instruction};

/// SPL Token `TransferChecked` instruction index.
const TRANSFER_CHECKED_IX: u8 = 12;

/// Associated Token program `CreateIdempotent` instruction index.
const CREATE_IDEMPOTENT_IX: u8 = 1;

// ---------------------------------------------------------------------------
// Associated Token Account derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account for a wallet + mint pair.
///
/// Seeds are `[wallet, token_program_id, mint]` under the Associated Token
/// program.
pub fn get_associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, SolError> {
    find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Create the ATA for `wallet` if it does not exist yet; a no-op otherwise.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, SolError> {
    let ata = get_associated_token_address(wallet, mint)?;
    Ok(Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::signer(*payer),
            AccountMeta::writable(ata),
            AccountMeta::readonly(*wallet),
            AccountMeta::readonly(*mint),
            AccountMeta::readonly(SYSTEM_PROGRAM_ID),
            AccountMeta::readonly(TOKEN_PROGRAM_ID),
        ],
        data: vec![CREATE_IDEMPOTENT_IX],
    })
}

// ---------------------------------------------------------------------------
// TransferChecked
// ---------------------------------------------------------------------------

/// Build an SPL Token `TransferChecked` instruction.
///
/// Data: `[12]` + u64 LE amount + u8 decimals. The token program rejects
/// the transfer if `decimals` does not match the mint.
pub fn transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, SolError> {
    if amount == 0 {
        return Err(SolError::TransactionBuildError(
            "SPL transfer amount must be > 0".into(),
        ));
    }

    let mut data = Vec::with_capacity(10);
    data.push(TRANSFER_CHECKED_IX);
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);

    Ok(Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*source),
            AccountMeta::readonly(*mint),
            AccountMeta::writable(*destination),
            AccountMeta::readonly_signer(*owner),
        ],
        data,
    })
}
