//! Game instructions: positional account lists and byte-exact payloads.
//!
//! Each payload is an 8-byte discriminator, `sha256("global:<name>")[..8]`,
//! followed by fixed-width little-endian arguments. The program reads
//! accounts by position, so the order of every list below is load-bearing.

use sol_wire::compute_budget::{set_compute_unit_limit, set_compute_unit_price};
use sol_wire::ids::{
    ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, SYSVAR_RENT_ID, SYSVAR_SLOT_HASHES_ID,
    TOKEN_PROGRAM_ID,
};
use sol_wire::{
    create_associated_token_account_idempotent, system_transfer, transfer_checked, AccountMeta,
    Instruction, Pubkey,
};

use crate::addresses::{ProgramAddresses, TokenAccounts};
use crate::config::{ProgramAccounts, TxSettings};
use crate::error::ClientError;
use crate::state::MAX_CARDS;

pub const PURCHASE_INITIAL_FARM: [u8; 8] = [0xe9, 0x3e, 0x31, 0x8a, 0xa4, 0xb5, 0x72, 0x45];
pub const STAKE_CARD: [u8; 8] = [0x61, 0x6f, 0xab, 0xba, 0xb3, 0xc6, 0x44, 0xac];
pub const UNSTAKE_CARD: [u8; 8] = [0xe4, 0xb2, 0x9f, 0xb7, 0x77, 0x01, 0xc5, 0xde];
pub const OPEN_BOOSTER_COMMIT: [u8; 8] = [0x07, 0xfc, 0x87, 0xdf, 0xf2, 0xec, 0xf2, 0x5d];
pub const SETTLE_OPEN_BOOSTER: [u8; 8] = [0xe4, 0x90, 0xc7, 0x38, 0x5e, 0xdf, 0x09, 0xe2];
pub const CLAIM_REWARDS: [u8; 8] = [0x04, 0x90, 0x84, 0x47, 0x74, 0x17, 0x97, 0x50];
pub const RECYCLE_CARDS_COMMIT: [u8; 8] = [0xc7, 0xd1, 0x60, 0xc7, 0xcd, 0x39, 0x42, 0xef];
pub const RECYCLE_CARDS_SETTLE: [u8; 8] = [0x2b, 0xbb, 0x21, 0xf9, 0xb8, 0xe1, 0x7f, 0x8f];
pub const CANCEL_PENDING_ACTION: [u8; 8] = [0xda, 0x7e, 0x4c, 0xe0, 0x1e, 0x09, 0x56, 0x72];

/// Builds instructions for one wallet. Pure: no I/O.
#[derive(Debug, Clone)]
pub struct InstructionBuilder {
    wallet: Pubkey,
    accounts: ProgramAccounts,
    program: ProgramAddresses,
    compute_unit_limit: u32,
    compute_unit_price: u64,
    token_decimals: u8,
}

impl InstructionBuilder {
    pub fn new(
        wallet: Pubkey,
        accounts: ProgramAccounts,
        program: ProgramAddresses,
        settings: &TxSettings,
    ) -> Self {
        Self {
            wallet,
            accounts,
            program,
            compute_unit_limit: settings.compute_unit_limit,
            compute_unit_price: settings.compute_unit_price,
            token_decimals: settings.token_decimals,
        }
    }

    /// Prefix `body` with the compute unit limit and price instructions.
    pub fn with_compute_budget(&self, body: impl IntoIterator<Item = Instruction>) -> Vec<Instruction> {
        let mut out = vec![
            set_compute_unit_limit(self.compute_unit_limit),
            set_compute_unit_price(self.compute_unit_price),
        ];
        out.extend(body);
        out
    }

    fn game(&self, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Instruction {
        Instruction {
            program_id: self.accounts.program_id,
            accounts,
            data,
        }
    }

    /// wallet, player, global state, rewards vault: the shared prefix.
    fn core_accounts(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::signer(self.wallet),
            AccountMeta::writable(self.program.player),
            AccountMeta::writable(self.program.global_state),
            AccountMeta::writable(self.program.rewards_vault),
        ]
    }

    // -- Farm ---------------------------------------------------------------

    pub fn purchase_initial_farm(&self, tokens: &TokenAccounts) -> Instruction {
        self.game(
            vec![
                AccountMeta::signer(self.wallet),
                AccountMeta::writable(self.program.player),
                AccountMeta::writable(self.program.global_state),
                AccountMeta::writable(self.accounts.fees_wallet),
                AccountMeta::writable(tokens.referrer_wallet),
                AccountMeta::writable(self.accounts.token_mint),
                AccountMeta::writable(tokens.player),
                AccountMeta::readonly(TOKEN_PROGRAM_ID),
                AccountMeta::readonly(ASSOCIATED_TOKEN_PROGRAM_ID),
                AccountMeta::readonly(SYSTEM_PROGRAM_ID),
                AccountMeta::readonly(SYSVAR_RENT_ID),
            ],
            PURCHASE_INITIAL_FARM.to_vec(),
        )
    }

    // -- Staking ------------------------------------------------------------

    pub fn stake_card(&self, tokens: &TokenAccounts, card_index: u8) -> Instruction {
        self.staking(tokens, STAKE_CARD, card_index)
    }

    pub fn unstake_card(&self, tokens: &TokenAccounts, card_index: u8) -> Instruction {
        self.staking(tokens, UNSTAKE_CARD, card_index)
    }

    fn staking(&self, tokens: &TokenAccounts, discriminator: [u8; 8], card_index: u8) -> Instruction {
        let mut accounts = self.core_accounts();
        accounts.extend([
            AccountMeta::readonly(self.accounts.token_mint),
            AccountMeta::writable(tokens.player),
            AccountMeta::readonly(TOKEN_PROGRAM_ID),
        ]);
        let mut data = discriminator.to_vec();
        data.push(card_index);
        self.game(accounts, data)
    }

    // -- Booster ------------------------------------------------------------

    pub fn open_booster_commit(&self, tokens: &TokenAccounts) -> Instruction {
        let mut accounts = self.core_accounts();
        accounts.extend([
            AccountMeta::writable(tokens.player),
            AccountMeta::writable(tokens.fees),
            AccountMeta::writable(tokens.referrer),
            AccountMeta::writable(self.accounts.token_mint),
            AccountMeta::readonly(TOKEN_PROGRAM_ID),
        ]);
        self.game(accounts, OPEN_BOOSTER_COMMIT.to_vec())
    }

    pub fn settle_open_booster(&self) -> Instruction {
        self.settle(SETTLE_OPEN_BOOSTER)
    }

    fn settle(&self, discriminator: [u8; 8]) -> Instruction {
        let mut accounts = self.core_accounts();
        accounts.extend([
            AccountMeta::readonly(self.accounts.token_mint),
            AccountMeta::readonly(SYSVAR_SLOT_HASHES_ID),
        ]);
        self.game(accounts, discriminator.to_vec())
    }

    // -- Rewards ------------------------------------------------------------

    pub fn claim_rewards(&self, tokens: &TokenAccounts) -> Instruction {
        let mut accounts = self.core_accounts();
        accounts.extend([
            AccountMeta::writable(tokens.player),
            AccountMeta::writable(self.accounts.token_mint),
            AccountMeta::readonly(TOKEN_PROGRAM_ID),
        ]);
        self.game(accounts, CLAIM_REWARDS.to_vec())
    }

    // -- Recycling ----------------------------------------------------------

    /// Data: discriminator, count (u8), 3 zero bytes, one byte per slot.
    pub fn recycle_cards_commit(&self, card_indices: &[u8]) -> Result<Instruction, ClientError> {
        if card_indices.is_empty() || card_indices.len() > MAX_CARDS {
            return Err(ClientError::PreconditionFailed(format!(
                "recycle needs 1 to {MAX_CARDS} cards, got {}",
                card_indices.len()
            )));
        }
        let mut data = Vec::with_capacity(12 + card_indices.len());
        data.extend_from_slice(&RECYCLE_CARDS_COMMIT);
        data.push(card_indices.len() as u8);
        data.extend_from_slice(&[0u8; 3]);
        data.extend_from_slice(card_indices);

        let mut accounts = self.core_accounts();
        accounts.push(AccountMeta::readonly(self.accounts.token_mint));
        Ok(self.game(accounts, data))
    }

    pub fn recycle_cards_settle(&self) -> Instruction {
        self.settle(RECYCLE_CARDS_SETTLE)
    }

    pub fn cancel_pending_action(&self) -> Instruction {
        let mut accounts = self.core_accounts();
        accounts.push(AccountMeta::readonly(self.accounts.token_mint));
        self.game(accounts, CANCEL_PENDING_ACTION.to_vec())
    }

    // -- Transfers ----------------------------------------------------------

    /// Move `amount` tokens from the player's token account to the recipient's.
    pub fn sweep_to_recipient(&self, tokens: &TokenAccounts, amount: u64) -> Result<Instruction, ClientError> {
        Ok(transfer_checked(
            &tokens.player,
            &self.accounts.token_mint,
            &tokens.recipient,
            &self.wallet,
            amount,
            self.token_decimals,
        )?)
    }

    /// Create the recipient's token account, paid by this wallet, unless it exists.
    pub fn open_recipient_account(&self) -> Result<Instruction, ClientError> {
        Ok(create_associated_token_account_idempotent(
            &self.wallet,
            &self.accounts.recipient_account,
            &self.accounts.token_mint,
        )?)
    }

    pub fn transfer_sol(&self, to: &Pubkey, lamports: u64) -> Result<Instruction, ClientError> {
        Ok(system_transfer(&self.wallet, to, lamports)?)
    }
}
