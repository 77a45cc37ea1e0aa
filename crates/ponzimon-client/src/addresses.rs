//! Program-derived and associated token addresses for one wallet.
//!
//! Program addresses are derived eagerly. The four associated token
//! addresses go through a two-phase lifecycle (`Constructed` → `Ready`)
//! behind [`AddressBook::ensure_ready`], and the referrer's entry is
//! replaced once the player account names a different referrer.

use sol_wire::{find_program_address, get_associated_token_address, Pubkey};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::ProgramAccounts;
use crate::error::ClientError;

pub const GLOBAL_STATE_SEED: &[u8] = b"global_state";
pub const PLAYER_SEED: &[u8] = b"player";
pub const REWARDS_VAULT_SEED: &[u8] = b"rewards_vault";

pub fn global_state_address(program_id: &Pubkey, mint: &Pubkey) -> Result<Pubkey, ClientError> {
    Ok(find_program_address(&[GLOBAL_STATE_SEED, mint.as_ref()], program_id)?.0)
}

pub fn player_address(
    program_id: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Result<Pubkey, ClientError> {
    Ok(find_program_address(&[PLAYER_SEED, wallet.as_ref(), mint.as_ref()], program_id)?.0)
}

pub fn rewards_vault_address(program_id: &Pubkey, mint: &Pubkey) -> Result<Pubkey, ClientError> {
    Ok(find_program_address(&[REWARDS_VAULT_SEED, mint.as_ref()], program_id)?.0)
}

/// Accounts owned by the game program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramAddresses {
    pub global_state: Pubkey,
    pub player: Pubkey,
    pub rewards_vault: Pubkey,
}

impl ProgramAddresses {
    pub fn derive(program_id: &Pubkey, mint: &Pubkey, wallet: &Pubkey) -> Result<Self, ClientError> {
        Ok(Self {
            global_state: global_state_address(program_id, mint)?,
            player: player_address(program_id, wallet, mint)?,
            rewards_vault: rewards_vault_address(program_id, mint)?,
        })
    }
}

/// Token accounts referenced by game instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccounts {
    pub player: Pubkey,
    pub recipient: Pubkey,
    pub fees: Pubkey,
    /// Owner of `referrer`: the configured default until the player
    /// account names one.
    pub referrer_wallet: Pubkey,
    pub referrer: Pubkey,
}

impl TokenAccounts {
    pub fn derive(
        mint: &Pubkey,
        wallet: &Pubkey,
        recipient_owner: &Pubkey,
        fees_owner: &Pubkey,
        referrer_wallet: &Pubkey,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            player: get_associated_token_address(wallet, mint)?,
            recipient: get_associated_token_address(recipient_owner, mint)?,
            fees: get_associated_token_address(fees_owner, mint)?,
            referrer_wallet: *referrer_wallet,
            referrer: get_associated_token_address(referrer_wallet, mint)?,
        })
    }
}

#[derive(Debug)]
enum AddressState {
    Constructed { referrer_wallet: Pubkey },
    Ready(TokenAccounts),
}

/// Every address a wallet handle needs.
#[derive(Debug)]
pub struct AddressBook {
    wallet: Pubkey,
    accounts: ProgramAccounts,
    program: ProgramAddresses,
    state: RwLock<AddressState>,
}

impl AddressBook {
    pub fn new(wallet: Pubkey, accounts: ProgramAccounts) -> Result<Self, ClientError> {
        let program = ProgramAddresses::derive(&accounts.program_id, &accounts.token_mint, &wallet)?;
        debug!(
            wallet = %wallet,
            player = %program.player,
            global_state = %program.global_state,
            "derived program addresses"
        );
        Ok(Self {
            wallet,
            accounts,
            program,
            state: RwLock::new(AddressState::Constructed {
                referrer_wallet: accounts.referrer_wallet,
            }),
        })
    }

    pub fn wallet(&self) -> Pubkey {
        self.wallet
    }

    pub fn accounts(&self) -> &ProgramAccounts {
        &self.accounts
    }

    pub fn program(&self) -> &ProgramAddresses {
        &self.program
    }

    /// Resolve the token accounts, once. Later calls return the cached set.
    pub async fn ensure_ready(&self) -> Result<TokenAccounts, ClientError> {
        if let AddressState::Ready(tokens) = &*self.state.read().await {
            return Ok(*tokens);
        }

        let mut state = self.state.write().await;
        let referrer_wallet = match &*state {
            // Another caller finished while we waited for the write lock.
            AddressState::Ready(tokens) => return Ok(*tokens),
            AddressState::Constructed { referrer_wallet } => *referrer_wallet,
        };
        let tokens = self.derive_tokens(&referrer_wallet)?;
        *state = AddressState::Ready(tokens);
        Ok(tokens)
    }

    /// Point the referrer entry at `referrer_wallet`'s token account.
    ///
    /// Returns `true` if the cached address changed.
    pub async fn refresh_referrer(&self, referrer_wallet: Pubkey) -> Result<bool, ClientError> {
        let mut state = self.state.write().await;
        match &mut *state {
            AddressState::Constructed {
                referrer_wallet: current,
            } => {
                let changed = *current != referrer_wallet;
                *current = referrer_wallet;
                Ok(changed)
            }
            AddressState::Ready(tokens) => {
                if tokens.referrer_wallet == referrer_wallet {
                    return Ok(false);
                }
                let referrer = get_associated_token_address(&referrer_wallet, &self.accounts.token_mint)?;
                info!(
                    old = %tokens.referrer_wallet,
                    new = %referrer_wallet,
                    "referrer changed, token account re-derived"
                );
                tokens.referrer_wallet = referrer_wallet;
                tokens.referrer = referrer;
                Ok(true)
            }
        }
    }

    fn derive_tokens(&self, referrer_wallet: &Pubkey) -> Result<TokenAccounts, ClientError> {
        TokenAccounts::derive(
            &self.accounts.token_mint,
            &self.wallet,
            &self.accounts.recipient_account,
            &self.accounts.fees_wallet,
            referrer_wallet,
        )
    }
}
