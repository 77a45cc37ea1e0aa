//! Solana wire primitives for the ponzimon client.
//!
//! Addresses, program-derived address search, the legacy transaction
//! message format, Ed25519 signing, and the handful of native program
//! instructions the client needs (System, SPL Token, Associated Token
//! Account, Compute Budget). Everything is built by hand on top of
//! `ed25519-dalek`, `curve25519-dalek`, `sha2` and `bs58` rather than
//! `solana-sdk`, which would drag a full RPC stack into a library that
//! never talks to the network itself.

pub mod compute_budget;
pub mod error;
pub mod ids;
pub mod keypair;
pub mod pda;
pub mod pubkey;
pub mod spl_token;
pub mod transaction;

pub use error::SolError;
pub use keypair::Keypair;
pub use pda::{create_program_address, find_program_address, is_on_curve};
pub use pubkey::Pubkey;
pub use spl_token::{
    create_associated_token_account_idempotent, get_associated_token_address, transfer_checked,
};
pub use transaction::{
    decode_compact_u16, encode_compact_u16, system_transfer, AccountMeta, CompiledInstruction,
    Instruction, Message, MessageHeader, SignedTransaction,
};
