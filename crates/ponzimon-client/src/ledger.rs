//! The ledger collaborator: everything the client needs from an RPC node.
//!
//! No transport ships with this crate. Callers plug in their own RPC client
//! by implementing [`LedgerClient`]; implementations may use `async fn`.

use std::future::Future;
use std::sync::Arc;

use sol_wire::Pubkey;
use thiserror::Error;

/// How far the cluster has progressed with a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

/// A raw failure as reported by the ledger, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectReason {
    /// Custom instruction error code, when the failure carries one.
    pub code: Option<u32>,
    pub message: String,
}

impl RejectReason {
    pub fn code(code: u32) -> Self {
        Self {
            code: Some(code),
            message: format!("custom program error: {code:#x}"),
        }
    }
}

/// Status of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub confirmation: Option<Commitment>,
    /// Set when the transaction landed but its execution failed.
    pub err: Option<RejectReason>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationResult {
    pub err: Option<RejectReason>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

/// Raw account contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The request never got an answer (connection, HTTP, parse).
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered and refused the transaction.
    #[error("rejected: {}", .0.message)]
    Rejected(RejectReason),
}

/// Read and submit access to the cluster.
pub trait LedgerClient: Send + Sync {
    fn latest_blockhash(&self) -> impl Future<Output = Result<[u8; 32], LedgerError>> + Send;

    fn simulate_transaction(
        &self,
        wire: &[u8],
    ) -> impl Future<Output = Result<SimulationResult, LedgerError>> + Send;

    /// Submit a signed transaction, returning its Base58 signature.
    fn send_transaction(&self, wire: &[u8]) -> impl Future<Output = Result<String, LedgerError>> + Send;

    /// `None` when the cluster has not seen the signature (yet).
    fn signature_status(
        &self,
        signature: &str,
    ) -> impl Future<Output = Result<Option<SignatureStatus>, LedgerError>> + Send;

    /// `None` when the account does not exist.
    fn account(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<AccountData>, LedgerError>> + Send;

    fn slot(&self) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Raw token amount held by a token account; `None` when it does not exist.
    fn token_account_balance(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<u64>, LedgerError>> + Send;

    /// Native balance in lamports.
    fn balance(&self, address: &Pubkey) -> impl Future<Output = Result<u64, LedgerError>> + Send;
}

impl<T: LedgerClient> LedgerClient for Arc<T> {
    fn latest_blockhash(&self) -> impl Future<Output = Result<[u8; 32], LedgerError>> + Send {
        (**self).latest_blockhash()
    }

    fn simulate_transaction(
        &self,
        wire: &[u8],
    ) -> impl Future<Output = Result<SimulationResult, LedgerError>> + Send {
        (**self).simulate_transaction(wire)
    }

    fn send_transaction(&self, wire: &[u8]) -> impl Future<Output = Result<String, LedgerError>> + Send {
        (**self).send_transaction(wire)
    }

    fn signature_status(
        &self,
        signature: &str,
    ) -> impl Future<Output = Result<Option<SignatureStatus>, LedgerError>> + Send {
        (**self).signature_status(signature)
    }

    fn account(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<AccountData>, LedgerError>> + Send {
        (**self).account(address)
    }

    fn slot(&self) -> impl Future<Output = Result<u64, LedgerError>> + Send {
        (**self).slot()
    }

    fn token_account_balance(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<u64>, LedgerError>> + Send {
        (**self).token_account_balance(address)
    }

    fn balance(&self, address: &Pubkey) -> impl Future<Output = Result<u64, LedgerError>> + Send {
        (**self).balance(address)
    }
}
