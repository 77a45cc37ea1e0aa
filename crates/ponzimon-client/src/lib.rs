//! Client core for the Ponzimon on-chain card game.
//!
//! A [`WalletHandle`] owns one signer. It derives the game's program and
//! token addresses, decodes player and global state, estimates pending
//! rewards and drives every game action as one or more transactions. The
//! network is reached only through a caller-supplied [`LedgerClient`].

pub mod addresses;
pub mod codec;
pub mod config;
pub mod error;
pub mod handle;
pub mod instructions;
pub mod ledger;
pub mod lock;
pub mod orchestrator;
pub mod program_error;
pub mod reward;
pub mod state;

pub use addresses::{ProgramAddresses, TokenAccounts};
pub use config::{TxSettings, WalletConfig};
pub use error::{ClientError, StepOutcome};
pub use handle::{AccountSummary, InitStrategy, WalletHandle};
pub use ledger::{
    AccountData, Commitment, LedgerClient, LedgerError, RejectReason, SignatureStatus,
    SimulationResult,
};
pub use orchestrator::{ConfirmationStatus, TxOutcome};
pub use program_error::{ProgramError, ProgramErrorKind};
pub use reward::PendingReward;
pub use state::{ActiveCard, Card, GlobalStateRecord, PendingAction, PlayerRecord};
