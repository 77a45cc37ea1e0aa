use std::time::Duration;

use sol_wire::SolError;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::program_error::ProgramError;

/// A finished step of a multi-transaction operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: &'static str,
    pub signature: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid address configuration for {field}: {reason}")]
    InvalidAddressConfiguration { field: &'static str, reason: String },

    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("Unreadable configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Malformed account: {0}")]
    MalformedAccount(String),

    #[error("Simulation failed: {0}")]
    SimulationFailed(ProgramError),

    #[error("Submission failed: {0}")]
    SubmissionFailed(ProgramError),

    /// The transaction may still land; re-query state before retrying.
    #[error("Confirmation timed out for {signature}")]
    ConfirmationTimeout { signature: String },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Ledger request failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Timed out after {after:?} fetching {what}")]
    FetchTimeout { what: String, after: Duration },

    #[error("Transaction build failed: {0}")]
    Transaction(#[from] SolError),

    /// A multi-transaction operation stopped part way. Steps in `completed`
    /// are already on chain and are not rolled back.
    #[error("{operation} failed at {step} after {} completed step(s): {source}", .completed.len())]
    StepFailed {
        operation: &'static str,
        step: &'static str,
        completed: Vec<StepOutcome>,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Whether the outcome is unknown rather than failed, looking through
    /// composite step failures.
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::ConfirmationTimeout { .. } => true,
            ClientError::StepFailed { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// The classified program error, if the ledger rejected a transaction.
    pub fn program_error(&self) -> Option<&ProgramError> {
        match self {
            ClientError::SimulationFailed(e) | ClientError::SubmissionFailed(e) => Some(e),
            ClientError::StepFailed { source, .. } => source.program_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program_error::ProgramErrorKind;

    #[test]
    fn display_missing_configuration() {
        let err = ClientError::MissingConfiguration("token_mint");
        assert_eq!(err.to_string(), "Missing configuration: token_mint");
    }

    #[test]
    fn display_step_failed() {
        let err = ClientError::StepFailed {
            operation: "open_booster",
            step: "settle",
            completed: vec![StepOutcome {
                step: "commit",
                signature: "sig1".into(),
            }],
            source: Box::new(ClientError::ConfirmationTimeout {
                signature: "sig2".into(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "open_booster failed at settle after 1 completed step(s): Confirmation timed out for sig2"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn rejection_is_not_timeout() {
        let err = ClientError::SimulationFailed(ProgramError::from_code(6005));
        assert!(!err.is_timeout());
        assert_eq!(
            err.program_error().map(|e| e.kind),
            Some(ProgramErrorKind::Timing)
        );
    }

    #[test]
    fn sol_error_converts() {
        let err: ClientError = SolError::TransactionBuildError("too big".into()).into();
        assert!(matches!(err, ClientError::Transaction(_)));
    }
}
