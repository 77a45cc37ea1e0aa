//! Build, simulate, submit and confirm transactions for one signer.
//!
//! ```text
//! Built -> Simulated -> Submitted -> Polling -> Finalized | TimedOut
//!              |            |           |
//!              +------------+-----------+--> rejected (error)
//! ```
//!
//! A confirmation timeout is returned as an outcome, not an error: the
//! transaction may still land, so the caller has to re-read state.

use std::future::Future;
use std::time::Duration;

use sol_wire::{Instruction, Keypair, Message, Pubkey, SignedTransaction};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::TxSettings;
use crate::error::{ClientError, StepOutcome};
use crate::ledger::{AccountData, Commitment, LedgerClient, LedgerError, RejectReason};
use crate::program_error::ProgramError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Finalized,
    /// Polling gave up; the outcome is unknown.
    TimedOut,
}

/// Result of one submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub signature: String,
    pub status: ConfirmationStatus,
}

impl TxOutcome {
    pub fn is_finalized(&self) -> bool {
        self.status == ConfirmationStatus::Finalized
    }

    /// Treat a timeout as an error, for steps that later steps depend on.
    pub fn require_finalized(self) -> Result<String, ClientError> {
        match self.status {
            ConfirmationStatus::Finalized => Ok(self.signature),
            ConfirmationStatus::TimedOut => Err(ClientError::ConfirmationTimeout {
                signature: self.signature,
            }),
        }
    }
}

pub struct Orchestrator<L> {
    ledger: L,
    payer: Keypair,
    settings: TxSettings,
}

impl<L: LedgerClient> Orchestrator<L> {
    pub fn new(ledger: L, payer: Keypair, settings: TxSettings) -> Self {
        Self {
            ledger,
            payer,
            settings,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    pub fn settings(&self) -> &TxSettings {
        &self.settings
    }

    /// Sign `instructions` as one transaction, send it and wait for
    /// finalization.
    pub async fn submit(&self, label: &str, instructions: &[Instruction]) -> Result<TxOutcome, ClientError> {
        let tx = self.build(instructions).await?;
        let wire = tx.to_wire()?;

        if self.settings.simulate_before_send {
            self.simulate(label, &wire).await?;
        }

        let signature = self.send(label, &wire).await?;
        info!(%signature, label, "transaction sent");

        let status = self.confirm(&signature).await?;
        match status {
            ConfirmationStatus::Finalized => info!(%signature, label, "transaction finalized"),
            ConfirmationStatus::TimedOut => {
                warn!(%signature, label, "confirmation timed out, outcome unknown")
            }
        }
        Ok(TxOutcome { signature, status })
    }

    async fn build(&self, instructions: &[Instruction]) -> Result<SignedTransaction, ClientError> {
        let blockhash = self.ledger.latest_blockhash().await?;
        let message = Message::compile(instructions, &self.payer.pubkey(), &blockhash)?;
        Ok(SignedTransaction::sign(message, &self.payer)?)
    }

    async fn simulate(&self, label: &str, wire: &[u8]) -> Result<(), ClientError> {
        let sim = self.ledger.simulate_transaction(wire).await?;
        if let Some(reason) = sim.err {
            let err = ProgramError::from_reason(&reason);
            for line in &sim.logs {
                debug!(label, log = %line, "simulation log");
            }
            warn!(label, error = %err, "simulation rejected transaction");
            return Err(ClientError::SimulationFailed(err));
        }
        debug!(label, units = ?sim.units_consumed, "simulation ok");
        Ok(())
    }

    /// Send with bounded retries. Only transport failures are retried; a
    /// rejection by the node is final.
    async fn send(&self, label: &str, wire: &[u8]) -> Result<String, ClientError> {
        let attempts = self.settings.send_retries.max(1);
        let mut last = String::new();
        for attempt in 0..attempts {
            match self.ledger.send_transaction(wire).await {
                Ok(signature) => return Ok(signature),
                Err(LedgerError::Rejected(reason)) => {
                    let err = ProgramError::from_reason(&reason);
                    warn!(label, error = %err, "submission rejected");
                    return Err(ClientError::SubmissionFailed(err));
                }
                Err(LedgerError::Transport(msg)) => {
                    warn!(label, attempt = attempt + 1, error = %msg, "send failed");
                    last = msg;
                    if attempt + 1 < attempts {
                        sleep(self.settings.send_backoff(attempt)).await;
                    }
                }
            }
        }
        Err(ClientError::SubmissionFailed(ProgramError::from_reason(&RejectReason {
            code: None,
            message: format!("send failed after {attempts} attempt(s): {last}"),
        })))
    }

    /// Wait the initial delay, then poll until finalized or out of polls.
    async fn confirm(&self, signature: &str) -> Result<ConfirmationStatus, ClientError> {
        sleep(self.settings.confirm_initial_delay()).await;

        for poll in 0..self.settings.confirm_max_polls {
            match self.ledger.signature_status(signature).await {
                Ok(Some(status)) => {
                    if let Some(reason) = status.err {
                        let err = ProgramError::from_reason(&reason);
                        warn!(%signature, error = %err, "transaction failed on chain");
                        return Err(ClientError::SubmissionFailed(err));
                    }
                    if status.confirmation == Some(Commitment::Finalized) {
                        return Ok(ConfirmationStatus::Finalized);
                    }
                }
                Ok(None) => {}
                Err(e) => debug!(%signature, poll, error = %e, "status check failed"),
            }
            if poll + 1 < self.settings.confirm_max_polls {
                sleep(self.settings.confirm_poll_interval()).await;
            }
        }
        Ok(ConfirmationStatus::TimedOut)
    }

    /// Race a ledger read against the fetch timeout.
    pub async fn fetch<T>(
        &self,
        what: impl Into<String>,
        request: impl Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, ClientError> {
        let after = self.settings.fetch_timeout();
        match timeout(after, request).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ClientError::FetchTimeout {
                what: what.into(),
                after,
            }),
        }
    }

    pub async fn fetch_account(&self, address: &Pubkey) -> Result<Option<AccountData>, ClientError> {
        self.fetch(format!("account {address}"), self.ledger.account(address))
            .await
    }
}

/// Runs the steps of a multi-transaction operation in order.
///
/// Each step must finalize before the next one starts. The first failure
/// (rejection or timeout) stops the run and is wrapped with the steps that
/// already landed, which stay on chain.
pub struct StepRunner<'a, L> {
    orchestrator: &'a Orchestrator<L>,
    operation: &'static str,
    completed: Vec<StepOutcome>,
}

impl<'a, L: LedgerClient> StepRunner<'a, L> {
    pub fn new(orchestrator: &'a Orchestrator<L>, operation: &'static str) -> Self {
        Self {
            orchestrator,
            operation,
            completed: Vec::new(),
        }
    }

    pub async fn step(&mut self, step: &'static str, instructions: &[Instruction]) -> Result<(), ClientError> {
        info!(operation = self.operation, step, "running step");
        let result = self
            .orchestrator
            .submit(step, instructions)
            .await
            .and_then(TxOutcome::require_finalized);
        match result {
            Ok(signature) => {
                self.completed.push(StepOutcome { step, signature });
                Ok(())
            }
            Err(e) => Err(self.fail(step, e)),
        }
    }

    /// Wrap a non-transaction failure (a read between steps) the same way.
    pub fn fail(&self, step: &'static str, source: ClientError) -> ClientError {
        warn!(
            operation = self.operation,
            step,
            completed = self.completed.len(),
            error = %source,
            "operation stopped"
        );
        ClientError::StepFailed {
            operation: self.operation,
            step,
            completed: self.completed.clone(),
            source: Box::new(source),
        }
    }

    pub async fn pause(&self, delay: Duration) {
        sleep(delay).await;
    }

    pub fn finish(self) -> Vec<StepOutcome> {
        self.completed
    }
}
