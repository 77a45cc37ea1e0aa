//! Numeric program error codes mapped to categories and readable causes.
//!
//! Codes come from three places: the SPL Token program (small integers),
//! the Anchor framework (2000..=4999) and the game program itself
//! (6000 + variant index).

use std::fmt;

use serde::Serialize;

use crate::ledger::RejectReason;

/// Base of the game program's custom error codes.
pub const CUSTOM_ERROR_BASE: u32 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProgramErrorKind {
    InsufficientFunds,
    /// Cooldowns, wallet age and other slot-based windows.
    Timing,
    AccountState,
    Capacity,
    Authorization,
    InvalidArgument,
    Randomness,
    Unknown,
}

/// A classified failure reported by the ledger for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramError {
    /// Raw numeric code, when the ledger reported one.
    pub code: Option<u32>,
    pub kind: ProgramErrorKind,
    pub description: String,
}

impl ProgramError {
    pub fn from_code(code: u32) -> Self {
        let (kind, description) = match lookup(code) {
            Some((kind, text)) => (kind, text.to_string()),
            None => (ProgramErrorKind::Unknown, format!("unknown program error {code}")),
        };
        Self {
            code: Some(code),
            kind,
            description,
        }
    }

    /// Classify a raw rejection: by code when present, else keep the message.
    pub fn from_reason(reason: &RejectReason) -> Self {
        match reason.code {
            Some(code) => Self::from_code(code),
            None => Self {
                code: None,
                kind: ProgramErrorKind::Unknown,
                description: reason.message.clone(),
            },
        }
    }
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.description),
            None => f.write_str(&self.description),
        }
    }
}

fn lookup(code: u32) -> Option<(ProgramErrorKind, &'static str)> {
    use ProgramErrorKind::*;

    let entry = match code {
        1 => (InsufficientFunds, "insufficient funds for this operation"),

        2000 => (AccountState, "an account expected to be writable was not"),
        2003 => (AccountState, "account constraint violated"),
        2006 => (AccountState, "derived address does not match the expected seeds"),
        3001 => (AccountState, "account discriminator not found"),
        3002 => (AccountState, "account discriminator mismatch"),
        3003 => (AccountState, "account could not be deserialized"),
        3007 => (AccountState, "account is owned by the wrong program"),
        3012 => (AccountState, "account is not initialized"),

        c if c >= CUSTOM_ERROR_BASE => return custom(c - CUSTOM_ERROR_BASE),
        _ => return None,
    };
    Some(entry)
}

/// Custom codes of the commit/settle program. The first 24 keep the order
/// the farm program has always used; the pending-action and slot-hash
/// variants follow.
fn custom(index: u32) -> Option<(ProgramErrorKind, &'static str)> {
    use ProgramErrorKind::*;

    let entry = match index {
        0 => (Timing, "wallet is too new to play"),
        1 => (Capacity, "farm power capacity exceeded"),
        2 => (Capacity, "farm card capacity exceeded"),
        3 => (InsufficientFunds, "insufficient token balance"),
        4 => (InsufficientFunds, "insufficient lamports"),
        5 => (Timing, "cooldown has not expired"),
        6 => (AccountState, "production is disabled"),
        7 => (InvalidArgument, "invalid card type"),
        8 => (InvalidArgument, "invalid farm type"),
        9 => (Authorization, "unauthorized"),
        10 => (AccountState, "initial farm already purchased"),
        11 => (InvalidArgument, "invalid referrer"),
        12 => (InvalidArgument, "invalid token mint"),
        13 => (Timing, "new wallets are restricted"),
        14 => (AccountState, "no pending reward"),
        15 => (AccountState, "reward already claimed"),
        16 => (Timing, "reward expired"),
        17 => (InvalidArgument, "self-referral is not allowed"),
        18 => (InvalidArgument, "invalid referral fee"),
        19 => (InvalidArgument, "invalid burn rate"),
        20 => (InvalidArgument, "invalid cooldown slots"),
        21 => (InvalidArgument, "invalid halving interval"),
        22 => (InvalidArgument, "invalid dust threshold divisor"),
        23 => (Capacity, "farm is not full enough to upgrade"),
        24 => (Randomness, "randomness not resolved yet, settle again later"),
        25 => (AccountState, "card is staked or being recycled"),
        26 => (AccountState, "card is not staked"),
        27 => (AccountState, "a booster opening is already pending"),
        28 => (AccountState, "no booster opening to settle"),
        29 => (AccountState, "a recycle is already pending"),
        30 => (AccountState, "no recycle to settle"),
        31 => (InvalidArgument, "invalid number of cards to recycle"),
        32 => (InvalidArgument, "duplicate card index in recycle list"),
        33 => (Timing, "pending action is too recent to cancel"),
        34 => (AccountState, "no pending action to cancel"),
        35 => (Randomness, "commit slot hash is no longer available, cancel the pending action"),
        36 => (Randomness, "invalid slot hashes sysvar"),
        37 => (InvalidArgument, "token account has the wrong owner"),
        38 => (Authorization, "invalid mint authority"),
        39 => (InvalidArgument, "invalid parameter index"),
        40 => (InvalidArgument, "referrer account missing"),
        _ => return None,
    };
    Some(entry)
}
