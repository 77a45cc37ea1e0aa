//! Local estimate of the reward a `claim_rewards` call would pay out.
//!
//! Mirrors the program's settlement formula:
//!
//! ```text
//! raw = total_hashpower * (acc_global - acc_checkpoint) / dust_threshold_divisor
//! raw = min(raw, total_supply - burned_tokens - cumulative_rewards)
//! ```
//!
//! The product of a u64 and a u128 needs up to 192 bits, so the math runs
//! in `U256`.

use alloy_primitives::U256;
use serde::Serialize;

use crate::state::{GlobalStateRecord, PlayerRecord};

/// The numbers the formula reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardInputs {
    pub total_hashpower: u64,
    pub last_acc_tokens_per_hashpower: u128,
    pub last_claim_slot: u64,
    pub acc_tokens_per_hashpower: u128,
    pub dust_threshold_divisor: u64,
    pub total_supply: u64,
    pub burned_tokens: u64,
    pub cumulative_rewards: u64,
    pub current_slot: u64,
}

impl RewardInputs {
    pub fn new(player: &PlayerRecord, global: &GlobalStateRecord, current_slot: u64) -> Self {
        Self {
            total_hashpower: player.total_hashpower,
            last_acc_tokens_per_hashpower: player.last_acc_tokens_per_hashpower,
            last_claim_slot: player.last_claim_slot,
            acc_tokens_per_hashpower: global.acc_tokens_per_hashpower,
            dust_threshold_divisor: global.dust_threshold_divisor,
            total_supply: global.total_supply,
            burned_tokens: global.burned_tokens,
            cumulative_rewards: global.cumulative_rewards,
            current_slot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingReward {
    /// Base units.
    pub raw: u64,
    /// Whole tokens, for display only.
    pub display: f64,
}

impl PendingReward {
    /// `decimals` is the mint's, as configured in `TxSettings::token_decimals`.
    pub fn from_raw(raw: u64, decimals: u8) -> Self {
        Self {
            raw,
            display: raw as f64 / 10f64.powi(i32::from(decimals)),
        }
    }
}

/// Pending reward in base units.
pub fn estimate_raw(inputs: &RewardInputs) -> u64 {
    if inputs.current_slot <= inputs.last_claim_slot || inputs.dust_threshold_divisor == 0 {
        return 0;
    }
    let Some(delta) = inputs
        .acc_tokens_per_hashpower
        .checked_sub(inputs.last_acc_tokens_per_hashpower)
    else {
        return 0;
    };

    let raw = U256::from(inputs.total_hashpower) * U256::from(delta)
        / U256::from(inputs.dust_threshold_divisor);

    let available = inputs
        .total_supply
        .saturating_sub(inputs.burned_tokens)
        .saturating_sub(inputs.cumulative_rewards);

    if raw > U256::from(available) {
        available
    } else {
        u64::try_from(raw).unwrap_or(available)
    }
}

pub fn estimate(inputs: &RewardInputs, decimals: u8) -> PendingReward {
    PendingReward::from_raw(estimate_raw(inputs), decimals)
}
