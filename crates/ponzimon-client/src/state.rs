//! Decoded on-chain records and the local checks made against them before
//! a transaction is spent.

use serde::Serialize;
use sol_wire::Pubkey;

use crate::error::ClientError;

/// Card slots allocated in every player account.
pub const MAX_CARDS: usize = 128;

/// Cards added by one booster pack.
pub const CARDS_PER_BOOSTER: usize = 5;

/// Slots that must pass after a commit before it can be cancelled.
pub const CANCEL_TIMEOUT_SLOTS: u64 = 100;

/// Rarity tiers, lowest first.
pub mod rarity {
    pub const COMMON: u8 = 0;
    pub const UNCOMMON: u8 = 1;
    pub const RARE: u8 = 2;
    pub const DOUBLE_RARE: u8 = 3;
    pub const VERY_RARE: u8 = 4;
    pub const SUPER_RARE: u8 = 5;
    pub const MEGA_RARE: u8 = 6;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Farm {
    pub farm_type: u8,
    pub total_cards: u8,
    pub berry_capacity: u64,
}

/// One card slot. `id == 0` marks an empty slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: u16,
    pub rarity: u8,
    pub hashpower: u16,
    pub berry_consumption: u8,
}

impl Card {
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

/// A commit waiting for its settle transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingAction {
    #[default]
    None,
    Booster,
    Recycle {
        card_indices: [u8; MAX_CARDS],
        card_count: u8,
    },
}

impl PendingAction {
    pub fn is_pending(&self) -> bool {
        !matches!(self, PendingAction::None)
    }

    /// Slots named by a pending recycle.
    pub fn recycle_indices(&self) -> &[u8] {
        match self {
            PendingAction::Recycle {
                card_indices,
                card_count,
            } => &card_indices[..usize::from(*card_count).min(MAX_CARDS)],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub owner: Pubkey,
    pub farm: Farm,
    /// All slots, empty ones included. Always `MAX_CARDS` long when decoded.
    pub cards: Vec<Card>,
    pub card_count: u8,
    /// Bit `i` set means slot `i` is staked.
    pub staked_cards_bitset: u128,
    pub berries: u64,
    pub total_hashpower: u64,
    pub referrer: Option<Pubkey>,
    pub last_acc_tokens_per_hashpower: u128,
    pub last_claim_slot: u64,
    pub last_upgrade_slot: u64,
    pub total_rewards: u64,
    pub total_gambles: u64,
    pub total_gamble_wins: u64,
    pub pending_action: PendingAction,
    pub commit_slot: u64,
    pub total_earnings_for_referrer: u64,
    pub total_booster_packs_opened: u64,
    pub total_cards_recycled: u64,
    pub successful_card_recycling: u64,
    pub total_sol_spent: u64,
    pub total_tokens_spent: u64,
    pub staked_tokens: u64,
    pub last_stake_slot: u64,
    pub last_acc_sol_rewards_per_token: u128,
    pub last_acc_token_rewards_per_token: u128,
    pub claimed_token_rewards: u64,
}

/// A non-empty card with its slot position and stake flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveCard {
    pub slot: u8,
    pub card: Card,
    pub is_staked: bool,
}

impl PlayerRecord {
    pub fn is_staked(&self, slot: u8) -> bool {
        slot < 128 && (self.staked_cards_bitset >> slot) & 1 == 1
    }

    /// Non-empty cards in slot order. Stake flags are read by slot position
    /// before empty slots are dropped.
    pub fn active_cards(&self) -> Vec<ActiveCard> {
        self.cards
            .iter()
            .enumerate()
            .take(MAX_CARDS)
            .map(|(slot, card)| ActiveCard {
                slot: slot as u8,
                card: *card,
                is_staked: self.is_staked(slot as u8),
            })
            .filter(|c| !c.card.is_empty())
            .collect()
    }

    pub fn card(&self, slot: u8) -> Option<&Card> {
        self.cards.get(usize::from(slot))
    }

    /// Last occupied slot below `card_count`.
    pub fn last_occupied_slot(&self) -> Option<u8> {
        let count = usize::from(self.card_count).min(self.cards.len());
        self.cards[..count]
            .iter()
            .rposition(|c| !c.is_empty())
            .map(|i| i as u8)
    }

    // -- Preconditions ------------------------------------------------------

    pub fn count_staked_cards(&self) -> u32 {
        self.staked_cards_bitset.count_ones()
    }

    /// Stake and unstake go through while a commit is pending, except for
    /// slots the pending recycle names.
    pub fn check_can_stake(&self, slot: u8) -> Result<(), ClientError> {
        self.check_occupied(slot)?;
        if self.is_staked(slot) {
            return Err(precondition(format!("card slot {slot} is already staked")));
        }
        self.check_not_recycling(slot)?;
        if self.count_staked_cards() >= u32::from(self.farm.total_cards) {
            return Err(precondition(format!(
                "farm holds at most {} staked cards",
                self.farm.total_cards
            )));
        }
        if let Some(card) = self.card(slot) {
            let berries = self.berries.saturating_add(u64::from(card.berry_consumption));
            if berries > self.farm.berry_capacity {
                return Err(precondition(format!(
                    "staking slot {slot} needs {berries} berries, farm capacity is {}",
                    self.farm.berry_capacity
                )));
            }
        }
        Ok(())
    }

    pub fn check_can_unstake(&self, slot: u8) -> Result<(), ClientError> {
        if !self.is_staked(slot) {
            return Err(precondition(format!("card slot {slot} is not staked")));
        }
        self.check_not_recycling(slot)
    }

    pub fn check_can_recycle(&self, slots: &[u8]) -> Result<(), ClientError> {
        self.check_no_pending()?;
        if slots.is_empty() || slots.len() > MAX_CARDS {
            return Err(precondition(format!(
                "recycle needs 1 to {MAX_CARDS} cards, got {}",
                slots.len()
            )));
        }
        let mut sorted = slots.to_vec();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(precondition("duplicate card slot in recycle list"));
        }
        for &slot in slots {
            self.check_occupied(slot)?;
            if self.is_staked(slot) {
                return Err(precondition(format!(
                    "card slot {slot} is staked, unstake it before recycling"
                )));
            }
        }
        Ok(())
    }

    pub fn check_can_open_booster(&self) -> Result<(), ClientError> {
        self.check_no_pending()?;
        if usize::from(self.card_count) + CARDS_PER_BOOSTER > MAX_CARDS {
            return Err(precondition(format!(
                "{} cards held, no room for a booster",
                self.card_count
            )));
        }
        Ok(())
    }

    /// A pending action can be cancelled once `current_slot` is past
    /// `commit_slot + CANCEL_TIMEOUT_SLOTS`.
    pub fn check_can_cancel(&self, current_slot: u64) -> Result<(), ClientError> {
        if !self.pending_action.is_pending() {
            return Err(precondition("no pending action to cancel"));
        }
        let unlock_slot = self.commit_slot.saturating_add(CANCEL_TIMEOUT_SLOTS);
        if current_slot <= unlock_slot {
            return Err(precondition(format!(
                "pending action committed at slot {} can be cancelled after slot {unlock_slot}, now {current_slot}",
                self.commit_slot
            )));
        }
        Ok(())
    }

    fn check_not_recycling(&self, slot: u8) -> Result<(), ClientError> {
        if self.pending_action.recycle_indices().contains(&slot) {
            return Err(precondition(format!(
                "card slot {slot} is part of a pending recycle"
            )));
        }
        Ok(())
    }

    fn check_no_pending(&self) -> Result<(), ClientError> {
        match self.pending_action {
            PendingAction::None => Ok(()),
            PendingAction::Booster => Err(precondition("a booster opening is still pending")),
            PendingAction::Recycle { .. } => Err(precondition("a recycle is still pending")),
        }
    }

    fn check_occupied(&self, slot: u8) -> Result<(), ClientError> {
        if slot >= self.card_count {
            return Err(precondition(format!(
                "card slot {slot} out of range, player holds {} cards",
                self.card_count
            )));
        }
        match self.card(slot) {
            Some(card) if !card.is_empty() => Ok(()),
            _ => Err(precondition(format!("card slot {slot} is empty"))),
        }
    }
}

fn precondition(msg: impl Into<String>) -> ClientError {
    ClientError::PreconditionFailed(msg.into())
}

/// Program-wide counters. A snapshot, never modified locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalStateRecord {
    pub authority: Pubkey,
    pub token_mint: Pubkey,
    pub fees_wallet: Pubkey,
    pub total_supply: u64,
    pub burned_tokens: u64,
    pub cumulative_rewards: u64,
    pub start_slot: u64,
    pub reward_rate: u64,
    pub acc_tokens_per_hashpower: u128,
    pub last_reward_slot: u64,
    pub burn_rate: u8,
    pub referral_fee: u8,
    pub production_enabled: bool,
    pub cooldown_slots: u64,
    pub dust_threshold_divisor: u64,
    pub initial_farm_purchase_fee_lamports: u64,
    pub booster_pack_cost_microtokens: u64,
    pub gamble_fee_lamports: u64,
    pub total_berries: u64,
    pub total_hashpower: u64,
    pub total_global_gambles: u64,
    pub total_global_gamble_wins: u64,
    pub total_booster_packs_opened: u64,
    pub total_card_recycling_attempts: u64,
    pub total_successful_card_recycling: u64,
    pub total_staked_tokens: u64,
    pub staking_lockup_slots: u64,
    pub acc_sol_rewards_per_token: u128,
    pub acc_token_rewards_per_token: u128,
    pub last_staking_reward_slot: u64,
    pub token_reward_rate: u64,
    pub total_sol_deposited: u64,
    pub reward_rate_multiplier: u64,
    pub last_rate_update_slot: u64,
    pub rewards_vault: Pubkey,
    pub padding: [u8; 32],
}

impl GlobalStateRecord {
    pub fn check_production_enabled(&self) -> Result<(), ClientError> {
        if !self.production_enabled {
            return Err(precondition("production is disabled"));
        }
        Ok(())
    }
}
