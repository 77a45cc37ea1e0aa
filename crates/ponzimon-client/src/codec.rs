//! Fixed-layout decoding of the program's accounts.
//!
//! Every decoder takes a buffer and an offset and returns
//! `(value, next_offset)`. Integers are little-endian and every bit pattern
//! is a valid value; the only failure is running out of bytes, which is a
//! `MalformedAccount` error. Short buffers are never zero-padded.
//!
//! Account blobs start with an 8-byte type discriminator that the record
//! decoders skip. [`check_discriminator`] verifies it separately.

use sol_wire::Pubkey;

use crate::error::ClientError;
use crate::state::{Card, Farm, GlobalStateRecord, PendingAction, PlayerRecord, MAX_CARDS};

pub const DISCRIMINATOR_LEN: usize = 8;

/// `sha256("account:Player")[..8]`
pub const PLAYER_DISCRIMINATOR: [u8; 8] = [0xcd, 0xde, 0x70, 0x07, 0xa5, 0x9b, 0xce, 0xda];

/// `sha256("account:GlobalState")[..8]`
pub const GLOBAL_STATE_DISCRIMINATOR: [u8; 8] = [0xa3, 0x2e, 0x4a, 0xa8, 0xd8, 0x7b, 0x85, 0x62];

/// Encoded size of one card slot.
pub const CARD_LEN: usize = 6;

type Decoded<T> = Result<(T, usize), ClientError>;

fn take<const N: usize>(buf: &[u8], offset: usize) -> Decoded<[u8; N]> {
    let end = offset.checked_add(N).filter(|end| *end <= buf.len()).ok_or_else(|| {
        ClientError::MalformedAccount(format!(
            "need {N} bytes at offset {offset}, buffer is {} bytes",
            buf.len()
        ))
    })?;
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..end]);
    Ok((out, end))
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

pub fn decode_u8(buf: &[u8], offset: usize) -> Decoded<u8> {
    let ([b], next) = take::<1>(buf, offset)?;
    Ok((b, next))
}

pub fn decode_u16(buf: &[u8], offset: usize) -> Decoded<u16> {
    let (bytes, next) = take(buf, offset)?;
    Ok((u16::from_le_bytes(bytes), next))
}

pub fn decode_u64(buf: &[u8], offset: usize) -> Decoded<u64> {
    let (bytes, next) = take(buf, offset)?;
    Ok((u64::from_le_bytes(bytes), next))
}

pub fn decode_u128(buf: &[u8], offset: usize) -> Decoded<u128> {
    let (bytes, next) = take(buf, offset)?;
    Ok((u128::from_le_bytes(bytes), next))
}

pub fn decode_bool(buf: &[u8], offset: usize) -> Decoded<bool> {
    let (b, next) = decode_u8(buf, offset)?;
    Ok((b != 0, next))
}

pub fn decode_pubkey(buf: &[u8], offset: usize) -> Decoded<Pubkey> {
    let (bytes, next) = take(buf, offset)?;
    Ok((Pubkey::new_from_array(bytes), next))
}

/// One tag byte: `0` is `None`, anything else is followed by the value.
pub fn decode_option<T>(
    buf: &[u8],
    offset: usize,
    inner: impl FnOnce(&[u8], usize) -> Decoded<T>,
) -> Decoded<Option<T>> {
    let (tag, next) = decode_u8(buf, offset)?;
    if tag == 0 {
        return Ok((None, next));
    }
    let (value, next) = inner(buf, next)?;
    Ok((Some(value), next))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

pub fn decode_farm(buf: &[u8], offset: usize) -> Decoded<Farm> {
    let (farm_type, o) = decode_u8(buf, offset)?;
    let (total_cards, o) = decode_u8(buf, o)?;
    let (berry_capacity, o) = decode_u64(buf, o)?;
    Ok((
        Farm {
            farm_type,
            total_cards,
            berry_capacity,
        },
        o,
    ))
}

pub fn decode_card(buf: &[u8], offset: usize) -> Decoded<Card> {
    let (id, o) = decode_u16(buf, offset)?;
    let (rarity, o) = decode_u8(buf, o)?;
    let (hashpower, o) = decode_u16(buf, o)?;
    let (berry_consumption, o) = decode_u8(buf, o)?;
    Ok((
        Card {
            id,
            rarity,
            hashpower,
            berry_consumption,
        },
        o,
    ))
}

pub fn decode_pending_action(buf: &[u8], offset: usize) -> Decoded<PendingAction> {
    let (tag, o) = decode_u8(buf, offset)?;
    match tag {
        0 => Ok((PendingAction::None, o)),
        1 => Ok((PendingAction::Booster, o)),
        2 => {
            let (card_indices, o) = take::<MAX_CARDS>(buf, o)?;
            let (card_count, o) = decode_u8(buf, o)?;
            Ok((
                PendingAction::Recycle {
                    card_indices,
                    card_count,
                },
                o,
            ))
        }
        other => Err(ClientError::MalformedAccount(format!(
            "unknown pending action tag {other} at offset {offset}"
        ))),
    }
}

/// Verify the leading account type discriminator.
pub fn check_discriminator(account: &[u8], expected: &[u8; 8], name: &str) -> Result<(), ClientError> {
    let (found, _) = take::<DISCRIMINATOR_LEN>(account, 0)?;
    if &found != expected {
        return Err(ClientError::MalformedAccount(format!(
            "{name} discriminator mismatch: expected {}, found {}",
            hex::encode(expected),
            hex::encode(found)
        )));
    }
    Ok(())
}

fn body(account: &[u8]) -> Result<&[u8], ClientError> {
    account.get(DISCRIMINATOR_LEN..).ok_or_else(|| {
        ClientError::MalformedAccount(format!(
            "account is {} bytes, shorter than its discriminator",
            account.len()
        ))
    })
}

/// Decode a full player account, discriminator included.
///
/// All `MAX_CARDS` slots are decoded whatever `card_count` says; the
/// account is allocated at full capacity.
pub fn decode_player_data(account: &[u8]) -> Result<PlayerRecord, ClientError> {
    let buf = body(account)?;

    let (owner, o) = decode_pubkey(buf, 0)?;
    let (farm, mut o) = decode_farm(buf, o)?;
    let mut cards = Vec::with_capacity(MAX_CARDS);
    for _ in 0..MAX_CARDS {
        let (card, next) = decode_card(buf, o)?;
        cards.push(card);
        o = next;
    }
    let (card_count, o) = decode_u8(buf, o)?;
    let (staked_cards_bitset, o) = decode_u128(buf, o)?;
    let (berries, o) = decode_u64(buf, o)?;
    let (total_hashpower, o) = decode_u64(buf, o)?;
    let (referrer, o) = decode_option(buf, o, decode_pubkey)?;
    let (last_acc_tokens_per_hashpower, o) = decode_u128(buf, o)?;
    let (last_claim_slot, o) = decode_u64(buf, o)?;
    let (last_upgrade_slot, o) = decode_u64(buf, o)?;
    let (total_rewards, o) = decode_u64(buf, o)?;
    let (total_gambles, o) = decode_u64(buf, o)?;
    let (total_gamble_wins, o) = decode_u64(buf, o)?;
    let (pending_action, o) = decode_pending_action(buf, o)?;
    let (commit_slot, o) = decode_u64(buf, o)?;
    let (total_earnings_for_referrer, o) = decode_u64(buf, o)?;
    let (total_booster_packs_opened, o) = decode_u64(buf, o)?;
    let (total_cards_recycled, o) = decode_u64(buf, o)?;
    let (successful_card_recycling, o) = decode_u64(buf, o)?;
    let (total_sol_spent, o) = decode_u64(buf, o)?;
    let (total_tokens_spent, o) = decode_u64(buf, o)?;
    let (staked_tokens, o) = decode_u64(buf, o)?;
    let (last_stake_slot, o) = decode_u64(buf, o)?;
    let (last_acc_sol_rewards_per_token, o) = decode_u128(buf, o)?;
    let (last_acc_token_rewards_per_token, o) = decode_u128(buf, o)?;
    let (claimed_token_rewards, _) = decode_u64(buf, o)?;

    Ok(PlayerRecord {
        owner,
        farm,
        cards,
        card_count,
        staked_cards_bitset,
        berries,
        total_hashpower,
        referrer,
        last_acc_tokens_per_hashpower,
        last_claim_slot,
        last_upgrade_slot,
        total_rewards,
        total_gambles,
        total_gamble_wins,
        pending_action,
        commit_slot,
        total_earnings_for_referrer,
        total_booster_packs_opened,
        total_cards_recycled,
        successful_card_recycling,
        total_sol_spent,
        total_tokens_spent,
        staked_tokens,
        last_stake_slot,
        last_acc_sol_rewards_per_token,
        last_acc_token_rewards_per_token,
        claimed_token_rewards,
    })
}

/// Decode a full global state account, discriminator included.
pub fn decode_global_state(account: &[u8]) -> Result<GlobalStateRecord, ClientError> {
    let buf = body(account)?;

    let (authority, o) = decode_pubkey(buf, 0)?;
    let (token_mint, o) = decode_pubkey(buf, o)?;
    let (fees_wallet, o) = decode_pubkey(buf, o)?;
    let (total_supply, o) = decode_u64(buf, o)?;
    let (burned_tokens, o) = decode_u64(buf, o)?;
    let (cumulative_rewards, o) = decode_u64(buf, o)?;
    let (start_slot, o) = decode_u64(buf, o)?;
    let (reward_rate, o) = decode_u64(buf, o)?;
    let (acc_tokens_per_hashpower, o) = decode_u128(buf, o)?;
    let (last_reward_slot, o) = decode_u64(buf, o)?;
    let (burn_rate, o) = decode_u8(buf, o)?;
    let (referral_fee, o) = decode_u8(buf, o)?;
    let (production_enabled, o) = decode_bool(buf, o)?;
    let (cooldown_slots, o) = decode_u64(buf, o)?;
    let (dust_threshold_divisor, o) = decode_u64(buf, o)?;
    let (initial_farm_purchase_fee_lamports, o) = decode_u64(buf, o)?;
    let (booster_pack_cost_microtokens, o) = decode_u64(buf, o)?;
    let (gamble_fee_lamports, o) = decode_u64(buf, o)?;
    let (total_berries, o) = decode_u64(buf, o)?;
    let (total_hashpower, o) = decode_u64(buf, o)?;
    let (total_global_gambles, o) = decode_u64(buf, o)?;
    let (total_global_gamble_wins, o) = decode_u64(buf, o)?;
    let (total_booster_packs_opened, o) = decode_u64(buf, o)?;
    let (total_card_recycling_attempts, o) = decode_u64(buf, o)?;
    let (total_successful_card_recycling, o) = decode_u64(buf, o)?;
    let (total_staked_tokens, o) = decode_u64(buf, o)?;
    let (staking_lockup_slots, o) = decode_u64(buf, o)?;
    let (acc_sol_rewards_per_token, o) = decode_u128(buf, o)?;
    let (acc_token_rewards_per_token, o) = decode_u128(buf, o)?;
    let (last_staking_reward_slot, o) = decode_u64(buf, o)?;
    let (token_reward_rate, o) = decode_u64(buf, o)?;
    let (total_sol_deposited, o) = decode_u64(buf, o)?;
    let (reward_rate_multiplier, o) = decode_u64(buf, o)?;
    let (last_rate_update_slot, o) = decode_u64(buf, o)?;
    let (rewards_vault, o) = decode_pubkey(buf, o)?;
    let (padding, _) = take::<32>(buf, o)?;

    Ok(GlobalStateRecord {
        authority,
        token_mint,
        fees_wallet,
        total_supply,
        burned_tokens,
        cumulative_rewards,
        start_slot,
        reward_rate,
        acc_tokens_per_hashpower,
        last_reward_slot,
        burn_rate,
        referral_fee,
        production_enabled,
        cooldown_slots,
        dust_threshold_divisor,
        initial_farm_purchase_fee_lamports,
        booster_pack_cost_microtokens,
        gamble_fee_lamports,
        total_berries,
        total_hashpower,
        total_global_gambles,
        total_global_gamble_wins,
        total_booster_packs_opened,
        total_card_recycling_attempts,
        total_successful_card_recycling,
        total_staked_tokens,
        staking_lockup_slots,
        acc_sol_rewards_per_token,
        acc_token_rewards_per_token,
        last_staking_reward_slot,
        token_reward_rate,
        total_sol_deposited,
        reward_rate_multiplier,
        last_rate_update_slot,
        rewards_vault,
        padding,
    })
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize a player account in the on-chain layout, discriminator first.
///
/// `cards` is written padded or truncated to exactly `MAX_CARDS` slots.
pub fn encode_player_data(player: &PlayerRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(1100);
    out.extend_from_slice(&PLAYER_DISCRIMINATOR);
    out.extend_from_slice(player.owner.as_ref());
    out.push(player.farm.farm_type);
    out.push(player.farm.total_cards);
    out.extend_from_slice(&player.farm.berry_capacity.to_le_bytes());
    for i in 0..MAX_CARDS {
        let card = player.cards.get(i).copied().unwrap_or_default();
        out.extend_from_slice(&card.id.to_le_bytes());
        out.push(card.rarity);
        out.extend_from_slice(&card.hashpower.to_le_bytes());
        out.push(card.berry_consumption);
    }
    out.push(player.card_count);
    out.extend_from_slice(&player.staked_cards_bitset.to_le_bytes());
    out.extend_from_slice(&player.berries.to_le_bytes());
    out.extend_from_slice(&player.total_hashpower.to_le_bytes());
    match &player.referrer {
        Some(referrer) => {
            out.push(1);
            out.extend_from_slice(referrer.as_ref());
        }
        None => out.push(0),
    }
    out.extend_from_slice(&player.last_acc_tokens_per_hashpower.to_le_bytes());
    for v in [
        player.last_claim_slot,
        player.last_upgrade_slot,
        player.total_rewards,
        player.total_gambles,
        player.total_gamble_wins,
    ] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    match &player.pending_action {
        PendingAction::None => out.push(0),
        PendingAction::Booster => out.push(1),
        PendingAction::Recycle {
            card_indices,
            card_count,
        } => {
            out.push(2);
            out.extend_from_slice(card_indices);
            out.push(*card_count);
        }
    }
    for v in [
        player.commit_slot,
        player.total_earnings_for_referrer,
        player.total_booster_packs_opened,
        player.total_cards_recycled,
        player.successful_card_recycling,
        player.total_sol_spent,
        player.total_tokens_spent,
        player.staked_tokens,
        player.last_stake_slot,
    ] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&player.last_acc_sol_rewards_per_token.to_le_bytes());
    out.extend_from_slice(&player.last_acc_token_rewards_per_token.to_le_bytes());
    out.extend_from_slice(&player.claimed_token_rewards.to_le_bytes());
    out
}

/// Serialize a global state account in the on-chain layout.
pub fn encode_global_state(gs: &GlobalStateRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(512);
    out.extend_from_slice(&GLOBAL_STATE_DISCRIMINATOR);
    out.extend_from_slice(gs.authority.as_ref());
    out.extend_from_slice(gs.token_mint.as_ref());
    out.extend_from_slice(gs.fees_wallet.as_ref());
    for v in [
        gs.total_supply,
        gs.burned_tokens,
        gs.cumulative_rewards,
        gs.start_slot,
        gs.reward_rate,
    ] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&gs.acc_tokens_per_hashpower.to_le_bytes());
    out.extend_from_slice(&gs.last_reward_slot.to_le_bytes());
    out.push(gs.burn_rate);
    out.push(gs.referral_fee);
    out.push(u8::from(gs.production_enabled));
    for v in [
        gs.cooldown_slots,
        gs.dust_threshold_divisor,
        gs.initial_farm_purchase_fee_lamports,
        gs.booster_pack_cost_microtokens,
        gs.gamble_fee_lamports,
        gs.total_berries,
        gs.total_hashpower,
        gs.total_global_gambles,
        gs.total_global_gamble_wins,
        gs.total_booster_packs_opened,
        gs.total_card_recycling_attempts,
        gs.total_successful_card_recycling,
        gs.total_staked_tokens,
        gs.staking_lockup_slots,
    ] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&gs.acc_sol_rewards_per_token.to_le_bytes());
    out.extend_from_slice(&gs.acc_token_rewards_per_token.to_le_bytes());
    for v in [
        gs.last_staking_reward_slot,
        gs.token_reward_rate,
        gs.total_sol_deposited,
        gs.reward_rate_multiplier,
        gs.last_rate_update_slot,
    ] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(gs.rewards_vault.as_ref());
    out.extend_from_slice(&gs.padding);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    fn sample_player() -> PlayerRecord {
        let mut cards = vec![Card::default(); MAX_CARDS];
        cards[0] = Card {
            id: 179,
            rarity: 0,
            hashpower: 1,
            berry_consumption: 1,
        };
        cards[3] = Card {
            id: u16::MAX,
            rarity: 6,
            hashpower: u16::MAX,
            berry_consumption: u8::MAX,
        };
        cards[127] = Card {
            id: 12,
            rarity: 4,
            hashpower: 324,
            berry_consumption: 32,
        };
        PlayerRecord {
            owner: Pubkey::new_from_array([0x11; 32]),
            farm: Farm {
                farm_type: 1,
                total_cards: 2,
                berry_capacity: u64::MAX,
            },
            cards,
            card_count: 128,
            staked_cards_bitset: (1 << 0) | (1 << 3) | (1 << 127),
            berries: 42,
            total_hashpower: u64::MAX,
            referrer: Some(Pubkey::new_from_array([0x22; 32])),
            last_acc_tokens_per_hashpower: u128::MAX,
            last_claim_slot: 7,
            pending_action: PendingAction::Recycle {
                card_indices: [9; MAX_CARDS],
                card_count: 3,
            },
            claimed_token_rewards: 1,
            ..Default::default()
        }
    }

    // -- Primitives ---------------------------------------------------------

    #[test]
    fn integers_are_little_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        assert_eq!(decode_u8(&buf, 0).unwrap(), (0x01, 1));
        assert_eq!(decode_u16(&buf, 1).unwrap(), (0x0302, 3));
        assert_eq!(decode_u64(&buf, 1).unwrap(), (0x0908_0706_0504_0302, 9));
    }

    #[test]
    fn wide_values_survive_without_precision_loss() {
        let buf = [0xff; 16];
        assert_eq!(decode_u64(&buf, 0).unwrap().0, u64::MAX);
        assert_eq!(decode_u128(&buf, 0).unwrap().0, u128::MAX);
    }

    #[test]
    fn short_buffer_is_malformed() {
        assert!(matches!(
            decode_u64(&[0u8; 7], 0),
            Err(ClientError::MalformedAccount(_))
        ));
        assert!(decode_u8(&[], 0).is_err());
        assert!(decode_pubkey(&[0u8; 40], 9).is_err());
        assert!(decode_u8(&[1], usize::MAX).is_err());
    }

    #[test]
    fn option_tag_handling() {
        let none = [0u8, 0xaa];
        assert_eq!(decode_option(&none, 0, decode_u8).unwrap(), (None, 1));

        let some = [1u8, 0xaa];
        assert_eq!(decode_option(&some, 0, decode_u8).unwrap(), (Some(0xaa), 2));

        // Any non-zero tag means Some.
        let some = [7u8, 0xbb];
        assert_eq!(decode_option(&some, 0, decode_u8).unwrap().0, Some(0xbb));
    }

    #[test]
    fn card_layout() {
        let buf = [0xb3, 0x00, 0x02, 0x44, 0x01, 0x20];
        let (card, next) = decode_card(&buf, 0).unwrap();
        assert_eq!(next, CARD_LEN);
        assert_eq!(
            card,
            Card {
                id: 179,
                rarity: 2,
                hashpower: 324,
                berry_consumption: 32,
            }
        );
    }

    // -- Player -------------------------------------------------------------

    #[test]
    fn player_encode_decode_preserves_fields() {
        let player = sample_player();
        let bytes = encode_player_data(&player);
        assert_eq!(decode_player_data(&bytes).unwrap(), player);
    }

    #[test]
    fn player_without_referrer_shifts_tail() {
        let mut player = sample_player();
        player.referrer = None;
        player.pending_action = PendingAction::None;
        let bytes = encode_player_data(&player);
        assert_eq!(bytes.len(), encode_player_data(&sample_player()).len() - 32 - 129);
        assert_eq!(decode_player_data(&bytes).unwrap(), player);
    }

    #[test]
    fn staked_bitset_drives_active_cards() {
        let bytes = encode_player_data(&sample_player());
        let player = decode_player_data(&bytes).unwrap();
        let active = player.active_cards();

        let slots: Vec<u8> = active.iter().map(|c| c.slot).collect();
        assert_eq!(slots, vec![0, 3, 127]);
        assert!(active.iter().all(|c| c.is_staked));
        assert!(!player.is_staked(1));
        assert!(!player.is_staked(126));
    }

    #[test]
    fn empty_staked_slot_is_filtered() {
        let mut player = sample_player();
        player.staked_cards_bitset |= 1 << 5;
        let decoded = decode_player_data(&encode_player_data(&player)).unwrap();
        assert!(decoded.is_staked(5));
        assert!(decoded.active_cards().iter().all(|c| c.slot != 5));
    }

    #[test]
    fn truncated_player_is_malformed() {
        let bytes = encode_player_data(&sample_player());
        for len in [0, 7, 8, 100, bytes.len() - 1] {
            assert!(
                matches!(
                    decode_player_data(&bytes[..len]),
                    Err(ClientError::MalformedAccount(_))
                ),
                "length {len}"
            );
        }
    }

    #[test]
    fn unknown_pending_tag_is_malformed() {
        let mut player = sample_player();
        player.pending_action = PendingAction::Booster;
        let mut bytes = encode_player_data(&player);
        // Tag sits after the referrer option and six fixed fields.
        let tag_offset = 8 + 32 + 10 + 128 * CARD_LEN + 1 + 16 + 8 + 8 + 33 + 16 + 5 * 8;
        assert_eq!(bytes[tag_offset], 1);
        bytes[tag_offset] = 3;
        assert!(decode_player_data(&bytes).is_err());
    }

    // -- Global state -------------------------------------------------------

    #[test]
    fn global_state_encode_decode_preserves_fields() {
        let gs = GlobalStateRecord {
            authority: Pubkey::new_from_array([1; 32]),
            token_mint: Pubkey::new_from_array([2; 32]),
            fees_wallet: Pubkey::new_from_array([3; 32]),
            total_supply: 21_000_000_000_000,
            acc_tokens_per_hashpower: u128::MAX - 1,
            burn_rate: 75,
            referral_fee: 25,
            production_enabled: true,
            dust_threshold_divisor: 1_000,
            booster_pack_cost_microtokens: 10_000_000,
            acc_token_rewards_per_token: 1 << 100,
            last_rate_update_slot: u64::MAX,
            rewards_vault: Pubkey::new_from_array([4; 32]),
            ..Default::default()
        };
        let bytes = encode_global_state(&gs);
        assert_eq!(bytes.len(), 8 + 3 * 32 + 5 * 8 + 16 + 8 + 3 + 14 * 8 + 2 * 16 + 5 * 8 + 64);
        assert_eq!(decode_global_state(&bytes).unwrap(), gs);
        assert!(decode_global_state(&bytes[..bytes.len() - 1]).is_err());
    }

    // -- Discriminators -----------------------------------------------------

    #[test]
    fn account_discriminators_match_their_names() {
        for (name, disc) in [
            ("Player", PLAYER_DISCRIMINATOR),
            ("GlobalState", GLOBAL_STATE_DISCRIMINATOR),
        ] {
            let digest = Sha256::digest(format!("account:{name}").as_bytes());
            assert_eq!(&digest[..8], &disc, "{name}");
        }
    }

    #[test]
    fn discriminator_mismatch_is_reported() {
        let bytes = encode_global_state(&GlobalStateRecord::default());
        assert!(check_discriminator(&bytes, &GLOBAL_STATE_DISCRIMINATOR, "GlobalState").is_ok());
        let err = check_discriminator(&bytes, &PLAYER_DISCRIMINATOR, "Player").unwrap_err();
        assert!(err.to_string().contains("cdde7007a59bceda"));
        assert!(check_discriminator(&[0u8; 4], &PLAYER_DISCRIMINATOR, "Player").is_err());
    }
}
