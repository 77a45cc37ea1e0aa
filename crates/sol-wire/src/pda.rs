//! Program-derived addresses.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || program_id || "ProgramDerivedAddress")`
//! with the constraint that the digest must NOT be a valid Ed25519 point, so
//! nobody can hold a private key for it. `find_program_address` appends a
//! one-byte bump seed and walks it down from 255 until the digest falls off
//! the curve.

use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::pubkey::Pubkey;

/// Upper bound on the number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// Upper bound on the length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Find the canonical (highest-bump) program address for `seeds`.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), SolError> {
    // One slot is reserved for the bump.
    check_seeds(seeds, MAX_SEEDS - 1)?;

    for bump in (0u8..=255).rev() {
        let bump_seed = [bump];
        let mut with_bump = seeds.to_vec();
        with_bump.push(&bump_seed);
        let digest = hash_seeds(&with_bump, program_id);

        if !is_on_curve(&digest) {
            return Ok((Pubkey::new_from_array(digest), bump));
        }
    }

    Err(SolError::InvalidSeeds(
        "no bump seed yields an off-curve address".into(),
    ))
}

/// Create a program address from seeds that already include the bump.
///
/// Fails if the resulting digest lies on the curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, SolError> {
    check_seeds(seeds, MAX_SEEDS)?;
    let digest = hash_seeds(seeds, program_id);
    if is_on_curve(&digest) {
        return Err(SolError::InvalidSeeds(
            "derived address lies on the ed25519 curve".into(),
        ));
    }
    Ok(Pubkey::new_from_array(digest))
}

/// Check if 32 bytes decompress to a valid Ed25519 point.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

fn check_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), SolError> {
    if seeds.len() > max_seeds {
        return Err(SolError::InvalidSeeds(format!(
            "{} seeds exceeds the maximum of {max_seeds}",
            seeds.len()
        )));
    }
    if let Some((i, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidSeeds(format!(
            "seed {i} is {} bytes, maximum is {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

fn hash_seeds(seeds: &[&[u8]], program_id: &Pubkey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}
