//! Solana account addresses.
//!
//! An address is 32 raw bytes: either an Ed25519 public key or a
//! program-derived address that deliberately lies off the curve. The
//! human-readable form is plain Base58 (Bitcoin alphabet) with no checksum
//! or hashing step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SolError;

/// Length of an address in bytes.
pub const PUBKEY_BYTES: usize = 32;

/// A 32-byte Solana address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice that must be exactly 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; PUBKEY_BYTES] = bytes.try_into().map_err(|_| {
            SolError::InvalidAddress(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    pub const fn to_bytes(self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    pub const fn as_array(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Whether these bytes decompress to a point on the Ed25519 curve.
    ///
    /// Wallet addresses are on the curve; program-derived addresses never are.
    pub fn is_on_curve(&self) -> bool {
        crate::pda::is_on_curve(&self.0)
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl FromStr for Pubkey {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 32 bytes never need more than 44 Base58 characters.
        if s.is_empty() || s.len() > 44 {
            return Err(SolError::InvalidAddress(format!(
                "address length {} out of range",
                s.len()
            )));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;
        Self::try_from_slice(&bytes)
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
