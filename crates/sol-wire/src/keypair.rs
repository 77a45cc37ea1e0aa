//! Ed25519 signing keys imported from their Base58 text form.
//!
//! Wallet software exports a Solana secret key as Base58 of 64 bytes:
//! the 32-byte seed followed by the 32-byte public key. A bare 32-byte seed
//! is accepted too. Decoded bytes live in a `Zeroizing` buffer and the
//! `ed25519-dalek` signing key wipes itself on drop.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroizing;

use crate::error::SolError;
use crate::pubkey::Pubkey;

/// A signing keypair. `Debug` never prints secret material.
pub struct Keypair {
    signing_key: SigningKey,
    pubkey: Pubkey,
}

impl Keypair {
    /// Build a keypair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let pubkey = Pubkey::new_from_array(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            pubkey,
        }
    }

    /// Build a keypair from raw secret bytes (64-byte keypair or 32-byte seed).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        match bytes.len() {
            32 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(bytes);
                Ok(Self::from_seed(&seed))
            }
            64 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(&bytes[..32]);
                let keypair = Self::from_seed(&seed);
                if keypair.pubkey.as_ref() != &bytes[32..] {
                    return Err(SolError::InvalidPrivateKey(
                        "public half does not match the secret seed".into(),
                    ));
                }
                Ok(keypair)
            }
            n => Err(SolError::InvalidPrivateKey(format!(
                "expected 32 or 64 bytes, got {n}"
            ))),
        }
    }

    /// Decode a Base58 secret key.
    pub fn from_base58(encoded: &str) -> Result<Self, SolError> {
        let bytes = Zeroizing::new(
            bs58::decode(encoded.trim())
                .into_vec()
                .map_err(|e| SolError::InvalidPrivateKey(format!("base58 decode failed: {e}")))?,
        );
        Self::from_bytes(&bytes)
    }

    pub fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    /// Sign `message`, returning the 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey)
            .finish_non_exhaustive()
    }
}
