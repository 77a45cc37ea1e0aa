//! Legacy Solana transaction wire format and signing.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use crate::error::SolError;
use crate::ids::SYSTEM_PROGRAM_ID;
use crate::keypair::Keypair;
use crate::pubkey::Pubkey;

/// System Program `Transfer` instruction index (little-endian u32).
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;

/// Serialized transactions above this size are dropped by the network.
pub const PACKET_DATA_SIZE: usize = 1232;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` in Solana's compact-u16 (7 bits per byte) format.
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut rem = value;
    let mut out = Vec::with_capacity(3);
    loop {
        let byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Decode a compact-u16, returning `(value, bytes_consumed)`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    for (i, byte) in data.iter().take(3).enumerate() {
        value |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            let value = u16::try_from(value)
                .map_err(|_| SolError::SerializationError("compact-u16 value overflow".into()))?;
            return Ok((value, i + 1));
        }
    }
    Err(SolError::SerializationError(
        "unexpected end of data while decoding compact-u16".into(),
    ))
}

fn compact_len(len: usize, what: &str) -> Result<Vec<u8>, SolError> {
    let len = u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("{what} count {len} exceeds u16")))?;
    Ok(encode_compact_u16(len))
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// One account reference in an instruction, with its access flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// Writable signer (fee payer, token owner).
    pub fn signer(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: true,
            is_writable: true,
        }
    }

    pub fn writable(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: false,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: false,
            is_writable: false,
        }
    }

    pub fn readonly_signer(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: true,
            is_writable: false,
        }
    }
}

/// An instruction before compilation into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// An instruction whose accounts are indices into `Message::account_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// Build a System Program `Transfer` instruction.
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<Instruction, SolError> {
    if lamports == 0 {
        return Err(SolError::TransactionBuildError(
            "lamports must be > 0".into(),
        ));
    }

    // u32 LE instruction index (2 = Transfer) + u64 LE lamports.
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Ok(Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::signer(*from), AccountMeta::writable(*to)],
        data,
    })
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
}

/// A compiled legacy message: the bytes that get signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    /// Canonical order: writable signers (fee payer first), read-only
    /// signers, writable non-signers, read-only non-signers.
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile `instructions` for a single fee payer.
    ///
    /// Accounts referenced more than once are merged, OR-ing their flags.
    /// Instruction order is preserved exactly.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        recent_blockhash: &[u8; 32],
    ) -> Result<Self, SolError> {
        let mut metas: Vec<AccountMeta> = vec![AccountMeta::signer(*fee_payer)];
        let mut merge = |meta: AccountMeta| match metas.iter_mut().find(|m| m.pubkey == meta.pubkey) {
            Some(existing) => {
                existing.is_signer |= meta.is_signer;
                existing.is_writable |= meta.is_writable;
            }
            None => metas.push(meta),
        };

        for ix in instructions {
            for meta in &ix.accounts {
                merge(*meta);
            }
            merge(AccountMeta::readonly(ix.program_id));
        }

        // Stable sort keeps first-seen order inside each class, so the fee
        // payer (inserted first, always a writable signer) stays at index 0.
        metas.sort_by_key(|m| match (m.is_signer, m.is_writable) {
            (true, true) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if metas.len() > usize::from(u8::MAX) {
            return Err(SolError::TransactionBuildError(format!(
                "{} accounts exceed the 255 account limit",
                metas.len()
            )));
        }

        let count = |pred: fn(&AccountMeta) -> bool| metas.iter().filter(|m| pred(m)).count() as u8;
        let header = MessageHeader {
            num_required_signatures: count(|m| m.is_signer),
            num_readonly_signed: count(|m| m.is_signer && !m.is_writable),
            num_readonly_unsigned: count(|m| !m.is_signer && !m.is_writable),
        };

        let account_keys: Vec<Pubkey> = metas.iter().map(|m| m.pubkey).collect();
        let index_of = |key: &Pubkey| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| SolError::TransactionBuildError(format!("{key} not in account keys")))
        };

        let compiled = instructions
            .iter()
            .map(|ix| {
                Ok(CompiledInstruction {
                    program_id_index: index_of(&ix.program_id)?,
                    account_indices: ix
                        .accounts
                        .iter()
                        .map(|m| index_of(&m.pubkey))
                        .collect::<Result<_, SolError>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect::<Result<Vec<_>, SolError>>()?;

        Ok(Self {
            header,
            account_keys,
            recent_blockhash: *recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    /// Serialize the message (the bytes covered by the signatures).
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed);
        buf.push(self.header.num_readonly_unsigned);

        buf.extend_from_slice(&compact_len(self.account_keys.len(), "account")?);
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_ref());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&compact_len(self.instructions.len(), "instruction")?);
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            buf.extend_from_slice(&compact_len(ix.account_indices.len(), "instruction account")?);
            buf.extend_from_slice(&ix.account_indices);
            buf.extend_from_slice(&compact_len(ix.data.len(), "instruction data")?);
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }

    /// Parse a serialized message, returning it with the bytes consumed.
    pub fn deserialize(data: &[u8]) -> Result<(Self, usize), SolError> {
        let mut cursor = Cursor { data, pos: 0 };

        let header = MessageHeader {
            num_required_signatures: cursor.u8()?,
            num_readonly_signed: cursor.u8()?,
            num_readonly_unsigned: cursor.u8()?,
        };

        let num_keys = cursor.compact()?;
        let mut account_keys = Vec::with_capacity(num_keys);
        for _ in 0..num_keys {
            account_keys.push(Pubkey::try_from_slice(cursor.take(32)?)?);
        }

        let mut recent_blockhash = [0u8; 32];
        recent_blockhash.copy_from_slice(cursor.take(32)?);

        let num_ix = cursor.compact()?;
        let mut instructions = Vec::with_capacity(num_ix);
        for _ in 0..num_ix {
            let program_id_index = cursor.u8()?;
            let n = cursor.compact()?;
            let account_indices = cursor.take(n)?.to_vec();
            let len = cursor.compact()?;
            let data = cursor.take(len)?.to_vec();
            instructions.push(CompiledInstruction {
                program_id_index,
                account_indices,
                data,
            });
        }

        Ok((
            Self {
                header,
                account_keys,
                recent_blockhash,
                instructions,
            },
            cursor.pos,
        ))
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], SolError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| SolError::SerializationError("message truncated".into()))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, SolError> {
        Ok(self.take(1)?[0])
    }

    fn compact(&mut self) -> Result<usize, SolError> {
        let (value, used) = decode_compact_u16(&self.data[self.pos.min(self.data.len())..])?;
        self.pos += used;
        Ok(usize::from(value))
    }
}

// ---------------------------------------------------------------------------
// Signed transactions
// ---------------------------------------------------------------------------

/// A fully signed single-signer transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signatures: Vec<[u8; 64]>,
    pub message: Message,
}

impl SignedTransaction {
    /// Sign `message` with the fee payer's key.
    ///
    /// Only the fee payer may be a signer; a message asking for more
    /// signatures than we hold is rejected rather than sent half-signed.
    pub fn sign(message: Message, fee_payer: &Keypair) -> Result<Self, SolError> {
        if message.fee_payer() != Some(&fee_payer.pubkey()) {
            return Err(SolError::TransactionBuildError(
                "fee payer is not the first account key".into(),
            ));
        }
        if message.header.num_required_signatures != 1 {
            return Err(SolError::TransactionBuildError(format!(
                "message requires {} signatures, only the fee payer can sign",
                message.header.num_required_signatures
            )));
        }
        let signature = fee_payer.sign(&message.serialize()?);
        Ok(Self {
            signatures: vec![signature],
            message,
        })
    }

    /// The first signature in Base58: the transaction id used for status lookups.
    pub fn signature(&self) -> String {
        self.signatures
            .first()
            .map(|s| bs58::encode(s).into_string())
            .unwrap_or_default()
    }

    /// Serialize into the wire format accepted by `sendTransaction`.
    pub fn to_wire(&self) -> Result<Vec<u8>, SolError> {
        let message = self.message.serialize()?;
        let mut wire = Vec::with_capacity(3 + 64 * self.signatures.len() + message.len());
        wire.extend_from_slice(&compact_len(self.signatures.len(), "signature")?);
        for sig in &self.signatures {
            wire.extend_from_slice(sig);
        }
        wire.extend_from_slice(&message);

        if wire.len() > PACKET_DATA_SIZE {
            return Err(SolError::TransactionBuildError(format!(
                "transaction is {} bytes, limit is {PACKET_DATA_SIZE}",
                wire.len()
            )));
        }
        Ok(wire)
    }

    /// Parse a wire-format transaction.
    pub fn from_wire(wire: &[u8]) -> Result<Self, SolError> {
        let (num_sigs, used) = decode_compact_u16(wire)?;
        let sigs_end = used + usize::from(num_sigs) * 64;
        if sigs_end > wire.len() {
            return Err(SolError::SerializationError(
                "transaction too short: signature slots exceed length".into(),
            ));
        }
        let signatures = wire[used..sigs_end]
            .chunks_exact(64)
            .map(|c| {
                let mut sig = [0u8; 64];
                sig.copy_from_slice(c);
                sig
            })
            .collect();

        let (message, consumed) = Message::deserialize(&wire[sigs_end..])?;
        if sigs_end + consumed != wire.len() {
            return Err(SolError::SerializationError(
                "trailing bytes after message".into(),
            ));
        }
        Ok(Self {
            signatures,
            message,
        })
    }
}
