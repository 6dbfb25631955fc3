// Consensus-critical. Changes require spec update + tests.
//! Canonical protocol types for Vespera.
//!
//! This module defines the consensus-visible data structures and primitive
//! value types used across the protocol. All types here must remain
//! backward-compatible once released.

use crate::constants::*;
use borsh::{BorshDeserialize, BorshSerialize};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors related to parsing, validation, or construction of core protocol types.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Hex string had an unexpected byte length.
    #[error("invalid hex length: expected {expected} bytes, got {got} bytes")]
    InvalidHexLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        got: usize,
    },

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A value violated protocol constraints.
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

/// Fixed-size 32-byte hash used throughout the protocol.
///
/// Bytes are kept in internal (wire) order. When a hash is interpreted as a
/// 256-bit integer, the bytes are read little-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hash32(pub [u8; HASH32_LEN]);

impl Hash32 {
    /// Returns an all-zero hash.
    pub const fn zero() -> Self {
        Self([0u8; HASH32_LEN])
    }

    /// Returns the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; HASH32_LEN] {
        &self.0
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", hex::encode(self.0))
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; HASH32_LEN]> for Hash32 {
    fn from(value: [u8; HASH32_LEN]) -> Self {
        Self(value)
    }
}

impl From<Hash32> for [u8; HASH32_LEN] {
    fn from(value: Hash32) -> Self {
        value.0
    }
}

impl FromStr for Hash32 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != HASH32_LEN {
            return Err(CoreError::InvalidHexLength {
                expected: HASH32_LEN,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; HASH32_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

/// Block hash type.
pub type BlockHash = Hash32;

/// Block header containing consensus-critical metadata.
///
/// The proof-of-work surface splits the header in three:
/// - everything up to and including `bits` forms the Equihash challenge
///   input `I`;
/// - `nonce` is the 256-bit challenge extension `V`;
/// - `solution` is the Equihash solution, whose byte length selects the
///   `(n, k)` parameter pair.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockHeader {
    /// Header version.
    pub version: i32,
    /// Hash of the previous block.
    pub prev: BlockHash,
    /// Merkle root of transaction identifiers.
    pub merkle_root: Hash32,
    /// Reserved commitment slot (all-zero until activated by a future upgrade).
    pub reserved: Hash32,
    /// Block timestamp (Unix seconds).
    pub time: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// Proof-of-work nonce (256-bit).
    pub nonce: Hash32,
    /// Equihash solution bytes.
    pub solution: Vec<u8>,
}

impl BlockHeader {
    /// Performs basic structural validation.
    pub fn validate_sanity(&self) -> Result<(), CoreError> {
        if self.version != CURRENT_HEADER_VERSION {
            return Err(CoreError::InvalidValue("unsupported header version"));
        }
        if self.time == 0 {
            return Err(CoreError::InvalidValue("timestamp must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash32_hex_roundtrip() {
        let h = Hash32([0xab; 32]);
        let s = h.to_string();
        assert_eq!(s.len(), 64);
        let parsed: Hash32 = s.parse().expect("parse");
        assert_eq!(parsed, h);
    }

    #[test]
    fn hash32_rejects_bad_length() {
        let err = "abcd".parse::<Hash32>().expect_err("short hex");
        assert!(matches!(err, CoreError::InvalidHexLength { .. }));
    }

    #[test]
    fn header_sanity() {
        let mut header = BlockHeader {
            version: CURRENT_HEADER_VERSION,
            prev: Hash32::zero(),
            merkle_root: Hash32::zero(),
            reserved: Hash32::zero(),
            time: 1_700_000_000,
            bits: 0x1f07_ffff,
            nonce: Hash32::zero(),
            solution: vec![],
        };
        header.validate_sanity().expect("sane header");

        header.version = 1;
        assert!(header.validate_sanity().is_err());
    }
}
