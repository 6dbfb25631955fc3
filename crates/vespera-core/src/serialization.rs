// Consensus-critical. Changes require spec update + tests.
//! Canonical serialization helpers.
//!
//! Rule: all consensus-critical objects are encoded with Borsh. Borsh writes
//! integers little-endian at fixed width and fixed-size byte arrays raw, so
//! the encodings below are byte-for-byte the network wire layout.

use crate::constants::*;
use crate::types::{BlockHeader, CoreError, Hash32};
use borsh::{to_vec, BorshSerialize};
use sha2::{Digest, Sha256};

/// Encode a value with canonical Borsh encoding.
pub fn to_bytes<T: borsh::BorshSerialize>(v: &T) -> Result<Vec<u8>, CoreError> {
    to_vec(v).map_err(|_| CoreError::InvalidValue("borsh serialization failed"))
}

/// The Equihash challenge input `I`: the header minus nonce and solution.
///
/// Wire layout: `version(4 LE) | prev(32) | merkle_root(32) | reserved(32) |
/// time(4 LE) | bits(4 LE)`, 108 bytes total.
#[derive(BorshSerialize)]
struct ChallengeInput {
    version: i32,
    prev: Hash32,
    merkle_root: Hash32,
    reserved: Hash32,
    time: u32,
    bits: u32,
}

/// Serialize the Equihash challenge input `I` for a header.
pub fn equihash_input(header: &BlockHeader) -> Result<Vec<u8>, CoreError> {
    let input = ChallengeInput {
        version: header.version,
        prev: header.prev,
        merkle_root: header.merkle_root,
        reserved: header.reserved,
        time: header.time,
        bits: header.bits,
    };
    let bytes = to_bytes(&input)?;
    if bytes.len() != EQUIHASH_INPUT_LEN {
        return Err(CoreError::InvalidValue("malformed equihash input"));
    }
    Ok(bytes)
}

/// Double SHA-256 over arbitrary bytes.
pub fn sha256d(bytes: &[u8]) -> Hash32 {
    let first = Sha256::digest(bytes);
    let second = Sha256::digest(first);
    let mut arr = [0u8; HASH32_LEN];
    arr.copy_from_slice(&second);
    Hash32(arr)
}

/// Canonical proof-of-work hash of a header: double SHA-256 over the full
/// serialized header (challenge input, nonce, and solution).
pub fn block_pow_hash(header: &BlockHeader) -> Result<Hash32, CoreError> {
    let bytes = to_bytes(header)?;
    Ok(sha256d(&bytes))
}
