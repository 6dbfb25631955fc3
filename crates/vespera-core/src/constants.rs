//! Protocol-wide constants for Vespera.

/// Header version carried by Equihash-era blocks.
pub const CURRENT_HEADER_VERSION: i32 = 4;

/// Length in bytes of a 32-byte hash.
pub const HASH32_LEN: usize = 32;

/// Length in bytes of the proof-of-work nonce (a 256-bit value).
pub const NONCE_LEN: usize = 32;

/// Serialized length of the Equihash challenge input `I`:
/// `version(4) | prev(32) | merkle_root(32) | reserved(32) | time(4) | bits(4)`.
pub const EQUIHASH_INPUT_LEN: usize = 108;

/// Serialized length of `I || V` (challenge input followed by the nonce).
pub const EQUIHASH_HEADER_LEN: usize = EQUIHASH_INPUT_LEN + NONCE_LEN;
