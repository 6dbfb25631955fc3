// Consensus-critical. Changes require spec update + tests.
//! Compact difficulty target encoding and decoding.
//!
//! A 256-bit target is packed into a 32-bit "compact" in `BlockHeader.bits`:
//! the top 8 bits are a base-256 exponent `E`, the low 24 bits a mantissa
//! whose bit 23 is the sign. The decoded value is `M * 256^(E-3)` for
//! `E >= 3`, or `M >> 8*(3-E)` otherwise, where `M` is the unsigned low-23
//! mantissa word.
//!
//! [`decode_compact`] is total and reports `negative`/`overflow` flags so
//! callers decide what is fatal; [`bits_to_target`] is the strict form.
//! All conversions are integer-exact; no floats touch consensus values.

use crate::error::ConsensusError;
use crate::params::Params;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use vespera_core::Hash32;

/// Unsigned mantissa word mask (low 23 bits of the compact).
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Sign bit of the 24-bit mantissa.
const SIGN_BIT: u32 = 0x0080_0000;

/// Result of decoding a compact target, flags included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTarget {
    /// The decoded 256-bit target. Meaningful only when both flags are clear.
    pub target: BigUint,
    /// Sign bit was set on a nonzero mantissa.
    pub negative: bool,
    /// The encoding denotes a value that does not fit in 256 bits.
    pub overflow: bool,
}

/// Decode compact `bits` into a target plus validity flags.
///
/// Total: every 32-bit input decodes. `0` is a distinct valid encoding of
/// target zero. The flags mirror the reference node's compact rules; a
/// flagged compact never appears in a valid header, but windowed retarget
/// sums decode previously validated `bits` and ignore the flags.
pub fn decode_compact(bits: u32) -> DecodedTarget {
    let exponent = bits >> 24;
    let word = bits & MANTISSA_MASK;

    let target = if exponent <= 3 {
        BigUint::from(word >> (8 * (3 - exponent)))
    } else {
        BigUint::from(word) << (8 * (exponent - 3)) as usize
    };

    let negative = (bits & SIGN_BIT) != 0 && (bits & 0x00ff_ffff) != 0;
    // Overflow when the mantissa would be shifted past 256 bits.
    let overflow = word != 0
        && (exponent > 34
            || (word > 0xff && exponent > 33)
            || (word > 0xffff && exponent > 32));

    DecodedTarget {
        target,
        negative,
        overflow,
    }
}

/// Encode a target into canonical compact form.
///
/// Strips leading zero bytes; if bit 23 of the resulting mantissa is set,
/// shifts right one byte and bumps the exponent so the sign bit stays clear.
/// Zero encodes to `0`. Callers keep targets below `2^256` (every consensus
/// path saturates to `powLimit` first), so the exponent always fits.
pub fn encode_compact(target: &BigUint) -> u32 {
    if target.is_zero() {
        return 0;
    }

    let mut bytes = target.to_bytes_be();
    let mut exponent = bytes.len() as u32;

    while bytes.len() < 3 {
        bytes.push(0);
    }
    let mut mantissa =
        ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32);

    if mantissa & SIGN_BIT != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    (exponent << 24) | mantissa
}

/// Strict decode: rejects negative, overflowing, and zero targets.
pub fn bits_to_target(bits: u32) -> Result<BigUint, ConsensusError> {
    let decoded = decode_compact(bits);
    if decoded.negative || decoded.overflow {
        return Err(ConsensusError::InvalidBits);
    }
    if decoded.target.is_zero() {
        return Err(ConsensusError::InvalidTarget);
    }
    Ok(decoded.target)
}

/// Compare a proof-of-work hash with a target.
///
/// Hash bytes are in internal (wire) order and are read as a little-endian
/// 256-bit integer. Returns `true` if `hash <= target`.
pub fn hash_meets_target(hash: &Hash32, target: &BigUint) -> bool {
    BigUint::from_bytes_le(hash.as_bytes()) <= *target
}

/// Floating-point difficulty of `bits` relative to the network's `powLimit`.
///
/// Display-only; nothing in consensus depends on this value. Returns `0.0`
/// for invalid encodings.
pub fn difficulty_from_bits(bits: u32, params: &Params) -> f64 {
    let Ok(target) = bits_to_target(bits) else {
        return 0.0;
    };
    let limit = params.pow_limit.to_f64().unwrap_or(f64::MAX);
    let target = target.to_f64().unwrap_or(f64::MAX);
    limit / target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(bits: u32) -> BigUint {
        let d = decode_compact(bits);
        assert!(!d.negative && !d.overflow, "flags set for {bits:#010x}");
        d.target
    }

    #[test]
    fn zero_is_a_valid_distinct_encoding() {
        let d = decode_compact(0);
        assert!(d.target.is_zero());
        assert!(!d.negative);
        assert!(!d.overflow);
        assert_eq!(encode_compact(&BigUint::zero()), 0);
    }

    #[test]
    fn small_exponents_shift_right() {
        assert!(decoded(0x0012_3456).is_zero());
        assert!(decoded(0x0100_3456).is_zero());
        assert_eq!(decoded(0x0112_3456), BigUint::from(0x12u32));
        assert_eq!(decoded(0x0212_3456), BigUint::from(0x1234u32));
        assert_eq!(decoded(0x0312_3456), BigUint::from(0x0012_3456u32));
        assert_eq!(decoded(0x0412_3456), BigUint::from(0x1234_5600u32));
        assert_eq!(decoded(0x0500_9234), BigUint::from(0x9234_0000u64));
    }

    #[test]
    fn large_exponent_decodes_wide() {
        // 1 * 256^29
        assert_eq!(
            decoded(0x2000_0001),
            BigUint::from(1u32) << (8 * 29),
        );
        assert_eq!(
            decoded(0x2012_3456),
            BigUint::from(0x0012_3456u32) << (8 * 29),
        );
    }

    #[test]
    fn negative_flag() {
        // Sign bit alone on an otherwise-zero word still flags.
        assert!(decode_compact(0x0080_0000).negative);
        assert!(decode_compact(0x01fe_dcba).negative);
        assert!(!decode_compact(0x0180_0000).overflow);
        // Sign bit with an all-zero mantissa field does not.
        assert!(!decode_compact(0x0000_0000).negative);
    }

    #[test]
    fn overflow_flag() {
        // Exponent 33 with a three-byte word does not fit 256 bits.
        assert!(decode_compact(0x2101_0000).overflow);
        // Exponent 34 tolerates a single-byte word.
        assert!(!decode_compact(0x2200_00ff).overflow);
        assert!(decode_compact(0x2200_ff00).overflow);
        // Exponent 35 overflows for any nonzero word.
        assert!(decode_compact(0x2300_0001).overflow);
        // Zero word never overflows.
        assert!(!decode_compact(0xff00_0000).overflow);
    }

    #[test]
    fn encode_is_canonical() {
        assert_eq!(encode_compact(&decoded(0x0112_3456)), 0x0112_0000);
        assert_eq!(encode_compact(&decoded(0x0212_3456)), 0x0212_3400);
        assert_eq!(encode_compact(&decoded(0x0312_3456)), 0x0312_3456);
        // A leading byte >= 0x80 shifts out so the sign bit stays clear.
        assert_eq!(encode_compact(&decoded(0x0500_9234)), 0x0500_9234);
        assert_eq!(encode_compact(&BigUint::from(0x80u32)), 0x0200_8000);
    }

    #[test]
    fn roundtrip_preserves_decoded_targets() {
        // decode(encode(t)) == t for canonicalizable targets across the
        // exponent range.
        for exponent in 3u32..=32 {
            for mantissa in [0x0000_01u32, 0x00_8000, 0x01_2345, 0x7f_ffff] {
                let bits = (exponent << 24) | mantissa;
                let d = decode_compact(bits);
                if d.overflow {
                    continue;
                }
                let reencoded = encode_compact(&d.target);
                assert_eq!(
                    decode_compact(reencoded).target,
                    d.target,
                    "roundtrip failed for {bits:#010x}"
                );
            }
        }
    }

    #[test]
    fn strict_decode_rejects_flags_and_zero() {
        assert!(matches!(
            bits_to_target(0x0080_0000),
            Err(ConsensusError::InvalidBits)
        ));
        assert!(matches!(
            bits_to_target(0x2301_0000),
            Err(ConsensusError::InvalidBits)
        ));
        assert!(matches!(
            bits_to_target(0),
            Err(ConsensusError::InvalidTarget)
        ));
        assert!(bits_to_target(0x1d00_ffff).is_ok());
    }

    #[test]
    fn hash_comparison_is_little_endian() {
        let target = BigUint::from(0x0100u32);
        let mut hash = Hash32::zero();
        hash.0[1] = 0x01; // value 0x0100 little-endian
        assert!(hash_meets_target(&hash, &target));
        hash.0[0] = 0x01; // value 0x0101
        assert!(!hash_meets_target(&hash, &target));
    }

    #[test]
    fn display_difficulty_at_pow_limit_is_one() {
        let params = Params::main();
        let bits = encode_compact(&params.pow_limit);
        let d = difficulty_from_bits(bits, &params);
        // The compact mantissa truncates the limit, so allow a few ulps.
        assert!((d - 1.0).abs() < 1e-4);
        assert_eq!(difficulty_from_bits(0, &params), 0.0);
    }
}
