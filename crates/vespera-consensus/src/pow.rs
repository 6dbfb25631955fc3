// Consensus-critical. Changes require spec update + tests.
//! Header proof-of-work validation.
//!
//! Two independent predicates must both hold for a header to be valid:
//! the declared compact target is met by the block hash
//! ([`check_proof_of_work`]), and the Equihash solution answers the
//! challenge formed from the header ([`check_equihash_solution`]). The
//! Equihash verifier itself (BLAKE2b state, personalization, index
//! expansion) lives in the `equihash` crate; this module only builds its
//! inputs.

use crate::difficulty::{decode_compact, hash_meets_target};
use crate::params::Params;
use num_traits::Zero;
use vespera_core::{equihash_input, BlockHeader, Hash32};

/// Validate a proof-of-work hash against a compact target.
///
/// True iff `bits` decodes cleanly (not negative, not overflowing, not
/// zero), the target does not exceed the network's `powLimit`, and the
/// hash, read as a little-endian 256-bit integer, is at most the target.
pub fn check_proof_of_work(pow_hash: &Hash32, bits: u32, params: &Params) -> bool {
    let decoded = decode_compact(bits);

    if decoded.negative || decoded.overflow || decoded.target.is_zero() {
        return false;
    }
    if decoded.target > params.pow_limit {
        return false;
    }

    hash_meets_target(pow_hash, &decoded.target)
}

/// Equihash `(n, k)` parameters implied by a solution byte length.
///
/// The header does not carry the parameters; the solution length selects
/// them uniquely via `len = 2^k * (n / (k + 1) + 1) / 8`. Returns `None`
/// for lengths no supported parameter pair produces.
pub fn solution_parameters(solution_len: usize) -> Option<(u32, u32)> {
    match solution_len {
        1344 => Some((200, 9)),
        400 => Some((192, 7)),
        100 => Some((144, 5)),
        68 => Some((96, 5)),
        36 => Some((48, 5)),
        _ => None,
    }
}

/// Validate a header's Equihash solution.
///
/// Builds the challenge `I` from the header minus nonce and solution,
/// extends it with the 256-bit nonce, and hands both to the verifier with
/// the parameters selected by the solution length. Unknown lengths fail
/// without invoking the verifier.
pub fn check_equihash_solution(header: &BlockHeader) -> bool {
    let Some((n, k)) = solution_parameters(header.solution.len()) else {
        return false;
    };

    let Ok(input) = equihash_input(header) else {
        return false;
    };

    equihash::is_valid_solution(n, k, &input, header.nonce.as_bytes(), &header.solution).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::encode_compact;

    #[test]
    fn solution_length_selects_parameters() {
        assert_eq!(solution_parameters(1344), Some((200, 9)));
        assert_eq!(solution_parameters(400), Some((192, 7)));
        assert_eq!(solution_parameters(100), Some((144, 5)));
        assert_eq!(solution_parameters(68), Some((96, 5)));
        assert_eq!(solution_parameters(36), Some((48, 5)));
    }

    #[test]
    fn unknown_solution_lengths_are_rejected() {
        for len in [0usize, 1, 35, 37, 69, 99, 101, 399, 401, 1343, 1345, 4096] {
            assert_eq!(solution_parameters(len), None, "length {len}");
        }
    }

    #[test]
    fn solution_lengths_follow_the_equihash_formula() {
        for (len, (n, k)) in [
            (1344usize, (200u32, 9u32)),
            (400, (192, 7)),
            (100, (144, 5)),
            (68, (96, 5)),
            (36, (48, 5)),
        ] {
            let expected = (1usize << k) * ((n / (k + 1)) as usize + 1) / 8;
            assert_eq!(len, expected, "({n}, {k})");
        }
    }

    #[test]
    fn pow_check_rejects_bad_compacts() {
        let params = Params::main();
        let easiest = Hash32::zero();

        // Negative, overflow, zero, and above-limit targets all fail even
        // for the smallest possible hash.
        assert!(!check_proof_of_work(&easiest, 0x0080_0000, &params));
        assert!(!check_proof_of_work(&easiest, 0x2301_0000, &params));
        assert!(!check_proof_of_work(&easiest, 0, &params));
        assert!(!check_proof_of_work(&easiest, 0x2100_ffff, &params));

        // The limit itself passes.
        let limit_bits = encode_compact(&params.pow_limit);
        assert!(check_proof_of_work(&easiest, limit_bits, &params));
    }
}
