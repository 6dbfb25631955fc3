// Consensus-critical. Changes require spec update + tests.
//! Per-block work and heaviest-chain tip selection.

use crate::difficulty::bits_to_target;
use crate::error::ConsensusError;
use num_bigint::BigUint;
use num_traits::One;
use vespera_core::Hash32;

/// Expected work represented by a block's compact target.
///
/// `work = floor(2^256 / (target + 1))`: the expected number of hash
/// attempts needed to find a hash at or below the target. Depends on the
/// declared target only, never on the luck of the actual hash.
pub fn work_from_bits(bits: u32) -> Result<BigUint, ConsensusError> {
    let target = bits_to_target(bits)?;
    let numerator = BigUint::one() << 256u32;
    Ok(numerator / (target + BigUint::one()))
}

/// Return true if tip A is strictly preferable to tip B.
///
/// Cumulative work decides; equal work breaks the tie toward the lower
/// block hash so all nodes converge on the same tip.
pub fn tip_is_better(a_work: &BigUint, a_hash: &Hash32, b_work: &BigUint, b_hash: &Hash32) -> bool {
    if a_work != b_work {
        a_work > b_work
    } else {
        a_hash.as_bytes() < b_hash.as_bytes()
    }
}
