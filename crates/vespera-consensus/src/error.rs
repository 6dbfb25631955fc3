//! Consensus error types.

use thiserror::Error;

/// Errors returned by consensus difficulty conversion and work calculation.
///
/// The three validation entry points (`next_work_required`,
/// `check_proof_of_work`, `check_equihash_solution`) deliberately return
/// plain values; these errors surface only from the strict helpers.
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// Invalid compact target encoding in `bits` (negative or overflowing).
    #[error("invalid compact target bits")]
    InvalidBits,

    /// Target decoded to zero or otherwise unusable.
    #[error("invalid difficulty target")]
    InvalidTarget,
}
