// Consensus-critical. Changes require spec update + tests.
//! Difficulty retargeting.
//!
//! Two algorithms share the job, selected purely by height: Digishield v3
//! below `zawy_lwma_height`, Zawy's LWMA at and above it. There is no
//! blending at the hand-off. Both walk previously validated ancestors
//! through a [`ChainView`], do all wide arithmetic in `BigUint`, saturate
//! to `powLimit`, and compact-encode the result.
//!
//! The `debug!` lines mirror the reference node's retarget tracing and have
//! no consensus effect.

use crate::chain::{median_time_past, BlockIndexEntry, ChainView};
use crate::difficulty::{decode_compact, encode_compact};
use crate::params::{Network, Params};
use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;
use vespera_core::BlockHeader;

/// Lower edge of the mainnet post-fork difficulty-reset window.
///
/// Historical constant: the production network shipped with this literal
/// height rather than deriving it from the Equihash fork height. It must
/// stay verbatim so old blocks replay.
const MAIN_RESET_LOWER_EDGE: i32 = 95_005;

/// Compact target the next block must carry.
///
/// `parent` is the current tip (`None` only when asking for the genesis
/// target). `candidate` supplies the timestamp consulted by the
/// min-difficulty escapes; it may be `None` when no candidate exists yet.
pub fn next_work_required<C: ChainView>(
    chain: &C,
    parent: Option<&BlockIndexEntry>,
    candidate: Option<&BlockHeader>,
    params: &Params,
) -> u32 {
    let Some(parent) = parent else {
        return encode_compact(&params.pow_limit);
    };

    let height = parent.height + 1;
    if height < params.zawy_lwma_height {
        digishield_next_work_required(chain, parent, candidate, params)
    } else {
        lwma_next_work_required(chain, parent, candidate, params)
    }
}

/// Digishield v3: damped, clamped moving average over a small window.
pub fn digishield_next_work_required<C: ChainView>(
    chain: &C,
    parent: &BlockIndexEntry,
    candidate: Option<&BlockHeader>,
    params: &Params,
) -> u32 {
    let pow_limit_bits = encode_compact(&params.pow_limit);
    let window = params.digishield_averaging_window;
    let height = parent.height + 1;

    debug!(
        "digishield retarget: parent height {}, fork height {}, window {}",
        parent.height, params.equihash_fork_height, window
    );

    if params.pow_allow_min_difficulty_blocks {
        // A stalled tip may mine a min-difficulty block once the candidate
        // is more than six spacings late.
        if let Some(block) = candidate {
            if i64::from(block.time) > parent.time + params.digishield_target_spacing * 6 {
                return pow_limit_bits;
            }
        }
    }

    // Difficulty resets for a full window after the Equihash fork. The
    // production network uses a fixed lower edge instead of the fork height.
    let reset_lower_edge = match params.network {
        Network::Main => MAIN_RESET_LOWER_EDGE,
        _ => params.equihash_fork_height,
    };
    if height >= reset_lower_edge && parent.height < params.equihash_fork_height + window {
        debug!("difficulty reset after algorithm change: {pow_limit_bits:#010x}");
        return pow_limit_bits;
    }

    // Sum the decoded targets of the window ending at the parent.
    let mut total = BigUint::zero();
    for back in 0..window {
        match chain.ancestor(parent.height - back) {
            Some(entry) => total += decode_compact(entry.bits).target,
            None => return pow_limit_bits,
        }
    }

    // The block immediately below the window anchors the timespan.
    let Some(first) = chain.ancestor(parent.height - window) else {
        return pow_limit_bits;
    };
    let (Some(first_mtp), Some(parent_mtp)) = (
        median_time_past(chain, first.height),
        median_time_past(chain, parent.height),
    ) else {
        return pow_limit_bits;
    };

    let avg = total / window as u64;
    digishield_calculate_next_work(parent, parent_mtp, avg, first_mtp, params)
}

/// The arithmetic half of the Digishield retarget, once the window has been
/// gathered.
fn digishield_calculate_next_work(
    parent: &BlockIndexEntry,
    parent_mtp: i64,
    avg: BigUint,
    first_mtp: i64,
    params: &Params,
) -> u32 {
    if params.pow_no_retargeting {
        return parent.bits;
    }

    let target_timespan = params.digishield_averaging_window_timespan();

    // Median timestamps at both ends deflect time-warp manipulation.
    let mut actual_timespan = parent_mtp - first_mtp;
    debug!("actual timespan {actual_timespan} before dampening");

    // Dampen: move a quarter of the way from the ideal to the measurement.
    // Integer division truncates toward zero for both signs of the delta.
    actual_timespan = target_timespan + (actual_timespan - target_timespan) / 4;
    debug!("actual timespan {actual_timespan} before bounds");

    actual_timespan = actual_timespan.clamp(
        params.digishield_min_actual_timespan(),
        params.digishield_max_actual_timespan(),
    );

    // Divide before multiplying to bound the intermediate magnitude.
    let mut next = avg.clone() / target_timespan as u64;
    next *= actual_timespan as u64;
    if next > params.pow_limit {
        next = params.pow_limit.clone();
    }

    debug!(
        "digishield retarget: timespan {target_timespan}, actual {actual_timespan}, \
         average {:#010x}, next {:#010x}",
        encode_compact(&avg),
        encode_compact(&next)
    );

    encode_compact(&next)
}

/// Zawy's LWMA: linearly weighted solvetimes over the last `N` blocks.
pub fn lwma_next_work_required<C: ChainView>(
    chain: &C,
    parent: &BlockIndexEntry,
    candidate: Option<&BlockHeader>,
    params: &Params,
) -> u32 {
    if params.pow_allow_min_difficulty_blocks {
        // Same stalled-tip escape as Digishield, at two spacings.
        if let Some(block) = candidate {
            if i64::from(block.time) > parent.time + params.pow_target_spacing * 2 {
                return encode_compact(&params.pow_limit);
            }
        }
    }
    lwma_calculate_next_work(chain, parent, params)
}

/// The windowed half of the LWMA retarget.
///
/// Requires `parent.height + 1 > N` and a fully connected window; anything
/// else is a programmer error on the caller's side.
fn lwma_calculate_next_work<C: ChainView>(
    chain: &C,
    parent: &BlockIndexEntry,
    params: &Params,
) -> u32 {
    if params.pow_no_retargeting {
        return parent.bits;
    }

    let height = parent.height + 1;
    let spacing = params.pow_target_spacing;
    let n = params.zawy_lwma_averaging_window;
    let k = params.zawy_lwma_adjusted_weight;
    let dnorm = params.zawy_lwma_min_denominator;
    let limit_solvetime = params.zawy_lwma_solvetime_limitation;
    assert!(height > n, "LWMA retarget needs more than {n} blocks");

    // Every addend is pre-divided by k * N^2 so the running sum stays near
    // one average per-block target and cannot overflow 256 bits.
    let divisor = (k as u64) * (n as u64) * (n as u64);
    let mut sum_target = BigUint::zero();
    let mut weighted_solvetime: i64 = 0;
    let mut weight: i64 = 0;

    for i in (height - n)..height {
        let block = chain
            .ancestor(i)
            .unwrap_or_else(|| panic!("chain view is missing ancestor at height {i}"));
        let prev = chain
            .ancestor(i - 1)
            .unwrap_or_else(|| panic!("chain view is missing ancestor at height {}", i - 1));

        // Solvetimes may be negative; only the high side is clamped.
        let mut solvetime = block.time - prev.time;
        if limit_solvetime && solvetime > 6 * spacing {
            solvetime = 6 * spacing;
        }

        weight += 1;
        weighted_solvetime += solvetime * weight;

        sum_target += decode_compact(block.bits).target / divisor;
    }

    // Floor the weighted sum against pathologically small or negative
    // solvetime runs.
    let floor = i64::from(n) * i64::from(k) / i64::from(dnorm);
    if weighted_solvetime < floor {
        weighted_solvetime = floor;
    }

    let mut next_target = sum_target * (weighted_solvetime as u64);
    if next_target > params.pow_limit {
        next_target = params.pow_limit.clone();
    }

    debug!(
        "lwma retarget: height {height}, weighted solvetime {weighted_solvetime}, next {:#010x}",
        encode_compact(&next_target)
    );

    encode_compact(&next_target)
}
