// Consensus-critical. Changes require spec update + tests.
//! Chain-index collaborator interface and the median-time-past oracle.
//!
//! The retarget engine never owns chain state; it reads previously
//! validated headers through [`ChainView`]. Ancestor lookup must be cheap
//! (O(1) amortised or O(log h)) because both retarget algorithms walk tens
//! of predecessors per call. [`HeaderChain`] is the crate's own
//! height-indexed implementation for callers and tests.

/// Timestamps considered by the median-time-past calculation.
const MEDIAN_TIME_SPAN: usize = 11;

/// Consensus-relevant view of one validated block in the best chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockIndexEntry {
    /// Height of the block (genesis is 0).
    pub height: i32,
    /// Compact difficulty target the block was validated against.
    pub bits: u32,
    /// Block timestamp (Unix seconds).
    pub time: i64,
}

/// Read-only ancestor lookup over a longest-chain prefix.
///
/// Implementations must return a consistent snapshot for the duration of a
/// retarget call; the caller owns synchronisation with writers.
pub trait ChainView {
    /// The entry at `height`, or `None` when the height is below the
    /// genesis or beyond the tip of this view.
    fn ancestor(&self, height: i32) -> Option<&BlockIndexEntry>;
}

/// A height-indexed, in-memory [`ChainView`] with O(1) ancestor lookup.
#[derive(Clone, Debug, Default)]
pub struct HeaderChain {
    entries: Vec<BlockIndexEntry>,
}

impl HeaderChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block at the next height.
    pub fn push(&mut self, bits: u32, time: i64) {
        let height = self.entries.len() as i32;
        self.entries.push(BlockIndexEntry { height, bits, time });
    }

    /// The entry at the tip, or `None` for an empty chain.
    pub fn tip(&self) -> Option<&BlockIndexEntry> {
        self.entries.last()
    }

    /// Number of blocks in the view.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the view holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ChainView for HeaderChain {
    fn ancestor(&self, height: i32) -> Option<&BlockIndexEntry> {
        let idx = usize::try_from(height).ok()?;
        self.entries.get(idx)
    }
}

/// Median of the timestamps of the up-to-11 most recent ancestors ending at
/// `height`.
///
/// Fewer timestamps participate when the chain is shorter than the span;
/// the sorted element at index `len / 2` is selected. Returns `None` when
/// `height` is not in the view.
pub fn median_time_past<C: ChainView>(chain: &C, height: i32) -> Option<i64> {
    let mut times = Vec::with_capacity(MEDIAN_TIME_SPAN);
    let mut h = height;
    while h >= 0 && times.len() < MEDIAN_TIME_SPAN {
        times.push(chain.ancestor(h)?.time);
        h -= 1;
    }
    if times.is_empty() {
        return None;
    }
    times.sort_unstable();
    Some(times[times.len() / 2])
}
