#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Vespera consensus rules for proof-of-work blocks.
//!
//! This crate is responsible for:
//! - compact difficulty target encoding/decoding (Bitcoin-style `bits`)
//! - difficulty retargeting (Digishield v3, then Zawy LWMA past the
//!   activation height)
//! - proof-of-work validation against the target
//! - Equihash solution validation
//! - per-block work and heaviest-tip comparison
//!
//! Every operation is a pure function over immutable inputs: no internal
//! state, no clock, no caching between calls. The chain index is read
//! through the [`chain::ChainView`] trait and is never mutated here.
//!
//! It intentionally does **not** include mining, block assembly, mempool
//! policy, networking, or persistence.

pub mod chain;
pub mod difficulty;
pub mod error;
pub mod params;
pub mod pow;
pub mod retarget;
pub mod work;

pub use chain::*;
pub use difficulty::*;
pub use error::*;
pub use params::*;
pub use pow::*;
pub use retarget::*;
pub use work::*;
