// Consensus-critical. Changes require spec update + tests.
//! Per-network consensus parameters.
//!
//! The reference node reads the active network through a process-wide
//! singleton; here the network tag travels on the [`Params`] value itself,
//! so every consensus call is explicit about which rules it runs under.

use num_bigint::BigUint;

/// Network the parameter bundle applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    /// The production network.
    Main,
    /// The public test network.
    Test,
    /// Local regression-test network.
    Regtest,
}

/// Immutable consensus parameters for one network.
///
/// All fields are plain data; construct one of the presets and override
/// fields in tests when a scenario needs a custom chain shape.
#[derive(Clone, Debug)]
pub struct Params {
    /// Which network these parameters describe.
    pub network: Network,
    /// Maximum (easiest) allowed proof-of-work target.
    pub pow_limit: BigUint,
    /// Every retarget returns the parent's `bits` unchanged (regtest).
    pub pow_no_retargeting: bool,
    /// Allow a min-difficulty block when the tip has stalled (testnet/regtest).
    pub pow_allow_min_difficulty_blocks: bool,
    /// Height at which Zawy's LWMA replaces Digishield.
    pub zawy_lwma_height: i32,
    /// Height at which Equihash replaced the pre-fork proof-of-work.
    pub equihash_fork_height: i32,
    /// Number of blocks averaged by the Digishield retarget.
    pub digishield_averaging_window: i32,
    /// Target block spacing (seconds) under Digishield.
    pub digishield_target_spacing: i64,
    /// Maximum per-window difficulty increase, in percent, under Digishield.
    pub digishield_max_adjust_up: i64,
    /// Maximum per-window difficulty decrease, in percent, under Digishield.
    pub digishield_max_adjust_down: i64,
    /// Target block spacing (seconds) under LWMA.
    pub pow_target_spacing: i64,
    /// Number of blocks in the LWMA window.
    pub zawy_lwma_averaging_window: i32,
    /// LWMA proportionality constant `k`.
    pub zawy_lwma_adjusted_weight: i32,
    /// Denominator of the LWMA weighted-sum floor.
    pub zawy_lwma_min_denominator: i32,
    /// Clamp individual solvetimes to `6 * T` on the high side.
    pub zawy_lwma_solvetime_limitation: bool,
}

impl Params {
    /// Parameters for the production network.
    pub fn main() -> Self {
        let mut limit = [0xffu8; 32];
        limit[0] = 0x00;
        limit[1] = 0x07;
        Self {
            network: Network::Main,
            pow_limit: BigUint::from_bytes_be(&limit),
            pow_no_retargeting: false,
            pow_allow_min_difficulty_blocks: false,
            zawy_lwma_height: 110_000,
            equihash_fork_height: 95_000,
            digishield_averaging_window: 17,
            digishield_target_spacing: 150,
            digishield_max_adjust_up: 16,
            digishield_max_adjust_down: 32,
            pow_target_spacing: 150,
            zawy_lwma_averaging_window: 45,
            zawy_lwma_adjusted_weight: 3443,
            zawy_lwma_min_denominator: 10,
            zawy_lwma_solvetime_limitation: true,
        }
    }

    /// Parameters for the public test network.
    pub fn test() -> Self {
        let mut limit = [0xffu8; 32];
        limit[0] = 0x07;
        Self {
            network: Network::Test,
            pow_limit: BigUint::from_bytes_be(&limit),
            pow_no_retargeting: false,
            pow_allow_min_difficulty_blocks: true,
            zawy_lwma_height: 45_000,
            equihash_fork_height: 40_000,
            ..Self::main()
        }
    }

    /// Parameters for local regression testing.
    ///
    /// LWMA is active from genesis and retargeting is disabled, so every
    /// block inherits its parent's `bits`.
    pub fn regtest() -> Self {
        Self {
            network: Network::Regtest,
            pow_limit: BigUint::from_bytes_be(&[0x0fu8; 32]),
            pow_no_retargeting: true,
            pow_allow_min_difficulty_blocks: true,
            zawy_lwma_height: 0,
            equihash_fork_height: 0,
            ..Self::main()
        }
    }

    /// Total target timespan of one Digishield averaging window.
    pub fn digishield_averaging_window_timespan(&self) -> i64 {
        i64::from(self.digishield_averaging_window) * self.digishield_target_spacing
    }

    /// Lower clamp on the measured window timespan (fastest allowed window).
    pub fn digishield_min_actual_timespan(&self) -> i64 {
        self.digishield_averaging_window_timespan() * (100 - self.digishield_max_adjust_up) / 100
    }

    /// Upper clamp on the measured window timespan (slowest allowed window).
    pub fn digishield_max_actual_timespan(&self) -> i64 {
        self.digishield_averaging_window_timespan() * (100 + self.digishield_max_adjust_down) / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digishield_timespan_bounds() {
        let params = Params::main();
        let timespan = params.digishield_averaging_window_timespan();
        assert_eq!(timespan, 17 * 150);
        // Asymmetric clamp: 84% below, 132% above.
        assert_eq!(params.digishield_min_actual_timespan(), timespan * 84 / 100);
        assert_eq!(params.digishield_max_actual_timespan(), timespan * 132 / 100);
        assert!(params.digishield_min_actual_timespan() < timespan);
        assert!(params.digishield_max_actual_timespan() > timespan);
    }

    #[test]
    fn pow_limits_are_network_ordered() {
        let main = Params::main();
        let test = Params::test();
        let regtest = Params::regtest();
        assert!(main.pow_limit < test.pow_limit);
        assert!(test.pow_limit < regtest.pow_limit);
        assert_eq!(main.pow_limit.bits(), 243);
    }

    #[test]
    fn regtest_disables_retargeting() {
        let regtest = Params::regtest();
        assert!(regtest.pow_no_retargeting);
        assert_eq!(regtest.zawy_lwma_height, 0);
    }
}
