// Copyright (c) 2022 Throne Contributors

use std::time::Duration;

/// Tunables for the jet-sharding and hot-data-waiting subsystems. Loading
/// these from a file or CLI flags is out of scope; only the typed struct
/// and its documented defaults live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JetConfig {
    /// Deadline after which an unresolved hot-data latch for a pulse
    /// transitions to `TimedOut`.
    pub hot_data_timeout: Duration,
    /// Number of pulses defining the light-chain retention window used by
    /// `is_beyond_limit`.
    pub light_chain_limit: u64,
}

impl Default for JetConfig {
    fn default() -> Self {
        JetConfig {
            hot_data_timeout: Duration::from_secs(10),
            light_chain_limit: 1_000,
        }
    }
}
