// Copyright (c) 2022 Throne Contributors

use std::time::Duration;
use throne_jet_exports::JetConfig;

/// Tunables for the conveyor core. Loading these from a file or CLI flags is
/// out of scope; construction validates nothing beyond field types, and the
/// struct is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// Interval between successive pulses emitted by the in-process clock.
    pub pulse_interval: Duration,
    /// Jet-sharding and hot-data tunables.
    pub jet: JetConfig,
    /// Bounded channel capacity for the conveyor's command queue and for
    /// per-slot item queues.
    pub channel_capacity: usize,
    /// Maximum jet-tree depth this node will create via splits.
    pub jet_tree_depth_limit: u8,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            pulse_interval: Duration::from_secs(1),
            jet: JetConfig::default(),
            channel_capacity: 1_024,
            jet_tree_depth_limit: throne_models::jet_id::MAX_JET_DEPTH,
        }
    }
}
