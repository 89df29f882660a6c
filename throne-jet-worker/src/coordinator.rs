// Copyright (c) 2022 Throne Contributors

use throne_jet_exports::{select_by_entropy, JetCoordinatorController, JetError};
use throne_models::{JetId, NodeRef, PulseNumber};

/// Non-cryptographic stand-in for the fnv-1a mixing used to rank candidate
/// nodes. The actual hash function used for executor selection is opaque
/// here, mirroring the platform's own boundary around cryptographic
/// design; any stable, collision-resistant function can be substituted.
fn stable_hash(input: &[u8]) -> Vec<u8> {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &byte in input {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash.to_be_bytes().to_vec()
}

/// Derives deterministic per-pulse entropy. A production deployment feeds
/// this from network-wide randomness (e.g. a VRF output collected at the
/// previous pulse); that mechanism is out of scope here, so the pulse
/// number itself stands in as the entropy seed.
fn entropy_for_pulse(pulse: PulseNumber) -> Vec<u8> {
    pulse.as_u64().to_be_bytes().to_vec()
}

/// Computes executor and heavy-custodian assignments by deterministic
/// entropy-seeded selection over a fixed population of known nodes.
pub struct JetCoordinator {
    me: NodeRef,
    light_nodes: Vec<NodeRef>,
    heavy_nodes: Vec<NodeRef>,
    light_chain_limit: u64,
}

impl JetCoordinator {
    /// Builds a coordinator for `me`, given the known population of
    /// light-material and heavy-material nodes and the retention window
    /// (in pulses) beyond which `is_beyond_limit` reports true.
    pub fn new(
        me: NodeRef,
        light_nodes: Vec<NodeRef>,
        heavy_nodes: Vec<NodeRef>,
        light_chain_limit: u64,
    ) -> Self {
        JetCoordinator {
            me,
            light_nodes,
            heavy_nodes,
            light_chain_limit,
        }
    }

    fn select_one(&self, entropy: &[u8], pool: &[NodeRef]) -> Option<NodeRef> {
        let values: Vec<Vec<u8>> = pool.iter().map(|node| node.to_bytes().to_vec()).collect();
        let selected = select_by_entropy(entropy, &values, 1, stable_hash)?;
        let winner = selected.first()?;
        pool.iter().find(|node| node.to_bytes() == *winner).copied()
    }
}

impl JetCoordinatorController for JetCoordinator {
    fn light_executor_for_jet(&self, jet: JetId, pulse: PulseNumber) -> NodeRef {
        let mut entropy = entropy_for_pulse(pulse);
        entropy.push(jet.depth());
        entropy.push(jet.prefix());
        self.select_one(&entropy, &self.light_nodes)
            .unwrap_or(self.me)
    }

    fn heavy(&self, pulse: PulseNumber) -> Result<NodeRef, JetError> {
        let entropy = entropy_for_pulse(pulse);
        self.select_one(&entropy, &self.heavy_nodes)
            .ok_or(JetError::NoHeavyCustodian)
    }

    fn node_for_jet(
        &self,
        jet: JetId,
        requesting_pulse: PulseNumber,
        target_pulse: PulseNumber,
    ) -> NodeRef {
        if self.is_beyond_limit(requesting_pulse, target_pulse) {
            self.heavy(target_pulse).unwrap_or(self.me)
        } else {
            self.light_executor_for_jet(jet, target_pulse)
        }
    }

    fn me(&self) -> NodeRef {
        self.me
    }

    fn is_beyond_limit(&self, current_pulse: PulseNumber, target_pulse: PulseNumber) -> bool {
        current_pulse.distance_since(target_pulse) > self.light_chain_limit
    }
}
