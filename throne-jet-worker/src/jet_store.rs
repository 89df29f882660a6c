// Copyright (c) 2022 Throne Contributors

use parking_lot::RwLock;
use std::collections::HashMap;
use throne_jet_exports::JetStoreController;
use throne_logging::throne_trace;
use throne_models::{JetId, PulseNumber, RecordId};

/// In-memory jet tree: one snapshot of (jet, actual) entries per pulse.
/// Writers update the snapshot for the current pulse; readers look up the
/// most specific jet covering a record's shard prefix.
pub struct JetTree {
    snapshots: RwLock<HashMap<PulseNumber, Vec<(JetId, bool)>>>,
}

impl JetTree {
    /// Builds an empty jet tree with only the implicit root jet.
    pub fn new() -> Self {
        JetTree {
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Drops snapshots for pulses at or before `cutoff`, bounding memory
    /// growth across long-running nodes.
    pub fn prune_before(&self, cutoff: PulseNumber) {
        self.snapshots.write().retain(|pulse, _| *pulse > cutoff);
    }
}

impl Default for JetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl JetStoreController for JetTree {
    fn for_id(&self, pulse: PulseNumber, record: RecordId) -> (JetId, bool) {
        if let Some(jet) = record.as_jet() {
            return (jet, true);
        }
        let prefix = record.shard_prefix();
        let snapshots = self.snapshots.read();
        match snapshots.get(&pulse) {
            None => (JetId::root(), false),
            Some(entries) => entries
                .iter()
                .filter(|(jet, _)| jet.owns(prefix))
                .max_by_key(|(jet, _)| jet.depth())
                .map(|(jet, actual)| (*jet, *actual))
                .unwrap_or((JetId::root(), false)),
        }
    }

    fn update(&self, jet: JetId, pulse: PulseNumber) {
        throne_trace!("jet.jet_store.update", { "pulse": pulse.as_u64() });
        let mut snapshots = self.snapshots.write();
        let entries = snapshots.entry(pulse).or_default();
        match entries.iter_mut().find(|(existing, _)| *existing == jet) {
            Some(entry) => entry.1 = true,
            None => entries.push((jet, true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreconciled_pulse_returns_root_and_not_actual() {
        let tree = JetTree::new();
        let record = RecordId::new(PulseNumber::new(10), 0xAB);
        let (jet, actual) = tree.for_id(PulseNumber::new(10), record);
        assert_eq!(jet, JetId::root());
        assert!(!actual);
    }

    #[test]
    fn update_then_lookup_finds_the_most_specific_jet() {
        let tree = JetTree::new();
        let pulse = PulseNumber::new(10);
        let left = JetId::new(1, 0b0000_0000).unwrap();
        let deeper = JetId::new(2, 0b0000_0000).unwrap();
        tree.update(left, pulse);
        tree.update(deeper, pulse);

        let record = RecordId::new(pulse, 0x0000_0000_0000_0001);
        let (jet, actual) = tree.for_id(pulse, record);
        assert!(actual);
        assert!(jet.depth() >= left.depth());
    }

    #[test]
    fn jet_marker_records_resolve_to_themselves() {
        let tree = JetTree::new();
        let jet = JetId::new(3, 0b1010_0000).unwrap();
        let record = RecordId::from_jet(jet);
        let (resolved, actual) = tree.for_id(PulseNumber::new(1), record);
        assert_eq!(resolved, jet);
        assert!(actual);
    }

    #[test]
    fn prune_before_drops_old_snapshots() {
        let tree = JetTree::new();
        tree.update(JetId::root(), PulseNumber::new(1));
        tree.update(JetId::root(), PulseNumber::new(5));
        tree.prune_before(PulseNumber::new(3));
        assert_eq!(tree.snapshots.read().len(), 1);
    }
}
