// Copyright (c) 2022 Throne Contributors

use crate::jet_id::JetId;
use crate::pulse::{PulseNumber, JET_PULSE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a record. Carries the pulse at which the record was
/// created; the remaining bits are an opaque local identifier. The exact
/// hashing scheme used to derive local identifiers is out of scope here,
/// since cryptographic design is treated as opaque, per the platform's own
/// boundary.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordId {
    pulse: PulseNumber,
    local: u64,
}

impl RecordId {
    /// Builds a record id from its pulse and opaque local identifier.
    pub const fn new(pulse: PulseNumber, local: u64) -> Self {
        RecordId { pulse, local }
    }

    /// The pulse this record id was minted at.
    pub const fn pulse(&self) -> PulseNumber {
        self.pulse
    }

    /// The opaque local identifier.
    pub const fn local(&self) -> u64 {
        self.local
    }

    /// True if this record id's pulse is the `JetPulse` marker, meaning the
    /// record id itself encodes a `JetId` rather than a real record.
    pub fn is_jet_marker(&self) -> bool {
        self.pulse.is_jet_marker()
    }

    /// Builds a record id that encodes a jet id (used when a message target
    /// already names a jet rather than an ordinary record).
    pub fn from_jet(jet: JetId) -> Self {
        RecordId {
            pulse: JET_PULSE,
            local: ((jet.depth() as u64) << 8) | jet.prefix() as u64,
        }
    }

    /// Recovers the jet id previously encoded with [`RecordId::from_jet`].
    /// Returns `None` if this record id does not carry the `JetPulse`
    /// marker.
    pub fn as_jet(&self) -> Option<JetId> {
        if !self.is_jet_marker() {
            return None;
        }
        let depth = ((self.local >> 8) & 0xFF) as u8;
        let prefix = (self.local & 0xFF) as u8;
        JetId::new(depth, prefix).ok()
    }

    /// Deterministic, non-cryptographic mixing of the local identifier used
    /// to place this record in the jet prefix tree. A production deployment
    /// would derive this from the record's content hash; that hash's design
    /// is out of scope here, so a stand-in shard key is used instead.
    pub fn shard_prefix(&self) -> u8 {
        let mixed = self.local ^ (self.local >> 33).wrapping_mul(0xff51_afd7_ed55_8ccd);
        (mixed >> 56) as u8
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{:x}", self.pulse, self.local)
    }
}

/// The affinity domain a record belongs to (e.g. the object whose states
/// are all grouped for jet-routing purposes).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainId(u64);

impl DomainId {
    /// Builds a domain id from its raw value.
    pub const fn new(raw: u64) -> Self {
        DomainId(raw)
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// A universal reference: an affinity domain plus the record id within it.
/// Immutable once constructed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    domain: DomainId,
    record: RecordId,
}

impl RecordRef {
    /// Builds a reference from its domain and record id.
    pub const fn new(domain: DomainId, record: RecordId) -> Self {
        RecordRef { domain, record }
    }

    /// The affinity domain.
    pub const fn domain(&self) -> DomainId {
        self.domain
    }

    /// The record id within the domain.
    pub const fn record(&self) -> RecordId {
        self.record
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_marker_round_trips_through_record_id() {
        let jet = JetId::new(4, 0b1011_0000).unwrap();
        let record = RecordId::from_jet(jet);
        assert!(record.is_jet_marker());
        assert_eq!(record.as_jet(), Some(jet));
    }

    #[test]
    fn ordinary_record_is_not_a_jet_marker() {
        let record = RecordId::new(PulseNumber::new(10), 42);
        assert!(!record.is_jet_marker());
        assert_eq!(record.as_jet(), None);
    }
}
