// Copyright (c) 2022 Throne Contributors

use crate::reference::{RecordId, RecordRef};
use serde::{Deserialize, Serialize};

/// An object's index: tracks which state is considered current. Stored
/// locally per object head, refreshed from the heavy custodian on a
/// cache miss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectIndex {
    /// Latest state known, approved or not.
    pub latest_state: Option<RecordId>,
    /// Latest state known to have been approved.
    pub latest_state_approved: Option<RecordId>,
}

impl ObjectIndex {
    /// Resolves the state id a `GetObject` request should use, given an
    /// explicit state (if the caller named one) and whether it prefers
    /// approved states.
    pub fn resolve_target_state(
        &self,
        explicit: Option<RecordId>,
        prefer_approved: bool,
    ) -> Option<RecordId> {
        explicit.or_else(|| {
            if prefer_approved {
                self.latest_state_approved.or(self.latest_state)
            } else {
                self.latest_state
            }
        })
    }
}

/// A state record as stored by local storage or returned by the heavy
/// custodian: everything needed to answer a `GetObject` for one state id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// This state's own record id.
    pub state: RecordId,
    /// Pointer to the object's prototype (code) record.
    pub prototype: RecordRef,
    /// Whether this record is itself a prototype.
    pub is_prototype: bool,
    /// Pointer to the next child in the object's child chain, if any.
    pub child_pointer: Option<RecordRef>,
    /// Pointer to the parent object, if any.
    pub parent: Option<RecordRef>,
    /// Reference to a memory blob attached to this state, if any.
    pub memory_ref: Option<RecordId>,
    /// True if this state is a deactivation record: the object no longer
    /// exists as of this state.
    pub deactivated: bool,
}

/// The fully assembled reply payload for a successful `GetObject`: a state
/// record plus its memory bytes resolved, ready to hand back to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// The object's head record id.
    pub head: RecordRef,
    /// The state id actually returned.
    pub state: RecordId,
    /// Pointer to the object's prototype record.
    pub prototype: RecordRef,
    /// Whether this record is itself a prototype.
    pub is_prototype: bool,
    /// Pointer to the next child in the object's child chain, if any.
    pub child_pointer: Option<RecordRef>,
    /// Pointer to the parent object, if any.
    pub parent: Option<RecordRef>,
    /// Resolved memory bytes, if the state references a blob.
    pub memory: Option<Vec<u8>>,
}

impl Object {
    /// Assembles the reply payload from a state record and its resolved
    /// memory bytes.
    pub fn from_state(head: RecordRef, state: StateRecord, memory: Option<Vec<u8>>) -> Self {
        Object {
            head,
            state: state.state,
            prototype: state.prototype,
            is_prototype: state.is_prototype,
            child_pointer: state.child_pointer,
            parent: state.parent,
            memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::PulseNumber;

    #[test]
    fn explicit_state_wins_over_latest() {
        let idx = ObjectIndex {
            latest_state: Some(RecordId::new(PulseNumber::new(5), 1)),
            latest_state_approved: Some(RecordId::new(PulseNumber::new(4), 2)),
        };
        let explicit = RecordId::new(PulseNumber::new(9), 3);
        assert_eq!(
            idx.resolve_target_state(Some(explicit), true),
            Some(explicit)
        );
    }

    #[test]
    fn falls_back_to_approved_when_requested() {
        let idx = ObjectIndex {
            latest_state: Some(RecordId::new(PulseNumber::new(5), 1)),
            latest_state_approved: Some(RecordId::new(PulseNumber::new(4), 2)),
        };
        assert_eq!(
            idx.resolve_target_state(None, true),
            idx.latest_state_approved
        );
        assert_eq!(idx.resolve_target_state(None, false), idx.latest_state);
    }

    #[test]
    fn none_when_nothing_is_available() {
        let idx = ObjectIndex::default();
        assert_eq!(idx.resolve_target_state(None, true), None);
    }
}
