// Copyright (c) 2022 Throne Contributors

use crate::error::ModelsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum depth a jet tree can reach. Chosen so that a jet prefix always
/// fits a single byte, which keeps bit manipulation branch-free.
pub const MAX_JET_DEPTH: u8 = 8;

/// A shard of the record-id space, identified by a bit-prefix of a given
/// depth. `prefix` stores the prefix left-aligned in the most significant
/// bits of the byte; bits at or past `depth` are always zero.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct JetId {
    depth: u8,
    prefix: u8,
}

impl JetId {
    /// Builds a new jet id, masking away any bits at or past `depth`.
    pub fn new(depth: u8, prefix: u8) -> Result<Self, ModelsError> {
        if depth > MAX_JET_DEPTH {
            return Err(ModelsError::InvalidJetDepth(depth));
        }
        Ok(JetId {
            depth,
            prefix: reset_bits(prefix, depth),
        })
    }

    /// The jet covering the whole id space: depth 0, empty prefix.
    pub const fn root() -> Self {
        JetId { depth: 0, prefix: 0 }
    }

    /// Depth of this jet in the prefix tree.
    pub const fn depth(&self) -> u8 {
        self.depth
    }

    /// Left-aligned bit-prefix identifying this jet.
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Returns the parent jet: resets bit `depth - 1` and shortens the
    /// prefix by one level. A root jet is its own parent.
    pub fn parent(&self) -> JetId {
        if self.depth == 0 {
            return *self;
        }
        let parent_depth = self.depth - 1;
        JetId {
            depth: parent_depth,
            prefix: reset_bits(self.prefix, parent_depth),
        }
    }

    /// Returns the two children of this jet, obtained by appending a 0 or 1
    /// bit at the current depth. `None` if the jet is already at
    /// `MAX_JET_DEPTH`.
    pub fn children(&self) -> Option<(JetId, JetId)> {
        if self.depth >= MAX_JET_DEPTH {
            return None;
        }
        let child_depth = self.depth + 1;
        let bit = 0x80u8 >> self.depth;
        let left = JetId {
            depth: child_depth,
            prefix: self.prefix,
        };
        let right = JetId {
            depth: child_depth,
            prefix: self.prefix | bit,
        };
        Some((left, right))
    }

    /// True if `self` is this jet or an ancestor of it, i.e. every record
    /// owned by `other` is also covered by `self`.
    pub fn covers(&self, other: &JetId) -> bool {
        if self.depth > other.depth {
            return false;
        }
        reset_bits(other.prefix, self.depth) == self.prefix
    }

    /// True if a record whose full prefix byte is `record_prefix` falls
    /// under this jet.
    pub fn owns(&self, record_prefix: u8) -> bool {
        reset_bits(record_prefix, self.depth) == self.prefix
    }
}

impl Default for JetId {
    fn default() -> Self {
        JetId::root()
    }
}

impl fmt::Display for JetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "jet({}, {:#010b})", self.depth, self.prefix)
    }
}

/// Returns `value` with every bit at or past bit position `start` (counted
/// from the most significant end, 0-indexed) cleared. Mirrors the original
/// ledger's `ResetBits` but specialized to a single byte since jet depth
/// never exceeds 8.
pub fn reset_bits(value: u8, start: u8) -> u8 {
    if start >= 8 {
        return value;
    }
    let mask = 0xFFu8 << (8 - start);
    value & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(JetId::root().parent(), JetId::root());
    }

    #[test]
    fn parent_resets_the_trailing_bit() {
        let jet = JetId::new(3, 0b1010_0000).unwrap();
        let parent = jet.parent();
        assert_eq!(parent.depth(), 2);
        assert_eq!(parent.prefix(), 0b1000_0000);
    }

    #[test]
    fn reset_bits_is_idempotent() {
        let v = 0b1111_1111;
        let once = reset_bits(v, 3);
        let twice = reset_bits(once, 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn parent_chain_reaches_root_after_depth_steps() {
        let jet = JetId::new(5, 0b1101_1000).unwrap();
        let mut cur = jet;
        for _ in 0..jet.depth() {
            cur = cur.parent();
        }
        assert_eq!(cur, JetId::root());
    }

    #[test]
    fn children_partition_the_parent() {
        let jet = JetId::new(2, 0b1000_0000).unwrap();
        let (left, right) = jet.children().unwrap();
        assert_eq!(left.parent(), jet);
        assert_eq!(right.parent(), jet);
        assert_ne!(left.prefix(), right.prefix());
    }

    #[test]
    fn covers_is_reflexive_and_transitive_to_ancestors() {
        let root = JetId::root();
        let jet = JetId::new(3, 0b1010_0000).unwrap();
        assert!(jet.covers(&jet));
        assert!(root.covers(&jet));
        assert!(!jet.covers(&root));
    }

    #[test]
    fn owns_matches_record_prefix_within_depth() {
        let jet = JetId::new(2, 0b1000_0000).unwrap();
        assert!(jet.owns(0b1011_1111));
        assert!(!jet.owns(0b0000_0000));
    }
}
