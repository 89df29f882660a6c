// Copyright (c) 2022 Throne Contributors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a node in the network. Node identity, certificate
/// issuance and key management are out of scope here; this is just the
/// handle the jet coordinator and selection algorithm operate on.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef(u64);

impl NodeRef {
    /// Builds a node reference from its raw identifier.
    pub const fn new(raw: u64) -> Self {
        NodeRef(raw)
    }

    /// Raw identifier, as bytes, for use as entropy-selection input.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "node-{:016x}", self.0)
    }
}
