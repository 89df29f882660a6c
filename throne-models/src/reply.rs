// Copyright (c) 2022 Throne Contributors

use crate::jet_id::JetId;
use crate::object::Object;
use displaydoc::Display;
use serde::{Deserialize, Serialize};

/// Domain-level outcome kinds a handler pipeline may report back to the
/// caller. These are normal replies, not transport failures: the caller
/// gets a well-typed answer either way.
#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// the object has no resolvable state
    StateNotAvailable,
    /// the object is deactivated
    Deactivated,
    /// hot data for the owning jet did not arrive before the deadline
    HotDataTimeout,
    /// the item reached a past slot that has already been retired
    InactiveSlot,
    /// the message referenced an invalid or unresolvable record
    InvalidRecord,
}

/// The bit-exact reply taxonomy callers of the message bus see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// A fully resolved object state.
    Object(Object),
    /// Not an error: redirect the caller to the indicated jet's executor.
    JetMiss {
        /// The jet the caller should retry against.
        jet: JetId,
    },
    /// A typed domain-level failure.
    Error {
        /// The kind of failure.
        kind: ErrorKind,
    },
}

impl Reply {
    /// Builds an `Error` reply of the given kind.
    pub fn error(kind: ErrorKind) -> Self {
        Reply::Error { kind }
    }

    /// Builds a `JetMiss` reply redirecting to `jet`.
    pub fn jet_miss(jet: JetId) -> Self {
        Reply::JetMiss { jet }
    }
}
