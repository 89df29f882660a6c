// Copyright (c) 2022 Throne Contributors

use crate::pulse::PulseNumber;
use crate::reference::RecordId;
use serde::{Deserialize, Serialize};

/// Request to fetch the current (or an explicit) state of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetObject {
    /// The object's head record id.
    pub head: RecordId,
    /// Explicit state to fetch, if the caller already knows which one it
    /// wants.
    pub state: Option<RecordId>,
    /// If `state` is absent, whether to prefer the latest *approved* state
    /// over the latest state overall.
    pub approved: bool,
}

/// Request to fetch the children of an object, resuming from a given child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetChildren {
    /// Resume point: the child to continue the traversal from.
    pub from_child: RecordId,
}

/// Request to fetch a pending request record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    /// The request record to fetch.
    pub request: RecordId,
}

/// The union of request message bodies the conveyor core knows how to
/// route and handle. Other message types (smart-contract calls, transfers)
/// are out of scope: they pass through the same ports but are not modeled
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// See [`GetObject`].
    GetObject(GetObject),
    /// See [`GetChildren`].
    GetChildren(GetChildren),
    /// See [`GetRequest`].
    GetRequest(GetRequest),
}

impl Message {
    /// The pulse that should be used to resolve the jet for this message
    /// when the parcel carries a delegation token (i.e. has already been
    /// redirected once): `State.pulse` for `GetObject`, `FromChild.pulse`
    /// for `GetChildren`, `Request.pulse` for `GetRequest`.
    pub fn delegated_target_pulse(&self) -> PulseNumber {
        match self {
            Message::GetObject(m) => m.state.unwrap_or(m.head).pulse(),
            Message::GetChildren(m) => m.from_child.pulse(),
            Message::GetRequest(m) => m.request.pulse(),
        }
    }

    /// The record id this message's default jet-routing decision should be
    /// based on, absent a delegation token.
    pub fn default_record(&self) -> RecordId {
        match self {
            Message::GetObject(m) => m.head,
            Message::GetChildren(m) => m.from_child,
            Message::GetRequest(m) => m.request,
        }
    }

    /// Short, stable name used in logs and trace events.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::GetObject(_) => "GetObject",
            Message::GetChildren(_) => "GetChildren",
            Message::GetRequest(_) => "GetRequest",
        }
    }
}
