// Copyright (c) 2022 Throne Contributors

use displaydoc::Display;
use thiserror::Error;
use throne_models::ErrorKind;

/// Errors surfaced by the conveyor core, its command channel, and its ports.
#[non_exhaustive]
#[derive(Clone, Display, Error, Debug)]
pub enum ConveyorError {
    /// `JetError`: {0}
    JetError(#[from] throne_jet_exports::JetError),

    /// `ModelsError`: {0}
    ModelsError(#[from] throne_models::ModelsError),

    /// item reached a past slot that has already been retired
    InactiveSlot,

    /// handler in the past slot has no past-slot implementation
    NoPastHandler,

    /// hot-data latch expired before data arrived
    HotDataTimeout,

    /// message lacks a required default target
    InvalidMessage,

    /// object index fetch failed: {0}
    IndexFetchFailed(String),

    /// record fetch failed: {0}
    RecordFetchFailed(String),

    /// memory blob fetch failed: {0}
    BlobFetchFailed(String),

    /// object is deactivated
    Deactivated,

    /// no state is available for the requested object
    StateNotAvailable,

    /// the referenced record is invalid
    InvalidRecord,

    /// send error on conveyor command channel: {0}
    SendChannelError(String),

    /// receive error on conveyor command channel: {0}
    ReceiveChannelError(String),

    /// the conveyor's reply channel was already consumed
    ReplyAlreadySent,
}

impl ConveyorError {
    /// Maps this error onto the fixed reply-error taxonomy callers see.
    /// The taxonomy has five kinds; errors with no direct counterpart are
    /// folded onto the closest domain-level outcome rather than growing
    /// the taxonomy with a catch-all variant.
    pub fn as_error_kind(&self) -> ErrorKind {
        match self {
            ConveyorError::InactiveSlot | ConveyorError::NoPastHandler => ErrorKind::InactiveSlot,
            ConveyorError::HotDataTimeout => ErrorKind::HotDataTimeout,
            ConveyorError::Deactivated => ErrorKind::Deactivated,
            ConveyorError::StateNotAvailable
            | ConveyorError::IndexFetchFailed(_)
            | ConveyorError::RecordFetchFailed(_)
            | ConveyorError::BlobFetchFailed(_) => ErrorKind::StateNotAvailable,
            ConveyorError::InvalidMessage
            | ConveyorError::InvalidRecord
            | ConveyorError::JetError(_)
            | ConveyorError::ModelsError(_) => ErrorKind::InvalidRecord,
            ConveyorError::SendChannelError(_)
            | ConveyorError::ReceiveChannelError(_)
            | ConveyorError::ReplyAlreadySent => ErrorKind::StateNotAvailable,
        }
    }
}
