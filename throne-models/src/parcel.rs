// Copyright (c) 2022 Throne Contributors

use crate::message::Message;
use crate::pulse::PulseNumber;
use crate::reference::RecordRef;
use serde::{Deserialize, Serialize};

/// Evidence, attached to a parcel, that it has already been redirected once
/// by a jet-miss response. A parcel carrying a token skips further redirect
/// checks and hot-data waiting (see `CheckJet`/`WaitForHot`). The evidence's
/// cryptographic form is opaque here; only its presence matters to the
/// core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationToken(Vec<u8>);

impl DelegationToken {
    /// Wraps opaque delegation evidence.
    pub fn new(evidence: Vec<u8>) -> Self {
        DelegationToken(evidence)
    }
}

/// A message-bus envelope: the message body, the pulse it originated at,
/// optional delegation evidence, and a default routing target used when the
/// message body itself does not name one unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    message: Message,
    origin_pulse: PulseNumber,
    delegation_token: Option<DelegationToken>,
    default_target: RecordRef,
}

impl Parcel {
    /// Builds a new parcel.
    pub fn new(
        message: Message,
        origin_pulse: PulseNumber,
        delegation_token: Option<DelegationToken>,
        default_target: RecordRef,
    ) -> Self {
        Parcel {
            message,
            origin_pulse,
            delegation_token,
            default_target,
        }
    }

    /// The message body.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// The pulse this parcel originated at.
    pub fn pulse(&self) -> PulseNumber {
        self.origin_pulse
    }

    /// The delegation evidence, if this parcel has already been redirected
    /// once.
    pub fn delegation_token(&self) -> Option<&DelegationToken> {
        self.delegation_token.as_ref()
    }

    /// True if this parcel already carries delegation evidence.
    pub fn is_delegated(&self) -> bool {
        self.delegation_token.is_some()
    }

    /// The default routing target, used when the message body's own target
    /// record cannot be resolved directly.
    pub fn default_target(&self) -> RecordRef {
        self.default_target
    }
}
