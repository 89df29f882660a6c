// Copyright (c) 2022 Throne Contributors

use displaydoc::Display;
use thiserror::Error;

/// Errors raised by the jet-sharding and hot-data ports.
#[non_exhaustive]
#[derive(Clone, Display, Error, Debug)]
pub enum JetError {
    /// `ModelsError`: {0}
    ModelsError(#[from] throne_models::ModelsError),

    /// hot data for jet never arrived before the deadline
    HotDataTimeout,

    /// no known node can serve as heavy-material custodian for this pulse
    NoHeavyCustodian,

    /// channel closed while awaiting a jet-store response
    ChannelClosed,
}
