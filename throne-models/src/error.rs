// Copyright (c) 2022 Throne Contributors

use displaydoc::Display;
use thiserror::Error;

/// Errors that can arise while constructing or manipulating core model types.
#[non_exhaustive]
#[derive(Clone, Display, Error, Debug, PartialEq, Eq)]
pub enum ModelsError {
    /// pulse number overflow
    PulseOverflow,
    /// jet depth {0} is out of the 0..8 range
    InvalidJetDepth(u8),
    /// jet prefix does not fit the declared depth: {0}
    InvalidJetPrefix(String),
    /// could not parse value: {0}
    DeserializeError(String),
}
