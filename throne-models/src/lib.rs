// Copyright (c) 2022 Throne Contributors

#![warn(missing_docs)]

//! Core data model shared by every light-material conveyor component:
//! pulse numbers, jet identifiers, record references, parcels and the
//! messages and replies that flow through the conveyor.

pub mod error;
pub mod jet_id;
pub mod message;
pub mod node;
pub mod object;
pub mod parcel;
pub mod pulse;
pub mod reference;
pub mod reply;

pub use error::ModelsError;
pub use jet_id::JetId;
pub use node::NodeRef;
pub use parcel::{DelegationToken, Parcel};
pub use pulse::PulseNumber;
pub use reference::{RecordId, RecordRef};
pub use reply::{ErrorKind, Reply};
