// Copyright (c) 2022 Throne Contributors

#![warn(missing_docs)]

//! Typed ports for the jet-sharding and hot-data-waiting subsystems the
//! conveyor core depends on: the jet store, the jet coordinator, and the
//! per-jet hot-data latch.

pub mod config;
pub mod controller;
pub mod entropy;
pub mod error;

pub use config::JetConfig;
pub use controller::{HotDataWaiterController, JetCoordinatorController, JetStoreController};
pub use entropy::select_by_entropy;
pub use error::JetError;
