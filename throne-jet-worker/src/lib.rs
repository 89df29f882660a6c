#![warn(missing_docs)]

//! Concrete implementations of the jet-sharding and hot-data-waiting ports:
//! an in-memory jet tree, an entropy-seeded coordinator, and a per-pulse
//! hot-data latch.

pub mod coordinator;
pub mod hot_data;
pub mod jet_store;

pub use coordinator::JetCoordinator;
pub use hot_data::HotDataWaiter;
pub use jet_store::JetTree;
