// Copyright (c) 2022 Throne Contributors

use crate::config::NodeConfig;
use crate::error::ConveyorError;
use async_trait::async_trait;
use std::sync::Arc;
use throne_jet_exports::{HotDataWaiterController, JetCoordinatorController, JetStoreController};
use throne_models::object::{ObjectIndex, StateRecord};
use throne_models::{JetId, NodeRef, PulseNumber, RecordId, RecordRef};

/// What the heavy custodian returns for a `fetch_object` call: enough to
/// assemble a reply, or a deactivation sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeavyObject {
    /// Pointer to the object's prototype record.
    pub prototype: RecordRef,
    /// Whether this record is itself a prototype.
    pub is_prototype: bool,
    /// Resolved memory bytes, if any.
    pub memory: Option<Vec<u8>>,
    /// True if the heavy custodian reports this object as deactivated.
    pub deactivated: bool,
}

/// Record index CRUD, record-by-(jet, state-id) lookups, and blob storage.
/// Disk backends, caching policy, and compaction are out of scope; only
/// the typed port the conveyor core consumes is defined here.
#[async_trait]
pub trait LocalStorageController: Send + Sync {
    /// Looks up the cached object index for `head`.
    async fn get_index(&self, head: RecordRef) -> Result<Option<ObjectIndex>, ConveyorError>;

    /// Caches `index` for `head`, overwriting any previous entry.
    async fn put_index(&self, head: RecordRef, index: ObjectIndex) -> Result<(), ConveyorError>;

    /// Looks up the state record for `state` within `jet`.
    async fn get_record(
        &self,
        jet: JetId,
        state: RecordId,
    ) -> Result<Option<StateRecord>, ConveyorError>;

    /// Persists `record` for `state` within `jet`.
    async fn put_record(
        &self,
        jet: JetId,
        state: RecordId,
        record: StateRecord,
    ) -> Result<(), ConveyorError>;

    /// Looks up a memory blob by the record id it is attached to.
    async fn get_blob(&self, memory_ref: RecordId) -> Result<Option<Vec<u8>>, ConveyorError>;

    /// Persists a memory blob, keyed by the record id it is attached to.
    async fn put_blob(&self, memory_ref: RecordId, bytes: Vec<u8>) -> Result<(), ConveyorError>;
}

/// Out-of-process fetch from the heavy-material custodian for a pulse.
#[async_trait]
pub trait HeavyClientController: Send + Sync {
    /// Fetches `record`'s state as of `state_id` at `pulse`, from `node`.
    async fn fetch_object(
        &self,
        record: RecordRef,
        node: NodeRef,
        state_id: RecordId,
        pulse: PulseNumber,
    ) -> Result<HeavyObject, ConveyorError>;

    /// Fetches the object index for `head` from the heavy custodian,
    /// used on a local index cache miss.
    async fn fetch_index(
        &self,
        head: RecordRef,
        node: NodeRef,
        pulse: PulseNumber,
    ) -> Result<ObjectIndex, ConveyorError>;

    /// Fetches a memory blob keyed by `memory_ref` from `node`. Reused as
    /// the generic outbound fetch port for both the heavy custodian and a
    /// light executor's node-for-pulse, since only one outbound network
    /// port is modeled here.
    async fn fetch_blob(
        &self,
        memory_ref: RecordId,
        node: NodeRef,
    ) -> Result<Vec<u8>, ConveyorError>;
}

/// The shared state the outermost `Provide` middleware injects into every
/// handler step: the jet-sharding and hot-data ports, the storage and
/// heavy-custodian ports, and the node's own configuration.
#[derive(Clone)]
pub struct Ports {
    /// Jet tree lookups.
    pub jet_store: Arc<dyn JetStoreController>,
    /// Executor/custodian selection.
    pub jet_coordinator: Arc<dyn JetCoordinatorController>,
    /// Per-(pulse, jet) hot-data latch.
    pub hot_data: Arc<dyn HotDataWaiterController>,
    /// Local record/index/blob storage.
    pub local_storage: Arc<dyn LocalStorageController>,
    /// Heavy-material custodian client.
    pub heavy_client: Arc<dyn HeavyClientController>,
    /// Immutable node configuration.
    pub config: Arc<NodeConfig>,
}
