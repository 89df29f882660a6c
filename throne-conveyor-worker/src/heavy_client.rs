// Copyright (c) 2022 Throne Contributors

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use throne_conveyor_exports::{ConveyorError, HeavyClientController, HeavyObject};
use throne_models::object::ObjectIndex;
use throne_models::{NodeRef, PulseNumber, RecordId, RecordRef};

/// A heavy custodian client backed by a fixed, in-memory catalog. Real
/// network transport to the heavy-material tier is out of scope; this is
/// the seedable stand-in used by tests and by the demo binary.
#[derive(Default)]
pub struct StaticHeavyClient {
    objects: RwLock<HashMap<(RecordRef, RecordId), HeavyObject>>,
    indexes: RwLock<HashMap<RecordRef, ObjectIndex>>,
    blobs: RwLock<HashMap<RecordId, Vec<u8>>>,
}

impl StaticHeavyClient {
    /// Builds an empty catalog.
    pub fn new() -> Self {
        StaticHeavyClient::default()
    }

    /// Seeds the catalog with `object` as the answer for `(record, state)`.
    pub fn with_object(self, record: RecordRef, state: RecordId, object: HeavyObject) -> Self {
        self.objects.write().insert((record, state), object);
        self
    }

    /// Seeds the catalog with `index` as the answer for `head`.
    pub fn with_index(self, head: RecordRef, index: ObjectIndex) -> Self {
        self.indexes.write().insert(head, index);
        self
    }

    /// Seeds the catalog with `bytes` as the answer for `memory_ref`.
    pub fn with_blob(self, memory_ref: RecordId, bytes: Vec<u8>) -> Self {
        self.blobs.write().insert(memory_ref, bytes);
        self
    }
}

#[async_trait]
impl HeavyClientController for StaticHeavyClient {
    async fn fetch_object(
        &self,
        record: RecordRef,
        _node: NodeRef,
        state_id: RecordId,
        _pulse: PulseNumber,
    ) -> Result<HeavyObject, ConveyorError> {
        self.objects
            .read()
            .get(&(record, state_id))
            .cloned()
            .ok_or_else(|| {
                ConveyorError::RecordFetchFailed(format!(
                    "no object known for {}/{} in the heavy catalog",
                    record, state_id
                ))
            })
    }

    async fn fetch_index(
        &self,
        head: RecordRef,
        _node: NodeRef,
        _pulse: PulseNumber,
    ) -> Result<ObjectIndex, ConveyorError> {
        self.indexes
            .read()
            .get(&head)
            .cloned()
            .ok_or_else(|| {
                ConveyorError::IndexFetchFailed(format!("no index known for {} in the heavy catalog", head))
            })
    }

    async fn fetch_blob(
        &self,
        memory_ref: RecordId,
        _node: NodeRef,
    ) -> Result<Vec<u8>, ConveyorError> {
        self.blobs
            .read()
            .get(&memory_ref)
            .cloned()
            .ok_or_else(|| {
                ConveyorError::BlobFetchFailed(format!("no blob known for {} in the heavy catalog", memory_ref))
            })
    }
}
