// Copyright (c) 2022 Throne Contributors

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use throne_conveyor_exports::{ConveyorError, LocalStorageController};
use throne_models::object::{ObjectIndex, StateRecord};
use throne_models::{JetId, RecordId, RecordRef};

/// In-memory local storage. Disk persistence and compaction are out of
/// scope; this is the port's reference implementation for single-process
/// deployments and tests.
#[derive(Default)]
pub struct InMemoryLocalStorage {
    indexes: RwLock<HashMap<RecordRef, ObjectIndex>>,
    records: RwLock<HashMap<(JetId, RecordId), StateRecord>>,
    blobs: RwLock<HashMap<RecordId, Vec<u8>>>,
}

impl InMemoryLocalStorage {
    /// Builds an empty store.
    pub fn new() -> Self {
        InMemoryLocalStorage::default()
    }
}

#[async_trait]
impl LocalStorageController for InMemoryLocalStorage {
    async fn get_index(&self, head: RecordRef) -> Result<Option<ObjectIndex>, ConveyorError> {
        Ok(self.indexes.read().get(&head).cloned())
    }

    async fn put_index(&self, head: RecordRef, index: ObjectIndex) -> Result<(), ConveyorError> {
        self.indexes.write().insert(head, index);
        Ok(())
    }

    async fn get_record(
        &self,
        jet: JetId,
        state: RecordId,
    ) -> Result<Option<StateRecord>, ConveyorError> {
        Ok(self.records.read().get(&(jet, state)).cloned())
    }

    async fn put_record(
        &self,
        jet: JetId,
        state: RecordId,
        record: StateRecord,
    ) -> Result<(), ConveyorError> {
        self.records.write().insert((jet, state), record);
        Ok(())
    }

    async fn get_blob(&self, memory_ref: RecordId) -> Result<Option<Vec<u8>>, ConveyorError> {
        Ok(self.blobs.read().get(&memory_ref).cloned())
    }

    async fn put_blob(&self, memory_ref: RecordId, bytes: Vec<u8>) -> Result<(), ConveyorError> {
        self.blobs.write().insert(memory_ref, bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throne_models::pulse::PulseNumber;
    use throne_models::reference::DomainId;

    fn sample_ref() -> RecordRef {
        RecordRef::new(DomainId::new(1), RecordId::new(PulseNumber::new(1), 7))
    }

    #[tokio::test]
    async fn index_round_trips_through_storage() {
        let storage = InMemoryLocalStorage::new();
        let head = sample_ref();
        assert_eq!(storage.get_index(head).await.unwrap(), None);

        let index = ObjectIndex {
            latest_state: Some(head.record()),
            latest_state_approved: None,
        };
        storage.put_index(head, index.clone()).await.unwrap();
        assert_eq!(storage.get_index(head).await.unwrap(), Some(index));
    }

    #[tokio::test]
    async fn blob_round_trips_through_storage() {
        let storage = InMemoryLocalStorage::new();
        let memory_ref = RecordId::new(PulseNumber::new(2), 3);
        storage
            .put_blob(memory_ref, vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(
            storage.get_blob(memory_ref).await.unwrap(),
            Some(vec![1, 2, 3])
        );
    }
}
