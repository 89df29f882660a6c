// Copyright (c) 2022 Throne Contributors

use async_trait::async_trait;
use lazy_static::lazy_static;
use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::sync::Arc;
use throne_conveyor_exports::{ConveyorError, Handler, HandlerContext, HandlerOutcome, Ports};
use throne_logging::throne_trace;
use throne_models::message::Message;
use throne_models::object::{Object, StateRecord};
use throne_models::{JetId, NodeRef, PulseNumber, RecordId, RecordRef, Reply};
use tokio::sync::Mutex as AsyncMutex;

lazy_static! {
    /// Per-object-head fair locks, so two concurrent `GetObject` requests
    /// for the same head serialize their index-cache fill instead of
    /// racing each other into the heavy custodian.
    static ref RECORD_LOCKS: SyncMutex<HashMap<RecordRef, Arc<AsyncMutex<()>>>> =
        SyncMutex::new(HashMap::new());
}

fn lock_for(head: RecordRef) -> Arc<AsyncMutex<()>> {
    RECORD_LOCKS
        .lock()
        .entry(head)
        .or_insert_with(|| Arc::new(AsyncMutex::new(())))
        .clone()
}

/// Terminal step of the `GetObject` pipeline. Resolves the object's index
/// (fetching it from the heavy custodian on a cache miss), picks the
/// target state, and fetches that state's record either from the heavy
/// custodian directly (when it has fallen outside the light-chain
/// retention window) or from local storage / the owning jet's executor
/// otherwise.
pub struct GetObjectHandler;

#[async_trait]
impl Handler for GetObjectHandler {
    fn name(&self) -> &'static str {
        "get_object"
    }

    async fn handle(&self, ctx: &mut HandlerContext, ports: &Ports) -> HandlerOutcome {
        let get_object = match ctx.parcel.message() {
            Message::GetObject(m) => m.clone(),
            _ => return HandlerOutcome::Fail(ConveyorError::InvalidMessage),
        };

        let head = ctx.parcel.default_target();
        let _guard = lock_for(head).lock().await;

        let index = match resolve_index(head, ctx.pulse, ports).await {
            Ok(index) => index,
            Err(err) => return HandlerOutcome::Fail(err),
        };

        let target_state = match index.resolve_target_state(get_object.state, get_object.approved)
        {
            Some(state) => state,
            None => return HandlerOutcome::Fail(ConveyorError::StateNotAvailable),
        };

        if ports
            .jet_coordinator
            .is_beyond_limit(ctx.pulse, target_state.pulse())
        {
            throne_trace!("conveyor.get_object.beyond_limit", {
                "state_pulse": target_state.pulse().as_u64()
            });
            let heavy = match ports.jet_coordinator.heavy(ctx.pulse) {
                Ok(node) => node,
                Err(err) => return HandlerOutcome::Fail(ConveyorError::from(err)),
            };
            return match ports
                .heavy_client
                .fetch_object(head, heavy, target_state, ctx.pulse)
                .await
            {
                Ok(obj) if obj.deactivated => HandlerOutcome::Fail(ConveyorError::Deactivated),
                Ok(obj) => HandlerOutcome::Reply(Reply::Object(Object {
                    head,
                    state: target_state,
                    prototype: obj.prototype,
                    is_prototype: obj.is_prototype,
                    child_pointer: None,
                    parent: None,
                    memory: obj.memory,
                })),
                Err(err) => HandlerOutcome::Fail(err),
            };
        }

        let (jet, actual) = ports.jet_store.for_id(target_state.pulse(), target_state);
        if !actual {
            ports.jet_store.update(jet, target_state.pulse());
        }

        let (record, inline_memory) =
            match fetch_record(head, jet, target_state, ctx.pulse, ports).await {
                Ok(result) => result,
                Err(err) => return HandlerOutcome::Fail(err),
            };

        if record.deactivated {
            return HandlerOutcome::Fail(ConveyorError::Deactivated);
        }

        let memory = match inline_memory {
            Some(memory) => Some(memory),
            None => {
                let fetch_node = ports
                    .jet_coordinator
                    .node_for_jet(jet, ctx.pulse, target_state.pulse());
                match resolve_memory(&record, fetch_node, ports).await {
                    Ok(memory) => memory,
                    Err(err) => return HandlerOutcome::Fail(err),
                }
            }
        };

        HandlerOutcome::Reply(Reply::Object(Object::from_state(head, record, memory)))
    }
}

async fn resolve_index(
    head: RecordRef,
    pulse: PulseNumber,
    ports: &Ports,
) -> Result<throne_models::object::ObjectIndex, ConveyorError> {
    if let Some(index) = ports.local_storage.get_index(head).await? {
        return Ok(index);
    }
    let heavy = ports
        .jet_coordinator
        .heavy(pulse)
        .map_err(ConveyorError::from)?;
    let index = ports
        .heavy_client
        .fetch_index(head, heavy, pulse)
        .await
        .map_err(|err| ConveyorError::IndexFetchFailed(err.to_string()))?;
    ports.local_storage.put_index(head, index.clone()).await?;
    Ok(index)
}

async fn fetch_record(
    head: RecordRef,
    jet: JetId,
    state_id: RecordId,
    pulse: PulseNumber,
    ports: &Ports,
) -> Result<(StateRecord, Option<Vec<u8>>), ConveyorError> {
    if let Some(record) = ports.local_storage.get_record(jet, state_id).await? {
        return Ok((record, None));
    }
    let node = ports.jet_coordinator.node_for_jet(jet, pulse, state_id.pulse());
    let fetched = ports
        .heavy_client
        .fetch_object(head, node, state_id, pulse)
        .await
        .map_err(|err| ConveyorError::RecordFetchFailed(err.to_string()))?;
    let record = StateRecord {
        state: state_id,
        prototype: fetched.prototype,
        is_prototype: fetched.is_prototype,
        child_pointer: None,
        parent: None,
        memory_ref: None,
        deactivated: fetched.deactivated,
    };
    ports.local_storage.put_record(jet, state_id, record.clone()).await?;
    Ok((record, fetched.memory))
}

async fn resolve_memory(
    record: &StateRecord,
    node: NodeRef,
    ports: &Ports,
) -> Result<Option<Vec<u8>>, ConveyorError> {
    let memory_ref = match record.memory_ref {
        Some(memory_ref) => memory_ref,
        None => return Ok(None),
    };
    if let Some(bytes) = ports.local_storage.get_blob(memory_ref).await? {
        return Ok(Some(bytes));
    }
    let bytes = ports
        .heavy_client
        .fetch_blob(memory_ref, node)
        .await
        .map_err(|err| ConveyorError::BlobFetchFailed(err.to_string()))?;
    ports.local_storage.put_blob(memory_ref, bytes.clone()).await?;
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use throne_conveyor_exports::NodeConfig;
    use throne_jet_worker::{HotDataWaiter, JetCoordinator, JetTree};
    use throne_models::message::{GetObject, Message};
    use throne_models::object::ObjectIndex;
    use throne_models::reference::DomainId;
    use throne_models::Parcel;

    fn ports_with_limit(limit: u64) -> Ports {
        let me = NodeRef::new(1);
        Ports {
            jet_store: Arc::new(JetTree::new()),
            jet_coordinator: Arc::new(JetCoordinator::new(me, vec![me], vec![me], limit)),
            hot_data: Arc::new(HotDataWaiter::new(Duration::from_secs(5))),
            local_storage: Arc::new(InMemoryLocalStorage::new()),
            heavy_client: Arc::new(StaticHeavyClient::new()),
            config: Arc::new(NodeConfig::default()),
        }
    }

    fn sample_ctx(current_pulse: PulseNumber, target: RecordRef) -> HandlerContext {
        let parcel = Parcel::new(
            Message::GetObject(GetObject {
                head: target.record(),
                state: None,
                approved: false,
            }),
            current_pulse,
            None,
            target,
        );
        HandlerContext::new(current_pulse, parcel).with_jet(JetId::root())
    }

    #[tokio::test]
    async fn fetches_from_the_heavy_custodian_when_beyond_the_light_chain_limit() {
        let ports = ports_with_limit(10);
        let state = RecordId::new(PulseNumber::new(1), 1);
        let head = RecordRef::new(DomainId::new(0), state);

        ports
            .local_storage
            .put_index(
                head,
                ObjectIndex {
                    latest_state: Some(state),
                    latest_state_approved: None,
                },
            )
            .await
            .unwrap();

        let heavy_object = throne_conveyor_exports::HeavyObject {
            prototype: head,
            is_prototype: true,
            memory: Some(vec![7, 7, 7]),
            deactivated: false,
        };
        let heavy_client = StaticHeavyClient::new().with_object(head, state, heavy_object);
        let ports = Ports {
            heavy_client: Arc::new(heavy_client),
            ..ports
        };

        let mut ctx = sample_ctx(PulseNumber::new(500), head);
        let outcome = GetObjectHandler.handle(&mut ctx, &ports).await;

        match outcome {
            HandlerOutcome::Reply(Reply::Object(obj)) => {
                assert_eq!(obj.memory, Some(vec![7, 7, 7]));
                assert_eq!(obj.state, state);
            }
            other => panic!("expected an Object reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fails_when_the_index_has_no_resolvable_state() {
        let ports = ports_with_limit(1_000);
        let state = RecordId::new(PulseNumber::new(1), 1);
        let head = RecordRef::new(DomainId::new(0), state);
        ports
            .local_storage
            .put_index(head, ObjectIndex::default())
            .await
            .unwrap();

        let mut ctx = sample_ctx(PulseNumber::new(2), head);
        let outcome = GetObjectHandler.handle(&mut ctx, &ports).await;

        assert!(matches!(
            outcome,
            HandlerOutcome::Fail(ConveyorError::StateNotAvailable)
        ));
    }
}
