// Copyright (c) 2022 Throne Contributors

use throne_conveyor_exports::{ConveyorCommandSender, ConveyorError};
use throne_logging::throne_trace;
use throne_models::{Parcel, Reply};

/// The conveyor's external-facing entry point: the single function a
/// message-bus subscriber calls to have a parcel sorted, processed, and
/// answered. Transport (wire framing, topic routing, retries) is out of
/// scope; this adapts one already-decoded `Parcel` onto the conveyor's
/// internal command channel and awaits its reply.
pub struct MessageBusAdaptor {
    commands: ConveyorCommandSender,
}

impl MessageBusAdaptor {
    /// Wraps a running conveyor worker's command sender.
    pub fn new(commands: ConveyorCommandSender) -> Self {
        MessageBusAdaptor { commands }
    }

    /// Submits `parcel` to the conveyor and awaits its reply.
    pub async fn wrap_message_bus(&self, parcel: Parcel) -> Result<Reply, ConveyorError> {
        throne_trace!("conveyor.adaptor.wrap_message_bus", {
            "kind": parcel.message().kind()
        });
        self.commands.submit_parcel(parcel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ExternallyFedClock;
    use crate::sorter::Sorter;
    use crate::start_conveyor_worker;
    use std::sync::Arc;
    use throne_conveyor_exports::NodeConfig;
    use throne_jet_worker::{HotDataWaiter, JetCoordinator, JetTree};
    use throne_models::message::{GetObject, Message};
    use throne_models::reference::DomainId;
    use throne_models::{NodeRef, PulseNumber, RecordId, RecordRef};

    use crate::heavy_client::StaticHeavyClient;
    use crate::storage::InMemoryLocalStorage;

    fn test_ports() -> throne_conveyor_exports::Ports {
        let me = NodeRef::new(1);
        throne_conveyor_exports::Ports {
            jet_store: Arc::new(JetTree::new()),
            jet_coordinator: Arc::new(JetCoordinator::new(me, vec![me], vec![], 100)),
            hot_data: Arc::new(HotDataWaiter::new(std::time::Duration::from_millis(50))),
            local_storage: Arc::new(InMemoryLocalStorage::new()),
            heavy_client: Arc::new(StaticHeavyClient::new()),
            config: Arc::new(NodeConfig::default()),
        }
    }

    #[tokio::test]
    async fn genesis_get_object_resolves_through_the_full_stack() {
        let ports = test_ports();
        let head = RecordId::new(PulseNumber::first(), 1);
        let target = RecordRef::new(DomainId::new(0), head);

        let index = throne_models::object::ObjectIndex {
            latest_state: Some(head),
            latest_state_approved: None,
        };
        ports.local_storage.put_index(target, index).await.unwrap();
        let record = throne_models::object::StateRecord {
            state: head,
            prototype: target,
            is_prototype: true,
            child_pointer: None,
            parent: None,
            memory_ref: None,
            deactivated: false,
        };
        ports
            .local_storage
            .put_record(throne_models::JetId::root(), head, record)
            .await
            .unwrap();

        let sorter = Arc::new(Sorter::new(PulseNumber::first()));
        let clock = ExternallyFedClock::new(PulseNumber::first());
        let (manager, commands) =
            start_conveyor_worker(sorter, ports, clock.subscribe(), 16);

        let parcel = Parcel::new(
            Message::GetObject(GetObject {
                head,
                state: None,
                approved: false,
            }),
            PulseNumber::first(),
            None,
            target,
        );

        let adaptor = MessageBusAdaptor::new(commands);
        let reply = adaptor.wrap_message_bus(parcel).await.unwrap();
        assert!(matches!(reply, Reply::Object(_)));

        manager.stop().await.unwrap();
    }
}
