// Copyright (c) 2022 Throne Contributors

use super::get_object::GetObjectHandler;
use super::wait_for_hot::WaitForHotHandler;
use async_trait::async_trait;
use std::sync::Arc;
use throne_conveyor_exports::{Handler, HandlerContext, HandlerOutcome, Ports};
use throne_logging::throne_trace;
use throne_models::{JetId, Reply};

/// First step of the `GetObject` pipeline: binds the item to a jet and
/// redirects the caller with `JetMiss` if this node is not that jet's
/// current light executor. Genesis parcels bind to the root jet
/// unconditionally; delegated parcels (carrying a token from a previous
/// redirect) resolve their jet at the message's delegated target pulse and
/// are never redirected a second time.
pub struct CheckJetHandler;

#[async_trait]
impl Handler for CheckJetHandler {
    fn name(&self) -> &'static str {
        "check_jet"
    }

    async fn handle(&self, ctx: &mut HandlerContext, ports: &Ports) -> HandlerOutcome {
        if ctx.parcel.pulse().is_first() {
            throne_trace!("conveyor.check_jet.genesis");
            ctx.jet = Some(JetId::root());
            return HandlerOutcome::yield_to(Arc::new(WaitForHotHandler));
        }

        if ctx.parcel.is_delegated() {
            let target_pulse = ctx.parcel.message().delegated_target_pulse();
            let record = ctx.parcel.message().default_record();
            let (jet, actual) = ports.jet_store.for_id(target_pulse, record);
            if !actual {
                ports.jet_store.update(jet, target_pulse);
            }
            throne_trace!("conveyor.check_jet.delegated", { "jet": jet.to_string() });
            ctx.jet = Some(jet);
            return HandlerOutcome::yield_to(Arc::new(GetObjectHandler));
        }

        let record = ctx.parcel.message().default_record();
        let (jet, actual) = ports.jet_store.for_id(ctx.pulse, record);
        if !actual {
            ports.jet_store.update(jet, ctx.pulse);
        }

        let executor = ports.jet_coordinator.light_executor_for_jet(jet, ctx.pulse);
        if executor != ports.jet_coordinator.me() {
            throne_trace!("conveyor.check_jet.miss", { "jet": jet.to_string() });
            return HandlerOutcome::Reply(Reply::jet_miss(jet));
        }

        ctx.jet = Some(jet);
        HandlerOutcome::yield_to(Arc::new(WaitForHotHandler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heavy_client::StaticHeavyClient;
    use crate::storage::InMemoryLocalStorage;
    use std::time::Duration;
    use throne_conveyor_exports::NodeConfig;
    use throne_jet_worker::{HotDataWaiter, JetCoordinator, JetTree};
    use throne_models::message::{GetObject, Message};
    use throne_models::reference::DomainId;
    use throne_models::{NodeRef, Parcel, PulseNumber, RecordId, RecordRef};

    fn ports_with(me: NodeRef, light_nodes: Vec<NodeRef>) -> Ports {
        Ports {
            jet_store: Arc::new(JetTree::new()),
            jet_coordinator: Arc::new(JetCoordinator::new(me, light_nodes, vec![], 1_000)),
            hot_data: Arc::new(HotDataWaiter::new(Duration::from_millis(20))),
            local_storage: Arc::new(InMemoryLocalStorage::new()),
            heavy_client: Arc::new(StaticHeavyClient::new()),
            config: Arc::new(NodeConfig::default()),
        }
    }

    fn sample_parcel(pulse: PulseNumber) -> Parcel {
        let head = RecordId::new(pulse, 9);
        let target = RecordRef::new(DomainId::new(0), head);
        Parcel::new(
            Message::GetObject(GetObject {
                head,
                state: None,
                approved: false,
            }),
            pulse,
            None,
            target,
        )
    }

    #[tokio::test]
    async fn redirects_with_jet_miss_when_this_node_is_not_the_executor() {
        let me = NodeRef::new(1);
        let other = NodeRef::new(2);
        let ports = ports_with(me, vec![other]);
        let parcel = sample_parcel(PulseNumber::new(50));
        let mut ctx = HandlerContext::new(PulseNumber::new(50), parcel);

        let outcome = CheckJetHandler.handle(&mut ctx, &ports).await;

        assert!(matches!(
            outcome,
            HandlerOutcome::Reply(Reply::JetMiss { .. })
        ));
    }

    #[tokio::test]
    async fn genesis_parcels_bind_to_root_jet_and_proceed() {
        let me = NodeRef::new(1);
        let ports = ports_with(me, vec![me]);
        let parcel = sample_parcel(PulseNumber::first());
        let mut ctx = HandlerContext::new(PulseNumber::first(), parcel);

        let outcome = CheckJetHandler.handle(&mut ctx, &ports).await;

        assert_eq!(ctx.jet, Some(JetId::root()));
        assert!(matches!(outcome, HandlerOutcome::Next(_)));
    }
}
