// Copyright (c) 2022 Throne Contributors

use super::get_object::GetObjectHandler;
use async_trait::async_trait;
use std::sync::Arc;
use throne_conveyor_exports::{ConveyorError, Handler, HandlerContext, HandlerOutcome, Ports};
use throne_logging::throne_trace;

/// Second step of the `GetObject` pipeline: suspends until the jet's
/// hot-data handoff from the previous executor has arrived. Skipped for
/// genesis and delegated parcels, which by construction do not depend on a
/// handoff: genesis has no previous executor, and a delegated parcel is
/// already being served by the jet's executor a second time.
pub struct WaitForHotHandler;

#[async_trait]
impl Handler for WaitForHotHandler {
    fn name(&self) -> &'static str {
        "wait_for_hot"
    }

    async fn handle(&self, ctx: &mut HandlerContext, ports: &Ports) -> HandlerOutcome {
        if ctx.parcel.pulse().is_first() || ctx.parcel.is_delegated() {
            return HandlerOutcome::yield_to(Arc::new(GetObjectHandler));
        }

        let jet = match ctx.jet {
            Some(jet) => jet,
            None => return HandlerOutcome::Fail(ConveyorError::InvalidMessage),
        };

        throne_trace!("conveyor.wait_for_hot.wait", {
            "pulse": ctx.pulse.as_u64(),
            "jet": jet.to_string()
        });

        match ports.hot_data.wait(ctx.pulse, jet).await {
            Ok(()) => HandlerOutcome::yield_to(Arc::new(GetObjectHandler)),
            Err(_) => HandlerOutcome::Fail(ConveyorError::HotDataTimeout),
        }
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
    use throne_models::{JetId, NodeRef, Parcel, PulseNumber, RecordId, RecordRef};

    fn ports_with(timeout: Duration) -> Ports {
        let me = NodeRef::new(1);
        Ports {
            jet_store: Arc::new(JetTree::new()),
            jet_coordinator: Arc::new(JetCoordinator::new(me, vec![me], vec![], 1_000)),
            hot_data: Arc::new(HotDataWaiter::new(timeout)),
            local_storage: Arc::new(InMemoryLocalStorage::new()),
            heavy_client: Arc::new(StaticHeavyClient::new()),
            config: Arc::new(NodeConfig::default()),
        }
    }

    fn sample_ctx(pulse: PulseNumber, jet: Option<JetId>) -> HandlerContext {
        let head = RecordId::new(pulse, 9);
        let target = RecordRef::new(DomainId::new(0), head);
        let parcel = Parcel::new(
            Message::GetObject(GetObject {
                head,
                state: None,
                approved: false,
            }),
            pulse,
            None,
            target,
        );
        let mut ctx = HandlerContext::new(pulse, parcel);
        ctx.jet = jet;
        ctx
    }

    #[tokio::test]
    async fn times_out_when_hot_data_never_arrives() {
        let ports = ports_with(Duration::from_millis(10));
        let mut ctx = sample_ctx(PulseNumber::new(50), Some(JetId::root()));

        let outcome = WaitForHotHandler.handle(&mut ctx, &ports).await;

        assert!(matches!(
            outcome,
            HandlerOutcome::Fail(ConveyorError::HotDataTimeout)
        ));
    }

    #[tokio::test]
    async fn proceeds_immediately_once_hot_data_is_marked_ready() {
        let ports = ports_with(Duration::from_secs(5));
        ports.hot_data.mark_ready(PulseNumber::new(50), JetId::root());
        let mut ctx = sample_ctx(PulseNumber::new(50), Some(JetId::root()));

        let outcome = WaitForHotHandler.handle(&mut ctx, &ports).await;

        assert!(matches!(outcome, HandlerOutcome::Next(_)));
    }

    #[tokio::test]
    async fn genesis_parcels_skip_the_wait() {
        let ports = ports_with(Duration::from_millis(10));
        let mut ctx = sample_ctx(PulseNumber::first(), Some(JetId::root()));

        let outcome = WaitForHotHandler.handle(&mut ctx, &ports).await;

        assert!(matches!(outcome, HandlerOutcome::Next(_)));
    }
}
