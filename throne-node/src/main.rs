// Copyright (c) 2022 Throne Contributors

use std::sync::Arc;
use throne_conveyor_exports::{LocalStorageController, NodeConfig};
use throne_conveyor_worker::{
    start_conveyor_worker, InMemoryLocalStorage, MessageBusAdaptor, PulseClock, Sorter,
    StaticHeavyClient, TimerPulseClock,
};
use throne_jet_worker::{HotDataWaiter, JetCoordinator, JetTree};
use throne_models::message::{GetObject, Message};
use throne_models::object::{ObjectIndex, StateRecord};
use throne_models::reference::DomainId;
use throne_models::{JetId, NodeRef, Parcel, PulseNumber, Reply, RecordId, RecordRef};
use tracing::info;

/// Boots a single-node light-material deployment: one node plays light
/// executor and heavy custodian for every jet, so the pipeline exercises
/// the full `CheckJet` -> `WaitForHot` -> `GetObject` chain without needing
/// a real network of peers. Bootstrapping a multi-node cluster from
/// configuration is out of scope; this wiring is the demo/reference
/// entry point the ports are built for.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::default();
    let me = NodeRef::new(0);
    let local_storage = Arc::new(InMemoryLocalStorage::new());

    let ports = throne_conveyor_exports::Ports {
        jet_store: Arc::new(JetTree::new()),
        jet_coordinator: Arc::new(JetCoordinator::new(me, vec![me], vec![me], 1_000)),
        hot_data: Arc::new(HotDataWaiter::new(config.jet.hot_data_timeout)),
        local_storage: local_storage.clone(),
        heavy_client: Arc::new(StaticHeavyClient::new()),
        config: Arc::new(config.clone()),
    };

    // Seed a genesis object so the demo has something to fetch once the
    // worker is up; real bootstrapping of the first pulse's state is out
    // of scope.
    let genesis_head = RecordId::new(PulseNumber::first(), 0);
    let genesis_target = RecordRef::new(DomainId::new(0), genesis_head);
    local_storage
        .put_index(
            genesis_target,
            ObjectIndex {
                latest_state: Some(genesis_head),
                latest_state_approved: None,
            },
        )
        .await
        .expect("seeding the genesis index");
    local_storage
        .put_record(
            JetId::root(),
            genesis_head,
            StateRecord {
                state: genesis_head,
                prototype: genesis_target,
                is_prototype: true,
                child_pointer: None,
                parent: None,
                memory_ref: None,
                deactivated: false,
            },
        )
        .await
        .expect("seeding the genesis record");

    let sorter = Arc::new(Sorter::new(PulseNumber::first()));
    let clock = TimerPulseClock::new(PulseNumber::first(), config.pulse_interval);
    let pulse_rx = clock.subscribe();

    let (manager, commands) =
        start_conveyor_worker(sorter, ports, pulse_rx, config.channel_capacity);
    let adaptor = MessageBusAdaptor::new(commands);

    let clock_for_run = clock.clone();
    let clock_handle = tokio::spawn(async move {
        clock_for_run
            .run(config.pulse_interval, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
    });

    let genesis_parcel = Parcel::new(
        Message::GetObject(GetObject {
            head: genesis_head,
            state: None,
            approved: false,
        }),
        PulseNumber::first(),
        None,
        genesis_target,
    );
    match adaptor.wrap_message_bus(genesis_parcel).await {
        Ok(Reply::Object(obj)) => info!(head = %obj.head, "fetched the seeded genesis object"),
        Ok(other) => tracing::warn!(reply = ?other, "unexpected reply fetching the genesis object"),
        Err(err) => tracing::warn!(error = %err, "failed to fetch the genesis object"),
    }

    info!("throne node started, waiting for shutdown signal");
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");

    let _ = clock_handle.await;
    if let Err(err) = manager.stop().await {
        tracing::warn!(error = %err, "conveyor worker did not shut down cleanly");
    }
}
