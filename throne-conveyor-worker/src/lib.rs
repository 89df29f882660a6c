// Copyright (c) 2022 Throne Contributors

#![warn(missing_docs)]

//! Concrete implementation of the three-slot, pulse-driven conveyor: the
//! slots themselves, the per-role middleware chains that process them, the
//! sorter that owns and rotates them, the pulse clocks that drive rotation,
//! the representative `GetObject` handler pipeline, and the cooperative
//! worker loop and external adaptor that tie everything to a command
//! channel.

pub mod adaptor;
pub mod clock;
pub mod handlers;
pub mod heavy_client;
pub mod middleware;
pub mod slot;
pub mod sorter;
pub mod storage;
pub mod worker;

pub use adaptor::MessageBusAdaptor;
pub use clock::{ExternallyFedClock, PulseClock, TimerPulseClock};
pub use heavy_client::StaticHeavyClient;
pub use middleware::Middleware;
pub use slot::{Role, Slot};
pub use sorter::Sorter;
pub use storage::InMemoryLocalStorage;
pub use worker::ConveyorWorker;

use std::sync::Arc;
use throne_conveyor_exports::{
    ConveyorCommand, ConveyorCommandSender, ConveyorManagementCommand, ConveyorManager, Ports,
};
use throne_models::PulseNumber;
use tokio::sync::{broadcast, mpsc};

/// Wires a fresh command channel and management channel to a
/// [`ConveyorWorker`] built around `sorter` and `ports`, spawns its run
/// loop, and returns the handles external callers use to submit parcels
/// and to stop it.
pub fn start_conveyor_worker(
    sorter: Arc<Sorter>,
    ports: Ports,
    pulse_rx: broadcast::Receiver<PulseNumber>,
    channel_capacity: usize,
) -> (ConveyorManager, ConveyorCommandSender) {
    let (command_tx, command_rx) = mpsc::channel::<ConveyorCommand>(channel_capacity);
    let (manager_tx, manager_rx) = mpsc::channel::<ConveyorManagementCommand>(8);

    let worker = ConveyorWorker::new(sorter, ports, command_rx, manager_rx, pulse_rx);
    let join_handle = tokio::spawn(worker.run_loop());

    (
        ConveyorManager {
            join_handle,
            manager_tx,
        },
        ConveyorCommandSender(command_tx),
    )
}
