// Copyright (c) 2022 Throne Contributors

use crate::handlers::CheckJetHandler;
use crate::middleware::Middleware;
use crate::slot::Slot;
use crate::sorter::Sorter;
use parking_lot::RwLock;
use std::sync::Arc;
use throne_conveyor_exports::{
    ConveyorCommand, ConveyorError, ConveyorManagementCommand, ConveyorState, Ports,
};
use throne_logging::throne_trace;
use throne_models::PulseNumber;
use tokio::sync::{broadcast, mpsc, Notify};
use tracing::{info, warn};

/// The conveyor's cooperative run loop. Owns the sorter and drives pulses
/// into it, but never awaits an individual item's processing inline: every
/// dequeued item is handed to its own spawned task, so one item parked in
/// `WaitForHot` or the future slot cannot stall the rest.
pub struct ConveyorWorker {
    sorter: Arc<Sorter>,
    ports: Ports,
    state: RwLock<ConveyorState>,
    command_rx: mpsc::Receiver<ConveyorCommand>,
    manager_rx: mpsc::Receiver<ConveyorManagementCommand>,
    pulse_rx: broadcast::Receiver<PulseNumber>,
    work_notify: Arc<Notify>,
}

impl ConveyorWorker {
    /// Builds a worker around `sorter`, consuming commands from
    /// `command_rx`/`manager_rx` and pulses from `pulse_rx`.
    pub fn new(
        sorter: Arc<Sorter>,
        ports: Ports,
        command_rx: mpsc::Receiver<ConveyorCommand>,
        manager_rx: mpsc::Receiver<ConveyorManagementCommand>,
        pulse_rx: broadcast::Receiver<PulseNumber>,
    ) -> Self {
        ConveyorWorker {
            sorter,
            ports,
            state: RwLock::new(ConveyorState::Active),
            command_rx,
            manager_rx,
            pulse_rx,
            work_notify: Arc::new(Notify::new()),
        }
    }

    /// The worker's run loop. Consumed by value; returns once a `Stop`
    /// management command has drained every in-flight item.
    pub async fn run_loop(mut self) -> Result<(), ConveyorError> {
        info!("conveyor worker started");
        self.drain_ready();
        loop {
            /*
                We choose this order for the same reason the underlying
                platform orders its own run loop this way:
                    * manager commands: low freq, must not wait behind work
                    * pulse ticks: rotate promptly, everything else depends on it
                    * submitted parcels / pulse commands: respond quickly
                    * work notifications: high freq, drains whatever is ready
            */
            tokio::select! {
                biased;

                cmd = self.manager_rx.recv() => {
                    throne_trace!("conveyor.worker.run_loop.select.manager");
                    match cmd {
                        None | Some(ConveyorManagementCommand::Stop) => break,
                    }
                }

                pulse = self.pulse_rx.recv() => {
                    throne_trace!("conveyor.worker.run_loop.select.pulse_tick");
                    match pulse {
                        Ok(pulse) => self.apply_pulse(pulse).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "conveyor worker lagged behind the pulse clock");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                    self.drain_ready();
                }

                cmd = self.command_rx.recv() => {
                    throne_trace!("conveyor.worker.run_loop.select.command");
                    match cmd {
                        None => break,
                        Some(ConveyorCommand::SubmitParcel { parcel, response_tx }) => {
                            let target_pulse = parcel.pulse();
                            let reply_rx = self.sorter.sort(
                                parcel,
                                target_pulse,
                                Arc::new(CheckJetHandler),
                            );
                            tokio::spawn(async move {
                                if let Ok(reply) = reply_rx.await {
                                    let _ = response_tx.send(reply);
                                }
                            });
                        }
                        Some(ConveyorCommand::Pulse(pulse)) => self.apply_pulse(pulse).await,
                    }
                    self.drain_ready();
                }

                _ = self.work_notify.notified() => {
                    throne_trace!("conveyor.worker.run_loop.select.work_notify");
                    self.drain_ready();
                }
            }
        }

        *self.state.write() = ConveyorState::ShuttingDown;
        while !self.sorter.present().is_empty()
            || !self.sorter.future().is_empty()
            || !self.sorter.past().is_empty()
        {
            self.drain_ready();
            tokio::task::yield_now().await;
        }
        *self.state.write() = ConveyorState::Inactive;
        info!("conveyor worker stopped");
        Ok(())
    }

    /// The worker's own view of its lifecycle state.
    pub fn state(&self) -> ConveyorState {
        *self.state.read()
    }

    async fn apply_pulse(&self, new_pulse: PulseNumber) {
        *self.state.write() = ConveyorState::PreparingPulse;
        let retiring_pulse = self.sorter.present().pulse();
        throne_trace!("conveyor.worker.apply_pulse", { "pulse": new_pulse.as_u64() });
        self.sorter.on_pulse(new_pulse).await;
        self.ports.hot_data.expire_pulse(retiring_pulse);
        *self.state.write() = ConveyorState::Active;
    }

    fn drain_ready(&self) {
        for slot in [self.sorter.past(), self.sorter.present(), self.sorter.future()] {
            while let Some((item, middleware, _rotation)) = slot.pop() {
                self.spawn_item(item, middleware, slot.clone());
            }
        }
    }

    fn spawn_item(
        &self,
        item: throne_conveyor_exports::Item,
        middleware: Arc<dyn Middleware>,
        slot: Arc<Slot>,
    ) {
        let ports = self.ports.clone();
        let work_notify = self.work_notify.clone();
        tokio::spawn(async move {
            let successors = middleware.process(item, &ports, &slot).await;
            if !successors.is_empty() {
                for successor in successors {
                    slot.push(successor);
                }
                work_notify.notify_one();
            }
        });
    }
}
