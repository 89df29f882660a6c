// Copyright (c) 2022 Throne Contributors

use crate::error::ConveyorError;
use throne_logging::throne_trace;
use throne_models::{Parcel, PulseNumber, Reply};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Commands accepted by the conveyor worker's run loop.
pub enum ConveyorCommand {
    /// Submit a parcel for processing; the worker replies on `response_tx`
    /// once the handler pipeline it starts completes.
    SubmitParcel {
        /// The parcel to process.
        parcel: Parcel,
        /// Where the eventual reply is sent.
        response_tx: oneshot::Sender<Reply>,
    },
    /// Advance the sorter to `pulse`, rotating slots.
    Pulse(PulseNumber),
}

/// Management-plane commands, handled out of band from the item stream.
pub enum ConveyorManagementCommand {
    /// Ask the worker to drain in-flight items and stop.
    Stop,
}

/// Handle for submitting work to a running conveyor worker.
#[derive(Clone)]
pub struct ConveyorCommandSender(pub mpsc::Sender<ConveyorCommand>);

impl ConveyorCommandSender {
    /// Submits `parcel` and awaits its reply, mirroring the synchronous
    /// contract `wrap_message_bus` exposes to external callers.
    pub async fn submit_parcel(&self, parcel: Parcel) -> Result<Reply, ConveyorError> {
        let (response_tx, response_rx) = oneshot::channel();
        throne_trace!("conveyor.command.submit_parcel");
        self.0
            .send(ConveyorCommand::SubmitParcel {
                parcel,
                response_tx,
            })
            .await
            .map_err(|_| {
                ConveyorError::SendChannelError("send error conveyor command submit_parcel".into())
            })?;
        response_rx.await.map_err(|_| {
            ConveyorError::ReceiveChannelError(
                "conveyor command submit_parcel response read error".into(),
            )
        })
    }

    /// Notifies the worker that the clock has advanced to `pulse`.
    pub async fn pulse(&self, pulse: PulseNumber) -> Result<(), ConveyorError> {
        throne_trace!("conveyor.command.pulse", { "pulse": pulse.as_u64() });
        self.0.send(ConveyorCommand::Pulse(pulse)).await.map_err(|_| {
            ConveyorError::SendChannelError("send error conveyor command pulse".into())
        })
    }
}

/// Owns the worker's join handle and its management channel, letting the
/// caller stop it cleanly.
pub struct ConveyorManager {
    /// The worker task's join handle.
    pub join_handle: JoinHandle<Result<(), ConveyorError>>,
    /// Sender for management-plane commands.
    pub manager_tx: mpsc::Sender<ConveyorManagementCommand>,
}

impl ConveyorManager {
    /// Asks the worker to stop and waits for it to finish draining.
    pub async fn stop(self) -> Result<(), ConveyorError> {
        throne_trace!("conveyor.command.stop");
        let _ = self.manager_tx.send(ConveyorManagementCommand::Stop).await;
        self.join_handle.await.map_err(|_| {
            ConveyorError::ReceiveChannelError("conveyor worker task panicked".into())
        })?
    }
}
