// Copyright (c) 2022 Throne Contributors

use crate::error::ConveyorError;
use throne_models::{Parcel, Reply};
use tokio::sync::oneshot;

/// Wraps a parcel with its reply sink. Created by the adaptor when a
/// caller submits a parcel; the sink accepts at most one send.
pub struct Event {
    parcel: Parcel,
    reply_tx: Option<oneshot::Sender<Reply>>,
}

impl Event {
    /// Builds a new event for `parcel`, returning it together with the
    /// receiving half of its reply channel.
    pub fn new(parcel: Parcel) -> (Self, oneshot::Receiver<Reply>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        (
            Event {
                parcel,
                reply_tx: Some(reply_tx),
            },
            reply_rx,
        )
    }

    /// The parcel this event wraps.
    pub fn parcel(&self) -> &Parcel {
        &self.parcel
    }

    /// Sends `reply` on this event's sink. Fails with `ReplyAlreadySent` if
    /// a reply was already sent, upholding the send-once invariant.
    pub fn send(&mut self, reply: Reply) -> Result<(), ConveyorError> {
        let tx = self.reply_tx.take().ok_or(ConveyorError::ReplyAlreadySent)?;
        tx.send(reply).map_err(|_| {
            ConveyorError::SendChannelError("event reply receiver dropped".to_string())
        })
    }
}
