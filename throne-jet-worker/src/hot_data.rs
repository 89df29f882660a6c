// Copyright (c) 2022 Throne Contributors

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use throne_jet_exports::{HotDataWaiterController, JetError};
use throne_logging::throne_trace;
use throne_models::{JetId, PulseNumber};
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatchState {
    Waiting,
    Ready,
    TimedOut,
}

struct Latch {
    state: Mutex<LatchState>,
    notify: Notify,
}

impl Latch {
    fn new() -> Self {
        Latch {
            state: Mutex::new(LatchState::Waiting),
            notify: Notify::new(),
        }
    }
}

/// Per-(pulse, jet) latch that callers block on until hot data for that
/// shard arrives, the configured deadline elapses, or the pulse is retired.
pub struct HotDataWaiter {
    latches: Mutex<HashMap<(PulseNumber, JetId), Arc<Latch>>>,
    timeout: Duration,
}

impl HotDataWaiter {
    /// Builds a waiter whose unresolved latches time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        HotDataWaiter {
            latches: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    fn latch_for(&self, pulse: PulseNumber, jet: JetId) -> Arc<Latch> {
        self.latches
            .lock()
            .entry((pulse, jet))
            .or_insert_with(|| Arc::new(Latch::new()))
            .clone()
    }
}

#[async_trait]
impl HotDataWaiterController for HotDataWaiter {
    async fn wait(&self, pulse: PulseNumber, jet: JetId) -> Result<(), JetError> {
        let latch = self.latch_for(pulse, jet);
        loop {
            match *latch.state.lock() {
                LatchState::Ready => return Ok(()),
                LatchState::TimedOut => return Err(JetError::HotDataTimeout),
                LatchState::Waiting => {}
            }
            let notified = latch.notify.notified();
            match tokio::time::timeout(self.timeout, notified).await {
                Ok(()) => continue,
                Err(_) => {
                    let mut state = latch.state.lock();
                    if *state == LatchState::Ready {
                        return Ok(());
                    }
                    if *state == LatchState::Waiting {
                        *state = LatchState::TimedOut;
                    }
                    drop(state);
                    latch.notify.notify_waiters();
                    throne_trace!("jet.hot_data.timeout", { "pulse": pulse.as_u64() });
                    return Err(JetError::HotDataTimeout);
                }
            }
        }
    }

    fn mark_ready(&self, pulse: PulseNumber, jet: JetId) {
        let latch = self.latch_for(pulse, jet);
        *latch.state.lock() = LatchState::Ready;
        latch.notify.notify_waiters();
        throne_trace!("jet.hot_data.ready", { "pulse": pulse.as_u64() });
    }

    fn expire_pulse(&self, pulse: PulseNumber) {
        let latches = self.latches.lock();
        for ((latch_pulse, _), latch) in latches.iter() {
            if *latch_pulse != pulse {
                continue;
            }
            let mut state = latch.state.lock();
            if *state == LatchState::Waiting {
                *state = LatchState::TimedOut;
                drop(state);
                latch.notify.notify_waiters();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throne_models::JetId;

    #[tokio::test]
    async fn mark_ready_releases_a_pending_waiter() {
        let waiter = Arc::new(HotDataWaiter::new(Duration::from_secs(5)));
        let pulse = PulseNumber::new(1);
        let jet = JetId::root();

        let task_waiter = waiter.clone();
        let handle = tokio::spawn(async move { task_waiter.wait(pulse, jet).await });

        tokio::task::yield_now().await;
        waiter.mark_ready(pulse, jet);

        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn wait_times_out_when_nothing_arrives() {
        let waiter = HotDataWaiter::new(Duration::from_millis(20));
        let result = waiter.wait(PulseNumber::new(1), JetId::root()).await;
        assert!(matches!(result, Err(JetError::HotDataTimeout)));
    }

    #[tokio::test]
    async fn expire_pulse_releases_waiters_with_an_error() {
        let waiter = Arc::new(HotDataWaiter::new(Duration::from_secs(5)));
        let pulse = PulseNumber::new(7);
        let jet = JetId::root();

        let task_waiter = waiter.clone();
        let handle = tokio::spawn(async move { task_waiter.wait(pulse, jet).await });

        tokio::task::yield_now().await;
        waiter.expire_pulse(pulse);

        assert!(matches!(handle.await.unwrap(), Err(JetError::HotDataTimeout)));
    }

    #[tokio::test]
    async fn ready_before_wait_is_observed_immediately() {
        let waiter = HotDataWaiter::new(Duration::from_secs(5));
        let pulse = PulseNumber::new(3);
        let jet = JetId::root();
        waiter.mark_ready(pulse, jet);
        assert!(waiter.wait(pulse, jet).await.is_ok());
    }
}
