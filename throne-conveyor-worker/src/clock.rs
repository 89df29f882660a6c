// Copyright (c) 2022 Throne Contributors

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use throne_logging::throne_trace;
use throne_models::{ModelsError, PulseNumber};
use tokio::sync::broadcast;

/// Source of strictly increasing pulse numbers. `subscribe` yields a
/// single-producer signal receiving each new pulse; `current` returns the
/// last emitted one. No failure is surfaced locally: a clock that stops
/// ticking is an external alarm condition, not a local error.
pub trait PulseClock: Send + Sync {
    /// Subscribes to the stream of newly emitted pulses.
    fn subscribe(&self) -> broadcast::Receiver<PulseNumber>;

    /// The last pulse this clock emitted.
    fn current(&self) -> PulseNumber;
}

/// Drives pulses at a fixed cadence using the async runtime's own timer.
pub struct TimerPulseClock {
    current: RwLock<PulseNumber>,
    tx: broadcast::Sender<PulseNumber>,
}

impl TimerPulseClock {
    /// Builds a clock starting at `first_pulse`, ticking every
    /// `interval`. Call `run` on a clone to actually drive it.
    pub fn new(first_pulse: PulseNumber, interval: Duration) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(64);
        let _ = interval;
        Arc::new(TimerPulseClock {
            current: RwLock::new(first_pulse),
            tx,
        })
    }

    /// Runs the ticking loop until `stop` resolves. Intended to be spawned
    /// as its own task alongside the conveyor worker.
    pub async fn run(self: Arc<Self>, interval: Duration, stop: impl std::future::Future<Output = ()>) {
        tokio::pin!(stop);
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; discard
        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    if let Err(err) = self.advance() {
                        tracing::warn!(error = %err, "pulse clock failed to advance");
                        break;
                    }
                }
            }
        }
    }

    fn advance(&self) -> Result<PulseNumber, ModelsError> {
        let next = self.current.read().next()?;
        *self.current.write() = next;
        throne_trace!("conveyor.clock.advance", { "pulse": next.as_u64() });
        let _ = self.tx.send(next);
        Ok(next)
    }
}

impl PulseClock for TimerPulseClock {
    fn subscribe(&self) -> broadcast::Receiver<PulseNumber> {
        self.tx.subscribe()
    }

    fn current(&self) -> PulseNumber {
        *self.current.read()
    }
}

/// A clock whose pulses are pushed in by an external driver (e.g. network
/// consensus on pulse timing) rather than a local timer. Useful for tests
/// and for deployments where pulse cadence is decided elsewhere.
pub struct ExternallyFedClock {
    current: RwLock<PulseNumber>,
    tx: broadcast::Sender<PulseNumber>,
}

impl ExternallyFedClock {
    /// Builds a clock starting at `first_pulse` with no ticking of its own.
    pub fn new(first_pulse: PulseNumber) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(64);
        Arc::new(ExternallyFedClock {
            current: RwLock::new(first_pulse),
            tx,
        })
    }

    /// Pushes `pulse` as the next tick. The caller is responsible for
    /// supplying strictly increasing values.
    pub fn push(&self, pulse: PulseNumber) {
        *self.current.write() = pulse;
        let _ = self.tx.send(pulse);
    }
}

impl PulseClock for ExternallyFedClock {
    fn subscribe(&self) -> broadcast::Receiver<PulseNumber> {
        self.tx.subscribe()
    }

    fn current(&self) -> PulseNumber {
        *self.current.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn externally_fed_clock_broadcasts_pushed_pulses() {
        let clock = ExternallyFedClock::new(PulseNumber::new(1));
        let mut rx = clock.subscribe();
        clock.push(PulseNumber::new(2));
        assert_eq!(rx.recv().await.unwrap(), PulseNumber::new(2));
        assert_eq!(clock.current(), PulseNumber::new(2));
    }

    #[tokio::test]
    async fn timer_clock_advance_is_monotonic() {
        let clock = TimerPulseClock::new(PulseNumber::new(0), Duration::from_millis(1));
        let mut rx = clock.subscribe();
        clock.advance().unwrap();
        clock.advance().unwrap();
        assert_eq!(rx.recv().await.unwrap(), PulseNumber::new(1));
        assert_eq!(rx.recv().await.unwrap(), PulseNumber::new(2));
        assert_eq!(clock.current(), PulseNumber::new(2));
    }
}
