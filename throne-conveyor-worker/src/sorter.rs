// Copyright (c) 2022 Throne Contributors

use crate::middleware::{FutureMiddleware, InactiveMiddleware, PastMiddleware, PresentMiddleware};
use crate::slot::{Role, Slot};
use parking_lot::RwLock;
use std::sync::{Arc, Mutex};
use throne_conveyor_exports::{Event, Handler, HandlerContext, Item};
use throne_logging::throne_trace;
use throne_models::{Parcel, PulseNumber};
use tokio::sync::Mutex as AsyncMutex;

/// Owns the three temporal slots, routes incoming parcels to the right
/// one, and rotates them on every pulse tick. The three `Slot` containers
/// are fixed for the Sorter's lifetime; rotation relabels which container
/// plays which role rather than allocating new ones, except for the slot
/// being repurposed into a fresh `future`, whose queue is cleared.
pub struct Sorter {
    past: RwLock<Arc<Slot>>,
    present: RwLock<Arc<Slot>>,
    future: RwLock<Arc<Slot>>,
    /// Serializes `on_pulse` against itself; dequeues are unaffected since
    /// slots are read independently, but overlapping rotations would race.
    rotation_lock: AsyncMutex<()>,
}

impl Sorter {
    /// Builds a sorter with past/present/future bound to the pulse before
    /// `first_pulse`, `first_pulse` itself, and the pulse after it.
    pub fn new(first_pulse: PulseNumber) -> Self {
        let past_pulse = PulseNumber::new(first_pulse.as_u64().saturating_sub(1));
        let future_pulse = first_pulse.next().unwrap_or(first_pulse);

        let past = Arc::new(Slot::new(Role::Past, past_pulse, Arc::new(PastMiddleware)));
        let present = Arc::new(Slot::new(
            Role::Present,
            first_pulse,
            Arc::new(PresentMiddleware),
        ));
        let future = Arc::new(Slot::new(Role::Future, future_pulse, Arc::new(FutureMiddleware)));

        Sorter {
            past: RwLock::new(past),
            present: RwLock::new(present),
            future: RwLock::new(future),
            rotation_lock: AsyncMutex::new(()),
        }
    }

    /// The slot currently playing `Present`.
    pub fn present(&self) -> Arc<Slot> {
        self.present.read().clone()
    }

    /// The slot currently playing `Future`.
    pub fn future(&self) -> Arc<Slot> {
        self.future.read().clone()
    }

    /// The slot currently playing `Past`.
    pub fn past(&self) -> Arc<Slot> {
        self.past.read().clone()
    }

    /// Routes `parcel` to the slot matching `target_pulse`, builds its
    /// event and initial item (`init_handler` is the representative
    /// pipeline's first step), enqueues the item, and returns the event's
    /// reply receiver for the adaptor to await.
    pub fn sort(
        &self,
        parcel: Parcel,
        target_pulse: PulseNumber,
        init_handler: Arc<dyn Handler>,
    ) -> tokio::sync::oneshot::Receiver<throne_models::Reply> {
        let past = self.past();
        let present = self.present();
        let future = self.future();

        let slot = if target_pulse <= past.pulse() {
            past
        } else if target_pulse >= future.pulse() {
            future
        } else {
            present
        };

        throne_trace!("conveyor.sorter.sort", {
            "target_pulse": target_pulse.as_u64(),
            "slot_pulse": slot.pulse().as_u64()
        });

        let ctx = HandlerContext::new(slot.pulse(), parcel);
        let (event, reply_rx) = Event::new(ctx.parcel.clone());
        let item = Item::new(ctx, Arc::new(Mutex::new(event)), init_handler);
        slot.push(item);
        reply_rx
    }

    /// Atomically rotates the three slots for the arrival of `new_pulse`:
    /// the current `past` is retired (`Inactive`), `present` is promoted
    /// to `past`, `future` is promoted to `present`, and the just-retired
    /// container is cleared and reinstalled as a fresh `future`.
    pub async fn on_pulse(&self, new_pulse: PulseNumber) {
        let _guard = self.rotation_lock.lock().await;
        throne_trace!("conveyor.sorter.on_pulse", { "pulse": new_pulse.as_u64() });

        let old_past = self.past();
        let old_present = self.present();
        let old_future = self.future();

        old_past.reset(Role::Past, old_past.pulse(), Arc::new(InactiveMiddleware));

        old_present.reset(Role::Past, old_present.pulse(), Arc::new(PastMiddleware));
        old_future.reset(Role::Present, new_pulse, Arc::new(PresentMiddleware));

        old_past.clear();
        let fresh_future_pulse = new_pulse.next().unwrap_or(new_pulse);
        old_past.reset(Role::Future, fresh_future_pulse, Arc::new(FutureMiddleware));

        *self.past.write() = old_present;
        *self.present.write() = old_future;
        *self.future.write() = old_past;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use throne_conveyor_exports::{HandlerContext as Ctx, HandlerOutcome, Ports};
    use throne_models::message::{GetObject, Message};
    use throne_models::reference::DomainId;
    use throne_models::{RecordId, RecordRef};

    struct JetMissHandler;

    #[async_trait]
    impl Handler for JetMissHandler {
        fn name(&self) -> &'static str {
            "jet_miss_handler"
        }
        async fn handle(&self, _ctx: &mut Ctx, _ports: &Ports) -> HandlerOutcome {
            HandlerOutcome::Reply(throne_models::Reply::jet_miss(throne_models::JetId::root()))
        }
    }

    fn sample_parcel(origin_pulse: PulseNumber) -> Parcel {
        let head = RecordId::new(origin_pulse, 1);
        let target = RecordRef::new(DomainId::new(0), head);
        Parcel::new(
            Message::GetObject(GetObject {
                head,
                state: None,
                approved: false,
            }),
            origin_pulse,
            None,
            target,
        )
    }

    #[test]
    fn new_binds_past_present_and_future_to_adjacent_pulses() {
        let sorter = Sorter::new(PulseNumber::new(100));
        assert_eq!(sorter.present().pulse(), PulseNumber::new(100));
        assert_eq!(sorter.future().pulse(), PulseNumber::new(101));
        assert_eq!(sorter.past().pulse(), PulseNumber::new(99));
    }

    #[tokio::test]
    async fn sort_routes_a_present_pulse_parcel_into_the_present_slot() {
        let sorter = Sorter::new(PulseNumber::new(100));
        let parcel = sample_parcel(PulseNumber::new(100));
        let _reply_rx = sorter.sort(parcel, PulseNumber::new(100), Arc::new(JetMissHandler));
        assert!(!sorter.present().is_empty());
        assert!(sorter.future().is_empty());
        assert!(sorter.past().is_empty());
    }

    #[tokio::test]
    async fn sort_routes_a_future_pulse_parcel_into_the_future_slot() {
        let sorter = Sorter::new(PulseNumber::new(100));
        let parcel = sample_parcel(PulseNumber::new(100));
        let _reply_rx = sorter.sort(parcel, PulseNumber::new(101), Arc::new(JetMissHandler));
        assert!(sorter.present().is_empty());
        assert!(!sorter.future().is_empty());
    }

    #[tokio::test]
    async fn on_pulse_rotates_roles_and_clears_the_new_future() {
        let sorter = Sorter::new(PulseNumber::new(100));
        let old_present = sorter.present();
        let old_future = sorter.future();

        sorter.on_pulse(PulseNumber::new(101)).await;

        assert_eq!(sorter.present().pulse(), PulseNumber::new(101));
        assert!(Arc::ptr_eq(&sorter.present(), &old_future));
        assert!(Arc::ptr_eq(&sorter.past(), &old_present));
        assert_eq!(sorter.future().pulse(), PulseNumber::new(102));
        assert!(sorter.future().is_empty());
    }
}
