// Copyright (c) 2022 Throne Contributors

use crate::middleware::Middleware;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use throne_conveyor_exports::Item;
use throne_models::PulseNumber;
use tokio::sync::Notify;

/// Which of the three temporal roles a slot currently plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Retired; only `past`-capable handlers may still run here.
    Past,
    /// Live; handlers run directly.
    Present,
    /// Not yet live; handlers without a `future` hook park here.
    Future,
}

/// A queue of in-flight items plus the middleware chain that processes
/// them. `reset` hot-swaps the chain: items already dequeued finish under
/// the chain they started with, items dequeued afterward see the new one.
pub struct Slot {
    role: RwLock<Role>,
    pulse: RwLock<PulseNumber>,
    middleware: RwLock<Arc<dyn Middleware>>,
    queue: Mutex<VecDeque<Item>>,
    /// Fires exactly once, when this slot is promoted by a rotation. The
    /// future middleware parks on this instead of performing unbounded
    /// blocking; promotion is the slot's serialization barrier. Replaced
    /// on every `reset` so a slot reused as `future` gets a fresh token.
    rotation: RwLock<Arc<Notify>>,
}

impl Slot {
    /// Builds a fresh slot with no items, the given role, and the
    /// middleware chain appropriate to it.
    pub fn new(role: Role, pulse: PulseNumber, middleware: Arc<dyn Middleware>) -> Self {
        Slot {
            role: RwLock::new(role),
            pulse: RwLock::new(pulse),
            middleware: RwLock::new(middleware),
            queue: Mutex::new(VecDeque::new()),
            rotation: RwLock::new(Arc::new(Notify::new())),
        }
    }

    /// This slot's current role.
    pub fn role(&self) -> Role {
        *self.role.read()
    }

    /// The pulse this slot is currently bound to.
    pub fn pulse(&self) -> PulseNumber {
        *self.pulse.read()
    }

    /// Enqueues `item` for processing under this slot's current chain.
    pub fn push(&self, item: Item) {
        self.queue.lock().push_back(item);
    }

    /// Dequeues the next item, if any, along with the middleware chain and
    /// rotation signal active at the moment of the call. FIFO within a
    /// slot for items that never suspend.
    pub fn pop(&self) -> Option<(Item, Arc<dyn Middleware>, Arc<Notify>)> {
        let item = self.queue.lock().pop_front()?;
        Some((
            item,
            self.middleware.read().clone(),
            self.rotation.read().clone(),
        ))
    }

    /// True if no items are queued. Used by the shutdown drain.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Drops every queued item without running it. Used when repurposing
    /// a retired `past` slot into a fresh `future` slot.
    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    /// Atomically replaces this slot's role, pulse, and middleware chain,
    /// then signals anything parked on the old rotation token. A fresh
    /// rotation token is installed for the new role.
    pub fn reset(&self, role: Role, pulse: PulseNumber, middleware: Arc<dyn Middleware>) {
        *self.role.write() = role;
        *self.pulse.write() = pulse;
        *self.middleware.write() = middleware;
        let old_rotation = std::mem::replace(&mut *self.rotation.write(), Arc::new(Notify::new()));
        old_rotation.notify_waiters();
    }

    /// The rotation signal future-middleware items park on.
    pub fn rotation_signal(&self) -> Arc<Notify> {
        self.rotation.read().clone()
    }
}
