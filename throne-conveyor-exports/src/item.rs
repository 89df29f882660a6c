// Copyright (c) 2022 Throne Contributors

use crate::context::HandlerContext;
use crate::event::Event;
use crate::handler::Handler;
use std::sync::{Arc, Mutex};

/// A (context, event, current-handler) triple flowing through a slot. The
/// event is shared across every step an item yields into, since only the
/// terminal step sends a reply; it is wrapped for shared ownership because
/// a single event may fan out into several concurrently-dequeued items
/// when a step yields more than one successor.
pub struct Item {
    /// The handler-chain-local state for this step.
    pub ctx: HandlerContext,
    /// The event this item belongs to; shared with sibling items spawned
    /// from the same `Next` outcome.
    pub event: Arc<Mutex<Event>>,
    /// The step about to run.
    pub handler: Arc<dyn Handler>,
}

impl Item {
    /// Builds the first item for a freshly sorted event.
    pub fn new(ctx: HandlerContext, event: Arc<Mutex<Event>>, handler: Arc<dyn Handler>) -> Self {
        Item { ctx, event, handler }
    }

    /// Builds a successor item inheriting this item's event, under a
    /// (possibly context-migrated) context and a new step.
    pub fn successor(&self, ctx: HandlerContext, handler: Arc<dyn Handler>) -> Self {
        Item {
            ctx,
            event: self.event.clone(),
            handler,
        }
    }
}
