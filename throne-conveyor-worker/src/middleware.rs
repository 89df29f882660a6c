// Copyright (c) 2022 Throne Contributors

use crate::slot::Slot;
use async_trait::async_trait;
use throne_conveyor_exports::{ConveyorError, HandlerContext, HandlerOutcome, Item, Ports};
use throne_models::Reply;

async fn finish(item: &Item, ctx: HandlerContext, outcome: HandlerOutcome) -> Vec<Item> {
    match outcome {
        HandlerOutcome::Next(handlers) => {
            let final_ctx = item.handler.context(&ctx).unwrap_or(ctx);
            handlers
                .into_iter()
                .map(|next| item.successor(final_ctx.clone(), next))
                .collect()
        }
        HandlerOutcome::Reply(reply) => {
            reply_once(item, reply);
            Vec::new()
        }
        HandlerOutcome::Fail(err) => {
            reply_once(item, Reply::error(err.as_error_kind()));
            Vec::new()
        }
    }
}

fn reply_once(item: &Item, reply: Reply) {
    if let Ok(mut event) = item.event.lock() {
        let _ = event.send(reply);
    }
}

/// A slot's installed processing chain. The outermost layer is always the
/// transport-level `Provide` wiring handled by the worker itself (which
/// supplies `ports`); a `Middleware` implementation is the role-specific
/// behavior described in the component design: present, future, past, or
/// inactive.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Runs `item`'s current step under this middleware's role, returning
    /// any successor items to requeue onto `slot`. An empty result means
    /// the item completed (replied or failed) or was intentionally parked.
    async fn process(&self, item: Item, ports: &Ports, slot: &Slot) -> Vec<Item>;
}

/// Calls `handler.handle` directly.
pub struct PresentMiddleware;

#[async_trait]
impl Middleware for PresentMiddleware {
    async fn process(&self, item: Item, ports: &Ports, _slot: &Slot) -> Vec<Item> {
        let mut ctx = item.ctx.clone();
        let outcome = item.handler.handle(&mut ctx, ports).await;
        finish(&item, ctx, outcome).await
    }
}

/// Calls `handler.future` if implemented; otherwise parks the item until
/// the slot is promoted, then migrates it to the new pulse and lets the
/// worker re-dequeue it under whatever chain replaced this one.
pub struct FutureMiddleware;

#[async_trait]
impl Middleware for FutureMiddleware {
    async fn process(&self, item: Item, ports: &Ports, slot: &Slot) -> Vec<Item> {
        let mut ctx = item.ctx.clone();
        if let Some(outcome) = item.handler.future(&mut ctx, ports).await {
            return finish(&item, ctx, outcome).await;
        }
        let rotation = slot.rotation_signal();
        rotation.notified().await;
        let mut migrated = item.ctx.clone();
        migrated.migrate_to(slot.pulse());
        vec![item.successor(migrated, item.handler.clone())]
    }
}

/// Calls `handler.past` if implemented; otherwise fails with
/// `NoPastHandler`.
pub struct PastMiddleware;

#[async_trait]
impl Middleware for PastMiddleware {
    async fn process(&self, item: Item, ports: &Ports, _slot: &Slot) -> Vec<Item> {
        let mut ctx = item.ctx.clone();
        match item.handler.past(&mut ctx, ports).await {
            Some(outcome) => finish(&item, ctx, outcome).await,
            None => {
                reply_once(&item, Reply::error(ConveyorError::NoPastHandler.as_error_kind()));
                Vec::new()
            }
        }
    }
}

/// Installed on the oldest slot at rotation; fails every item it sees.
pub struct InactiveMiddleware;

#[async_trait]
impl Middleware for InactiveMiddleware {
    async fn process(&self, item: Item, _ports: &Ports, _slot: &Slot) -> Vec<Item> {
        reply_once(&item, Reply::error(ConveyorError::InactiveSlot.as_error_kind()));
        Vec::new()
    }
}
