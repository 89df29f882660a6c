// Copyright (c) 2022 Throne Contributors

use crate::context::HandlerContext;
use crate::error::ConveyorError;
use crate::ports::Ports;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use throne_models::Reply;

/// What a handler step produced. Replaces panic-as-control-flow: every
/// outcome is a tagged value the worker acts on, never a thrown exception.
pub enum HandlerOutcome {
    /// Continue the item with these successor steps, executed in order.
    Next(Vec<Arc<dyn Handler>>),
    /// Terminate the item, delivering `reply` to the event's reply sink.
    Reply(Reply),
    /// Terminate the item, delivering `error` as a typed failure.
    Fail(ConveyorError),
}

impl HandlerOutcome {
    /// Shorthand for yielding a single successor step.
    pub fn yield_to(handler: Arc<dyn Handler>) -> Self {
        HandlerOutcome::Next(vec![handler])
    }
}

impl fmt::Debug for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerOutcome::Next(next) => f
                .debug_tuple("Next")
                .field(&next.iter().map(|h| h.name()).collect::<Vec<_>>())
                .finish(),
            HandlerOutcome::Reply(reply) => f.debug_tuple("Reply").field(reply).finish(),
            HandlerOutcome::Fail(err) => f.debug_tuple("Fail").field(err).finish(),
        }
    }
}

/// A single step of a handler pipeline. Steps are chained via `Next`
/// rather than by holding a reference to their successor, avoiding cyclic
/// handler-to-handler references. `ports` carries the shared state the
/// outermost `Provide` middleware injects (jet ports, storage, config).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Stable name used for tracing and `NoPastHandler`/`InactiveSlot`
    /// diagnostics.
    fn name(&self) -> &'static str;

    /// Invoked by the present middleware.
    async fn handle(&self, ctx: &mut HandlerContext, ports: &Ports) -> HandlerOutcome;

    /// Invoked by the future middleware instead of parking the item, when
    /// the handler has a replay-specific behavior for unsettled pulses.
    /// Returning `None` falls back to future-slot parking.
    async fn future(&self, _ctx: &mut HandlerContext, _ports: &Ports) -> Option<HandlerOutcome> {
        None
    }

    /// Invoked by the past middleware for items re-entering a retired
    /// pulse's slot. Returning `None` fails the item with `NoPastHandler`.
    async fn past(&self, _ctx: &mut HandlerContext, _ports: &Ports) -> Option<HandlerOutcome> {
        None
    }

    /// Invoked by the context middleware after `handle` returns. Returning
    /// `Some` replaces the item's context for its successor steps.
    fn context(&self, _ctx: &HandlerContext) -> Option<HandlerContext> {
        None
    }
}
