// Copyright (c) 2022 Throne Contributors

use crate::error::JetError;
use async_trait::async_trait;
use throne_models::{JetId, NodeRef, PulseNumber, RecordId};

/// Maintains the binary tree of jets and answers ownership queries for a
/// given pulse's reconciled snapshot.
pub trait JetStoreController: Send + Sync {
    /// Returns the jet owning `record` at `pulse`, and whether that pulse's
    /// jet-tree snapshot has been reconciled with network consensus yet.
    fn for_id(&self, pulse: PulseNumber, record: RecordId) -> (JetId, bool);

    /// Returns the parent of `jet`. A pure function of `jet` itself; kept
    /// on the trait so callers do not need to import `JetId` directly.
    fn parent(&self, jet: JetId) -> JetId {
        jet.parent()
    }

    /// Records or refreshes the jet-tree snapshot entry for `(jet, pulse)`,
    /// marking it actual.
    fn update(&self, jet: JetId, pulse: PulseNumber);
}

/// Computes, for a (jet, pulse) pair, which node is responsible for it.
pub trait JetCoordinatorController: Send + Sync {
    /// The node that is the current light-material executor for `jet` at
    /// `pulse`.
    fn light_executor_for_jet(&self, jet: JetId, pulse: PulseNumber) -> NodeRef;

    /// The heavy-material custodian responsible for `pulse`.
    fn heavy(&self, pulse: PulseNumber) -> Result<NodeRef, JetError>;

    /// The node that should be asked about `jet` when a caller at
    /// `requesting_pulse` actually wants data as of `target_pulse` (used
    /// for redirect decisions across pulses).
    fn node_for_jet(
        &self,
        jet: JetId,
        requesting_pulse: PulseNumber,
        target_pulse: PulseNumber,
    ) -> NodeRef;

    /// This node's own reference.
    fn me(&self) -> NodeRef;

    /// True when `target_pulse` is older than the light-chain retention
    /// window measured from `current_pulse`.
    fn is_beyond_limit(&self, current_pulse: PulseNumber, target_pulse: PulseNumber) -> bool;
}

/// Per-(pulse, jet) latch tracking whether the live state handed off from
/// the previous executor has arrived yet.
#[async_trait]
pub trait HotDataWaiterController: Send + Sync {
    /// Suspends the caller until hot data for `(pulse, jet)` is ready, the
    /// latch times out, or `pulse` is retired by a rotation. Returns
    /// `JetError::HotDataTimeout` in the latter two cases.
    async fn wait(&self, pulse: PulseNumber, jet: JetId) -> Result<(), JetError>;

    /// Marks hot data for `(pulse, jet)` as having arrived, releasing any
    /// waiters.
    fn mark_ready(&self, pulse: PulseNumber, jet: JetId);

    /// Called on pulse rotation: every latch still `Waiting` for `pulse`
    /// transitions to `TimedOut`, releasing its waiters with an error.
    fn expire_pulse(&self, pulse: PulseNumber);
}
