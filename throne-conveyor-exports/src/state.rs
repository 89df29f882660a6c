// Copyright (c) 2022 Throne Contributors

use displaydoc::Display;

/// Lifecycle state of the conveyor worker's run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConveyorState {
    /// actively dequeuing and running items
    Active,
    /// running `Sorter::on_pulse`; dequeues are paused until it completes
    PreparingPulse,
    /// draining in-flight items before stopping
    ShuttingDown,
    /// stopped; no further items will be processed
    Inactive,
}
