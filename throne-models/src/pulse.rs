// Copyright (c) 2022 Throne Contributors

use crate::error::ModelsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A network-wide discrete time step. Strictly increasing; also used as the
/// numeric suffix baked into jet identifiers.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PulseNumber(u64);

/// The pulse at which the network starts: genesis.
pub const FIRST_PULSE: PulseNumber = PulseNumber(0);

/// A reserved pulse value used as a marker inside a `JetId` encoded as a
/// record id: a jet id is never actually observed at this pulse.
pub const JET_PULSE: PulseNumber = PulseNumber(u64::MAX);

impl PulseNumber {
    /// Builds a pulse number from its raw integer representation.
    pub const fn new(raw: u64) -> Self {
        PulseNumber(raw)
    }

    /// Returns the raw integer representation.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the genesis pulse.
    pub const fn first() -> Self {
        FIRST_PULSE
    }

    /// True if this is the genesis pulse.
    pub fn is_first(&self) -> bool {
        *self == FIRST_PULSE
    }

    /// True if this is the `JetPulse` marker value.
    pub fn is_jet_marker(&self) -> bool {
        *self == JET_PULSE
    }

    /// Returns the next pulse in sequence.
    pub fn next(&self) -> Result<PulseNumber, ModelsError> {
        self.0
            .checked_add(1)
            .map(PulseNumber)
            .ok_or(ModelsError::PulseOverflow)
    }

    /// Number of pulses between `self` and an earlier pulse `since`
    /// (saturating at zero if `since` is in the future).
    pub fn distance_since(&self, since: PulseNumber) -> u64 {
        self.0.saturating_sub(since.0)
    }
}

impl fmt::Display for PulseNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PulseNumber {
    type Err = ModelsError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(PulseNumber)
            .map_err(|_| ModelsError::DeserializeError(format!("invalid pulse number: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_is_strictly_increasing() {
        let p = FIRST_PULSE;
        let q = p.next().unwrap();
        assert!(q > p);
        assert_eq!(q.as_u64(), 1);
    }

    #[test]
    fn distance_since_saturates() {
        let p = PulseNumber::new(10);
        let q = PulseNumber::new(3);
        assert_eq!(p.distance_since(q), 7);
        assert_eq!(q.distance_since(p), 0);
    }

    #[test]
    fn next_overflow_is_reported() {
        let p = PulseNumber::new(u64::MAX);
        assert_eq!(p.next(), Err(ModelsError::PulseOverflow));
    }

    #[test]
    fn from_str_round_trips() {
        let p = PulseNumber::new(42);
        let parsed: PulseNumber = p.to_string().parse().unwrap();
        assert_eq!(p, parsed);
    }
}
