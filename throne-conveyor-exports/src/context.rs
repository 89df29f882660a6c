// Copyright (c) 2022 Throne Contributors

use throne_models::{JetId, Parcel, PulseNumber};

/// Carries everything a handler step needs: the pulse the item is running
/// under, the jet it has been bound to (once `CheckJet` resolves it), and
/// the parcel being processed. Passed explicitly down the handler chain in
/// place of a shared mutable "current request" singleton.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    /// The slot's pulse at the time this context was created or migrated.
    pub pulse: PulseNumber,
    /// The jet this item has been routed to, once `CheckJet` resolves it.
    pub jet: Option<JetId>,
    /// The parcel driving this item.
    pub parcel: Parcel,
}

impl HandlerContext {
    /// Builds the initial context for a freshly sorted item.
    pub fn new(pulse: PulseNumber, parcel: Parcel) -> Self {
        HandlerContext {
            pulse,
            jet: None,
            parcel,
        }
    }

    /// Binds `jet` into the context, returning the updated context for
    /// chaining.
    pub fn with_jet(mut self, jet: JetId) -> Self {
        self.jet = Some(jet);
        self
    }

    /// Rebinds this context to a new pulse, used when a future-slot item is
    /// migrated into the present on rotation.
    pub fn migrate_to(&mut self, pulse: PulseNumber) {
        self.pulse = pulse;
    }
}
