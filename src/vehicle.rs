use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// The colours a vehicle may be drawn in.
pub const PALETTE: [&str; 7] = [
    "#e53e3e", "#38a169", "#3182ce", "#d69e2e", "#805ad5", "#d53f8c", "#d1d5db",
];

/// Unique ID of a [Vehicle], increasing in order of creation within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The animation state of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Driving into the back of the queue.
    Entering,
    /// Waiting in the queue, or being served.
    Steady,
    /// Driving through the booth. Removed once the exit delay elapses.
    Leaving,
}

/// A vehicle shown in a lane queue.
///
/// Vehicles don't exist in the simulation data; they are synthesized from
/// changes to the aggregate queue length between frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    /// The vehicle's ID.
    id: VehicleId,
    /// The colour the vehicle is drawn in.
    tag: &'static str,
    /// The animation state.
    lifecycle: Lifecycle,
}

impl Vehicle {
    /// Creates an entering vehicle with a colour chosen from the palette.
    pub(crate) fn new(id: VehicleId, rng: &mut impl Rng) -> Self {
        Self {
            id,
            tag: PALETTE.choose(rng).copied().unwrap_or(PALETTE[0]),
            lifecycle: Lifecycle::Entering,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The colour the vehicle is drawn in.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// The vehicle's animation state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether the vehicle is driving through its booth.
    pub fn is_leaving(&self) -> bool {
        self.lifecycle == Lifecycle::Leaving
    }

    /// Finishes the entering animation. Has no effect on a leaving vehicle.
    pub(crate) fn settle(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Entering {
            self.lifecycle = Lifecycle::Steady;
            true
        } else {
            false
        }
    }

    /// Starts the leaving animation.
    pub(crate) fn leave(&mut self) {
        self.lifecycle = Lifecycle::Leaving;
    }
}
