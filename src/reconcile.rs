//! Derives per-vehicle lane queues from aggregate frames.
//!
//! A frame only says how many vehicles are waiting and which booths are busy.
//! Each time playback advances, the reconciler compares the new frame with the
//! previous one: growth in the total number of vehicles becomes a new vehicle
//! joining the shortest lane, and a booth turning from busy to free becomes
//! the front vehicle of that lane leaving. The follow-up lifecycle changes are
//! returned as [Transition]s for the caller to schedule.

use crate::config::ArrivalMode;
use crate::frame::{Frame, FrameError, Status};
use crate::lane::{choose_lane, Lane};
use crate::vehicle::{Vehicle, VehicleId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;

/// A delayed lifecycle change of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The vehicle finishes entering its lane.
    Settle { lane: usize, vehicle: VehicleId },
    /// The vehicle is removed from the front of its lane.
    Remove { lane: usize, vehicle: VehicleId },
}

/// The transitions produced by a single reconciliation.
pub type Transitions = SmallVec<[Transition; 4]>;

/// The queue reconciliation engine.
#[derive(Debug)]
pub struct Reconciler {
    /// The ID of the next vehicle to be created.
    next_id: u64,
    /// Chooses vehicle colours.
    rng: StdRng,
    /// How many vehicles to create when the total grows.
    arrivals: ArrivalMode,
}

impl Reconciler {
    /// Creates a reconciler. Vehicle colours are reproducible if a seed is given.
    pub fn new(arrivals: ArrivalMode, seed: Option<u64>) -> Self {
        Self {
            next_id: 0,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
            arrivals,
        }
    }

    /// Restarts vehicle numbering from zero.
    pub fn reset(&mut self) {
        self.next_id = 0;
    }

    /// The ID the next created vehicle will get.
    pub fn next_id(&self) -> VehicleId {
        VehicleId(self.next_id)
    }

    /// Updates the lane queues for playback advancing from `prev` to `cur`.
    ///
    /// Fails without touching the lanes if either frame doesn't match them.
    pub fn reconcile(
        &mut self,
        prev: &Frame,
        cur: &Frame,
        lanes: &mut [Lane],
    ) -> Result<Transitions, FrameError> {
        prev.validate(lanes.iter().map(Lane::id))?;
        cur.validate(lanes.iter().map(Lane::id))?;

        let mut transitions = Transitions::new();

        // Arrivals
        let before = prev.total_vehicles();
        let now = cur.total_vehicles();
        let arrivals = match self.arrivals {
            ArrivalMode::Single => usize::from(now > before),
            ArrivalMode::Delta => now.saturating_sub(before),
        };
        for _ in 0..arrivals {
            let Some(lane) = choose_lane(lanes) else {
                log::debug!("no lanes to place an arriving vehicle in");
                break;
            };
            let vehicle = Vehicle::new(VehicleId(self.next_id), &mut self.rng);
            self.next_id += 1;
            transitions.push(Transition::Settle {
                lane,
                vehicle: vehicle.id(),
            });
            lanes[lane].push_vehicle(vehicle);
        }

        // Departures
        let departed = prev
            .lanes
            .iter()
            .zip(&cur.lanes)
            .enumerate()
            .filter(|(_, (p, c))| p.status == Status::Busy && c.status == Status::Free)
            .map(|(idx, _)| idx)
            .collect::<SmallVec<[usize; 8]>>();
        for lane in departed {
            if let Some(vehicle) = lanes[lane].depart() {
                transitions.push(Transition::Remove { lane, vehicle });
            }
        }

        for (lane, status) in lanes.iter_mut().zip(&cur.lanes) {
            lane.set_status(status.status);
        }

        Ok(transitions)
    }

    /// Applies a transition returned by [Reconciler::reconcile].
    pub fn apply(&self, transition: Transition, lanes: &mut [Lane]) {
        match transition {
            Transition::Settle { lane, vehicle } => {
                if let Some(lane) = lanes.get_mut(lane) {
                    lane.settle_vehicle(vehicle);
                }
            }
            Transition::Remove { lane, vehicle } => {
                let removed = lanes
                    .get_mut(lane)
                    .and_then(|lane| lane.remove_vehicle(vehicle));
                if removed.is_none() {
                    log::warn!("vehicle {} was already gone from lane {}", vehicle, lane);
                }
            }
        }
    }
}
