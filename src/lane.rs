use crate::config::{LaneKind, LaneLayout};
use crate::frame::Status;
use crate::vehicle::{Vehicle, VehicleId};
use serde::Serialize;
use std::collections::VecDeque;

pub use assignment::choose_lane;

mod assignment;

/// A lane represents a single toll booth and the vehicles queued at it.
#[derive(Clone, Debug, Serialize)]
pub struct Lane {
    /// The lane ID.
    id: String,
    /// The kind of booth.
    kind: LaneKind,
    /// The booth status reported by the latest reconciled frame.
    status: Status,
    /// The vehicles in the lane. The front vehicle is the one nearest the booth.
    queue: VecDeque<Vehicle>,
}

impl Lane {
    /// Creates an empty lane with a free booth.
    pub(crate) fn new(id: &str, kind: LaneKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            status: Status::Free,
            queue: VecDeque::new(),
        }
    }

    /// Builds the empty lanes of a layout, in declared order.
    pub(crate) fn from_layout(layout: &LaneLayout) -> Vec<Self> {
        layout.iter().map(|(id, kind)| Self::new(id, kind)).collect()
    }

    /// Gets the lane ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the kind of booth.
    pub fn kind(&self) -> LaneKind {
        self.kind
    }

    /// Gets the booth status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The number of vehicles in the lane, including a leaving one.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the lane has no vehicles.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterates over the vehicles from the front of the queue to the back.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.queue.iter()
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Appends a vehicle to the back of the queue.
    pub(crate) fn push_vehicle(&mut self, vehicle: Vehicle) {
        self.queue.push_back(vehicle);
    }

    /// Marks the first vehicle that isn't already leaving as leaving.
    /// While no other departure is pending this is the front vehicle.
    ///
    /// A booth can free up again before the previous vehicle's exit delay
    /// ends. The next departure then marks the vehicle behind it rather than
    /// marking the front vehicle a second time, so every departure leaves one
    /// vehicle and removals still happen in queue order.
    pub(crate) fn depart(&mut self) -> Option<VehicleId> {
        let vehicle = self.queue.iter_mut().find(|v| !v.is_leaving())?;
        vehicle.leave();
        Some(vehicle.id())
    }

    /// Settles the given vehicle if it's still in the lane.
    pub(crate) fn settle_vehicle(&mut self, id: VehicleId) -> bool {
        self.queue
            .iter_mut()
            .find(|v| v.id() == id)
            .map_or(false, Vehicle::settle)
    }

    /// Removes the given vehicle, which is expected to be at the front of the queue.
    pub(crate) fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        if self.queue.front().map(Vehicle::id) == Some(id) {
            return self.queue.pop_front();
        }
        let idx = self.queue.iter().position(|v| v.id() == id)?;
        log::warn!(
            "vehicle {} left {} from position {} instead of the front",
            id,
            self.id,
            idx
        );
        self.queue.remove(idx)
    }
}
