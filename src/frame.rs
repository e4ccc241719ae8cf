//! The snapshot format produced by the simulation service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The occupancy of a toll booth in a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "bebas", alias = "free")]
    Free,
    #[serde(rename = "sibuk", alias = "busy")]
    Busy,
}

/// The status of one lane as reported in a frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneStatus {
    /// The lane ID, stable across the whole run.
    pub id: String,
    /// Whether the booth is serving a vehicle.
    pub status: Status,
}

/// One immutable time-stamped snapshot of the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// The simulation time in s.
    #[serde(rename = "waktu", alias = "time", default)]
    pub time: Option<f64>,
    /// The number of vehicles waiting for a booth.
    #[serde(rename = "panjangAntrean", alias = "aggregateQueueLength", default)]
    pub queue_length: Option<u32>,
    /// The status of every lane, in layout order.
    #[serde(rename = "statusGardu", alias = "lanes", default)]
    pub lanes: Vec<LaneStatus>,
    /// The number of vehicles served so far.
    #[serde(rename = "totalSelesai", alias = "served", default)]
    pub served: u32,
    /// A human readable description of something that happened this frame.
    #[serde(default)]
    pub event: Option<String>,
}

/// A frame which doesn't match the lane layout of the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame has no {0}")]
    MissingField(&'static str),
    #[error("frame has no lane statuses")]
    MissingLanes,
    #[error("frame has {found} lanes, expected {expected}")]
    LaneCount { expected: usize, found: usize },
    #[error("lane {index} is {found:?}, expected {expected:?}")]
    LaneId {
        index: usize,
        expected: String,
        found: String,
    },
}

impl Frame {
    /// The number of lanes whose booth is busy.
    pub fn busy_lanes(&self) -> usize {
        self.lanes
            .iter()
            .filter(|lane| lane.status == Status::Busy)
            .count()
    }

    /// The total number of vehicles in the system: waiting plus being served.
    ///
    /// A missing queue length counts as zero.
    pub fn total_vehicles(&self) -> usize {
        self.queue_length.unwrap_or(0) as usize + self.busy_lanes()
    }

    /// Checks that the frame has a time and queue length, and reports exactly
    /// the given lanes, in order.
    pub fn validate<'a>(
        &self,
        layout: impl ExactSizeIterator<Item = &'a str>,
    ) -> Result<(), FrameError> {
        if self.time.is_none() {
            return Err(FrameError::MissingField("time"));
        }
        if self.queue_length.is_none() {
            return Err(FrameError::MissingField("queue length"));
        }
        self.check_lanes(layout)
    }

    /// Checks that the frame reports exactly the given lanes, in order.
    pub fn check_lanes<'a>(
        &self,
        layout: impl ExactSizeIterator<Item = &'a str>,
    ) -> Result<(), FrameError> {
        let expected = layout.len();
        if self.lanes.is_empty() && expected > 0 {
            return Err(FrameError::MissingLanes);
        }
        if self.lanes.len() != expected {
            return Err(FrameError::LaneCount {
                expected,
                found: self.lanes.len(),
            });
        }
        for (index, (lane, id)) in self.lanes.iter().zip(layout).enumerate() {
            if lane.id != id {
                return Err(FrameError::LaneId {
                    index,
                    expected: id.to_string(),
                    found: lane.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The utilization of a single booth over the whole run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneUtilization {
    pub id: String,
    /// The percentage of the run the booth was busy.
    pub utilization: f64,
}

/// Summary statistics computed by the simulation at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    #[serde(rename = "totalMobilDilayani", alias = "totalServed")]
    pub total_served: u32,
    /// Average wait in s.
    #[serde(rename = "rataRataWaktuTunggu", alias = "avgWait")]
    pub avg_wait: f64,
    /// Longest wait in s.
    #[serde(rename = "waktuTungguMaks", alias = "maxWait")]
    pub max_wait: f64,
    #[serde(rename = "panjangAntreanMaks", alias = "maxQueueLength")]
    pub max_queue_length: u32,
    #[serde(rename = "utilisasiGardu", alias = "utilizationPerLane", default)]
    pub utilization: Vec<LaneUtilization>,
}

/// Everything returned by one simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// The frames, ordered by time.
    pub history: Vec<Frame>,
    #[serde(rename = "statistikAkhir", alias = "finalStats")]
    pub final_stats: FinalStats,
}
