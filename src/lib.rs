//! Replays toll-gate simulation runs as per-vehicle lane queues.
//!
//! The simulation service only reports how many vehicles are waiting and
//! which booths are busy. A [Replay] plays those frames back on a timer and
//! infers individual vehicles joining, waiting in and leaving each lane.

pub use config::{
    ArrivalMode, ConfigError, LaneKind, LaneLayout, PlaybackSettings, SimulationConfig,
    TrafficPattern,
};
pub use frame::{FinalStats, Frame, FrameError, LaneStatus, LaneUtilization, RunResult, Status};
pub use lane::{choose_lane, Lane};
pub use metrics::{Projector, SeriesPoint};
pub use playback::{Advance, Playback};
pub use reconcile::{Reconciler, Transition, Transitions};
pub use replay::{Notice, Replay};
pub use scheduler::Scheduler;
pub use service::{Scenario, ScenarioStore, ServiceError, SimulationService};
pub use store::{SnapshotStore, StoreError};
pub use vehicle::{Lifecycle, Vehicle, VehicleId, PALETTE};

#[cfg(feature = "http")]
pub use service::HttpService;

mod config;
mod frame;
mod lane;
mod metrics;
mod playback;
mod reconcile;
mod replay;
mod scheduler;
mod service;
mod store;
mod vehicle;
pub mod view;
