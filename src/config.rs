//! Simulation requests, the lane layout they imply, and playback settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// The maximum number of booths of each kind.
pub const MAX_LANES_PER_KIND: u32 = 8;

/// The maximum arrival rate, in vehicles per minute.
pub const MAX_ARRIVALS_PER_MINUTE: u32 = 120;

/// The maximum length of a simulation run, in s.
pub const MAX_DURATION_SECS: u32 = 1800;

/// How the arrival rate varies over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficPattern {
    /// A constant arrival rate.
    #[default]
    #[serde(rename = "stabil", alias = "steady")]
    Steady,
    /// Doubled arrivals in the first and last quarter of the run, halved in between.
    #[serde(rename = "jam_sibuk", alias = "rush_hour")]
    RushHour,
}

/// The parameters of a simulation run, as sent to the simulation service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// The number of automatic (electronic payment only) booths.
    #[serde(rename = "garduOtomatis")]
    pub automatic_lanes: u32,
    /// The number of manual booths.
    #[serde(rename = "garduManual")]
    pub manual_lanes: u32,
    /// The mean arrival rate in vehicles per minute.
    #[serde(rename = "mobilPerMenit")]
    pub arrivals_per_minute: u32,
    /// The percentage of vehicles paying electronically.
    #[serde(rename = "persentaseEToll")]
    pub electronic_percent: u32,
    /// The length of the run in s.
    #[serde(rename = "durasiSimulasiDetik")]
    pub duration_secs: u32,
    #[serde(rename = "polaTrafik", default)]
    pub pattern: TrafficPattern,
}

/// A configuration value outside of its allowed range.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} is {value}, the maximum is {max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            automatic_lanes: 3,
            manual_lanes: 2,
            arrivals_per_minute: 45,
            electronic_percent: 85,
            duration_secs: 300,
            pattern: TrafficPattern::Steady,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a configuration using the service's JSON keys.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against the range the service accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("automatic_lanes", self.automatic_lanes, MAX_LANES_PER_KIND),
            ("manual_lanes", self.manual_lanes, MAX_LANES_PER_KIND),
            (
                "arrivals_per_minute",
                self.arrivals_per_minute,
                MAX_ARRIVALS_PER_MINUTE,
            ),
            ("electronic_percent", self.electronic_percent, 100),
            ("duration_secs", self.duration_secs, MAX_DURATION_SECS),
        ];
        match checks.into_iter().find(|(_, value, max)| value > max) {
            Some((field, value, max)) => Err(ConfigError::OutOfRange { field, value, max }),
            None => Ok(()),
        }
    }

    /// The lanes a run with this configuration will report.
    pub fn layout(&self) -> LaneLayout {
        LaneLayout::new(self.automatic_lanes, self.manual_lanes)
    }
}

/// The kind of toll booth at the head of a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
    Automatic,
    Manual,
}

/// The declared order of the lanes in a run.
///
/// Automatic lanes come first, then manual lanes, each in creation order.
/// Lanes are numbered from 1 across both kinds, so with two automatic lanes
/// the first manual lane is `MANUAL-3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneLayout {
    lanes: Vec<(String, LaneKind)>,
}

impl LaneLayout {
    /// Creates the layout for the given number of booths.
    pub fn new(automatic: u32, manual: u32) -> Self {
        let automatic_ids =
            (1..=automatic).map(|n| (format!("GTO-{}", n), LaneKind::Automatic));
        let manual_ids = (automatic + 1..=automatic + manual)
            .map(|n| (format!("MANUAL-{}", n), LaneKind::Manual));
        Self {
            lanes: automatic_ids.chain(manual_ids).collect(),
        }
    }

    /// The number of lanes.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Whether there are no lanes.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Iterates over the lane IDs and kinds in declared order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, LaneKind)> {
        self.lanes.iter().map(|(id, kind)| (id.as_str(), *kind))
    }
}

/// How many vehicles to synthesize when the total number of vehicles grows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalMode {
    /// At most one vehicle per frame, whatever the size of the increase.
    #[default]
    Single,
    /// One vehicle per unit of increase.
    Delta,
}

/// Settings for the playback of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// The interval between frame advances, in ms.
    pub tick_period_ms: u64,
    /// How long a new vehicle is shown entering, in ms.
    pub settle_delay_ms: u64,
    /// How long a departing vehicle is shown leaving, in ms.
    pub exit_delay_ms: u64,
    /// The maximum number of entries kept in the event log.
    pub event_log_capacity: usize,
    pub arrival_mode: ArrivalMode,
    /// Seeds the vehicle colour choice, for reproducible playback.
    pub seed: Option<u64>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_period_ms: 200,
            settle_delay_ms: 500,
            exit_delay_ms: 2000,
            event_log_capacity: 50,
            arrival_mode: ArrivalMode::Single,
            seed: None,
        }
    }
}

impl PlaybackSettings {
    /// Parses settings from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn exit_delay(&self) -> Duration {
        Duration::from_millis(self.exit_delay_ms)
    }
}
