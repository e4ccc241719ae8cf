use crate::frame::{FinalStats, Frame, RunResult};
use thiserror::Error;

/// An access to a frame which doesn't exist.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("frame {index} is out of range for a run of {len} frames")]
pub struct StoreError {
    pub index: usize,
    pub len: usize,
}

/// The frames and final statistics of the most recent simulation run.
///
/// The store is only ever replaced as a whole, so readers never observe a
/// partially loaded run.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    /// The frames, ordered by time.
    frames: Vec<Frame>,
    /// The final statistics, if a run has been loaded.
    stats: Option<FinalStats>,
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the contents of the store with a new run.
    pub fn load(&mut self, run: RunResult) {
        *self = Self {
            frames: run.history,
            stats: Some(run.final_stats),
        };
    }

    /// Gets the frame with the given index.
    pub fn frame_at(&self, index: usize) -> Result<&Frame, StoreError> {
        self.frames.get(index).ok_or(StoreError {
            index,
            len: self.frames.len(),
        })
    }

    /// The number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The final statistics of the loaded run.
    pub fn final_stats(&self) -> Option<&FinalStats> {
        self.stats.as_ref()
    }
}
