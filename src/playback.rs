/// The result of a playback tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Playback moved to frame `index`. `finished` is set if it's the last frame.
    Moved { index: usize, finished: bool },
    /// Playback is stopped, or already at the last frame.
    Idle,
}

/// The playback controller: which frame is shown, and whether it's advancing.
#[derive(Debug, Default)]
pub struct Playback {
    /// The index of the frame being shown.
    frame_index: usize,
    /// Whether playback is advancing.
    running: bool,
    /// Identifies the current chain of ticks. Changed whenever playback
    /// starts, stops or resets, so a tick from an older chain is ignored.
    generation: u64,
}

impl Playback {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts advancing through a run of `len` frames.
    ///
    /// Returns the generation the first tick must carry, or `None` if there's
    /// nothing to play.
    pub fn start(&mut self, len: usize) -> Option<u64> {
        if self.running || self.frame_index + 1 >= len {
            return None;
        }
        self.running = true;
        self.generation += 1;
        Some(self.generation)
    }

    /// Stops advancing. The frame index is kept.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.generation += 1;
        }
    }

    /// Stops and returns to the first frame.
    pub fn reset(&mut self) {
        self.stop();
        self.frame_index = 0;
    }

    /// Whether a tick carrying `generation` should still advance playback.
    pub fn is_current(&self, generation: u64) -> bool {
        self.running && self.generation == generation
    }

    /// Advances to the next frame of a run of `len` frames.
    /// Stops automatically on reaching the last frame.
    pub fn advance(&mut self, len: usize) -> Advance {
        if !self.running {
            return Advance::Idle;
        }
        if self.frame_index + 1 >= len {
            self.stop();
            return Advance::Idle;
        }
        self.frame_index += 1;
        let finished = self.frame_index + 1 == len;
        if finished {
            self.stop();
        }
        Advance::Moved {
            index: self.frame_index,
            finished,
        }
    }
}
