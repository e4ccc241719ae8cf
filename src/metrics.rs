use crate::frame::Frame;
use serde::Serialize;
use std::collections::VecDeque;

/// A point of the queue length chart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// The simulation time in s.
    pub time: f64,
    /// The number of vehicles waiting.
    pub queue_length: u32,
}

/// Projects frame advances onto the queue length series and the event log.
#[derive(Debug)]
pub struct Projector {
    /// One point per frame advance. Never truncated.
    series: Vec<SeriesPoint>,
    /// Formatted events, newest first.
    log: VecDeque<String>,
    /// The maximum length of the event log.
    capacity: usize,
}

impl Projector {
    /// Creates an empty projector whose log keeps at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            series: vec![],
            log: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records playback advancing to `frame`.
    ///
    /// A frame without a time or queue length adds no point to the series.
    pub fn record(&mut self, frame: &Frame) {
        if let (Some(time), Some(queue_length)) = (frame.time, frame.queue_length) {
            self.series.push(SeriesPoint { time, queue_length });
        }
        if let Some(event) = &frame.event {
            let entry = match frame.time {
                Some(time) => format!("[{}d] {}", time, event),
                None => event.clone(),
            };
            self.log.push_front(entry);
            self.log.truncate(self.capacity);
        }
    }

    /// Clears the series and the log.
    pub fn reset(&mut self) {
        self.series.clear();
        self.log.clear();
    }

    /// The queue length series, oldest first.
    pub fn series(&self) -> &[SeriesPoint] {
        &self.series
    }

    /// The event log, newest first.
    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    /// The number of entries in the event log.
    pub fn log_len(&self) -> usize {
        self.log.len()
    }
}
