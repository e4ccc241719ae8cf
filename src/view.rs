//! A JSON snapshot of everything a render layer draws.

use crate::Replay;
use serde_json::json;

/// Captures the render-facing state of a replay.
pub fn snapshot(replay: &Replay) -> serde_json::Value {
    json!({
        "revision": replay.revision(),
        "frame": replay.frame_index(),
        "frames": replay.frame_count(),
        "running": replay.is_running(),
        "time": replay.current_frame().and_then(|frame| frame.time),
        "lanes": replay.lanes(),
        "series": replay.series(),
        "log": replay.event_log().collect::<Vec<_>>(),
        "report": replay.final_report(),
    })
}
