use crate::Lane;
use itertools::Itertools;

/// Chooses the lane a new vehicle joins: the one with the shortest queue.
///
/// Ties go to the first such lane in layout order. Returns `None` if there
/// are no lanes.
pub fn choose_lane(lanes: &[Lane]) -> Option<usize> {
    lanes.iter().position_min_by_key(|lane| lane.len())
}
