//! Tests that play back whole runs.

use std::time::Duration;

use tollgate_replay::{
    ArrivalMode, FinalStats, Frame, LaneStatus, Lifecycle, PlaybackSettings, Replay, RunResult,
    SimulationConfig, Status, Vehicle, VehicleId,
};

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// A frame of a run with only automatic lanes.
fn frame(time: f64, queue_length: u32, busy: &[bool]) -> Frame {
    Frame {
        time: Some(time),
        queue_length: Some(queue_length),
        lanes: busy
            .iter()
            .enumerate()
            .map(|(i, busy)| LaneStatus {
                id: format!("GTO-{}", i + 1),
                status: if *busy { Status::Busy } else { Status::Free },
            })
            .collect(),
        served: 0,
        event: None,
    }
}

fn run(history: Vec<Frame>) -> RunResult {
    RunResult {
        history,
        final_stats: FinalStats::default(),
    }
}

fn replay(automatic_lanes: u32, settings: PlaybackSettings) -> Replay {
    let config = SimulationConfig {
        automatic_lanes,
        manual_lanes: 0,
        ..Default::default()
    };
    Replay::with_config(config, PlaybackSettings {
        seed: Some(42),
        ..settings
    })
    .unwrap()
}

fn queue(replay: &Replay, lane: usize) -> Vec<(VehicleId, Lifecycle)> {
    replay.lanes()[lane]
        .vehicles()
        .map(|v| (v.id(), v.lifecycle()))
        .collect()
}

fn vehicle_count(replay: &Replay) -> usize {
    replay.lanes().iter().map(|lane| lane.len()).sum()
}

/// The three frame run: one vehicle arrives at a booth, then leaves.
fn arrive_and_leave() -> RunResult {
    run(vec![
        frame(0.0, 0, &[false, false]),
        frame(1.0, 0, &[true, false]),
        frame(2.0, 0, &[false, false]),
    ])
}

#[test]
fn vehicle_arrives_and_leaves() {
    let mut replay = replay(2, Default::default());
    replay.load_run(arrive_and_leave());
    replay.start();

    replay.step(ms(200));
    assert_eq!(replay.frame_index(), 1);
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Entering)]);
    assert!(queue(&replay, 1).is_empty());

    replay.step(ms(200));
    assert_eq!(replay.frame_index(), 2);
    assert!(!replay.is_running());
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Leaving)]);

    // The settle timer fires while the vehicle is leaving
    replay.step(ms(500));
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Leaving)]);

    // Removed 2000 ms after the booth became free, at t = 2400 ms
    replay.step(ms(1499));
    assert_eq!(replay.now(), ms(2399));
    assert_eq!(vehicle_count(&replay), 1);
    replay.step(ms(1));
    assert_eq!(vehicle_count(&replay), 0);
    assert_eq!(replay.pending_timers(), 0);

    let series: Vec<_> = replay
        .series()
        .iter()
        .map(|p| (p.time, p.queue_length))
        .collect();
    assert_eq!(series, [(1.0, 0), (2.0, 0)]);
}

#[test]
fn entering_vehicle_settles() {
    let mut replay = replay(1, Default::default());
    replay.load_run(run(vec![
        frame(0.0, 0, &[false]),
        frame(1.0, 0, &[true]),
        frame(2.0, 0, &[true]),
    ]));
    replay.start();
    replay.step(ms(699));
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Entering)]);
    replay.step(ms(1));
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Steady)]);
}

#[test]
fn stale_removal_is_ignored_after_reset() {
    let mut replay = replay(2, Default::default());
    replay.load_run(arrive_and_leave());
    replay.start();
    replay.step(ms(400));
    // Vehicle #0 is leaving, its removal is due at t = 2400 ms
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Leaving)]);

    replay.reset();
    assert_eq!(vehicle_count(&replay), 0);
    replay.start();
    replay.step(ms(400));
    // A new vehicle #0, leaving since t = 800 ms
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Leaving)]);

    replay.step(ms(1700));
    assert_eq!(replay.now(), ms(2500));
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Leaving)]);

    replay.step(ms(300));
    assert_eq!(vehicle_count(&replay), 0);
}

#[test]
fn stale_settle_is_ignored_after_reset() {
    let mut replay = replay(1, Default::default());
    replay.load_run(run(vec![
        frame(0.0, 0, &[false]),
        frame(1.0, 0, &[true]),
        frame(2.0, 0, &[true]),
    ]));
    replay.start();
    replay.step(ms(300));
    // The settle of the first vehicle #0 is due at t = 700 ms
    replay.reset();
    replay.start();
    replay.step(ms(200));
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Entering)]);

    replay.step(ms(300));
    assert_eq!(replay.now(), ms(800));
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Entering)]);

    replay.step(ms(200));
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Steady)]);
}

#[test]
fn stale_timers_leave_reset_state_unchanged() {
    let mut replay = replay(2, Default::default());
    replay.load_run(arrive_and_leave());
    replay.start();
    replay.step(ms(400));
    assert!(replay.pending_timers() > 0);

    replay.reset();
    replay.run_until_idle();
    assert_eq!(vehicle_count(&replay), 0);
    assert_eq!(replay.frame_index(), 0);
    assert!(replay.series().is_empty());
    assert_eq!(replay.pending_timers(), 0);
}

#[test]
fn reset_is_idempotent() {
    let mut replay = replay(2, Default::default());
    let mut history = arrive_and_leave().history;
    history[1].event = Some("Mobil #1 (e-money) masuk antrean.".to_string());
    replay.load_run(run(history));
    replay.start();
    replay.step(ms(300));
    assert_eq!(replay.event_log().count(), 1);

    for _ in 0..2 {
        replay.reset();
        assert_eq!(vehicle_count(&replay), 0);
        assert!(replay.series().is_empty());
        assert_eq!(replay.event_log().count(), 0);
        assert_eq!(replay.frame_index(), 0);
        assert!(!replay.is_running());
    }

    // Vehicle numbering starts over
    replay.start();
    replay.step(ms(200));
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Entering)]);
}

/// A single booth serving three vehicles, one change per frame.
fn single_booth() -> RunResult {
    let states = [
        (0, false),
        (0, true),  // #0 arrives at the booth
        (1, true),  // #1 queues
        (2, true),  // #2 queues
        (2, false), // #0 served
        (1, true),
        (1, false), // #1 served
        (0, true),
        (0, false), // #2 served
        (1, false), // #3 queues
    ];
    run(states
        .iter()
        .enumerate()
        .map(|(t, (q, busy))| frame(t as f64, *q, &[*busy]))
        .collect())
}

#[test]
fn vehicles_converge_to_frame_totals() {
    let settings = PlaybackSettings {
        tick_period_ms: 3000,
        ..Default::default()
    };
    let mut replay = replay(1, settings);
    let run = single_booth();
    replay.load_run(run.clone());
    replay.start();

    replay.step(ms(3000));
    for index in 1..run.history.len() {
        assert_eq!(replay.frame_index(), index);
        // Every timer scheduled by this frame fires before the next tick
        replay.step(ms(2500));
        assert_eq!(
            vehicle_count(&replay),
            run.history[index].total_vehicles(),
            "frame {}",
            index
        );
        replay.step(ms(500));
    }
}

#[test]
fn vehicles_leave_in_arrival_order() {
    let mut replay = replay(1, Default::default());
    replay.load_run(single_booth());
    replay.start();

    let mut seen: Vec<VehicleId> = vec![];
    let mut removed: Vec<VehicleId> = vec![];
    let mut previous: Vec<VehicleId> = vec![];
    while replay.is_running() || replay.pending_timers() > 0 {
        replay.step(ms(100));
        let current: Vec<_> = replay.lanes()[0].vehicles().map(Vehicle::id).collect();
        // Vehicles queue in increasing ID order
        assert!(current.windows(2).all(|w| w[0] < w[1]));
        for id in &current {
            if !seen.contains(id) {
                assert!(seen.last().map_or(true, |last| last < id));
                seen.push(*id);
            }
        }
        removed.extend(previous.iter().filter(|id| !current.contains(id)));
        previous = current;
    }

    assert_eq!(seen, [VehicleId(0), VehicleId(1), VehicleId(2), VehicleId(3)]);
    assert_eq!(removed, [VehicleId(0), VehicleId(1), VehicleId(2)]);
    assert_eq!(previous, [VehicleId(3)]);
}

#[test]
fn malformed_frame_is_skipped() {
    let mut replay = replay(2, Default::default());
    let mut broken = frame(1.0, 4, &[true, true]);
    broken.lanes.clear();
    replay.load_run(run(vec![
        frame(0.0, 0, &[false, false]),
        broken,
        frame(2.0, 0, &[false, false]),
        frame(3.0, 0, &[true, false]),
    ]));
    replay.start();
    replay.run_until_idle();

    assert_eq!(replay.frame_index(), 3);
    assert_eq!(replay.series().len(), 3);
    // Only the last frame produced a vehicle
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Steady)]);
    assert_eq!(replay.lanes()[0].status(), Status::Busy);
}

#[test]
fn frame_without_queue_length_is_skipped() {
    let json = r#"{
        "history": [
            {"waktu": 0, "panjangAntrean": 0, "statusGardu": [
                {"id": "GTO-1", "status": "bebas"}, {"id": "GTO-2", "status": "bebas"}]},
            {"waktu": 1, "statusGardu": [
                {"id": "GTO-1", "status": "sibuk"}, {"id": "GTO-2", "status": "bebas"}]},
            {"waktu": 2, "panjangAntrean": 0, "statusGardu": [
                {"id": "GTO-1", "status": "bebas"}, {"id": "GTO-2", "status": "bebas"}]},
            {"waktu": 3, "panjangAntrean": 0, "statusGardu": [
                {"id": "GTO-1", "status": "sibuk"}, {"id": "GTO-2", "status": "bebas"}]}
        ],
        "statistikAkhir": {
            "totalMobilDilayani": 1, "rataRataWaktuTunggu": 0, "waktuTungguMaks": 0,
            "panjangAntreanMaks": 0, "utilisasiGardu": []
        }
    }"#;
    let run: RunResult = serde_json::from_str(json).unwrap();
    assert_eq!(run.history[1].queue_length, None);

    let mut replay = replay(2, Default::default());
    replay.load_run(run);
    replay.start();
    replay.run_until_idle();

    assert_eq!(replay.frame_index(), 3);
    let series: Vec<_> = replay
        .series()
        .iter()
        .map(|p| (p.time, p.queue_length))
        .collect();
    assert_eq!(series, [(2.0, 0), (3.0, 0)]);
    assert_eq!(queue(&replay, 0), [(VehicleId(0), Lifecycle::Steady)]);
    assert!(replay.final_report().is_some());
}

#[test]
fn event_log_is_bounded() {
    let mut replay = replay(1, Default::default());
    let history = (0..80)
        .map(|t| Frame {
            event: Some(format!("event {}", t)),
            ..frame(t as f64, 0, &[false])
        })
        .collect();
    replay.load_run(run(history));
    replay.start();
    while replay.is_running() {
        replay.step(ms(200));
        assert!(replay.event_log().count() <= 50);
    }
    assert_eq!(replay.event_log().count(), 50);
    assert_eq!(replay.event_log().next(), Some("[79d] event 79"));
    assert_eq!(replay.series().len(), 79);
}

#[test]
fn mixed_layout_run_produces_vehicles() {
    let config = SimulationConfig {
        automatic_lanes: 1,
        manual_lanes: 1,
        ..Default::default()
    };
    let mut replay = Replay::with_config(config, PlaybackSettings {
        arrival_mode: ArrivalMode::Delta,
        seed: Some(42),
        ..Default::default()
    })
    .unwrap();
    let mixed = |time: f64, queue_length: u32, busy: [bool; 2]| Frame {
        lanes: ["GTO-1", "MANUAL-2"]
            .iter()
            .zip(busy)
            .map(|(id, busy)| LaneStatus {
                id: id.to_string(),
                status: if busy { Status::Busy } else { Status::Free },
            })
            .collect(),
        ..frame(time, queue_length, &[])
    };
    replay.load_run(run(vec![
        mixed(0.0, 0, [false, false]),
        mixed(1.0, 0, [true, true]),
    ]));
    replay.start();
    replay.step(ms(400));

    assert_eq!(replay.frame_index(), 1);
    assert_eq!(vehicle_count(&replay), 2);
    assert_eq!(replay.lanes()[1].id(), "MANUAL-2");
    assert_eq!(queue(&replay, 1), [(VehicleId(1), Lifecycle::Entering)]);
}

#[test]
fn arrivals_without_lanes_are_dropped() {
    let mut replay = replay(0, Default::default());
    replay.load_run(run(vec![
        frame(0.0, 0, &[]),
        frame(1.0, 2, &[]),
        frame(2.0, 5, &[]),
    ]));
    replay.start();
    replay.run_until_idle();
    assert_eq!(replay.frame_index(), 2);
    assert!(replay.lanes().is_empty());
    assert_eq!(replay.series().len(), 2);
}

#[test]
fn one_vehicle_per_frame_by_default() {
    let mut replay = replay(2, Default::default());
    replay.load_run(run(vec![
        frame(0.0, 0, &[false, false]),
        frame(1.0, 1, &[true, true]),
    ]));
    replay.start();
    replay.run_until_idle();
    assert_eq!(vehicle_count(&replay), 1);
}

#[test]
fn delta_arrivals_match_the_total() {
    let settings = PlaybackSettings {
        arrival_mode: ArrivalMode::Delta,
        ..Default::default()
    };
    let mut replay = replay(2, settings);
    replay.load_run(run(vec![
        frame(0.0, 0, &[false, false]),
        frame(1.0, 1, &[true, true]),
    ]));
    replay.start();
    replay.run_until_idle();
    assert_eq!(vehicle_count(&replay), 3);
    assert_eq!(
        queue(&replay, 0),
        [
            (VehicleId(0), Lifecycle::Steady),
            (VehicleId(2), Lifecycle::Steady)
        ]
    );
    assert_eq!(queue(&replay, 1), [(VehicleId(1), Lifecycle::Steady)]);
}
