use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tollgate_replay::{
    HttpService, PlaybackSettings, Replay, RunResult, SimulationConfig, Status,
};

const USAGE: &str = "Usage: tollgate-replay [--config <file.json>] [--settings <file.json>] \
                     [--json] (<run.json> | --service <url>)";

/// Where the run to play comes from.
enum Source {
    File(String),
    Service(String),
}

struct Args {
    source: Source,
    /// The simulation configuration, which also fixes the lane layout.
    config: Option<String>,
    settings: Option<String>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut source = None;
    let mut config = None;
    let mut settings = None;
    let mut json = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--service" => source = Some(Source::Service(args.next().context(USAGE)?)),
            "--config" => config = Some(args.next().context(USAGE)?),
            "--settings" => settings = Some(args.next().context(USAGE)?),
            "--json" => json = true,
            _ if arg.starts_with("--") => bail!("unknown option {}\n{}", arg, USAGE),
            _ => source = Some(Source::File(arg)),
        }
    }
    let source = match source {
        Some(source) => source,
        None => match std::env::var("TOLLGATE_SERVICE_URL") {
            Ok(url) => Source::Service(url),
            Err(_) => bail!(USAGE),
        },
    };
    Ok(Args {
        source,
        config,
        settings,
        json,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args()?;

    let settings = match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings from {}", path))?;
            PlaybackSettings::from_json(&json)?
        }
        None => PlaybackSettings::default(),
    };
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path))?;
            SimulationConfig::from_json(&json)?
        }
        None => SimulationConfig::default(),
    };
    let mut replay = Replay::with_config(config, settings)?;

    match &args.source {
        Source::File(path) => {
            let content =
                std::fs::read(path).with_context(|| format!("reading run from {}", path))?;
            let run: RunResult = serde_json::from_slice(&content)?;
            if let Some(first) = run.history.first() {
                let layout = replay.config().layout();
                first
                    .check_lanes(layout.iter().map(|(id, _)| id))
                    .context("the run doesn't match the lane layout, pass its --config")?;
            }
            replay.load_run(run);
            replay.start();
        }
        Source::Service(url) => {
            let service = HttpService::new(url.as_str());
            replay.start_run(&service)?;
        }
    }

    let mut revision = replay.revision();
    let mut last = Instant::now();
    while replay.is_running() || replay.pending_timers() > 0 {
        std::thread::sleep(Duration::from_millis(20));
        let now = Instant::now();
        replay.step(now - last);
        last = now;

        for notice in replay.take_notices() {
            log::info!("{:?}", notice);
        }
        if replay.revision() != revision {
            revision = replay.revision();
            if args.json {
                println!("{}", tollgate_replay::view::snapshot(&replay));
            } else {
                print_lanes(&replay);
            }
        }
    }

    if let Some(report) = replay.final_report() {
        println!("Vehicles served:   {}", report.total_served);
        println!("Average wait:      {:.2} s", report.avg_wait);
        println!("Longest wait:      {} s", report.max_wait);
        println!("Longest queue:     {} vehicles", report.max_queue_length);
        for lane in &report.utilization {
            println!("  {:<10} {:>6.2}% busy", lane.id, lane.utilization);
        }
    }
    Ok(())
}

/// Prints one line per lane: the booth status followed by its vehicles.
fn print_lanes(replay: &Replay) {
    let (time, served) = replay
        .current_frame()
        .map_or((0.0, 0), |frame| (frame.time.unwrap_or(0.0), frame.served));
    println!(
        "t = {}s (frame {}/{}, {} served)",
        time,
        replay.frame_index(),
        replay.frame_count(),
        served
    );
    for lane in replay.lanes() {
        let booth = match lane.status() {
            Status::Busy => '#',
            Status::Free => '.',
        };
        let vehicles = lane
            .vehicles()
            .map(|v| format!("{}:{:?}", v.id(), v.lifecycle()))
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {:<10} [{}] {}", lane.id(), booth, vehicles);
    }
    if let Some(event) = replay.event_log().next() {
        println!("  {}", event);
    }
}
