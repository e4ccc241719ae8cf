use crate::config::{ConfigError, PlaybackSettings, SimulationConfig};
use crate::frame::{FinalStats, Frame, RunResult};
use crate::lane::Lane;
use crate::metrics::{Projector, SeriesPoint};
use crate::playback::{Advance, Playback};
use crate::reconcile::{Reconciler, Transition};
use crate::scheduler::Scheduler;
use crate::service::{Scenario, ScenarioStore, ServiceError, SimulationService};
use crate::store::SnapshotStore;
use std::time::Duration;

/// A message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Work scheduled on the replay's timer queue.
#[derive(Clone, Copy, Debug)]
enum Task {
    /// Advance playback by one frame.
    Tick { generation: u64 },
    /// Apply a vehicle lifecycle transition scheduled during run `epoch`.
    Vehicle { epoch: u64, transition: Transition },
}

/// The replay of a simulation run.
///
/// Owns the loaded run and everything derived from playing it back. All
/// mutation goes through this type; a render layer reads the public getters
/// and re-reads them whenever [Replay::revision] changes.
pub struct Replay {
    /// The playback settings.
    settings: PlaybackSettings,
    /// The configuration the next run is requested with.
    config: SimulationConfig,
    /// The frames of the loaded run.
    store: SnapshotStore,
    /// The lanes of the configured layout, with their vehicles.
    lanes: Vec<Lane>,
    /// Infers vehicles from frame changes.
    engine: Reconciler,
    /// The queue length series and event log.
    projector: Projector,
    /// The playback controller.
    playback: Playback,
    /// The frame ticks and vehicle timers.
    timers: Scheduler<Task>,
    /// Identifies the current run. Vehicle timers from an earlier run are ignored.
    epoch: u64,
    /// Incremented on every change visible to a render layer.
    revision: u64,
    /// The scenarios known to the scenario store.
    scenarios: Vec<Scenario>,
    /// Messages not yet shown to the user.
    notices: Vec<Notice>,
}

impl Replay {
    /// Creates a replay with the default simulation configuration.
    pub fn new(settings: PlaybackSettings) -> Self {
        Self::build(SimulationConfig::default(), settings)
    }

    /// Creates a replay for runs of the given configuration.
    pub fn with_config(
        config: SimulationConfig,
        settings: PlaybackSettings,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, settings))
    }

    fn build(config: SimulationConfig, settings: PlaybackSettings) -> Self {
        Self {
            lanes: Lane::from_layout(&config.layout()),
            engine: Reconciler::new(settings.arrival_mode, settings.seed),
            projector: Projector::new(settings.event_log_capacity),
            store: Default::default(),
            playback: Playback::new(),
            timers: Scheduler::new(),
            epoch: 0,
            revision: 0,
            scenarios: vec![],
            notices: vec![],
            settings,
            config,
        }
    }

    /// The playback clock.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Advances the playback clock by `dt`, running every timer that falls due.
    pub fn step(&mut self, dt: Duration) {
        let until = self.timers.now() + dt;
        while let Some(task) = self.timers.pop_due(until) {
            self.run_task(task);
        }
        self.timers.advance_to(until);
    }

    /// Runs timers until none are left: playback reaches its end or stops,
    /// and every vehicle animation finishes.
    pub fn run_until_idle(&mut self) {
        while let Some(due) = self.timers.next_due() {
            if let Some(task) = self.timers.pop_due(due) {
                self.run_task(task);
            }
        }
    }

    /// The number of timers that haven't fired yet.
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Replaces the loaded run and resets playback to its first frame.
    pub fn load_run(&mut self, run: RunResult) {
        log::info!("loaded a run of {} frames", run.history.len());
        self.store.load(run);
        self.reset();
    }

    /// Requests a run for the current configuration and starts playing it.
    ///
    /// If the request fails the previous run stays loaded.
    pub fn start_run(&mut self, service: &dyn SimulationService) -> Result<(), ServiceError> {
        match service.simulate(&self.config) {
            Ok(run) => {
                self.load_run(run);
                self.start();
                self.notify(Notice::Info("Simulation started".to_string()));
                Ok(())
            }
            Err(err) => {
                log::warn!("simulation request failed: {}", err);
                self.notify(Notice::Error(format!("Couldn't reach the simulation: {}", err)));
                Err(err)
            }
        }
    }

    /// Starts or resumes playback.
    pub fn start(&mut self) {
        if let Some(generation) = self.playback.start(self.store.len()) {
            self.timers
                .schedule(self.settings.tick_period(), Task::Tick { generation });
            self.revision += 1;
        }
    }

    /// Pauses playback on the current frame.
    pub fn stop(&mut self) {
        if self.playback.is_running() {
            self.playback.stop();
            self.revision += 1;
        }
    }

    /// Returns to the first frame of the loaded run with empty lanes,
    /// an empty series and an empty event log.
    pub fn reset(&mut self) {
        self.playback.reset();
        self.clear_lanes();
        self.engine.reset();
        self.projector.reset();
        self.revision += 1;
    }

    /// Replaces the simulation configuration, rebuilding the lanes for its layout.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let layout = config.layout();
        self.config = config;
        self.lanes = Lane::from_layout(&layout);
        self.epoch += 1;
        self.revision += 1;
        Ok(())
    }

    /// Fetches the list of saved scenarios.
    pub fn refresh_scenarios(&mut self, store: &dyn ScenarioStore) {
        match store.list() {
            Ok(scenarios) => {
                self.scenarios = scenarios;
                self.revision += 1;
            }
            Err(err) => log::error!("couldn't load scenarios: {}", err),
        }
    }

    /// Saves the current configuration under `name`.
    pub fn save_scenario(&mut self, store: &dyn ScenarioStore, name: &str) {
        if name.trim().is_empty() {
            self.notify(Notice::Error("Give the scenario a name".to_string()));
            return;
        }
        let scenario = Scenario {
            name: name.to_string(),
            config: self.config.clone(),
        };
        match store.save(&scenario) {
            Ok(()) => {
                self.scenarios.push(scenario);
                self.notify(Notice::Info(format!("Scenario \"{}\" saved", name)));
            }
            Err(err) => {
                log::warn!("couldn't save scenario {:?}: {}", name, err);
                self.notify(Notice::Error("Couldn't save the scenario".to_string()));
            }
        }
    }

    /// Switches to the configuration of a saved scenario.
    pub fn load_scenario(&mut self, name: &str) -> bool {
        let Some(scenario) = self.scenarios.iter().find(|s| s.name == name) else {
            return false;
        };
        let config = scenario.config.clone();
        match self.set_config(config) {
            Ok(()) => {
                self.notify(Notice::Info(format!("Scenario \"{}\" loaded", name)));
                true
            }
            Err(err) => {
                self.notify(Notice::Error(format!("Scenario \"{}\" is invalid: {}", name, err)));
                false
            }
        }
    }

    /// The lanes, in layout order.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// The queue length series, one point per frame advance.
    pub fn series(&self) -> &[SeriesPoint] {
        self.projector.series()
    }

    /// The event log, newest first.
    pub fn event_log(&self) -> impl Iterator<Item = &str> {
        self.projector.log()
    }

    /// The index of the frame being shown.
    pub fn frame_index(&self) -> usize {
        self.playback.frame_index()
    }

    /// Whether playback is advancing.
    pub fn is_running(&self) -> bool {
        self.playback.is_running()
    }

    /// The frame being shown, if a run is loaded.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.store.frame_at(self.playback.frame_index()).ok()
    }

    /// The number of frames in the loaded run.
    pub fn frame_count(&self) -> usize {
        self.store.len()
    }

    /// The final statistics of the run, available while playback isn't running.
    pub fn final_report(&self) -> Option<&FinalStats> {
        if self.playback.is_running() {
            return None;
        }
        self.store.final_stats()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Changes whenever state visible to a render layer changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Takes the messages that haven't been shown yet.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
        self.revision += 1;
    }

    /// Empties the lanes and invalidates every pending vehicle timer.
    fn clear_lanes(&mut self) {
        self.lanes = Lane::from_layout(&self.config.layout());
        self.epoch += 1;
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Tick { generation } => self.tick(generation),
            Task::Vehicle { epoch, transition } => {
                if epoch != self.epoch {
                    log::trace!("ignoring {:?} from run {}", transition, epoch);
                    return;
                }
                self.engine.apply(transition, &mut self.lanes);
                self.revision += 1;
            }
        }
    }

    /// Advances playback by one frame.
    fn tick(&mut self, generation: u64) {
        if !self.playback.is_current(generation) {
            return;
        }
        let (index, finished) = match self.playback.advance(self.store.len()) {
            Advance::Moved { index, finished } => (index, finished),
            Advance::Idle => return,
        };
        self.revision += 1;

        let frames = self.store.frame_at(index - 1).and_then(|prev| {
            self.store.frame_at(index).map(|cur| (prev, cur))
        });
        let (prev, cur) = match frames {
            Ok(frames) => frames,
            Err(err) => {
                log::error!("playback out of bounds: {}", err);
                self.playback.stop();
                return;
            }
        };

        let transitions = match self.engine.reconcile(prev, cur, &mut self.lanes) {
            Ok(transitions) => transitions,
            Err(err) => {
                log::warn!("skipping frame {}: {}", index, err);
                Default::default()
            }
        };
        self.projector.record(cur);

        for transition in transitions {
            let delay = match transition {
                Transition::Settle { .. } => self.settings.settle_delay(),
                Transition::Remove { .. } => self.settings.exit_delay(),
            };
            let epoch = self.epoch;
            self.timers
                .schedule(delay, Task::Vehicle { epoch, transition });
        }

        if finished {
            log::info!("playback finished at frame {}", index);
            self.notify(Notice::Info("Simulation finished".to_string()));
        } else {
            self.timers
                .schedule(self.settings.tick_period(), Task::Tick { generation });
        }
    }
}
