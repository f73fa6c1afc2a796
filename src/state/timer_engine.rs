//! Countdown state machine
//!
//! ```text
//!            start               remaining hits 0
//!   Idle ─────────────► Running ──────────────────► AlarmFiring
//!    ▲                  │     ▲                          │
//!    │     toggle_pause │     │ toggle_pause             │
//!    │                  ▼     │                          │
//!    │                  Paused                           │
//!    │                                                   │
//!    └──────────────── stop (from any phase) ────────────┘
//! ```
//!
//! Every command runs to completion under the engine's lock, including the
//! scheduled tick callback. Each cadence handed to the [`Scheduler`] carries a
//! generation number, and a callback from a cadence that is no longer active
//! is dropped. A tick that was already waiting on the lock when `stop()` ran
//! cannot touch the state afterwards.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError, Weak},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{
    timer_state::{seconds_to_minutes, RunState},
    workout_config::{
        validate_break_minutes, validate_catalog, validate_exercise_count, validate_pace,
        validate_set_count,
    },
    Phase, TimerSnapshot, Workout, WorkoutConfig,
};
use crate::error::TimerError;

/// Audio capability supplied by the host.
///
/// Failures are logged by the engine and otherwise ignored.
pub trait SoundPlayer: Send + Sync {
    /// Short cue played whenever the remaining time changes
    fn play_click(&self) -> anyhow::Result<()>;
    /// Terminal cue played once when the countdown reaches zero
    fn play_alarm(&self) -> anyhow::Result<()>;
    /// Halt the alarm cue and rewind it to the beginning
    fn stop_alarm(&self) -> anyhow::Result<()>;
}

pub type TickCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// Identifies one repeating cadence handed out by a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Repeating one-second callback capability supplied by the host
pub trait Scheduler: Send + Sync {
    /// Invoke `on_tick` once per second, first one second from now, until cancelled.
    ///
    /// Implementations must not invoke `on_tick` before returning: the engine
    /// holds its own lock while scheduling.
    fn schedule_every_second(&self, on_tick: TickCallback) -> TickHandle;

    fn cancel(&self, handle: TickHandle);
}

pub type SharedEngine = Arc<Mutex<TimerEngine>>;

#[derive(Debug, Clone, Copy)]
struct Cadence {
    handle: TickHandle,
    generation: u64,
}

/// Owns the workout configuration, the derived duration and the run state
pub struct TimerEngine {
    workouts: Vec<Workout>,
    config: WorkoutConfig,
    initial_seconds: u32,
    run: RunState,
    allow_sound: bool,
    sound: Arc<dyn SoundPlayer>,
    scheduler: Arc<dyn Scheduler>,
    cadence: Option<Cadence>,
    generation: u64,
    this: Weak<Mutex<TimerEngine>>,
    updates: watch::Sender<TimerSnapshot>,
}

impl TimerEngine {
    /// Create an idle engine configured from the first catalog entry
    pub fn create(
        workouts: Vec<Workout>,
        allow_sound: bool,
        sound: Arc<dyn SoundPlayer>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<SharedEngine, TimerError> {
        validate_catalog(&workouts)?;
        let config = WorkoutConfig::for_workout(workouts.first().ok_or(TimerError::EmptyCatalog)?);
        let initial_seconds = config.total_seconds();
        let run = RunState::Idle {
            remaining: initial_seconds,
        };
        let (updates, _) = watch::channel(TimerSnapshot::new(&config, run, initial_seconds, allow_sound));

        info!(
            "Timer ready: {} exercises, {} sets, {}s/exercise, {}min breaks ({} min total)",
            config.exercise_count,
            config.set_count,
            config.pace_seconds_per_exercise,
            config.break_minutes,
            config.initial_duration_minutes()
        );

        Ok(Arc::new_cyclic(|this| {
            Mutex::new(Self {
                workouts,
                config,
                initial_seconds,
                run,
                allow_sound,
                sound,
                scheduler,
                cadence: None,
                generation: 0,
                this: this.clone(),
                updates,
            })
        }))
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn config(&self) -> WorkoutConfig {
        self.config
    }

    pub fn phase(&self) -> Phase {
        self.run.phase()
    }

    pub fn remaining_duration_minutes(&self) -> f64 {
        seconds_to_minutes(self.run.remaining_seconds())
    }

    pub fn initial_duration_minutes(&self) -> f64 {
        seconds_to_minutes(self.initial_seconds)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(&self.config, self.run, self.initial_seconds, self.allow_sound)
    }

    /// Receive a fresh snapshot after every mutation
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.updates.subscribe()
    }

    pub fn set_exercise_count(&mut self, n: u32) -> Result<TimerSnapshot, TimerError> {
        let n = validate_exercise_count(&self.workouts, n)?;
        Ok(self.reconfigure(|config| config.exercise_count = n))
    }

    pub fn set_set_count(&mut self, n: u32) -> Result<TimerSnapshot, TimerError> {
        let n = validate_set_count(n)?;
        Ok(self.reconfigure(|config| config.set_count = n))
    }

    pub fn set_pace(&mut self, n: u32) -> Result<TimerSnapshot, TimerError> {
        let n = validate_pace(n)?;
        Ok(self.reconfigure(|config| config.pace_seconds_per_exercise = n))
    }

    pub fn set_break_minutes(&mut self, n: u32) -> Result<TimerSnapshot, TimerError> {
        let n = validate_break_minutes(n)?;
        Ok(self.reconfigure(|config| config.break_minutes = n))
    }

    /// Gate the click cue. The alarm cue always plays.
    pub fn set_allow_sound(&mut self, allow_sound: bool) -> TimerSnapshot {
        info!("Click cues {}", if allow_sound { "enabled" } else { "muted" });
        self.allow_sound = allow_sound;
        self.publish()
    }

    pub fn start(&mut self) -> Result<TimerSnapshot, TimerError> {
        let RunState::Idle { remaining } = self.run else {
            return Err(TimerError::transition("start", self.run.phase()));
        };

        info!("Starting countdown from {}", super::timer_state::format_display(remaining));
        self.run = RunState::Running { remaining };
        self.begin_cadence();
        self.check_alarm();
        Ok(self.publish())
    }

    pub fn toggle_pause(&mut self) -> Result<TimerSnapshot, TimerError> {
        match self.run {
            RunState::Running { remaining } => {
                self.end_cadence();
                self.run = RunState::Paused { remaining };
                info!("Countdown paused");
            }
            RunState::Paused { remaining } => {
                self.run = RunState::Running { remaining };
                self.begin_cadence();
                info!("Countdown resumed");
                self.check_alarm();
            }
            RunState::Idle { .. } | RunState::AlarmFiring => {
                return Err(TimerError::transition("pause", self.run.phase()));
            }
        }
        Ok(self.publish())
    }

    /// Return to idle with the full duration, silencing any alarm
    pub fn stop(&mut self) -> TimerSnapshot {
        self.end_cadence();
        let previous = self.run.phase();
        if let Err(e) = self.sound.stop_alarm() {
            warn!("Failed to stop alarm cue: {}", e);
        }

        let before = self.run.remaining_seconds();
        self.run = RunState::Idle {
            remaining: self.initial_seconds,
        };
        if before != self.initial_seconds {
            self.click();
        }

        info!("Countdown stopped (was {})", previous);
        self.publish()
    }

    /// Round the remaining time down to a whole minute and add one
    pub fn increment(&mut self) -> Result<TimerSnapshot, TimerError> {
        if self.run == RunState::AlarmFiring {
            return Err(TimerError::transition("increment", Phase::AlarmFiring));
        }
        let minutes = self.run.remaining_seconds() / 60;
        self.set_remaining(minutes.saturating_add(1).saturating_mul(60));
        Ok(self.publish())
    }

    /// Round the remaining time up to a whole minute and take one away,
    /// bottoming out at zero
    pub fn decrement(&mut self) -> Result<TimerSnapshot, TimerError> {
        if self.run == RunState::AlarmFiring {
            return Err(TimerError::transition("decrement", Phase::AlarmFiring));
        }
        let remaining = self.run.remaining_seconds();
        let next = if remaining > 60 {
            (remaining.div_ceil(60) - 1) * 60
        } else {
            0
        };
        self.set_remaining(next);
        self.check_alarm();
        Ok(self.publish())
    }

    /// Take one second off a running countdown. Does nothing in other phases.
    pub fn tick(&mut self) -> TimerSnapshot {
        let RunState::Running { remaining } = self.run else {
            debug!("Tick ignored while {}", self.run.phase());
            return self.snapshot();
        };

        self.set_remaining(remaining.saturating_sub(1));
        self.check_alarm();
        self.publish()
    }

    fn on_scheduled_tick(&mut self, generation: u64) {
        match self.cadence {
            Some(cadence) if cadence.generation == generation => {
                self.tick();
            }
            _ => debug!("Dropping stale tick from cadence {}", generation),
        }
    }

    fn reconfigure(&mut self, apply: impl FnOnce(&mut WorkoutConfig)) -> TimerSnapshot {
        apply(&mut self.config);
        self.initial_seconds = self.config.total_seconds();
        info!(
            "Configuration changed: {} exercises, {} sets, {}s/exercise, {}min breaks ({} min total)",
            self.config.exercise_count,
            self.config.set_count,
            self.config.pace_seconds_per_exercise,
            self.config.break_minutes,
            self.config.initial_duration_minutes()
        );
        // An alarm keeps its zero until stopped.
        self.set_remaining(self.initial_seconds);
        self.publish()
    }

    fn set_remaining(&mut self, remaining: u32) {
        let before = self.run.remaining_seconds();
        self.run = self.run.with_remaining(remaining);
        if self.run.remaining_seconds() != before {
            self.click();
        }
    }

    fn check_alarm(&mut self) {
        if self.run != (RunState::Running { remaining: 0 }) {
            return;
        }

        info!("Countdown finished, sounding alarm");
        self.end_cadence();
        self.run = RunState::AlarmFiring;
        if let Err(e) = self.sound.play_alarm() {
            warn!("Failed to play alarm cue: {}", e);
        }
    }

    fn click(&self) {
        if !self.allow_sound {
            return;
        }
        if let Err(e) = self.sound.play_click() {
            warn!("Failed to play click cue: {}", e);
        }
    }

    fn begin_cadence(&mut self) {
        self.end_cadence();
        self.generation += 1;
        let generation = self.generation;
        let engine = self.this.clone();

        let handle = self.scheduler.schedule_every_second(Box::new(move || {
            if let Some(engine) = engine.upgrade() {
                engine
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .on_scheduled_tick(generation);
            }
        }));

        debug!("Scheduled tick cadence {} ({:?})", generation, handle);
        self.cadence = Some(Cadence { handle, generation });
    }

    fn end_cadence(&mut self) {
        if let Some(cadence) = self.cadence.take() {
            self.scheduler.cancel(cadence.handle);
            debug!("Cancelled tick cadence {}", cadence.generation);
        }
    }

    fn publish(&self) -> TimerSnapshot {
        let snapshot = self.snapshot();
        self.updates.send_replace(snapshot.clone());
        snapshot
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.end_cadence();
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("config", &self.config)
            .field("initial_seconds", &self.initial_seconds)
            .field("run", &self.run)
            .field("allow_sound", &self.allow_sound)
            .field("cadence", &self.cadence)
            .finish_non_exhaustive()
    }
}
