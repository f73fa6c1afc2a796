//! Run state of the countdown and the snapshot published to the host

use std::fmt;

use serde::{Deserialize, Serialize};

use super::WorkoutConfig;

/// Coarse phase of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    AlarmFiring,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::AlarmFiring => "alarm firing",
        })
    }
}

/// Countdown state with the remaining time in whole seconds.
///
/// The alarm only fires at zero, so `AlarmFiring` carries no remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle { remaining: u32 },
    Running { remaining: u32 },
    Paused { remaining: u32 },
    AlarmFiring,
}

impl RunState {
    pub fn phase(&self) -> Phase {
        match self {
            RunState::Idle { .. } => Phase::Idle,
            RunState::Running { .. } => Phase::Running,
            RunState::Paused { .. } => Phase::Paused,
            RunState::AlarmFiring => Phase::AlarmFiring,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        match *self {
            RunState::Idle { remaining }
            | RunState::Running { remaining }
            | RunState::Paused { remaining } => remaining,
            RunState::AlarmFiring => 0,
        }
    }

    /// Same phase, different remaining time. `AlarmFiring` is left as is.
    pub fn with_remaining(self, remaining: u32) -> Self {
        match self {
            RunState::Idle { .. } => RunState::Idle { remaining },
            RunState::Running { .. } => RunState::Running { remaining },
            RunState::Paused { .. } => RunState::Paused { remaining },
            RunState::AlarmFiring => RunState::AlarmFiring,
        }
    }
}

/// Render a duration in seconds as `MM:SS`
pub fn format_display(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub(crate) fn seconds_to_minutes(seconds: u32) -> f64 {
    f64::from(seconds) / 60.0
}

/// Everything a presentation layer needs to render the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub exercise_count: u32,
    pub set_count: u32,
    pub pace_seconds_per_exercise: u32,
    pub break_minutes: u32,
    pub remaining_duration_minutes: f64,
    pub initial_duration_minutes: f64,
    pub phase: Phase,
    pub display: String,
    pub allow_sound: bool,
}

impl TimerSnapshot {
    pub fn new(config: &WorkoutConfig, run: RunState, initial_seconds: u32, allow_sound: bool) -> Self {
        let remaining = run.remaining_seconds();
        Self {
            exercise_count: config.exercise_count,
            set_count: config.set_count,
            pace_seconds_per_exercise: config.pace_seconds_per_exercise,
            break_minutes: config.break_minutes,
            remaining_duration_minutes: seconds_to_minutes(remaining),
            initial_duration_minutes: seconds_to_minutes(initial_seconds),
            phase: run.phase(),
            display: format_display(remaining),
            allow_sound,
        }
    }
}
