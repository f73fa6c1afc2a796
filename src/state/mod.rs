//! State management module
//!
//! This module contains the workout configuration, the countdown state
//! machine and the shared application state wrapped around it.

pub mod workout_config;
pub mod timer_state;
pub mod timer_engine;
pub mod app_state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types
pub use workout_config::{Workout, WorkoutConfig};
pub use timer_state::{Phase, RunState, TimerSnapshot};
pub use timer_engine::{Scheduler, SharedEngine, SoundPlayer, TickCallback, TickHandle, TimerEngine};
pub use app_state::{AppState, Rejection};
