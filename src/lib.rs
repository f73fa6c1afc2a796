//! Workout Timer - An interval-workout countdown timer
//!
//! This library computes a session length from a workout's exercise count,
//! set count, pace and break length, then counts it down once per second,
//! requesting a click cue on every change and an alarm cue at zero.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, Phase, TimerEngine, TimerSnapshot};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
