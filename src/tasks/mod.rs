//! Background tasks module
//!
//! This module contains the tick scheduler that drives the countdown and
//! the tasks that run alongside the HTTP server.

pub mod tick_scheduler;
pub mod phase_logger;

// Re-export main types
pub use tick_scheduler::TokioScheduler;
pub use phase_logger::phase_logger_task;
