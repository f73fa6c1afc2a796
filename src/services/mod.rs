//! External service module
//!
//! This module contains the audio players handed to the timer engine.

pub mod sound;

// Re-export main types
pub use sound::{CommandSoundPlayer, LogSoundPlayer};
