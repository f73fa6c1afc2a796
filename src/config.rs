//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "workout-timer")]
#[command(about = "An interval-workout countdown timer with an HTTP control surface")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// JSON file with the workout catalog ([{"name": ..., "num_exercises": ...}])
    #[arg(short, long)]
    pub workouts: Option<PathBuf>,

    /// Start with click cues muted (the alarm still sounds)
    #[arg(short, long)]
    pub mute: bool,

    /// Audio file played on every change of the remaining time
    #[arg(long, requires = "alarm_sound")]
    pub click_sound: Option<PathBuf>,

    /// Audio file played when the countdown reaches zero
    #[arg(long, requires = "click_sound")]
    pub alarm_sound: Option<PathBuf>,

    /// Program used to play the audio files
    #[arg(long, default_value = "paplay")]
    pub player: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Click and alarm files, when both are configured
    pub fn sound_files(&self) -> Option<(PathBuf, PathBuf)> {
        Some((self.click_sound.clone()?, self.alarm_sound.clone()?))
    }
}
