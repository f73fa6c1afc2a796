//! Workout Timer - An interval-workout countdown timer
//!
//! This is the main entry point for the workout-timer application.

use std::sync::Arc;
use anyhow::Context;
use tokio::{net::TcpListener, runtime::Handle};
use tracing::info;

use workout_timer::{
    config::Config,
    services::{CommandSoundPlayer, LogSoundPlayer},
    state::{workout_config, AppState, SoundPlayer},
    tasks::{phase_logger_task, TokioScheduler},
    api::create_router,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("workout_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting workout-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, mute={}", config.host, config.port, config.mute);

    let workouts = match &config.workouts {
        Some(path) => workout_config::load_catalog(path)?,
        None => workout_config::default_catalog(),
    };
    info!("Loaded {} workouts", workouts.len());

    let sound: Arc<dyn SoundPlayer> = match config.sound_files() {
        Some((click, alarm)) => {
            info!("Playing cues with {}", config.player);
            Arc::new(CommandSoundPlayer::new(config.player.clone(), click, alarm, Handle::current()))
        }
        None => {
            info!("No sound files configured, cues will only be logged");
            Arc::new(LogSoundPlayer)
        }
    };

    // Create application state
    let state = Arc::new(
        AppState::new(
            config.port,
            config.host.clone(),
            workouts,
            !config.mute,
            sound,
            Arc::new(TokioScheduler::current()),
        )
        .context("Failed to create timer")?,
    );

    // Log phase transitions in the background
    tokio::spawn(phase_logger_task(state.subscribe()));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start             - Start the countdown");
    info!("  POST /pause             - Pause or resume the countdown");
    info!("  POST /stop              - Stop and reset the countdown");
    info!("  POST /increment         - Add a minute");
    info!("  POST /decrement         - Remove a minute");
    info!("  POST /config/exercises  - Set exercise count");
    info!("  POST /config/sets       - Set number of sets");
    info!("  POST /config/pace       - Set seconds per exercise");
    info!("  POST /config/break      - Set break minutes");
    info!("  POST /sound             - Enable or mute click cues");
    info!("  GET  /status            - Timer state");
    info!("  GET  /workouts          - Workout catalog");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Silence any alarm before exiting
    let timer = state.stop();
    info!("Timer stopped at {}", timer.display);
    info!("Server shutdown complete");
    Ok(())
}
