//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};

use crate::state::{AppState, Rejection, TimerSnapshot};
use super::responses::{
    ApiResponse, HealthResponse, SoundRequest, StatusResponse, ValueRequest, WorkoutsResponse,
};

type CommandResponse = (StatusCode, Json<ApiResponse>);

/// Turn a command result into a response; rejections carry the unchanged timer
fn respond(message: &str, result: Result<TimerSnapshot, Rejection>) -> CommandResponse {
    match result {
        Ok(timer) => (StatusCode::OK, Json(ApiResponse::ok(message.to_string(), timer))),
        Err(Rejection { error, timer }) => {
            let status = if error.is_configuration() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::CONFLICT
            };
            (status, Json(ApiResponse::rejected(error.to_string(), timer)))
        }
    }
}

/// Handle POST /start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    respond("Countdown started", state.start())
}

/// Handle POST /pause - Toggle between running and paused
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    let result = state.toggle_pause();
    let message = match &result {
        Ok(timer) => format!("Countdown {}", timer.phase),
        Err(_) => String::new(),
    };
    respond(&message, result)
}

/// Handle POST /stop
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    respond("Countdown stopped", Ok(state.stop()))
}

/// Handle POST /increment
pub async fn increment_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    respond("Added a minute", state.increment())
}

/// Handle POST /decrement
pub async fn decrement_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    respond("Removed a minute", state.decrement())
}

/// Handle POST /config/exercises
pub async fn exercises_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValueRequest>,
) -> CommandResponse {
    respond("Exercise count updated", state.set_exercise_count(body.value))
}

/// Handle POST /config/sets
pub async fn sets_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValueRequest>,
) -> CommandResponse {
    respond("Set count updated", state.set_set_count(body.value))
}

/// Handle POST /config/pace
pub async fn pace_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValueRequest>,
) -> CommandResponse {
    respond("Pace updated", state.set_pace(body.value))
}

/// Handle POST /config/break
pub async fn break_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValueRequest>,
) -> CommandResponse {
    respond("Break length updated", state.set_break_minutes(body.value))
}

/// Handle POST /sound - Enable or mute click cues
pub async fn sound_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SoundRequest>,
) -> CommandResponse {
    let message = if body.enabled { "Click cues enabled" } else { "Click cues muted" };
    respond(message, Ok(state.set_allow_sound(body.enabled)))
}

/// Handle GET /status - Return the timer and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.get_timer_state(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /workouts - Return the workout catalog
pub async fn workouts_handler(State(state): State<Arc<AppState>>) -> Json<WorkoutsResponse> {
    Json(WorkoutsResponse {
        workouts: state.get_workouts(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
