//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{Scheduler, SharedEngine, SoundPlayer, TimerEngine, TimerSnapshot, Workout};
use crate::error::TimerError;

/// A command the engine refused, with the timer it was refused against
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub error: TimerError,
    pub timer: TimerSnapshot,
}

/// Application state shared by the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// The single timer of this session
    pub engine: SharedEngine,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create the application state around a freshly built engine
    pub fn new(
        port: u16,
        host: String,
        workouts: Vec<Workout>,
        allow_sound: bool,
        sound: Arc<dyn SoundPlayer>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, TimerError> {
        let engine = TimerEngine::create(workouts, allow_sound, sound, scheduler)?;

        Ok(Self {
            engine,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        })
    }

    fn lock_engine(&self) -> MutexGuard<'_, TimerEngine> {
        // Commands never panic mid-transition, so a poisoned lock still guards consistent state.
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one command against the engine and record it as the last action.
    ///
    /// A rejection carries the timer as it stood under the same lock.
    pub fn dispatch<F>(&self, action: &str, command: F) -> Result<TimerSnapshot, Rejection>
    where
        F: FnOnce(&mut TimerEngine) -> Result<TimerSnapshot, TimerError>,
    {
        let mut engine = self.lock_engine();
        let result = command(&mut *engine).map_err(|error| Rejection {
            error,
            timer: engine.snapshot(),
        });
        drop(engine); // Release the lock early

        match &result {
            Ok(_) => self.record(action),
            Err(rejection) => warn!("Command '{}' rejected: {}", action, rejection.error),
        }

        result
    }

    fn record(&self, action: &str) {
        info!("Command '{}' applied", action);
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    pub fn start(&self) -> Result<TimerSnapshot, Rejection> {
        self.dispatch("start", TimerEngine::start)
    }

    pub fn toggle_pause(&self) -> Result<TimerSnapshot, Rejection> {
        self.dispatch("pause", TimerEngine::toggle_pause)
    }

    /// Stop from any phase; this cannot be rejected
    pub fn stop(&self) -> TimerSnapshot {
        let snapshot = self.lock_engine().stop();
        self.record("stop");
        snapshot
    }

    pub fn increment(&self) -> Result<TimerSnapshot, Rejection> {
        self.dispatch("increment", TimerEngine::increment)
    }

    pub fn decrement(&self) -> Result<TimerSnapshot, Rejection> {
        self.dispatch("decrement", TimerEngine::decrement)
    }

    pub fn set_exercise_count(&self, n: u32) -> Result<TimerSnapshot, Rejection> {
        self.dispatch("set-exercises", |engine| engine.set_exercise_count(n))
    }

    pub fn set_set_count(&self, n: u32) -> Result<TimerSnapshot, Rejection> {
        self.dispatch("set-sets", |engine| engine.set_set_count(n))
    }

    pub fn set_pace(&self, n: u32) -> Result<TimerSnapshot, Rejection> {
        self.dispatch("set-pace", |engine| engine.set_pace(n))
    }

    pub fn set_break_minutes(&self, n: u32) -> Result<TimerSnapshot, Rejection> {
        self.dispatch("set-break", |engine| engine.set_break_minutes(n))
    }

    pub fn set_allow_sound(&self, enabled: bool) -> TimerSnapshot {
        let snapshot = self.lock_engine().set_allow_sound(enabled);
        self.record(if enabled { "sound-on" } else { "sound-off" });
        snapshot
    }

    /// Current timer snapshot
    pub fn get_timer_state(&self) -> TimerSnapshot {
        self.lock_engine().snapshot()
    }

    pub fn get_workouts(&self) -> Vec<Workout> {
        self.lock_engine().workouts().to_vec()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.lock_engine().subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        test_support::{ManualScheduler, RecordingSoundPlayer},
        Phase,
    };

    fn app_state() -> AppState {
        AppState::new(
            20554,
            "127.0.0.1".to_string(),
            vec![Workout::new("Arms + Legs", 6)],
            false,
            Arc::new(RecordingSoundPlayer::new()),
            Arc::new(ManualScheduler::new()),
        )
        .unwrap()
    }

    #[test]
    fn accepted_commands_are_recorded() {
        let state = app_state();
        assert_eq!(state.get_last_action(), (None, None));

        let snapshot = state.start().unwrap();
        assert_eq!(snapshot.phase, Phase::Running);

        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("start"));
        assert!(time.is_some());
    }

    #[test]
    fn rejected_commands_are_not_recorded() {
        let state = app_state();
        assert!(state.toggle_pause().is_err());
        assert!(state.set_pace(200).is_err());
        assert_eq!(state.get_last_action().0, None);
        assert_eq!(state.get_timer_state().phase, Phase::Idle);
    }

    #[test]
    fn rejection_reports_the_timer_it_was_refused_against() {
        let state = app_state();
        state.start().unwrap();

        // A tick that lands inside the same critical section shows up in the rejection.
        let rejection = state
            .dispatch("start", |engine| {
                engine.tick();
                engine.start()
            })
            .unwrap_err();
        assert_eq!(rejection.error, TimerError::transition("start", Phase::Running));
        assert_eq!(rejection.timer.phase, Phase::Running);
        assert_eq!(rejection.timer.display, "36:59");
        assert_eq!(rejection.timer, state.get_timer_state());
    }

    #[test]
    fn stop_and_sound_toggle_always_apply() {
        let state = app_state();
        state.start().unwrap();

        let snapshot = state.stop();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(state.get_last_action().0.as_deref(), Some("stop"));

        assert!(state.set_allow_sound(true).allow_sound);
        assert_eq!(state.get_last_action().0.as_deref(), Some("sound-on"));
    }

    #[test]
    fn uptime_starts_in_seconds() {
        let state = app_state();
        assert!(state.get_uptime().ends_with('s'));
    }
}
