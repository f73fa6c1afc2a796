//! Workout catalog and configuration

use std::{fs, path::Path};

use anyhow::Context;
use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::TimerError;

pub const MIN_SETS: u32 = 1;
pub const MAX_SETS: u32 = 5;
pub const MIN_PACE_SECONDS: u32 = 30;
pub const MAX_PACE_SECONDS: u32 = 180;
pub const PACE_STEP_SECONDS: u32 = 30;
pub const MIN_BREAK_MINUTES: u32 = 1;
pub const MAX_BREAK_MINUTES: u32 = 10;

pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_PACE_SECONDS: u32 = 90;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Largest exercise count whose longest session still fits in `u32` seconds
pub const MAX_EXERCISES: u32 =
    (u32::MAX - (MAX_SETS - 1) * MAX_BREAK_MINUTES * 60) / (MAX_SETS * MAX_PACE_SECONDS);

/// A catalog entry the user can pick as the workout type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub name: String,
    pub num_exercises: u32,
}

impl Workout {
    pub fn new(name: impl Into<String>, num_exercises: u32) -> Self {
        Self {
            name: name.into(),
            num_exercises,
        }
    }
}

/// Built-in catalog; the full-body and core workouts are longer before noon.
pub fn default_catalog() -> Vec<Workout> {
    catalog_for_hour(Local::now().hour())
}

pub fn catalog_for_hour(hour: u32) -> Vec<Workout> {
    let morning = hour < 12;
    vec![
        Workout::new("Full-body workout", if morning { 9 } else { 8 }),
        Workout::new("Arms + Legs", 6),
        Workout::new("Arms only", 3),
        Workout::new("Legs only", 4),
        Workout::new("Core only", if morning { 5 } else { 4 }),
    ]
}

/// Load a catalog from a JSON array of `{"name", "num_exercises"}` objects
pub fn load_catalog(path: &Path) -> anyhow::Result<Vec<Workout>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read workout catalog {}", path.display()))?;
    let workouts: Vec<Workout> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse workout catalog {}", path.display()))?;
    validate_catalog(&workouts)?;
    Ok(workouts)
}

pub fn validate_catalog(workouts: &[Workout]) -> Result<(), TimerError> {
    if workouts.is_empty() {
        return Err(TimerError::EmptyCatalog);
    }
    if let Some(workout) = workouts
        .iter()
        .find(|w| w.num_exercises == 0 || w.num_exercises > MAX_EXERCISES)
    {
        return Err(TimerError::InvalidWorkout {
            name: workout.name.clone(),
        });
    }
    Ok(())
}

/// User-adjustable workout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    pub exercise_count: u32,
    pub set_count: u32,
    pub pace_seconds_per_exercise: u32,
    pub break_minutes: u32,
}

impl WorkoutConfig {
    /// Defaults for a session starting on the given catalog's first entry
    pub fn for_workout(workout: &Workout) -> Self {
        Self {
            exercise_count: workout.num_exercises,
            set_count: DEFAULT_SETS,
            pace_seconds_per_exercise: DEFAULT_PACE_SECONDS,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }

    /// Total session length in whole seconds.
    ///
    /// No break is charged after the final set.
    pub fn total_seconds(&self) -> u32 {
        self.exercise_count * self.set_count * self.pace_seconds_per_exercise
            + self.set_count.saturating_sub(1) * self.break_minutes * 60
    }

    /// Total session length in minutes
    pub fn initial_duration_minutes(&self) -> f64 {
        f64::from(self.total_seconds()) / 60.0
    }
}

pub fn validate_exercise_count(workouts: &[Workout], n: u32) -> Result<u32, TimerError> {
    if workouts.iter().any(|w| w.num_exercises == n) {
        Ok(n)
    } else {
        Err(TimerError::out_of_range(
            "exercise count",
            n,
            "no workout in the catalog has that many exercises",
        ))
    }
}

pub fn validate_set_count(n: u32) -> Result<u32, TimerError> {
    if (MIN_SETS..=MAX_SETS).contains(&n) {
        Ok(n)
    } else {
        Err(TimerError::out_of_range(
            "set count",
            n,
            format!("must be between {} and {}", MIN_SETS, MAX_SETS),
        ))
    }
}

pub fn validate_pace(n: u32) -> Result<u32, TimerError> {
    if !(MIN_PACE_SECONDS..=MAX_PACE_SECONDS).contains(&n) {
        return Err(TimerError::out_of_range(
            "pace",
            n,
            format!(
                "must be between {} and {} seconds per exercise",
                MIN_PACE_SECONDS, MAX_PACE_SECONDS
            ),
        ));
    }
    if n % PACE_STEP_SECONDS != 0 {
        return Err(TimerError::out_of_range(
            "pace",
            n,
            format!("must be a multiple of {} seconds", PACE_STEP_SECONDS),
        ));
    }
    Ok(n)
}

pub fn validate_break_minutes(n: u32) -> Result<u32, TimerError> {
    if (MIN_BREAK_MINUTES..=MAX_BREAK_MINUTES).contains(&n) {
        Ok(n)
    } else {
        Err(TimerError::out_of_range(
            "break length",
            n,
            format!("must be between {} and {} minutes", MIN_BREAK_MINUTES, MAX_BREAK_MINUTES),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(exercise_count: u32, set_count: u32, pace: u32, break_minutes: u32) -> WorkoutConfig {
        WorkoutConfig {
            exercise_count,
            set_count,
            pace_seconds_per_exercise: pace,
            break_minutes,
        }
    }

    #[test]
    fn eight_exercises_three_sets_takes_46_minutes() {
        let c = config(8, 3, 90, 5);
        assert_eq!(c.total_seconds(), 46 * 60);
        assert_eq!(c.initial_duration_minutes(), 46.0);
    }

    #[test]
    fn single_set_charges_no_break() {
        assert_eq!(config(3, 1, 30, 10).initial_duration_minutes(), 1.5);
    }

    #[test]
    fn formula_holds_across_the_valid_domain() {
        for exercises in [3, 4, 9] {
            for sets in MIN_SETS..=MAX_SETS {
                for pace in (MIN_PACE_SECONDS..=MAX_PACE_SECONDS).step_by(PACE_STEP_SECONDS as usize) {
                    for brk in MIN_BREAK_MINUTES..=MAX_BREAK_MINUTES {
                        let expected = f64::from(exercises * sets * pace) / 60.0
                            + f64::from(sets - 1) * f64::from(brk);
                        let actual = config(exercises, sets, pace, brk).initial_duration_minutes();
                        assert!((actual - expected).abs() < 1e-9);
                        assert!(actual >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn defaults_start_from_the_given_workout() {
        let c = WorkoutConfig::for_workout(&Workout::new("Arms only", 3));
        assert_eq!(c, config(3, 3, 90, 5));
    }

    #[test]
    fn morning_catalog_is_longer() {
        let am = catalog_for_hour(8);
        let pm = catalog_for_hour(18);
        assert_eq!(am[0].num_exercises, 9);
        assert_eq!(pm[0].num_exercises, 8);
        assert_eq!(am[4].num_exercises, 5);
        assert_eq!(pm[4].num_exercises, 4);
    }

    #[test]
    fn setters_reject_values_outside_their_domain() {
        assert!(validate_set_count(0).is_err());
        assert!(validate_set_count(6).is_err());
        assert_eq!(validate_set_count(5), Ok(5));

        assert!(validate_pace(0).is_err());
        assert!(validate_pace(45).is_err());
        assert!(validate_pace(210).is_err());
        assert_eq!(validate_pace(180), Ok(180));

        assert!(validate_break_minutes(0).is_err());
        assert!(validate_break_minutes(11).is_err());
        assert_eq!(validate_break_minutes(1), Ok(1));

        let workouts = catalog_for_hour(8);
        assert!(validate_exercise_count(&workouts, 7).is_err());
        assert_eq!(validate_exercise_count(&workouts, 6), Ok(6));
    }

    #[test]
    fn catalog_must_be_non_empty_with_exercises() {
        assert_eq!(validate_catalog(&[]), Err(TimerError::EmptyCatalog));
        assert_eq!(
            validate_catalog(&[Workout::new("Nothing", 0)]),
            Err(TimerError::InvalidWorkout { name: "Nothing".to_string() })
        );
    }

    #[test]
    fn catalog_rejects_counts_the_duration_cannot_hold() {
        assert_eq!(
            validate_catalog(&[Workout::new("Marathon", 10_000_000)]),
            Err(TimerError::InvalidWorkout { name: "Marathon".to_string() })
        );

        let longest = Workout::new("Longest", MAX_EXERCISES);
        assert_eq!(validate_catalog(&[longest]), Ok(()));
        let c = config(MAX_EXERCISES, MAX_SETS, MAX_PACE_SECONDS, MAX_BREAK_MINUTES);
        let expected = u64::from(MAX_EXERCISES) * u64::from(MAX_SETS * MAX_PACE_SECONDS)
            + u64::from((MAX_SETS - 1) * MAX_BREAK_MINUTES * 60);
        assert_eq!(u64::from(c.total_seconds()), expected);
    }

    #[test]
    fn catalog_loads_from_json() {
        let path = std::env::temp_dir().join(format!("workout-catalog-{}.json", std::process::id()));
        fs::write(&path, r#"[{"name": "Stretching", "num_exercises": 7}]"#).unwrap();
        let workouts = load_catalog(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(workouts, vec![Workout::new("Stretching", 7)]);
    }
}
