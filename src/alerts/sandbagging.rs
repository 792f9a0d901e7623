//! Sandbagging detection: reps that don't drop across sets suggest sets stop
//! well short of 1 RIR

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::db::{AlertSeverity, AlertType, Database, Workout, WorkoutSet};

const RECENT_WORKOUTS: usize = 3;
const MIN_WORKOUTS: usize = 2;
const SET_WINDOW: usize = 20;

/// A workout needs this many sets before its rep range means anything
const MIN_SETS_PER_WORKOUT: usize = 3;
/// max - min reps at or under this is "flat"
const FLAT_RANGE: i32 = 1;
const FLAT_WORKOUTS_THRESHOLD: usize = 2;
const STRONG_FLAT_WORKOUTS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct SandbaggingAlert {
    pub exercise_id: i64,
    pub exercise_name: String,
    /// Always a warning
    pub severity: AlertSeverity,
    pub message: String,
    pub suggestion: String,
    pub workouts_analyzed: usize,
    pub flat_rep_workouts: usize,
    pub average_rep_range: f64,
    pub current_weight: f64,
}

/// Reps per eligible workout (3+ sets), in set order
pub fn rep_progressions(workouts: &[Workout], sets: &[WorkoutSet]) -> Vec<Vec<i32>> {
    workouts
        .iter()
        .filter_map(|workout| {
            let mut workout_sets: Vec<&WorkoutSet> = sets
                .iter()
                .filter(|s| s.workout_id == workout.id && !s.is_warmup)
                .collect();
            workout_sets.sort_by_key(|s| s.set_number);
            (workout_sets.len() >= MIN_SETS_PER_WORKOUT)
                .then(|| workout_sets.iter().map(|s| s.reps).collect())
        })
        .collect()
}

fn rep_range(reps: &[i32]) -> i32 {
    match (reps.iter().max(), reps.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}

pub fn average_rep_range(progressions: &[Vec<i32>]) -> f64 {
    if progressions.is_empty() {
        return 0.0;
    }
    let total: i32 = progressions.iter().map(|reps| rep_range(reps)).sum();
    total as f64 / progressions.len() as f64
}

fn sandbagging_message(flat_workouts: usize, exercise_name: &str) -> String {
    if flat_workouts >= STRONG_FLAT_WORKOUTS {
        format!(
            "{} reps aren't dropping across sets in {} workouts. You might not be training to true failure.",
            exercise_name, flat_workouts
        )
    } else {
        format!(
            "{} shows consistent reps across sets in {} workouts. Consider pushing harder to 1 RIR.",
            exercise_name, flat_workouts
        )
    }
}

fn sandbagging_suggestion(average_rep_range: f64) -> String {
    if average_rep_range <= FLAT_RANGE as f64 {
        "Add 5-10lbs and push until reps start dropping (Set 1: 8-10 reps, Set 5: 5-7 reps)".to_string()
    } else {
        "Focus on progressive overload - increase weight when you can complete all sets at target reps".to_string()
    }
}

/// Check one exercise; None when history is too short or reps are dropping normally
pub fn detect_sandbagging(db: &Database, exercise_id: i64) -> Result<Option<SandbaggingAlert>> {
    let recent = db.get_recent_workouts_for_exercise(exercise_id, RECENT_WORKOUTS)?;
    if recent.len() < MIN_WORKOUTS {
        return Ok(None);
    }

    let Some(exercise) = db.get_exercise(exercise_id)? else {
        return Ok(None);
    };

    let sets = db.get_recent_sets(exercise_id, SET_WINDOW)?;
    let current_weight = sets.iter().map(|s| s.weight).fold(0.0, f64::max);

    let progressions = rep_progressions(&recent, &sets);
    let flat_rep_workouts = progressions
        .iter()
        .filter(|reps| rep_range(reps) <= FLAT_RANGE)
        .count();
    debug!("{}: rep progressions {:?}, flat {}", exercise.name, progressions, flat_rep_workouts);

    if flat_rep_workouts < FLAT_WORKOUTS_THRESHOLD {
        return Ok(None);
    }

    let average_rep_range = average_rep_range(&progressions);

    Ok(Some(SandbaggingAlert {
        exercise_id,
        message: sandbagging_message(flat_rep_workouts, &exercise.name),
        exercise_name: exercise.name,
        severity: AlertSeverity::Warning,
        suggestion: sandbagging_suggestion(average_rep_range),
        workouts_analyzed: recent.len(),
        flat_rep_workouts,
        average_rep_range,
        current_weight,
    }))
}

pub fn analyze_all_exercises_sandbagging(db: &Database) -> Result<Vec<SandbaggingAlert>> {
    let mut alerts = Vec::new();
    for exercise in db.get_exercises()? {
        if let Some(alert) = detect_sandbagging(db, exercise.id)? {
            alerts.push(alert);
        }
    }
    Ok(alerts)
}

/// Persist a sandbagging alert for every flagged exercise without an active one.
/// Returns the ids of alerts created.
pub fn process_sandbagging_alerts(db: &Database) -> Result<Vec<i64>> {
    let mut created = Vec::new();
    for exercise in db.get_exercises()? {
        if db.has_active_alert(exercise.id, AlertType::Sandbagging)? {
            debug!("Active sandbagging alert exists for {}, skipping", exercise.name);
            continue;
        }
        if let Some(alert) = detect_sandbagging(db, exercise.id)? {
            let id = db.insert_alert(exercise.id, AlertType::Sandbagging, alert.severity, &alert.message)?;
            info!("Sandbagging alert {} for {}", id, exercise.name);
            created.push(id);
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewSet;
    use crate::exercises::RirResponse;
    use chrono::{Duration, NaiveDate};

    fn session(db: &Database, exercise_id: i64, day: i64, weight: f64, reps: &[i32]) {
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap() + Duration::days(day);
        let workout_id = db.create_workout(date, None, None).unwrap();
        for (i, r) in reps.iter().enumerate() {
            db.add_set(&NewSet {
                workout_id,
                exercise_id,
                set_number: i as i32 + 1,
                weight,
                reps: *r,
                rir_response: Some(RirResponse::YesMaybe),
                target_reps: Some(8),
                is_warmup: false,
            })
            .unwrap();
        }
    }

    fn bench(db: &Database) -> i64 {
        db.find_exercise_by_name("Barbell Bench Press").unwrap().unwrap().id
    }

    #[test]
    fn test_single_flat_workout_is_not_enough() {
        let db = Database::open_in_memory().unwrap();
        let id = bench(&db);
        session(&db, id, 0, 95.0, &[8, 8, 8, 8, 8]);
        assert!(detect_sandbagging(&db, id).unwrap().is_none());
    }

    #[test]
    fn test_two_flat_workouts_flag() {
        let db = Database::open_in_memory().unwrap();
        let id = bench(&db);
        session(&db, id, 0, 95.0, &[8, 8, 8, 8, 8]);
        session(&db, id, 2, 100.0, &[8, 8, 8, 8, 8]);

        let alert = detect_sandbagging(&db, id).unwrap().unwrap();
        assert_eq!(alert.flat_rep_workouts, 2);
        assert_eq!(alert.workouts_analyzed, 2);
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert_eq!(alert.current_weight, 100.0);
        assert_eq!(alert.average_rep_range, 0.0);
        assert!(alert.message.contains("Consider pushing harder to 1 RIR"));
        assert!(alert.suggestion.starts_with("Add 5-10lbs"));
    }

    #[test]
    fn test_three_flat_workouts_stronger_message() {
        let db = Database::open_in_memory().unwrap();
        let id = bench(&db);
        for day in [0, 2, 4] {
            session(&db, id, day, 95.0, &[8, 8, 8, 8, 8]);
        }
        let alert = detect_sandbagging(&db, id).unwrap().unwrap();
        assert_eq!(alert.flat_rep_workouts, 3);
        assert!(alert.message.contains("might not be training to true failure"));
    }

    #[test]
    fn test_dropping_reps_pass() {
        let db = Database::open_in_memory().unwrap();
        let id = bench(&db);
        session(&db, id, 0, 95.0, &[10, 9, 8, 7, 6]);
        session(&db, id, 2, 95.0, &[10, 9, 8, 7, 6]);
        assert!(detect_sandbagging(&db, id).unwrap().is_none());
    }

    #[test]
    fn test_average_range_counts_non_flat_workouts() {
        let db = Database::open_in_memory().unwrap();
        let id = bench(&db);
        session(&db, id, 0, 95.0, &[9, 8, 8]);
        session(&db, id, 2, 95.0, &[8, 8, 8]);
        session(&db, id, 4, 95.0, &[10, 8, 6, 4, 2]);

        let alert = detect_sandbagging(&db, id).unwrap().unwrap();
        assert_eq!(alert.flat_rep_workouts, 2);
        // (8 + 0 + 1) / 3
        assert!((alert.average_rep_range - 3.0).abs() < 1e-9);
        assert!(alert.suggestion.starts_with("Focus on progressive overload"));
    }

    #[test]
    fn test_short_workouts_ignored() {
        let db = Database::open_in_memory().unwrap();
        let id = bench(&db);
        session(&db, id, 0, 95.0, &[8, 8]);
        session(&db, id, 2, 95.0, &[8, 8]);
        assert!(detect_sandbagging(&db, id).unwrap().is_none());
    }

    #[test]
    fn test_process_dedups_active_alerts() {
        let db = Database::open_in_memory().unwrap();
        let id = bench(&db);
        session(&db, id, 0, 95.0, &[5, 5, 5, 5, 5]);
        session(&db, id, 2, 95.0, &[5, 5, 5, 5, 5]);

        assert_eq!(process_sandbagging_alerts(&db).unwrap().len(), 1);
        assert!(process_sandbagging_alerts(&db).unwrap().is_empty());
        assert!(db.has_active_alert(id, AlertType::Sandbagging).unwrap());
        assert_eq!(analyze_all_exercises_sandbagging(&db).unwrap().len(), 1);
    }
}
