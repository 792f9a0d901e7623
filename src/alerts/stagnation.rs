//! Stagnation detection: the top set weight has not moved for 3+ sessions

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::db::{AlertSeverity, AlertType, Database, Workout, WorkoutSet};

/// Sessions examined for a run of equal top weights
const RECENT_WORKOUTS: usize = 5;
const MIN_WORKOUTS: usize = 3;
const RECENT_SET_WINDOW: usize = 50;

const STAGNANT_THRESHOLD: usize = 3;
const SEVERE_THRESHOLD: usize = 4;

/// Windows used when looking up the last lower-weight session
const HISTORY_SET_WINDOW: usize = 100;
const HISTORY_WORKOUT_WINDOW: usize = 10;

const INTERVENTIONS: [&str; 6] = [
    "Deload to 90% of current weight for 1 week to recover",
    "Switch to 3×8-12 reps instead of 5×5 to build volume",
    "Add 1 extra set per workout (6×5 instead of 5×5)",
    "Try a different variation (front squat, incline bench, etc.)",
    "Take a full rest day and focus on recovery",
    "Review your nutrition and sleep quality",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StagnationSeverity {
    Warning,
    Error,
}

impl From<StagnationSeverity> for AlertSeverity {
    fn from(severity: StagnationSeverity) -> Self {
        match severity {
            StagnationSeverity::Warning => AlertSeverity::Warning,
            StagnationSeverity::Error => AlertSeverity::Critical,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StagnationAlert {
    pub exercise_id: i64,
    pub exercise_name: String,
    pub severity: StagnationSeverity,
    pub message: String,
    pub interventions: Vec<&'static str>,
    pub workouts_analyzed: usize,
    pub stagnant_workouts: usize,
    pub current_weight: f64,
    pub last_weight_increase: Option<NaiveDate>,
}

/// Heaviest set of each workout, in workout order. None if none of its sets are in `sets`.
pub fn top_set_weights(workouts: &[Workout], sets: &[WorkoutSet]) -> Vec<Option<f64>> {
    workouts
        .iter()
        .map(|workout| {
            sets.iter()
                .filter(|s| s.workout_id == workout.id)
                .map(|s| s.weight)
                .reduce(f64::max)
        })
        .collect()
}

/// Length of the leading run equal to the first entry
pub fn stagnant_run(weights: &[Option<f64>]) -> usize {
    let Some(first) = weights.first() else {
        return 0;
    };
    weights.iter().take_while(|w| *w == first).count()
}

/// Date of the session whose top weight is the closest below `current_weight`.
///
/// Candidates are ordered by weight, not by date, so this is the nearest
/// lighter session rather than the most recent one. Equal weights keep
/// workout id order. Only sessions among `dated` can produce a date.
pub fn last_weight_increase(sets: &[WorkoutSet], dated: &[Workout], current_weight: f64) -> Option<NaiveDate> {
    let mut per_workout: BTreeMap<i64, f64> = BTreeMap::new();
    for set in sets {
        per_workout
            .entry(set.workout_id)
            .and_modify(|w| *w = w.max(set.weight))
            .or_insert(set.weight);
    }

    let mut lower: Vec<(i64, f64)> = per_workout
        .into_iter()
        .filter(|(_, weight)| *weight < current_weight)
        .collect();
    lower.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (workout_id, _) = lower.first()?;
    dated.iter().find(|w| w.id == *workout_id).map(|w| w.date)
}

fn stagnation_message(stagnant_workouts: usize, exercise_name: &str) -> String {
    if stagnant_workouts >= SEVERE_THRESHOLD {
        format!(
            "{} has been stuck at the same weight for {} workouts. Time for a change!",
            exercise_name, stagnant_workouts
        )
    } else {
        format!(
            "{} hasn't progressed in {} workouts. Consider an intervention.",
            exercise_name, stagnant_workouts
        )
    }
}

/// Four interventions, deload first when severe and last otherwise
fn interventions(stagnant_workouts: usize) -> Vec<&'static str> {
    let order: [usize; 4] = if stagnant_workouts >= SEVERE_THRESHOLD {
        [0, 1, 3, 4]
    } else {
        [1, 2, 3, 0]
    };
    order.iter().map(|i| INTERVENTIONS[*i]).collect()
}

/// Check one exercise; None when history is too short or weight is moving
pub fn detect_stagnation(db: &Database, exercise_id: i64) -> Result<Option<StagnationAlert>> {
    let recent = db.get_recent_workouts_for_exercise(exercise_id, RECENT_WORKOUTS)?;
    if recent.len() < MIN_WORKOUTS {
        return Ok(None);
    }

    let Some(exercise) = db.get_exercise(exercise_id)? else {
        return Ok(None);
    };

    let sets = db.get_recent_sets(exercise_id, RECENT_SET_WINDOW)?;
    let weights = top_set_weights(&recent, &sets);
    let Some(current_weight) = weights.first().copied().flatten() else {
        return Ok(None);
    };

    let stagnant_workouts = stagnant_run(&weights);
    debug!("{}: top weights {:?}, run {}", exercise.name, weights, stagnant_workouts);
    if stagnant_workouts < STAGNANT_THRESHOLD {
        return Ok(None);
    }

    let history = db.get_recent_sets(exercise_id, HISTORY_SET_WINDOW)?;
    let dated = db.get_recent_workouts_for_exercise(exercise_id, HISTORY_WORKOUT_WINDOW)?;

    let severity = if stagnant_workouts >= SEVERE_THRESHOLD {
        StagnationSeverity::Error
    } else {
        StagnationSeverity::Warning
    };

    Ok(Some(StagnationAlert {
        exercise_id,
        message: stagnation_message(stagnant_workouts, &exercise.name),
        exercise_name: exercise.name,
        severity,
        interventions: interventions(stagnant_workouts),
        workouts_analyzed: recent.len(),
        stagnant_workouts,
        current_weight,
        last_weight_increase: last_weight_increase(&history, &dated, current_weight),
    }))
}

pub fn analyze_all_exercises_stagnation(db: &Database) -> Result<Vec<StagnationAlert>> {
    let mut alerts = Vec::new();
    for exercise in db.get_exercises()? {
        if let Some(alert) = detect_stagnation(db, exercise.id)? {
            alerts.push(alert);
        }
    }
    Ok(alerts)
}

/// Persist a stagnation alert for every stuck exercise without an active one.
/// Returns the ids of alerts created.
pub fn process_stagnation_alerts(db: &Database) -> Result<Vec<i64>> {
    let mut created = Vec::new();
    for exercise in db.get_exercises()? {
        if db.has_active_alert(exercise.id, AlertType::Stagnation)? {
            debug!("Active stagnation alert exists for {}, skipping", exercise.name);
            continue;
        }
        if let Some(alert) = detect_stagnation(db, exercise.id)? {
            let id = db.insert_alert(exercise.id, AlertType::Stagnation, alert.severity.into(), &alert.message)?;
            info!("Stagnation alert {} for {} ({:?})", id, exercise.name, alert.severity);
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
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    /// Log one 5x5 session per weight, two days apart, oldest first
    fn sessions(db: &Database, exercise_id: i64, weights: &[f64]) -> Vec<i64> {
        weights
            .iter()
            .enumerate()
            .map(|(i, weight)| {
                let workout_id = db
                    .create_workout(start() + Duration::days(2 * i as i64), None, None)
                    .unwrap();
                for n in 1..=5 {
                    db.add_set(&NewSet {
                        workout_id,
                        exercise_id,
                        set_number: n,
                        weight: *weight,
                        reps: 5,
                        rir_response: Some(RirResponse::YesMaybe),
                        target_reps: Some(5),
                        is_warmup: false,
                    })
                    .unwrap();
                }
                workout_id
            })
            .collect()
    }

    fn squat(db: &Database) -> i64 {
        db.find_exercise_by_name("Barbell Back Squat").unwrap().unwrap().id
    }

    #[test]
    fn test_stagnant_run_counts_leading_equal() {
        let w = |v: f64| Some(v);
        assert_eq!(stagnant_run(&[w(135.0), w(135.0), w(130.0), w(135.0)]), 2);
        assert_eq!(stagnant_run(&[w(135.0); 5]), 5);
        assert_eq!(stagnant_run(&[]), 0);
    }

    #[test]
    fn test_needs_three_workouts() {
        let db = Database::open_in_memory().unwrap();
        let id = squat(&db);
        sessions(&db, id, &[135.0, 135.0]);
        assert!(detect_stagnation(&db, id).unwrap().is_none());
    }

    #[test]
    fn test_three_equal_sessions_warn() {
        let db = Database::open_in_memory().unwrap();
        let id = squat(&db);
        let ids = sessions(&db, id, &[130.0, 135.0, 135.0, 135.0]);

        let alert = detect_stagnation(&db, id).unwrap().unwrap();
        assert_eq!(alert.severity, StagnationSeverity::Warning);
        assert_eq!(alert.stagnant_workouts, 3);
        assert_eq!(alert.workouts_analyzed, 4);
        assert_eq!(alert.current_weight, 135.0);
        assert_eq!(alert.interventions.len(), 4);
        assert_eq!(alert.interventions[0], INTERVENTIONS[1]);
        assert_eq!(alert.interventions[3], INTERVENTIONS[0]);
        assert!(alert.message.contains("hasn't progressed in 3 workouts"));

        let first = db.get_workout(ids[0]).unwrap().unwrap();
        assert_eq!(alert.last_weight_increase, Some(first.date));
    }

    #[test]
    fn test_fourth_equal_session_escalates() {
        let db = Database::open_in_memory().unwrap();
        let id = squat(&db);
        sessions(&db, id, &[135.0; 4]);

        let alert = detect_stagnation(&db, id).unwrap().unwrap();
        assert_eq!(alert.severity, StagnationSeverity::Error);
        assert_eq!(alert.stagnant_workouts, 4);
        assert_eq!(alert.interventions[0], INTERVENTIONS[0]);
        assert!(alert.message.contains("Time for a change!"));
        assert_eq!(alert.last_weight_increase, None);
    }

    #[test]
    fn test_recent_increase_resets() {
        let db = Database::open_in_memory().unwrap();
        let id = squat(&db);
        sessions(&db, id, &[135.0, 135.0, 135.0, 140.0]);
        assert!(detect_stagnation(&db, id).unwrap().is_none());
    }

    #[test]
    fn test_last_increase_picks_closest_lower_weight_not_latest() {
        let db = Database::open_in_memory().unwrap();
        let id = squat(&db);
        let ids = sessions(&db, id, &[130.0, 125.0, 135.0, 135.0, 135.0]);

        let alert = detect_stagnation(&db, id).unwrap().unwrap();
        let heavier_but_older = db.get_workout(ids[0]).unwrap().unwrap();
        assert_eq!(alert.last_weight_increase, Some(heavier_but_older.date));
    }

    #[test]
    fn test_process_dedups_active_alerts() {
        let db = Database::open_in_memory().unwrap();
        let id = squat(&db);
        sessions(&db, id, &[135.0; 3]);

        let created = process_stagnation_alerts(&db).unwrap();
        assert_eq!(created.len(), 1);
        assert!(process_stagnation_alerts(&db).unwrap().is_empty());

        db.dismiss_alert(created[0]).unwrap();
        assert_eq!(process_stagnation_alerts(&db).unwrap().len(), 1);

        let active = db.get_active_alerts().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_severe_alert_stored_as_critical() {
        let db = Database::open_in_memory().unwrap();
        let id = squat(&db);
        sessions(&db, id, &[135.0; 4]);
        process_stagnation_alerts(&db).unwrap();
        assert_eq!(db.get_active_alerts().unwrap()[0].severity, AlertSeverity::Critical);
        assert_eq!(analyze_all_exercises_stagnation(&db).unwrap().len(), 1);
    }
}
