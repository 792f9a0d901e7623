//! Next-session weight suggestion from the last session's first set

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};

use crate::db::{Database, WorkoutSet};
use crate::exercises::{Category, RirResponse, starting_weight, weight_increment};

/// Target reps assumed when a set was logged without one (5x5)
pub const DEFAULT_TARGET_REPS: i32 = 5;

/// Which progression rule produced a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightRule {
    /// No history, category starting weight
    FirstSession,
    /// Hit target and it was easy: two increments
    DoubleIncrement,
    /// Hit target at ~1 RIR: one increment
    Increment,
    /// Missed target by more than two reps
    Decrease,
    /// Missed by 1-2 reps, or hit target but failed
    Repeat,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightSuggestion {
    pub weight: f64,
    pub rule: WeightRule,
    /// First-set weight of the reference session
    pub last_weight: Option<f64>,
}

/// Pick the reference set: set 1 if present, else the earliest set logged
fn reference_set(last_sets: &[WorkoutSet]) -> Option<&WorkoutSet> {
    last_sets
        .iter()
        .find(|s| s.set_number == 1)
        .or_else(|| last_sets.iter().min_by_key(|s| s.set_number))
}

/// Suggest the next working weight from the most recent session's sets.
///
/// Rules are evaluated in order and the first match wins, so a set that hit
/// its target with `no_way` falls through to "repeat".
pub fn suggest_from_last_workout(category: Option<Category>, last_sets: &[WorkoutSet]) -> WeightSuggestion {
    let start = starting_weight(category);

    let Some(first) = reference_set(last_sets) else {
        return WeightSuggestion {
            weight: start,
            rule: WeightRule::FirstSession,
            last_weight: None,
        };
    };

    let last_weight = first.weight;
    let target_reps = first.target_reps.unwrap_or(DEFAULT_TARGET_REPS);
    let actual_reps = first.reps;
    let increment = weight_increment(category);
    let hit_target = actual_reps >= target_reps;

    let (weight, rule) = match first.rir_response {
        Some(RirResponse::YesEasily) if hit_target => (last_weight + increment * 2.0, WeightRule::DoubleIncrement),
        Some(RirResponse::YesMaybe) if hit_target => (last_weight + increment, WeightRule::Increment),
        _ if actual_reps < target_reps - 2 => ((last_weight - increment).max(start), WeightRule::Decrease),
        _ => (last_weight, WeightRule::Repeat),
    };

    debug!(
        "Last {}x{} (target {}, rir {:?}) -> {} ({:?})",
        last_weight, actual_reps, target_reps, first.rir_response, weight, rule
    );

    WeightSuggestion {
        weight,
        rule,
        last_weight: Some(last_weight),
    }
}

/// Suggested working weight for the next session of an exercise.
///
/// Storage errors never escape: the category starting weight is returned instead.
pub fn suggest_next_weight(db: &Database, exercise_id: i64) -> f64 {
    let category = match db.exercise_category(exercise_id) {
        Ok(category) => category,
        Err(e) => {
            warn!("Failed to read category for exercise {}: {:#}", exercise_id, e);
            None
        }
    };

    match db.get_last_workout_sets(exercise_id) {
        Ok(sets) => suggest_from_last_workout(category, &sets).weight,
        Err(e) => {
            warn!("Failed to read history for exercise {}: {:#}, using starting weight", exercise_id, e);
            starting_weight(category)
        }
    }
}

/// First-set weight of the most recent session, if any
pub fn get_last_weight(db: &Database, exercise_id: i64) -> Result<Option<f64>> {
    let sets = db.get_last_workout_sets(exercise_id)?;
    Ok(reference_set(&sets).map(|s| s.weight))
}
