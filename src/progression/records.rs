//! Personal record detection
//!
//! Three categories per exercise:
//! - weight: heaviest weight for any rep count
//! - volume: most weight x reps in a single set
//! - reps: most reps at one exact weight
//!
//! Records are append-only rows; the current best is whatever the newest row
//! of a category says, which is also its maximum because a row is only ever
//! written when it strictly beats the previous one.

use std::cmp::Ordering;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::db::{Database, PersonalRecord, PrType};

/// Category of a record achieved by a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrKind {
    Weight,
    Volume,
    Reps,
}

impl PrKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrKind::Weight => "weight",
            PrKind::Volume => "volume",
            PrKind::Reps => "reps",
        }
    }

    pub fn pr_type(&self) -> PrType {
        match self {
            PrKind::Weight => PrType::WeightPr,
            PrKind::Volume => PrType::VolumePr,
            PrKind::Reps => PrType::RepPr,
        }
    }
}

/// Outcome of comparing a set against existing records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrCheck {
    pub is_weight_pr: bool,
    pub is_volume_pr: bool,
    pub is_rep_pr: bool,
    pub previous_weight_pr: Option<f64>,
    pub previous_volume_pr: Option<f64>,
    pub previous_rep_pr: Option<i32>,
}

impl PrCheck {
    /// Achieved categories in weight, volume, reps order
    pub fn achieved(&self) -> Vec<PrKind> {
        [
            (self.is_weight_pr, PrKind::Weight),
            (self.is_volume_pr, PrKind::Volume),
            (self.is_rep_pr, PrKind::Reps),
        ]
        .into_iter()
        .filter_map(|(hit, kind)| hit.then_some(kind))
        .collect()
    }
}

/// Compare a set with an exercise's records.
///
/// `existing` must be newest first. A rep record needs something to beat at
/// this exact weight: the newest rep record there, or failing that the best
/// earlier set logged at it (`prior_reps_at_weight`). The first time a weight
/// is ever lifted there is nothing to beat, so no rep record is awarded.
pub fn check_for_pr(
    existing: &[PersonalRecord],
    prior_reps_at_weight: Option<i32>,
    weight: f64,
    reps: i32,
) -> PrCheck {
    let volume = weight * reps as f64;

    let newest = |pr_type: PrType| existing.iter().find(|pr| pr.pr_type == pr_type);

    let current_weight_pr = newest(PrType::WeightPr).map_or(0.0, |pr| pr.weight);
    let current_volume_pr = newest(PrType::VolumePr)
        .and_then(|pr| pr.volume)
        .unwrap_or(0.0);
    let rep_baseline = existing
        .iter()
        .find(|pr| pr.pr_type == PrType::RepPr && pr.weight == weight)
        .map(|pr| pr.reps)
        .or(prior_reps_at_weight);

    PrCheck {
        is_weight_pr: weight > current_weight_pr,
        is_volume_pr: volume > current_volume_pr,
        is_rep_pr: rep_baseline.is_some_and(|best| reps > best),
        previous_weight_pr: (current_weight_pr > 0.0).then_some(current_weight_pr),
        previous_volume_pr: (current_volume_pr > 0.0).then_some(current_volume_pr),
        previous_rep_pr: rep_baseline.filter(|r| *r > 0),
    }
}

/// Check a freshly logged set and append a record row for each category it beats
pub fn detect_and_save_prs(
    db: &Database,
    exercise_id: i64,
    workout_id: i64,
    set_id: i64,
    weight: f64,
    reps: i32,
) -> Result<Vec<PrKind>> {
    let existing = db.get_personal_records(exercise_id)?;
    let prior_reps = db.best_reps_at_weight(exercise_id, weight, Some(set_id))?;
    let achieved = check_for_pr(&existing, prior_reps, weight, reps).achieved();

    for kind in &achieved {
        db.insert_personal_record(exercise_id, Some(workout_id), Some(set_id), kind.pr_type(), weight, reps)?;
    }

    if !achieved.is_empty() {
        let names: Vec<&str> = achieved.iter().map(|k| k.as_str()).collect();
        info!("New PR for exercise {}: {}x{} ({})", exercise_id, weight, reps, names.join(", "));
    }

    Ok(achieved)
}

/// Best record of each category, by value
#[derive(Debug, Clone, Default, Serialize)]
pub struct BestPrs {
    pub weight: Option<PersonalRecord>,
    pub volume: Option<PersonalRecord>,
    pub reps: Option<PersonalRecord>,
}

fn max_by_value<F>(records: &[PersonalRecord], pr_type: PrType, value: F) -> Option<PersonalRecord>
where
    F: Fn(&PersonalRecord) -> f64,
{
    records
        .iter()
        .filter(|pr| pr.pr_type == pr_type)
        .max_by(|a, b| value(a).partial_cmp(&value(b)).unwrap_or(Ordering::Equal))
        .cloned()
}

pub fn best_prs(records: &[PersonalRecord]) -> BestPrs {
    BestPrs {
        weight: max_by_value(records, PrType::WeightPr, |pr| pr.weight),
        volume: max_by_value(records, PrType::VolumePr, |pr| pr.volume.unwrap_or(0.0)),
        reps: max_by_value(records, PrType::RepPr, |pr| pr.reps as f64),
    }
}

pub fn get_best_prs(db: &Database, exercise_id: i64) -> Result<BestPrs> {
    Ok(best_prs(&db.get_personal_records(exercise_id)?))
}
