//! Workout session context
//!
//! Owned by the caller from workout start until it is finished or discarded.
//! Holds the cursor (exercise index, set number) and the sets logged so far;
//! every analytic it calls receives its inputs explicitly.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::alerts::{process_sandbagging_alerts, process_stagnation_alerts};
use crate::db::{Database, Exercise, NewSet, WorkoutSet};
use crate::exercises::RirResponse;
use crate::progression::{
    PrKind, RepPrediction, RirFeedback, detect_and_save_prs, get_rir_feedback, predict_reps, suggest_next_weight,
};

pub const PROGRAM_NAME: &str = "StrongLifts 5×5";

/// What the lifter sees after finishing a set
#[derive(Debug, Clone, Serialize)]
pub struct SetOutcome {
    pub set: WorkoutSet,
    pub prs: Vec<PrKind>,
    pub feedback: RirFeedback,
    /// Preview of the following set, based on this exercise's Set 1
    pub next_set: RepPrediction,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSummary {
    pub workout_id: i64,
    pub duration_minutes: i32,
    pub sets_logged: usize,
    pub stagnation_alerts: Vec<i64>,
    pub sandbagging_alerts: Vec<i64>,
}

pub struct WorkoutSession {
    workout_id: i64,
    exercises: Vec<Exercise>,
    current_exercise_index: usize,
    current_set_number: i32,
    completed_sets: Vec<WorkoutSet>,
    is_resting: bool,
    started_at: DateTime<Utc>,
}

impl WorkoutSession {
    /// Create the workout row and position on the first exercise, set 1
    pub fn start(
        db: &Database,
        exercises: Vec<Exercise>,
        date: NaiveDate,
        workout_type: Option<&str>,
    ) -> Result<Self> {
        if exercises.is_empty() {
            bail!("cannot start a workout without exercises");
        }

        let workout_id = db.create_workout(date, Some(PROGRAM_NAME), workout_type)?;
        info!("Started workout {} with {} exercises", workout_id, exercises.len());

        Ok(Self {
            workout_id,
            exercises,
            current_exercise_index: 0,
            current_set_number: 1,
            completed_sets: Vec::new(),
            is_resting: false,
            started_at: Utc::now(),
        })
    }

    pub fn workout_id(&self) -> i64 {
        self.workout_id
    }

    pub fn current_exercise(&self) -> &Exercise {
        &self.exercises[self.current_exercise_index]
    }

    pub fn current_set_number(&self) -> i32 {
        self.current_set_number
    }

    pub fn completed_sets(&self) -> &[WorkoutSet] {
        &self.completed_sets
    }

    pub fn is_resting(&self) -> bool {
        self.is_resting
    }

    pub fn is_last_exercise(&self) -> bool {
        self.current_exercise_index + 1 >= self.exercises.len()
    }

    /// Weight to load for the current exercise
    pub fn suggested_weight(&self, db: &Database) -> f64 {
        suggest_next_weight(db, self.current_exercise().id)
    }

    /// Set 1 of the current exercise in this session
    fn first_set_of_current(&self) -> Option<&WorkoutSet> {
        let exercise_id = self.current_exercise().id;
        self.completed_sets
            .iter()
            .find(|s| s.exercise_id == exercise_id && s.set_number == 1)
    }

    /// Log the current set, check it for records, and preview the next one.
    ///
    /// The set row and its record rows are written together. On error nothing
    /// is stored and the cursor stays on the same set.
    pub fn complete_set(
        &mut self,
        db: &Database,
        weight: f64,
        reps: i32,
        rir: RirResponse,
        target_reps: i32,
    ) -> Result<SetOutcome> {
        if self.is_resting {
            bail!("set {} is already logged, end the rest first", self.current_set_number);
        }
        if !weight.is_finite() || weight < 0.0 {
            bail!("weight must be a non-negative number, got {}", weight);
        }
        if reps < 0 {
            bail!("reps must not be negative, got {}", reps);
        }
        if target_reps < 0 {
            bail!("target reps must not be negative, got {}", target_reps);
        }

        let exercise_id = self.current_exercise().id;
        let new_set = NewSet {
            workout_id: self.workout_id,
            exercise_id,
            set_number: self.current_set_number,
            weight,
            reps,
            rir_response: Some(rir),
            target_reps: Some(target_reps),
            is_warmup: false,
        };
        let (set_id, prs) = db.in_transaction(|db| {
            let set_id = db.add_set(&new_set)?;
            let prs = detect_and_save_prs(db, exercise_id, self.workout_id, set_id, weight, reps)?;
            Ok((set_id, prs))
        })?;

        let set = WorkoutSet {
            id: set_id,
            workout_id: new_set.workout_id,
            exercise_id,
            set_number: new_set.set_number,
            weight,
            reps,
            rir_response: new_set.rir_response,
            target_reps: new_set.target_reps,
            is_warmup: false,
        };
        self.completed_sets.push(set.clone());
        self.is_resting = true;

        let (set1_reps, set1_rir) = self
            .first_set_of_current()
            .and_then(|s| s.rir_response.map(|r| (s.reps, r)))
            .unwrap_or((reps, rir));
        let next_set = predict_reps(set1_reps, set1_rir, (self.current_set_number + 1) as u32);

        Ok(SetOutcome {
            set,
            prs,
            feedback: get_rir_feedback(rir),
            next_set,
        })
    }

    /// Rest is over, move to the next set number
    pub fn end_rest(&mut self) {
        self.is_resting = false;
        self.current_set_number += 1;
    }

    /// Advance to the next exercise at set 1. False when there is none.
    pub fn next_exercise(&mut self) -> bool {
        if self.is_last_exercise() {
            return false;
        }
        self.current_exercise_index += 1;
        self.current_set_number = 1;
        self.is_resting = false;
        true
    }

    /// Mark the workout complete and materialize alerts for every exercise
    pub fn finish(self, db: &Database) -> Result<WorkoutSummary> {
        let duration_minutes = (Utc::now() - self.started_at).num_minutes() as i32;
        db.complete_workout(self.workout_id, Some(duration_minutes))?;

        let stagnation_alerts = process_stagnation_alerts(db)?;
        let sandbagging_alerts = process_sandbagging_alerts(db)?;

        info!(
            "Finished workout {}: {} sets in {} min, {} new alerts",
            self.workout_id,
            self.completed_sets.len(),
            duration_minutes,
            stagnation_alerts.len() + sandbagging_alerts.len()
        );

        Ok(WorkoutSummary {
            workout_id: self.workout_id,
            duration_minutes,
            sets_logged: self.completed_sets.len(),
            stagnation_alerts,
            sandbagging_alerts,
        })
    }

    /// Drop the session without completing the workout; logged sets stay
    pub fn discard(self) -> i64 {
        info!(
            "Discarded workout {} after {} sets",
            self.workout_id,
            self.completed_sets.len()
        );
        self.workout_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn main_lifts(db: &Database) -> Vec<Exercise> {
        db.get_default_exercises().unwrap()
    }

    #[test]
    fn test_start_requires_exercises() {
        let db = Database::open_in_memory().unwrap();
        assert!(WorkoutSession::start(&db, Vec::new(), today(), None).is_err());
    }

    #[test]
    fn test_cursor_moves_through_sets_and_exercises() {
        let db = Database::open_in_memory().unwrap();
        let lifts: Vec<_> = main_lifts(&db).into_iter().take(2).collect();
        let mut session = WorkoutSession::start(&db, lifts, today(), Some("A")).unwrap();

        assert_eq!(session.current_set_number(), 1);
        session.complete_set(&db, 45.0, 5, RirResponse::YesMaybe, 5).unwrap();
        assert!(session.is_resting());
        session.end_rest();
        assert_eq!(session.current_set_number(), 2);

        assert!(session.next_exercise());
        assert_eq!(session.current_set_number(), 1);
        assert!(session.is_last_exercise());
        assert!(!session.next_exercise());
    }

    #[test]
    fn test_complete_set_previews_from_set_one() {
        let db = Database::open_in_memory().unwrap();
        let mut session = WorkoutSession::start(&db, main_lifts(&db), today(), None).unwrap();

        let first = session.complete_set(&db, 45.0, 10, RirResponse::YesMaybe, 5).unwrap();
        assert_eq!(first.next_set, predict_reps(10, RirResponse::YesMaybe, 2));
        assert_eq!(first.prs, vec![PrKind::Weight, PrKind::Volume]);
        session.end_rest();

        // A worse set 2 doesn't change the Set 1 reference
        let second = session.complete_set(&db, 45.0, 6, RirResponse::NoWay, 5).unwrap();
        assert_eq!(second.next_set, predict_reps(10, RirResponse::YesMaybe, 3));
        assert_eq!(second.feedback, get_rir_feedback(RirResponse::NoWay));
    }

    #[test]
    fn test_finish_completes_workout() {
        let db = Database::open_in_memory().unwrap();
        let mut session = WorkoutSession::start(&db, main_lifts(&db), today(), None).unwrap();
        for _ in 0..5 {
            session.complete_set(&db, 45.0, 5, RirResponse::YesMaybe, 5).unwrap();
            session.end_rest();
        }
        let workout_id = session.workout_id();
        let summary = session.finish(&db).unwrap();

        assert_eq!(summary.sets_logged, 5);
        assert!(summary.stagnation_alerts.is_empty());
        let workout = db.get_workout(workout_id).unwrap().unwrap();
        assert!(workout.completed);
        assert_eq!(workout.program_name.as_deref(), Some(PROGRAM_NAME));
        assert_eq!(db.get_sets_by_workout(workout_id).unwrap().len(), 5);
    }

    #[test]
    fn test_discard_leaves_workout_incomplete() {
        let db = Database::open_in_memory().unwrap();
        let session = WorkoutSession::start(&db, main_lifts(&db), today(), None).unwrap();
        let workout_id = session.discard();
        assert!(!db.get_workout(workout_id).unwrap().unwrap().completed);
    }

    #[test]
    fn test_complete_set_rejects_bad_numbers() {
        let db = Database::open_in_memory().unwrap();
        let mut session = WorkoutSession::start(&db, main_lifts(&db), today(), None).unwrap();

        for (weight, reps, target) in [
            (f64::INFINITY, 5, 5),
            (f64::NAN, 5, 5),
            (-45.0, 5, 5),
            (100.0, -3, 5),
            (100.0, 5, -1),
        ] {
            assert!(session.complete_set(&db, weight, reps, RirResponse::YesMaybe, target).is_err());
        }
        assert!(session.completed_sets().is_empty());
        assert!(db.get_sets_by_workout(session.workout_id()).unwrap().is_empty());
        assert!(db.get_personal_records(session.current_exercise().id).unwrap().is_empty());

        // Still on set 1, and a real weight can still set the record
        let outcome = session.complete_set(&db, 500.0, 5, RirResponse::YesMaybe, 5).unwrap();
        assert_eq!(outcome.set.set_number, 1);
        assert_eq!(outcome.prs, vec![PrKind::Weight, PrKind::Volume]);
    }

    #[test]
    fn test_complete_set_twice_without_rest_end_fails() {
        let db = Database::open_in_memory().unwrap();
        let mut session = WorkoutSession::start(&db, main_lifts(&db), today(), None).unwrap();

        session.complete_set(&db, 45.0, 5, RirResponse::YesMaybe, 5).unwrap();
        assert!(session.complete_set(&db, 45.0, 5, RirResponse::YesMaybe, 5).is_err());
        session.end_rest();
        session.complete_set(&db, 45.0, 5, RirResponse::YesMaybe, 5).unwrap();

        let numbers: Vec<i32> = db
            .get_sets_by_workout(session.workout_id())
            .unwrap()
            .iter()
            .map(|s| s.set_number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_failed_record_write_keeps_set_out() {
        let db = Database::open_in_memory().unwrap();
        let mut session = WorkoutSession::start(&db, main_lifts(&db), today(), None).unwrap();
        db.execute_raw("DROP TABLE personal_records").unwrap();

        assert!(session.complete_set(&db, 45.0, 5, RirResponse::YesMaybe, 5).is_err());
        assert!(db.get_sets_by_workout(session.workout_id()).unwrap().is_empty());
        assert!(session.completed_sets().is_empty());
        assert!(!session.is_resting());
        assert_eq!(session.current_set_number(), 1);
    }
}
