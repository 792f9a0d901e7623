//! Database module - SQLite storage for workouts, sets, records and alerts

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::exercises::{Category, MuscleGroup, ParseEnumError, RirResponse, get_all_exercises};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS exercises (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        is_compound INTEGER NOT NULL DEFAULT 1,
        is_default INTEGER NOT NULL DEFAULT 0,
        muscle_group TEXT NOT NULL DEFAULT 'other',
        description TEXT
    );

    CREATE TABLE IF NOT EXISTS workouts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        program_name TEXT,
        workout_type TEXT,
        notes TEXT,
        duration_minutes INTEGER,
        completed INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
        exercise_id INTEGER NOT NULL REFERENCES exercises(id),
        set_number INTEGER NOT NULL,
        weight REAL NOT NULL,
        reps INTEGER NOT NULL,
        rir_response TEXT,
        target_reps INTEGER,
        is_warmup INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS personal_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        exercise_id INTEGER NOT NULL REFERENCES exercises(id),
        workout_id INTEGER REFERENCES workouts(id),
        set_id INTEGER REFERENCES sets(id),
        pr_type TEXT NOT NULL,
        weight REAL NOT NULL,
        reps INTEGER NOT NULL,
        volume REAL,
        date TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        exercise_id INTEGER NOT NULL REFERENCES exercises(id),
        alert_type TEXT NOT NULL,
        severity TEXT NOT NULL,
        message TEXT NOT NULL,
        is_dismissed INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_sets_workout ON sets(workout_id);
    CREATE INDEX IF NOT EXISTS idx_sets_exercise ON sets(exercise_id);
    CREATE INDEX IF NOT EXISTS idx_workouts_date ON workouts(date);
    CREATE INDEX IF NOT EXISTS idx_pr_exercise ON personal_records(exercise_id);
    CREATE INDEX IF NOT EXISTS idx_alerts_exercise ON alerts(exercise_id);
";

/// Exercise row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    /// None when the stored category is not one we know
    pub category: Option<Category>,
    pub is_compound: bool,
    pub is_default: bool,
    pub muscle_group: MuscleGroup,
    pub description: Option<String>,
}

/// One training session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub date: NaiveDate,
    pub program_name: Option<String>,
    pub workout_type: Option<String>,
    pub duration_minutes: Option<i32>,
    pub completed: bool,
}

/// Logged set, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    /// 1-based within (workout, exercise)
    pub set_number: i32,
    pub weight: f64,
    pub reps: i32,
    pub rir_response: Option<RirResponse>,
    pub target_reps: Option<i32>,
    pub is_warmup: bool,
}

/// Set data before it has an id
#[derive(Debug, Clone)]
pub struct NewSet {
    pub workout_id: i64,
    pub exercise_id: i64,
    pub set_number: i32,
    pub weight: f64,
    pub reps: i32,
    pub rir_response: Option<RirResponse>,
    pub target_reps: Option<i32>,
    pub is_warmup: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PrType {
    WeightPr,
    VolumePr,
    RepPr,
}

impl PrType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrType::WeightPr => "weight_pr",
            PrType::VolumePr => "volume_pr",
            PrType::RepPr => "rep_pr",
        }
    }
}

impl FromStr for PrType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight_pr" => Ok(PrType::WeightPr),
            "volume_pr" => Ok(PrType::VolumePr),
            "rep_pr" => Ok(PrType::RepPr),
            other => Err(ParseEnumError { kind: "PR type", value: other.to_string() }),
        }
    }
}

/// Personal record row, never updated once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub id: i64,
    pub exercise_id: i64,
    pub workout_id: Option<i64>,
    pub set_id: Option<i64>,
    pub pr_type: PrType,
    pub weight: f64,
    pub reps: i32,
    pub volume: Option<f64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Stagnation,
    Sandbagging,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Stagnation => "stagnation",
            AlertType::Sandbagging => "sandbagging",
        }
    }
}

impl FromStr for AlertType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stagnation" => Ok(AlertType::Stagnation),
            "sandbagging" => Ok(AlertType::Sandbagging),
            other => Err(ParseEnumError { kind: "alert type", value: other.to_string() }),
        }
    }
}

/// Stored alert severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(AlertSeverity::Warning),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(ParseEnumError { kind: "alert severity", value: other.to_string() }),
        }
    }
}

/// Alert row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub exercise_id: i64,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub is_dismissed: bool,
    pub created_at: DateTime<Utc>,
    /// Joined from exercises
    pub exercise_name: Option<String>,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

fn parse_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

const SET_COLUMNS: &str =
    "s.id, s.workout_id, s.exercise_id, s.set_number, s.weight, s.reps, s.rir_response, s.target_reps, s.is_warmup";

fn set_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutSet> {
    let rir: Option<String> = row.get(6)?;
    let rir_response = rir
        .map(|r| r.parse::<RirResponse>().map_err(|e| conversion_error(6, e)))
        .transpose()?;
    Ok(WorkoutSet {
        id: row.get(0)?,
        workout_id: row.get(1)?,
        exercise_id: row.get(2)?,
        set_number: row.get(3)?,
        weight: row.get(4)?,
        reps: row.get(5)?,
        rir_response,
        target_reps: row.get(7)?,
        is_warmup: row.get(8)?,
    })
}

const WORKOUT_COLUMNS: &str =
    "w.id, w.date, w.program_name, w.workout_type, w.duration_minutes, w.completed";

fn workout_from_row(row: &Row<'_>) -> rusqlite::Result<Workout> {
    Ok(Workout {
        id: row.get(0)?,
        date: parse_date(row, 1)?,
        program_name: row.get(2)?,
        workout_type: row.get(3)?,
        duration_minutes: row.get(4)?,
        completed: row.get(5)?,
    })
}

const EXERCISE_COLUMNS: &str =
    "id, name, category, is_compound, is_default, muscle_group, description";

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    let name: String = row.get(1)?;
    let raw_category: String = row.get(2)?;
    let category = match raw_category.parse::<Category>() {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("{} for exercise '{}', using defaults", e, name);
            None
        }
    };
    Ok(Exercise {
        id: row.get(0)?,
        name,
        category,
        is_compound: row.get(3)?,
        is_default: row.get(4)?,
        muscle_group: parse_column(row, 5)?,
        description: row.get(6)?,
    })
}

const PR_COLUMNS: &str = "id, exercise_id, workout_id, set_id, pr_type, weight, reps, volume, date";

fn pr_from_row(row: &Row<'_>) -> rusqlite::Result<PersonalRecord> {
    Ok(PersonalRecord {
        id: row.get(0)?,
        exercise_id: row.get(1)?,
        workout_id: row.get(2)?,
        set_id: row.get(3)?,
        pr_type: parse_column(row, 4)?,
        weight: row.get(5)?,
        reps: row.get(6)?,
        volume: row.get(7)?,
        date: parse_timestamp(row, 8)?,
    })
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema and seed the exercise library on first run
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(SCHEMA)?;

        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        if count == 0 {
            let library = get_all_exercises();
            for def in &library {
                self.add_exercise(def.name, def.category, def.is_compound, def.is_default, def.description)?;
            }
            info!("Seeded {} exercises", library.len());
        }

        Ok(())
    }

    /// Run `f` in one transaction; nothing it wrote survives an error
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Raw SQL for tests that need to break the schema
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    // ---- exercises ----

    /// Add an exercise; its muscle group is resolved once, here
    pub fn add_exercise(
        &self,
        name: &str,
        category: Category,
        is_compound: bool,
        is_default: bool,
        description: Option<&str>,
    ) -> Result<i64> {
        let muscle_group = MuscleGroup::from_exercise_name(name);
        self.conn.execute(
            "INSERT INTO exercises (name, category, is_compound, is_default, muscle_group, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![name, category.as_str(), is_compound, is_default, muscle_group.as_str(), description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All exercises ordered by name
    pub fn get_exercises(&self) -> Result<Vec<Exercise>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {EXERCISE_COLUMNS} FROM exercises ORDER BY name"))?;
        let exercises = stmt
            .query_map([], exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    pub fn get_default_exercises(&self) -> Result<Vec<Exercise>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE is_default = 1 ORDER BY id"
        ))?;
        let exercises = stmt
            .query_map([], exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    pub fn get_exercise(&self, id: i64) -> Result<Option<Exercise>> {
        let exercise = self
            .conn
            .query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1"),
                [id],
                exercise_from_row,
            )
            .optional()?;
        Ok(exercise)
    }

    /// Case-insensitive exact name lookup
    pub fn find_exercise_by_name(&self, name: &str) -> Result<Option<Exercise>> {
        let exercise = self
            .conn
            .query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE name = ?1 COLLATE NOCASE"),
                [name],
                exercise_from_row,
            )
            .optional()?;
        Ok(exercise)
    }

    /// Category of an exercise; None if the exercise is missing or its category unknown
    pub fn exercise_category(&self, exercise_id: i64) -> Result<Option<Category>> {
        Ok(self.get_exercise(exercise_id)?.and_then(|e| e.category))
    }

    // ---- workouts ----

    pub fn create_workout(
        &self,
        date: NaiveDate,
        program_name: Option<&str>,
        workout_type: Option<&str>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO workouts (date, program_name, workout_type, completed, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![
                date.format(DATE_FORMAT).to_string(),
                program_name,
                workout_type,
                timestamp(Utc::now()),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Created workout {} on {}", id, date);
        Ok(id)
    }

    pub fn complete_workout(&self, workout_id: i64, duration_minutes: Option<i32>) -> Result<()> {
        self.conn.execute(
            "UPDATE workouts SET completed = 1, duration_minutes = ?1 WHERE id = ?2",
            params![duration_minutes, workout_id],
        )?;
        Ok(())
    }

    pub fn get_workout(&self, id: i64) -> Result<Option<Workout>> {
        let workout = self
            .conn
            .query_row(
                &format!("SELECT {WORKOUT_COLUMNS} FROM workouts w WHERE w.id = ?1"),
                [id],
                workout_from_row,
            )
            .optional()?;
        Ok(workout)
    }

    /// Distinct workouts with at least one working set of this exercise, newest first
    pub fn get_recent_workouts_for_exercise(&self, exercise_id: i64, limit: usize) -> Result<Vec<Workout>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts w
             WHERE EXISTS (
                 SELECT 1 FROM sets s
                 WHERE s.workout_id = w.id AND s.exercise_id = ?1 AND s.is_warmup = 0
             )
             ORDER BY w.date DESC, w.id DESC
             LIMIT ?2"
        ))?;
        let workouts = stmt
            .query_map(params![exercise_id, limit as i64], workout_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(workouts)
    }

    // ---- sets ----

    /// Append a set
    pub fn add_set(&self, set: &NewSet) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO sets (workout_id, exercise_id, set_number, weight, reps, rir_response, target_reps, is_warmup, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                set.workout_id,
                set.exercise_id,
                set.set_number,
                set.weight,
                set.reps,
                set.rir_response.map(|r| r.as_str()),
                set.target_reps,
                set.is_warmup,
                timestamp(Utc::now()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_sets_by_workout(&self, workout_id: i64) -> Result<Vec<WorkoutSet>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SET_COLUMNS} FROM sets s WHERE s.workout_id = ?1 ORDER BY s.exercise_id, s.set_number"
        ))?;
        let sets = stmt
            .query_map([workout_id], set_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }

    /// Working sets for an exercise: newest workout first, set number ascending within it
    pub fn get_recent_sets(&self, exercise_id: i64, limit: usize) -> Result<Vec<WorkoutSet>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SET_COLUMNS} FROM sets s
             JOIN workouts w ON s.workout_id = w.id
             WHERE s.exercise_id = ?1 AND s.is_warmup = 0
             ORDER BY w.date DESC, w.id DESC, s.set_number ASC
             LIMIT ?2"
        ))?;
        let sets = stmt
            .query_map(params![exercise_id, limit as i64], set_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }

    /// Working sets of the most recent workout containing this exercise
    pub fn get_last_workout_sets(&self, exercise_id: i64) -> Result<Vec<WorkoutSet>> {
        let recent = self.get_recent_sets(exercise_id, 10)?;
        let Some(last_workout_id) = recent.first().map(|s| s.workout_id) else {
            return Ok(Vec::new());
        };
        Ok(recent
            .into_iter()
            .filter(|s| s.workout_id == last_workout_id)
            .collect())
    }

    /// Most reps ever logged at exactly this weight, ignoring one set (usually the one just logged)
    pub fn best_reps_at_weight(
        &self,
        exercise_id: i64,
        weight: f64,
        exclude_set_id: Option<i64>,
    ) -> Result<Option<i32>> {
        let best: Option<i32> = self.conn.query_row(
            "SELECT MAX(reps) FROM sets
             WHERE exercise_id = ?1 AND weight = ?2 AND is_warmup = 0
               AND (?3 IS NULL OR id != ?3)",
            params![exercise_id, weight, exclude_set_id],
            |row| row.get(0),
        )?;
        Ok(best)
    }

    /// Working sets per muscle group for workouts dated within [start, end]
    pub fn count_sets_by_muscle_group(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<MuscleGroup, usize>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.muscle_group, COUNT(*) FROM sets s
             JOIN workouts w ON s.workout_id = w.id
             JOIN exercises e ON s.exercise_id = e.id
             WHERE s.is_warmup = 0 AND w.date >= ?1 AND w.date <= ?2
             GROUP BY e.muscle_group",
        )?;
        let counts = stmt
            .query_map(
                params![start.format(DATE_FORMAT).to_string(), end.format(DATE_FORMAT).to_string()],
                |row| {
                    let group: MuscleGroup = parse_column(row, 0)?;
                    let count: i64 = row.get(1)?;
                    Ok((group, count as usize))
                },
            )?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(counts)
    }

    // ---- personal records ----

    /// Append a personal record row
    pub fn insert_personal_record(
        &self,
        exercise_id: i64,
        workout_id: Option<i64>,
        set_id: Option<i64>,
        pr_type: PrType,
        weight: f64,
        reps: i32,
    ) -> Result<i64> {
        let volume = weight * reps as f64;
        self.conn.execute(
            "INSERT INTO personal_records (exercise_id, workout_id, set_id, pr_type, weight, reps, volume, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                exercise_id,
                workout_id,
                set_id,
                pr_type.as_str(),
                weight,
                reps,
                volume,
                timestamp(Utc::now()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Records for one exercise, newest first
    pub fn get_personal_records(&self, exercise_id: i64) -> Result<Vec<PersonalRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PR_COLUMNS} FROM personal_records WHERE exercise_id = ?1 ORDER BY date DESC, id DESC"
        ))?;
        let records = stmt
            .query_map([exercise_id], pr_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Latest records across all exercises
    pub fn get_all_personal_records(&self, limit: usize) -> Result<Vec<PersonalRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PR_COLUMNS} FROM personal_records ORDER BY date DESC, id DESC LIMIT ?1"
        ))?;
        let records = stmt
            .query_map([limit as i64], pr_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // ---- alerts ----

    pub fn insert_alert(
        &self,
        exercise_id: i64,
        alert_type: AlertType,
        severity: AlertSeverity,
        message: &str,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO alerts (exercise_id, alert_type, severity, message, is_dismissed, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                exercise_id,
                alert_type.as_str(),
                severity.as_str(),
                message,
                timestamp(Utc::now()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Whether a non-dismissed alert of this type exists for the exercise
    pub fn has_active_alert(&self, exercise_id: i64, alert_type: AlertType) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE exercise_id = ?1 AND alert_type = ?2 AND is_dismissed = 0",
            params![exercise_id, alert_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Non-dismissed alerts, newest first
    pub fn get_active_alerts(&self) -> Result<Vec<Alert>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.exercise_id, a.alert_type, a.severity, a.message, a.is_dismissed, a.created_at, e.name
             FROM alerts a
             LEFT JOIN exercises e ON a.exercise_id = e.id
             WHERE a.is_dismissed = 0
             ORDER BY a.created_at DESC, a.id DESC",
        )?;
        let alerts = stmt
            .query_map([], |row| {
                Ok(Alert {
                    id: row.get(0)?,
                    exercise_id: row.get(1)?,
                    alert_type: parse_column(row, 2)?,
                    severity: parse_column(row, 3)?,
                    message: row.get(4)?,
                    is_dismissed: row.get(5)?,
                    created_at: parse_timestamp(row, 6)?,
                    exercise_name: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(alerts)
    }

    /// Dismiss an alert; returns false if no such active alert
    pub fn dismiss_alert(&self, alert_id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE alerts SET is_dismissed = 1 WHERE id = ?1 AND is_dismissed = 0",
            [alert_id],
        )?;
        Ok(changed > 0)
    }

    /// Delete dismissed alerts older than `days_to_keep` days
    pub fn cleanup_dismissed_alerts(&self, days_to_keep: i64) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(days_to_keep);
        let removed = self.conn.execute(
            "DELETE FROM alerts WHERE is_dismissed = 1 AND created_at < ?1",
            [timestamp(cutoff)],
        )?;
        Ok(removed)
    }
}
