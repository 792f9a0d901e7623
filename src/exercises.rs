//! Exercise definitions - categories, RIR answers, muscle groups and the default library

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored string that does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

/// Starting weight when the category is missing or unrecognized (empty bar)
pub const DEFAULT_STARTING_WEIGHT: f64 = 45.0;

/// Increment when the category is missing or unrecognized
pub const DEFAULT_INCREMENT: f64 = 5.0;

/// Lift category, drives starting weight and progression increment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Squat,
    Bench,
    Deadlift,
    Row,
    Press,
    Pull,
    Accessory,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Squat => "squat",
            Category::Bench => "bench",
            Category::Deadlift => "deadlift",
            Category::Row => "row",
            Category::Press => "press",
            Category::Pull => "pull",
            Category::Accessory => "accessory",
        }
    }

    /// Weight for the very first session of a lift
    pub fn starting_weight(&self) -> f64 {
        match self {
            Category::Squat => 45.0,    // just the bar
            Category::Deadlift => 95.0, // bar + 25s
            Category::Bench => 45.0,
            Category::Press => 45.0,
            Category::Row => 65.0,      // bar + 10s
            Category::Pull => 0.0,      // bodyweight
            Category::Accessory => 10.0,
        }
    }

    /// Per-session progression step
    pub fn increment(&self) -> f64 {
        match self {
            Category::Squat => 5.0,
            Category::Deadlift => 10.0,
            Category::Bench => 5.0,
            Category::Press => 2.5,
            Category::Row => 5.0,
            Category::Pull => 2.5,
            Category::Accessory => 2.5,
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::Squat,
            Category::Bench,
            Category::Deadlift,
            Category::Row,
            Category::Press,
            Category::Pull,
            Category::Accessory,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("category", s))
    }
}

/// Starting weight for a possibly unknown category
pub fn starting_weight(category: Option<Category>) -> f64 {
    category.map_or(DEFAULT_STARTING_WEIGHT, |c| c.starting_weight())
}

/// Increment for a possibly unknown category
pub fn weight_increment(category: Option<Category>) -> f64 {
    category.map_or(DEFAULT_INCREMENT, |c| c.increment())
}

/// Answer to "could you have done one more rep?"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RirResponse {
    /// ~1 rep in reserve, the target effort
    YesMaybe,
    /// Too light
    YesEasily,
    /// Failed before reaching it
    NoWay,
}

impl RirResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            RirResponse::YesMaybe => "yes_maybe",
            RirResponse::YesEasily => "yes_easily",
            RirResponse::NoWay => "no_way",
        }
    }
}

impl fmt::Display for RirResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RirResponse {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes_maybe" => Ok(RirResponse::YesMaybe),
            "yes_easily" => Ok(RirResponse::YesEasily),
            "no_way" => Ok(RirResponse::NoWay),
            other => Err(ParseEnumError::new("RIR response", other)),
        }
    }
}

/// Muscle groups reported in the weekly volume report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Legs,
    Chest,
    Back,
    Shoulders,
    Arms,
    Core,
    /// Anything the keyword table does not recognize; never reported
    Other,
}

impl MuscleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Legs => "legs",
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Arms => "arms",
            MuscleGroup::Core => "core",
            MuscleGroup::Other => "other",
        }
    }

    /// The six groups covered by the volume report, in report order
    pub fn tracked() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Legs,
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Arms,
            MuscleGroup::Core,
        ]
    }

    /// Resolve the group from an exercise name.
    ///
    /// Keywords are tried in table order and the first one contained in the
    /// lower-cased name wins, so "Barbell Bench Press" is chest, not shoulders.
    pub fn from_exercise_name(name: &str) -> MuscleGroup {
        let normalized = name.to_lowercase();
        MUSCLE_KEYWORDS
            .iter()
            .find(|(keyword, _)| normalized.contains(keyword))
            .map_or(MuscleGroup::Other, |(_, group)| *group)
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuscleGroup {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MuscleGroup::tracked()
            .iter()
            .chain(std::iter::once(&MuscleGroup::Other))
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("muscle group", s))
    }
}

/// Ordered keyword table; order matters for names that contain several keywords
pub const MUSCLE_KEYWORDS: &[(&str, MuscleGroup)] = &[
    // Legs
    ("squat", MuscleGroup::Legs),
    ("deadlift", MuscleGroup::Legs),
    ("lunge", MuscleGroup::Legs),
    ("leg press", MuscleGroup::Legs),
    ("leg curl", MuscleGroup::Legs),
    ("leg extension", MuscleGroup::Legs),
    // Chest
    ("bench", MuscleGroup::Chest),
    ("incline bench", MuscleGroup::Chest),
    ("decline bench", MuscleGroup::Chest),
    ("chest fly", MuscleGroup::Chest),
    ("push up", MuscleGroup::Chest),
    // Back
    ("row", MuscleGroup::Back),
    ("pull up", MuscleGroup::Back),
    ("lat pulldown", MuscleGroup::Back),
    ("conventional deadlift", MuscleGroup::Back),
    ("face pull", MuscleGroup::Back),
    // Shoulders
    ("press", MuscleGroup::Shoulders),
    ("lateral raise", MuscleGroup::Shoulders),
    ("front raise", MuscleGroup::Shoulders),
    ("rear delt", MuscleGroup::Shoulders),
    // Arms
    ("bicep curl", MuscleGroup::Arms),
    ("tricep extension", MuscleGroup::Arms),
    ("tricep dip", MuscleGroup::Arms),
    ("hammer curl", MuscleGroup::Arms),
    // Core
    ("plank", MuscleGroup::Core),
    ("crunch", MuscleGroup::Core),
    ("russian twist", MuscleGroup::Core),
];

/// Built-in exercise seeded into a fresh database
#[derive(Debug, Clone)]
pub struct ExerciseDef {
    pub name: &'static str,
    pub category: Category,
    pub is_compound: bool,
    /// Part of the StrongLifts A/B rotation
    pub is_default: bool,
    pub description: Option<&'static str>,
}

/// StrongLifts 5x5 main lifts
pub const DEFAULT_EXERCISES: &[ExerciseDef] = &[
    ExerciseDef {
        name: "Barbell Back Squat",
        category: Category::Squat,
        is_compound: true,
        is_default: true,
        description: Some("High-bar back squat to parallel or below"),
    },
    ExerciseDef {
        name: "Barbell Bench Press",
        category: Category::Bench,
        is_compound: true,
        is_default: true,
        description: Some("Flat bench, bar to mid-chest"),
    },
    ExerciseDef {
        name: "Conventional Deadlift",
        category: Category::Deadlift,
        is_compound: true,
        is_default: true,
        description: Some("Hip-width stance, bar over mid-foot"),
    },
    ExerciseDef {
        name: "Barbell Row",
        category: Category::Row,
        is_compound: true,
        is_default: true,
        description: Some("Pendlay-style row from the floor"),
    },
    ExerciseDef {
        name: "Overhead Press",
        category: Category::Press,
        is_compound: true,
        is_default: true,
        description: Some("Standing strict press"),
    },
    ExerciseDef {
        name: "Pull-ups",
        category: Category::Pull,
        is_compound: true,
        is_default: true,
        description: Some("Bodyweight or weighted"),
    },
];

/// Accessory work available alongside the main lifts
pub const ACCESSORY_EXERCISES: &[ExerciseDef] = &[
    ExerciseDef {
        name: "Barbell Bicep Curl",
        category: Category::Accessory,
        is_compound: false,
        is_default: false,
        description: None,
    },
    ExerciseDef {
        name: "Tricep Extensions",
        category: Category::Accessory,
        is_compound: false,
        is_default: false,
        description: None,
    },
    ExerciseDef {
        name: "Lateral Raises",
        category: Category::Accessory,
        is_compound: false,
        is_default: false,
        description: None,
    },
    ExerciseDef {
        name: "Face Pulls",
        category: Category::Accessory,
        is_compound: false,
        is_default: false,
        description: None,
    },
    ExerciseDef {
        name: "Walking Lunges",
        category: Category::Accessory,
        is_compound: true,
        is_default: false,
        description: None,
    },
    ExerciseDef {
        name: "Plank",
        category: Category::Accessory,
        is_compound: false,
        is_default: false,
        description: Some("Timed hold, log seconds as reps"),
    },
];

pub fn get_default_exercises() -> &'static [ExerciseDef] {
    DEFAULT_EXERCISES
}

pub fn get_all_exercises() -> Vec<&'static ExerciseDef> {
    DEFAULT_EXERCISES.iter().chain(ACCESSORY_EXERCISES.iter()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_weights() {
        assert_eq!(starting_weight(Some(Category::Squat)), 45.0);
        assert_eq!(starting_weight(Some(Category::Deadlift)), 95.0);
        assert_eq!(starting_weight(Some(Category::Row)), 65.0);
        assert_eq!(starting_weight(Some(Category::Pull)), 0.0);
        assert_eq!(starting_weight(Some(Category::Accessory)), 10.0);
        assert_eq!(starting_weight(None), 45.0);
    }

    #[test]
    fn test_increments() {
        assert_eq!(weight_increment(Some(Category::Deadlift)), 10.0);
        assert_eq!(weight_increment(Some(Category::Press)), 2.5);
        assert_eq!(weight_increment(None), 5.0);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::all() {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), *category);
        }
        assert!("kettlebell".parse::<Category>().is_err());
    }

    #[test]
    fn test_rir_parse_rejects_unknown() {
        assert_eq!("no_way".parse::<RirResponse>().unwrap(), RirResponse::NoWay);
        let err = "maybe".parse::<RirResponse>().unwrap_err();
        assert_eq!(err.to_string(), "unknown RIR response: 'maybe'");
    }

    #[test]
    fn test_muscle_group_keyword_order() {
        assert_eq!(MuscleGroup::from_exercise_name("Barbell Back Squat"), MuscleGroup::Legs);
        assert_eq!(MuscleGroup::from_exercise_name("Barbell Bench Press"), MuscleGroup::Chest);
        assert_eq!(MuscleGroup::from_exercise_name("Overhead Press"), MuscleGroup::Shoulders);
        assert_eq!(MuscleGroup::from_exercise_name("Barbell Row"), MuscleGroup::Back);
        // "deadlift" is listed before "conventional deadlift"
        assert_eq!(MuscleGroup::from_exercise_name("Conventional Deadlift"), MuscleGroup::Legs);
        assert_eq!(MuscleGroup::from_exercise_name("Plank"), MuscleGroup::Core);
        assert_eq!(MuscleGroup::from_exercise_name("Dips"), MuscleGroup::Other);
    }

    #[test]
    fn test_library_has_six_main_lifts() {
        assert_eq!(get_default_exercises().len(), 6);
        assert!(get_all_exercises().len() > get_default_exercises().len());
    }
}
