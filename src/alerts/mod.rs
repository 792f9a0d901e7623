//! Alerts module - training pattern detectors run after a workout
//!
//! An alert is only written when no active (non-dismissed) alert of the same
//! type exists for the exercise. The check-then-insert is not transactional;
//! it relies on a single local writer.

pub mod sandbagging;
pub mod stagnation;

pub use sandbagging::{
    SandbaggingAlert, analyze_all_exercises_sandbagging, detect_sandbagging, process_sandbagging_alerts,
};
pub use stagnation::{
    StagnationAlert, StagnationSeverity, analyze_all_exercises_stagnation, detect_stagnation,
    process_stagnation_alerts,
};
