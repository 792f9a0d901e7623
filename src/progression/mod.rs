//! Progression module - coaching signals derived from set history
//!
//! Features:
//! - Next-session weight suggestion
//! - In-session rep prediction
//! - Personal record detection
//! - Weekly muscle group volume report

pub mod records;
pub mod reps;
pub mod volume;
pub mod weight;

pub use records::{BestPrs, PrCheck, PrKind, check_for_pr, detect_and_save_prs, get_best_prs};
pub use reps::{FeedbackTone, RepPrediction, RirFeedback, format_rep_prediction, get_rir_feedback, predict_reps};
pub use volume::{Balance, VolumeAnalysis, VolumeStatus, WeeklyVolumeReport, generate_weekly_volume_report};
pub use weight::{WeightRule, WeightSuggestion, get_last_weight, suggest_next_weight};
