//! stronglog - StrongLifts 5x5 tracker with progression coaching
//!
//! Logs sets to SQLite and turns the history into coaching signals:
//! next-session weight, rep predictions, personal records, stagnation and
//! sandbagging alerts, weekly volume balance.

pub mod alerts;
pub mod db;
pub mod exercises;
pub mod progression;
pub mod session;

pub use db::Database;
pub use session::WorkoutSession;
