//! Weekly per-muscle-group set volume against the 10-15 set band

use std::collections::HashMap;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::db::Database;
use crate::exercises::MuscleGroup;

pub const OPTIMAL_MIN_SETS: usize = 10;
pub const OPTIMAL_MAX_SETS: usize = 15;

/// Share of active groups that must be optimal for the week to count as balanced
pub const BALANCED_RATIO: f64 = 0.7;

/// Trailing window length, today included
pub const WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStatus {
    TooLow,
    Optimal,
    TooHigh,
}

impl VolumeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VolumeStatus::TooLow => "too low",
            VolumeStatus::Optimal => "optimal",
            VolumeStatus::TooHigh => "too high",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeAnalysis {
    pub muscle_group: MuscleGroup,
    pub total_sets: usize,
    pub status: VolumeStatus,
    pub recommendation: String,
    /// Percent of the top of the optimal band, capped at 100
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Balance {
    Balanced,
    Unbalanced,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyVolumeReport {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub muscle_groups: Vec<VolumeAnalysis>,
    pub overall_balance: Balance,
    pub recommendations: Vec<String>,
}

/// First and last day of the trailing week ending today
pub fn week_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(WINDOW_DAYS - 1), today)
}

/// Classify one group's weekly set count
pub fn analyze_muscle_group(group: MuscleGroup, total_sets: usize) -> VolumeAnalysis {
    let (status, recommendation) = if total_sets < OPTIMAL_MIN_SETS {
        (
            VolumeStatus::TooLow,
            format!("Add {} more {} sets this week", OPTIMAL_MIN_SETS - total_sets, group),
        )
    } else if total_sets > OPTIMAL_MAX_SETS {
        (
            VolumeStatus::TooHigh,
            format!(
                "Reduce {} volume by {} sets (consider deload)",
                group,
                total_sets - OPTIMAL_MAX_SETS
            ),
        )
    } else {
        (VolumeStatus::Optimal, format!("{} volume is perfect!", group))
    };

    let percentage = (total_sets as f64 / OPTIMAL_MAX_SETS as f64 * 100.0).min(100.0);

    VolumeAnalysis {
        muscle_group: group,
        total_sets,
        status,
        recommendation,
        percentage,
    }
}

fn group_names(groups: &[&VolumeAnalysis]) -> String {
    groups
        .iter()
        .map(|g| g.muscle_group.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the report from per-group set counts; groups outside the tracked six are ignored
pub fn build_weekly_report(today: NaiveDate, counts: &HashMap<MuscleGroup, usize>) -> WeeklyVolumeReport {
    let (week_start, week_end) = week_window(today);

    let muscle_groups: Vec<VolumeAnalysis> = MuscleGroup::tracked()
        .iter()
        .map(|group| analyze_muscle_group(*group, counts.get(group).copied().unwrap_or(0)))
        .collect();

    // Groups with no sets at all don't count against balance
    let active: Vec<_> = muscle_groups.iter().filter(|g| g.total_sets > 0).collect();
    let optimal = active.iter().filter(|g| g.status == VolumeStatus::Optimal).count();
    let ratio = if active.is_empty() {
        0.0
    } else {
        optimal as f64 / active.len() as f64
    };
    let overall_balance = if ratio >= BALANCED_RATIO {
        Balance::Balanced
    } else {
        Balance::Unbalanced
    };

    let mut recommendations = Vec::new();

    if overall_balance == Balance::Unbalanced {
        let low: Vec<_> = muscle_groups
            .iter()
            .filter(|g| g.status == VolumeStatus::TooLow)
            .collect();
        let high: Vec<_> = muscle_groups
            .iter()
            .filter(|g| g.status == VolumeStatus::TooHigh)
            .collect();

        if !low.is_empty() {
            recommendations.push(format!("Focus on {} - add more sets", group_names(&low)));
        }
        if !high.is_empty() {
            recommendations.push(format!("{} volume is too high - consider reducing", group_names(&high)));
        }
    }

    recommendations.extend(
        muscle_groups
            .iter()
            .filter(|g| g.status != VolumeStatus::Optimal)
            .map(|g| g.recommendation.clone()),
    );

    if recommendations.is_empty() {
        recommendations.push("Great job! All muscle groups are in optimal volume range.".to_string());
    }

    WeeklyVolumeReport {
        week_start,
        week_end,
        muscle_groups,
        overall_balance,
        recommendations,
    }
}

/// Weekly report for the trailing seven days ending `today`
pub fn generate_weekly_volume_report(db: &Database, today: NaiveDate) -> Result<WeeklyVolumeReport> {
    let (start, end) = week_window(today);
    let counts = db.count_sets_by_muscle_group(start, end)?;
    Ok(build_weekly_report(today, &counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewSet;
    use crate::exercises::RirResponse;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn counts(pairs: &[(MuscleGroup, usize)]) -> HashMap<MuscleGroup, usize> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_classification_band() {
        let optimal = analyze_muscle_group(MuscleGroup::Legs, 12);
        assert_eq!(optimal.status, VolumeStatus::Optimal);
        assert!((optimal.percentage - 80.0).abs() < 1e-9);

        let low = analyze_muscle_group(MuscleGroup::Legs, 5);
        assert_eq!(low.status, VolumeStatus::TooLow);
        assert_eq!(low.recommendation, "Add 5 more legs sets this week");

        let high = analyze_muscle_group(MuscleGroup::Legs, 20);
        assert_eq!(high.status, VolumeStatus::TooHigh);
        assert_eq!(high.percentage, 100.0);
        assert_eq!(high.recommendation, "Reduce legs volume by 5 sets (consider deload)");
    }

    #[test]
    fn test_band_edges_are_optimal() {
        assert_eq!(analyze_muscle_group(MuscleGroup::Back, 10).status, VolumeStatus::Optimal);
        assert_eq!(analyze_muscle_group(MuscleGroup::Back, 15).status, VolumeStatus::Optimal);
    }

    #[test]
    fn test_window_is_seven_days_inclusive() {
        let (start, end) = week_window(today());
        assert_eq!(end, today());
        assert_eq!((end - start).num_days(), 6);
    }

    #[test]
    fn test_empty_week_is_unbalanced() {
        let report = build_weekly_report(today(), &HashMap::new());
        assert_eq!(report.muscle_groups.len(), 6);
        assert_eq!(report.overall_balance, Balance::Unbalanced);
        assert_eq!(
            report.recommendations[0],
            "Focus on legs, chest, back, shoulders, arms, core - add more sets"
        );
        assert_eq!(report.recommendations.len(), 7);
    }

    #[test]
    fn test_zero_groups_excluded_from_balance_ratio() {
        let report = build_weekly_report(
            today(),
            &counts(&[(MuscleGroup::Legs, 12), (MuscleGroup::Chest, 11), (MuscleGroup::Back, 14)]),
        );
        assert_eq!(report.overall_balance, Balance::Balanced);
        // Balanced weeks skip the summary line but still list the idle groups
        assert_eq!(report.recommendations.len(), 3);
        assert!(report.recommendations[0].starts_with("Add 10 more shoulders"));
    }

    #[test]
    fn test_all_optimal_congratulates() {
        let all: Vec<_> = MuscleGroup::tracked().iter().map(|g| (*g, 12)).collect();
        let report = build_weekly_report(today(), &counts(&all));
        assert_eq!(report.overall_balance, Balance::Balanced);
        assert_eq!(
            report.recommendations,
            vec!["Great job! All muscle groups are in optimal volume range.".to_string()]
        );
    }

    #[test]
    fn test_other_group_ignored() {
        let report = build_weekly_report(today(), &counts(&[(MuscleGroup::Other, 40)]));
        assert!(report.muscle_groups.iter().all(|g| g.total_sets == 0));
    }

    #[test]
    fn test_report_from_database() {
        let db = Database::open_in_memory().unwrap();
        let squat = db.find_exercise_by_name("Barbell Back Squat").unwrap().unwrap().id;
        let bench = db.find_exercise_by_name("Barbell Bench Press").unwrap().unwrap().id;

        let this_week = db.create_workout(today() - Duration::days(2), None, None).unwrap();
        let last_week = db.create_workout(today() - Duration::days(7), None, None).unwrap();

        for (workout_id, exercise_id, count) in [(this_week, squat, 12), (this_week, bench, 5), (last_week, bench, 10)] {
            for n in 1..=count {
                db.add_set(&NewSet {
                    workout_id,
                    exercise_id,
                    set_number: n,
                    weight: 100.0,
                    reps: 5,
                    rir_response: Some(RirResponse::YesMaybe),
                    target_reps: Some(5),
                    is_warmup: false,
                })
                .unwrap();
            }
        }

        let report = generate_weekly_volume_report(&db, today()).unwrap();
        let legs = &report.muscle_groups[0];
        let chest = &report.muscle_groups[1];
        assert_eq!((legs.muscle_group, legs.total_sets, legs.status), (MuscleGroup::Legs, 12, VolumeStatus::Optimal));
        assert_eq!((chest.muscle_group, chest.total_sets, chest.status), (MuscleGroup::Chest, 5, VolumeStatus::TooLow));
        assert_eq!(report.overall_balance, Balance::Unbalanced);
    }
}
