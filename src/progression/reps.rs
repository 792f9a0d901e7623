//! In-session rep prediction from Set 1 performance

use serde::Serialize;

use crate::exercises::RirResponse;

/// Expected reps for an upcoming set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepPrediction {
    pub min: i32,
    pub max: i32,
    pub expected: i32,
}

/// Per-set fatigue decay; lower means reps drop faster
pub fn decay_factor(rir: RirResponse) -> f64 {
    match rir {
        RirResponse::YesMaybe => 0.875,
        RirResponse::YesEasily => 0.925,
        RirResponse::NoWay => 0.825,
    }
}

/// Predict reps for `set_number` (1-based) given how Set 1 went.
///
/// expected = set1_reps * decay^(n-1), range is expected +/- 1 with the
/// lower bound floored and held at 1.
pub fn predict_reps(set1_reps: i32, set1_rir: RirResponse, set_number: u32) -> RepPrediction {
    let exponent = set_number.saturating_sub(1) as i32;
    let expected = set1_reps as f64 * decay_factor(set1_rir).powi(exponent);

    RepPrediction {
        min: ((expected - 1.0).floor() as i32).max(1),
        max: (expected + 1.0).ceil() as i32,
        expected: expected.round() as i32,
    }
}

pub fn format_rep_prediction(prediction: &RepPrediction) -> String {
    if prediction.min == prediction.max {
        format!("{} reps", prediction.expected)
    } else {
        format!("{}-{} reps", prediction.min, prediction.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTone {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RirFeedback {
    pub message: &'static str,
    pub tone: FeedbackTone,
}

/// User-facing reaction to an RIR answer
pub fn get_rir_feedback(rir: RirResponse) -> RirFeedback {
    match rir {
        RirResponse::YesMaybe => RirFeedback {
            message: "Perfect! That's 1 RIR. Keep it up!",
            tone: FeedbackTone::Success,
        },
        RirResponse::YesEasily => RirFeedback {
            message: "Too easy! Push harder next set or increase weight.",
            tone: FeedbackTone::Warning,
        },
        RirResponse::NoWay => RirFeedback {
            message: "Complete failure - risky for joints. Stop at 1 RIR next time.",
            tone: FeedbackTone::Error,
        },
    }
}
