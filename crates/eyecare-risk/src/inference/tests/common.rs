use serde_json::{json, Value};

use crate::inference::conditions::{Condition, ConditionCandidate, ConditionScores};
use crate::inference::distribution::ConditionProbabilities;
use crate::inference::features::AssessmentInput;

pub(super) const TOLERANCE: f64 = 1e-6;

pub(super) fn input(value: Value) -> AssessmentInput {
    match value {
        Value::Object(map) => AssessmentInput::from(map),
        other => panic!("fixture must be a JSON object, got {other}"),
    }
}

pub(super) fn presbyopia_profile() -> AssessmentInput {
    input(json!({
        "Age": 45,
        "Glasses_Usage": 1,
        "Reading_Hours": 3,
        "Study_Hours": 4,
    }))
}

pub(super) fn quiet_profile() -> AssessmentInput {
    input(json!({
        "Age": 27,
        "Screen_Time_Hours": 2,
        "Sleep_Hours": 9,
    }))
}

pub(super) fn heavy_screen_profile() -> AssessmentInput {
    input(json!({
        "Age": 19,
        "Screen_Time_Hours": 10,
        "Sleep_Hours": 4,
        "Outdoor_Time_Hours": 0.5,
        "Water_Intake_Liters": 1.0,
        "Contact_Lens_Use": "Yes",
        "Migraine_History": "No",
    }))
}

pub(super) fn candidate(condition: Condition, score: u32, rules: &[&str]) -> ConditionCandidate {
    ConditionCandidate {
        condition,
        score,
        triggered_rules: rules.iter().map(|rule| rule.to_string()).collect(),
    }
}

pub(super) fn scores(candidates: Vec<ConditionCandidate>) -> ConditionScores {
    ConditionScores::new(candidates, true)
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn assert_sums_to_one(distribution: &ConditionProbabilities) {
    assert_close(distribution.total(), 1.0);
}
