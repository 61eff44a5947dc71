use serde_json::json;

use super::common::*;
use crate::inference::conditions::{Condition, CONDITIONS};
use crate::inference::rules::score_conditions;

#[test]
fn presbyopia_profile_scores_every_rule() {
    let scores = score_conditions(&presbyopia_profile());

    let presbyopia = scores.get(Condition::Presbyopia);
    assert_eq!(presbyopia.score, 5);
    assert_eq!(
        presbyopia.triggered_rules,
        vec![
            "Age >= 40",
            "Glasses_Usage == 1",
            "Reading_Hours >= 2",
            "Study_Hours >= 3",
        ]
    );
    assert_eq!(scores.score(Condition::Hyperopia), 2);
    assert_eq!(scores.score(Condition::Astigmatism), 2);
    assert_eq!(scores.score(Condition::Myopia), 0);
}

#[test]
fn every_condition_is_reported_in_priority_order() {
    let scores = score_conditions(&quiet_profile());

    let order: Vec<Condition> = scores.iter().map(|candidate| candidate.condition).collect();
    assert_eq!(order, CONDITIONS.to_vec());
    assert!(scores.iter().all(|candidate| candidate.score == 0));
    assert!(scores
        .iter()
        .all(|candidate| candidate.triggered_rules.is_empty()));
}

#[test]
fn dry_eye_environment_rules_add_one_point_but_are_all_listed() {
    let scores = score_conditions(&input(json!({
        "Water_Intake_Liters": 1.0,
        "AC_Exposure": "Yes",
        "Contact_Lens_Use": true,
    })));

    let dry_eye = scores.get(Condition::DryEye);
    assert_eq!(dry_eye.score, 1);
    assert_eq!(
        dry_eye.triggered_rules,
        vec![
            "Water_Intake_Liters <= 1.5",
            "AC_Exposure == 1",
            "Contact_Lens_Use == 1",
        ]
    );
}

#[test]
fn dry_eye_environment_cap_still_allows_screen_and_sleep_points() {
    let scores = score_conditions(&heavy_screen_profile());

    let dry_eye = scores.get(Condition::DryEye);
    assert_eq!(dry_eye.score, 3);
    assert_eq!(dry_eye.triggered_rules.len(), 4);
}

#[test]
fn myopia_reads_the_first_outdoor_alias_present() {
    let scores = score_conditions(&input(json!({
        "Outdoor_Time_Hours": 3,
        "Outdoor_Exposure_Hours": 1,
    })));
    assert_eq!(scores.score(Condition::Myopia), 0);

    let scores = score_conditions(&input(json!({
        "Outdoor_Time_Hours": null,
        "Outdoor_Exposure_Hours": 1,
    })));
    let myopia = scores.get(Condition::Myopia);
    assert_eq!(myopia.score, 1);
    assert_eq!(myopia.triggered_rules, vec!["Outdoor_Exposure_Hours <= 1.5"]);
}

#[test]
fn blurred_vision_needs_both_screen_time_and_sleep() {
    let screen_only = score_conditions(&input(json!({ "Screen_Time_Hours": 9 })));
    assert_eq!(screen_only.score(Condition::BlurredVision), 0);

    let both = score_conditions(&heavy_screen_profile());
    let blurred = both.get(Condition::BlurredVision);
    assert_eq!(blurred.score, 1);
    assert_eq!(
        blurred.triggered_rules,
        vec!["Screen_Time_Hours >= 8 AND Sleep_Hours <= 5"]
    );
}

#[test]
fn light_sensitivity_is_skipped_without_any_proxy() {
    let scores = score_conditions(&input(json!({ "Age": 30 })));

    assert!(!scores.light_proxy_available());
    assert_eq!(scores.score(Condition::LightSensitivity), 0);
}

#[test]
fn light_sensitivity_gate_opens_on_presence_not_on_trigger() {
    let scores = score_conditions(&input(json!({ "Migraine_History": "No" })));

    assert!(scores.light_proxy_available());
    assert_eq!(scores.score(Condition::LightSensitivity), 0);
}

#[test]
fn outdoor_exposure_stands_in_for_missing_uv_reading() {
    let scores = score_conditions(&input(json!({
        "Outdoor_Exposure_Hours": 3,
        "No_Sunglasses": "yes",
    })));

    let light = scores.get(Condition::LightSensitivity);
    assert!(scores.light_proxy_available());
    assert_eq!(light.score, 2);
    assert_eq!(
        light.triggered_rules,
        vec!["Outdoor_Exposure_Hours >= 2", "No_Sunglasses == 1"]
    );
}

#[test]
fn snake_case_and_string_values_are_normalized() {
    let scores = score_conditions(&input(json!({
        "age": "45",
        "glasses_usage": "true",
        "family_history": 1,
    })));

    assert_eq!(scores.score(Condition::Presbyopia), 3);
    assert_eq!(
        scores.get(Condition::Astigmatism).triggered_rules,
        vec!["Glasses_Usage == 1", "Family_History == 1"]
    );
}

#[test]
fn unreadable_values_never_trigger_rules() {
    let scores = score_conditions(&input(json!({
        "Age": "unknown",
        "Screen_Time_Hours": "",
        "Glasses_Usage": "sometimes",
        "Sleep_Hours": [7],
    })));

    assert!(scores.iter().all(|candidate| candidate.score == 0));
}

#[test]
fn scoring_is_deterministic() {
    let profile = heavy_screen_profile();

    let first = serde_json::to_vec(&score_conditions(&profile)).expect("serialize scores");
    let second = serde_json::to_vec(&score_conditions(&profile)).expect("serialize scores");

    assert_eq!(first, second);
}
