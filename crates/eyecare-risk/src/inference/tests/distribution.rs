use std::collections::BTreeMap;

use super::common::*;
use crate::inference::conditions::{Condition, CONDITIONS};
use crate::inference::distribution::{
    distribute_probabilities, ConditionProbabilities, OTHER_UNSPECIFIED,
};
use crate::inference::policy::infer_probable_condition;
use crate::inference::rules::score_conditions;

#[test]
fn remainder_is_split_by_score_across_supported_conditions() {
    let scores = scores(vec![
        candidate(Condition::Myopia, 3, &["Age <= 25"]),
        candidate(Condition::Astigmatism, 1, &["Screen_Time_Hours >= 5"]),
        candidate(Condition::DryEye, 1, &["Sleep_Hours <= 6"]),
    ]);

    let distribution = distribute_probabilities(0.8, &scores, Some(Condition::Myopia));

    assert_close(distribution.condition(Condition::Myopia), 0.8);
    assert_close(distribution.condition(Condition::Astigmatism), 0.1);
    assert_close(distribution.condition(Condition::DryEye), 0.1);
    for condition in [
        Condition::Presbyopia,
        Condition::Hyperopia,
        Condition::LightSensitivity,
        Condition::BlurredVision,
    ] {
        assert_eq!(distribution.get(condition.label()), Some(0.0));
    }
    assert_eq!(distribution.get(OTHER_UNSPECIFIED), None);
    assert_sums_to_one(&distribution);
}

#[test]
fn remainder_without_alternatives_goes_to_other() {
    let scores = scores(vec![candidate(Condition::Presbyopia, 2, &["Age >= 40"])]);

    let distribution = distribute_probabilities(0.7, &scores, Some(Condition::Presbyopia));

    assert_close(distribution.condition(Condition::Presbyopia), 0.7);
    assert_close(distribution.get(OTHER_UNSPECIFIED).unwrap_or_default(), 0.3);
    assert_eq!(distribution.len(), CONDITIONS.len() + 1);
    assert_sums_to_one(&distribution);
}

#[test]
fn certain_risk_leaves_nothing_to_distribute() {
    let scores = scores(vec![
        candidate(Condition::Myopia, 3, &["Age <= 25"]),
        candidate(Condition::DryEye, 2, &["Sleep_Hours <= 6"]),
    ]);

    let distribution = distribute_probabilities(1.0, &scores, Some(Condition::Myopia));

    assert_eq!(distribution.condition(Condition::Myopia), 1.0);
    assert_eq!(distribution.condition(Condition::DryEye), 0.0);
    assert_eq!(distribution.get(OTHER_UNSPECIFIED), None);
}

#[test]
fn out_of_range_probabilities_are_clamped() {
    let scores = scores(vec![candidate(Condition::Myopia, 2, &["Age <= 25"])]);

    let high = distribute_probabilities(1.7, &scores, Some(Condition::Myopia));
    assert_eq!(high.condition(Condition::Myopia), 1.0);
    assert_sums_to_one(&high);

    let low = distribute_probabilities(-0.2, &scores, Some(Condition::Myopia));
    assert_eq!(low.condition(Condition::Myopia), 0.0);
    assert_close(low.get(OTHER_UNSPECIFIED).unwrap_or_default(), 1.0);

    let nan = distribute_probabilities(f64::NAN, &scores, Some(Condition::Myopia));
    assert_eq!(nan.condition(Condition::Myopia), 0.0);
    assert_sums_to_one(&nan);
}

#[test]
fn unspecified_prediction_keeps_mass_under_other() {
    let scores = scores(vec![candidate(Condition::BlurredVision, 1, &[])]);

    let distribution = distribute_probabilities(0.6, &scores, None);

    assert_close(distribution.condition(Condition::BlurredVision), 0.4);
    assert_close(distribution.get(OTHER_UNSPECIFIED).unwrap_or_default(), 0.6);
    assert_sums_to_one(&distribution);
}

#[test]
fn live_profiles_always_sum_to_one() {
    for profile in [presbyopia_profile(), quiet_profile(), heavy_screen_profile()] {
        let scores = score_conditions(&profile);
        let predicted = infer_probable_condition(&profile)
            .probable_condition
            .condition();

        for risk in [0.5, 0.51, 0.66, 0.8, 0.999, 1.0] {
            let distribution = distribute_probabilities(risk, &scores, predicted);
            assert_sums_to_one(&distribution);
            assert!(distribution
                .iter()
                .all(|(_, value)| (0.0..=1.0).contains(&value)));
        }
    }
}

#[test]
fn heavy_screen_profile_distribution() {
    let profile = heavy_screen_profile();
    let scores = score_conditions(&profile);

    let distribution = distribute_probabilities(0.8, &scores, Some(Condition::Myopia));

    assert_close(distribution.condition(Condition::Myopia), 0.8);
    assert_close(distribution.condition(Condition::DryEye), 0.1);
    assert_close(distribution.condition(Condition::Hyperopia), 0.2 / 6.0);
    assert_close(distribution.condition(Condition::Astigmatism), 0.2 / 6.0);
    assert_close(distribution.condition(Condition::BlurredVision), 0.2 / 6.0);
}

#[test]
fn one_hot_detection() {
    let mut legacy = BTreeMap::new();
    for condition in CONDITIONS {
        legacy.insert(condition.label().to_string(), 0.0);
    }
    legacy.insert("Myopia".to_string(), 1.0);
    let legacy = ConditionProbabilities::from(legacy);
    assert!(legacy.is_legacy_one_hot("Myopia"));
    assert!(!legacy.is_legacy_one_hot("Dry Eye"));
    assert!(!legacy.is_legacy_one_hot("Unspecified High Risk"));

    let scores = scores(vec![candidate(Condition::Myopia, 2, &["Age <= 25"])]);
    let current = distribute_probabilities(1.0, &scores, Some(Condition::Myopia));
    assert!(current.is_legacy_one_hot("Myopia"));

    let with_other = distribute_probabilities(0.9, &scores, Some(Condition::Myopia));
    assert!(!with_other.is_legacy_one_hot("Myopia"));

    assert!(!ConditionProbabilities::default().is_legacy_one_hot("Myopia"));
}
