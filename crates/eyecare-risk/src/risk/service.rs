use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::handle::ModelHandle;
use super::model::{ModelError, RiskClassifier};
use crate::inference::conditions::{
    ConditionRiskFlag, ConfidenceLevel, ProbableCondition, RuleResult,
};
use crate::inference::distribution::{distribute_probabilities, ConditionProbabilities};
use crate::inference::features::{AssessmentInput, FeatureNormalizer};
use crate::inference::policy::select_condition;
use crate::inference::rules::score_features;

pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = 0.5;

pub const PREDICTION_NOTE: &str = "Probable condition only. Not a medical diagnosis.";

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("risk model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
    #[error("risk model could not score the assessment: {0}")]
    Inference(#[source] ModelError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    High,
    Low,
}

/// Coarse banding of the risk probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Moderate,
    Low,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.66 {
            RiskLevel::High
        } else if probability >= 0.33 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// End-to-end result of both stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub risk_probability: f64,
    pub risk_label: RiskLabel,
    pub risk_level: RiskLevel,
    /// `risk_probability` on a 0-100 scale, two decimals.
    pub risk_score: f64,
    pub probable_condition: ProbableCondition,
    pub triggered_rules: Vec<String>,
    pub confidence_level: ConfidenceLevel,
    pub condition_risk_flag: ConditionRiskFlag,
    pub per_disease_probabilities: ConditionProbabilities,
    pub model_version: Option<String>,
    pub note: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the classifier, then the condition stage when risk is HIGH.
pub fn predict_risk(
    classifier: &dyn RiskClassifier,
    input: &AssessmentInput,
    high_risk_threshold: f64,
) -> Result<RiskPrediction, RiskError> {
    if classifier.feature_names().is_empty() {
        return Err(RiskError::ModelUnavailable(ModelError::MissingFeatureNames));
    }

    let features = FeatureNormalizer::new(input);
    let row = features.classifier_row(classifier.feature_names());
    let [_, p_high] = classifier
        .predict_proba(&row)
        .map_err(RiskError::Inference)?;
    let risk_probability = if p_high.is_nan() {
        0.0
    } else {
        p_high.clamp(0.0, 1.0)
    };

    let (risk_label, rule_result, per_disease_probabilities) =
        if risk_probability >= high_risk_threshold {
            let scores = score_features(&features);
            let rule_result = select_condition(&scores);
            let distribution = distribute_probabilities(
                risk_probability,
                &scores,
                rule_result.probable_condition.condition(),
            );
            (RiskLabel::High, rule_result, distribution)
        } else {
            (
                RiskLabel::Low,
                RuleResult::not_applicable(),
                ConditionProbabilities::default(),
            )
        };

    debug!(
        risk_probability,
        label = ?risk_label,
        condition = %rule_result.probable_condition,
        "risk predicted"
    );

    Ok(RiskPrediction {
        risk_probability,
        risk_label,
        risk_level: RiskLevel::from_probability(risk_probability),
        risk_score: round2(risk_probability * 100.0),
        condition_risk_flag: rule_result.probable_condition.risk_flag(),
        probable_condition: rule_result.probable_condition,
        triggered_rules: rule_result.triggered_rules,
        confidence_level: rule_result.confidence_level,
        per_disease_probabilities,
        model_version: classifier.model_version().map(str::to_string),
        note: PREDICTION_NOTE.to_string(),
    })
}

/// Prediction service bound to a cached model and a HIGH threshold.
#[derive(Debug, Clone)]
pub struct RiskAssessmentService {
    model: Arc<ModelHandle>,
    high_risk_threshold: f64,
}

impl RiskAssessmentService {
    pub fn new(model: Arc<ModelHandle>, high_risk_threshold: f64) -> Self {
        Self {
            model,
            high_risk_threshold,
        }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn high_risk_threshold(&self) -> f64 {
        self.high_risk_threshold
    }

    pub fn predict(&self, input: &AssessmentInput) -> Result<RiskPrediction, RiskError> {
        let classifier = self.model.get()?;
        predict_risk(classifier.as_ref(), input, self.high_risk_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::conditions::Condition;
    use crate::inference::features::FeatureRow;
    use serde_json::json;

    struct FixedClassifier {
        names: Vec<String>,
        p_high: f64,
    }

    impl FixedClassifier {
        fn new(p_high: f64) -> Self {
            Self {
                names: vec!["Age".to_string(), "Screen_Time_Hours".to_string()],
                p_high,
            }
        }
    }

    impl RiskClassifier for FixedClassifier {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_proba(&self, row: &FeatureRow) -> Result<[f64; 2], ModelError> {
            assert_eq!(row.len(), self.names.len());
            Ok([1.0 - self.p_high, self.p_high])
        }

        fn model_version(&self) -> Option<&str> {
            Some("fixed")
        }
    }

    fn presbyopia() -> AssessmentInput {
        AssessmentInput::new()
            .with("Age", 45)
            .with("Glasses_Usage", 1)
            .with("Reading_Hours", 3)
            .with("Study_Hours", 4)
    }

    #[test]
    fn high_risk_runs_condition_stage() {
        let prediction =
            predict_risk(&FixedClassifier::new(0.8), &presbyopia(), 0.5).expect("prediction");

        assert_eq!(prediction.risk_label, RiskLabel::High);
        assert_eq!(prediction.risk_level, RiskLevel::High);
        assert_eq!(prediction.risk_score, 80.0);
        assert_eq!(
            prediction.probable_condition,
            ProbableCondition::Condition(Condition::Presbyopia)
        );
        assert_eq!(prediction.confidence_level, ConfidenceLevel::High);
        assert_eq!(prediction.condition_risk_flag, ConditionRiskFlag::HighRisk);
        assert!((prediction.per_disease_probabilities.total() - 1.0).abs() < 1e-6);
        assert_eq!(prediction.model_version.as_deref(), Some("fixed"));
    }

    #[test]
    fn low_risk_skips_condition_stage() {
        let prediction =
            predict_risk(&FixedClassifier::new(0.42), &presbyopia(), 0.5).expect("prediction");

        assert_eq!(prediction.risk_label, RiskLabel::Low);
        assert_eq!(prediction.risk_level, RiskLevel::Moderate);
        assert_eq!(prediction.probable_condition, ProbableCondition::NotApplicable);
        assert!(prediction.triggered_rules.is_empty());
        assert_eq!(prediction.confidence_level, ConfidenceLevel::Low);
        assert_eq!(
            prediction.condition_risk_flag,
            ConditionRiskFlag::NotApplicable
        );
        assert!(prediction.per_disease_probabilities.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let prediction =
            predict_risk(&FixedClassifier::new(0.5), &presbyopia(), 0.5).expect("prediction");

        assert_eq!(prediction.risk_label, RiskLabel::High);
    }

    #[test]
    fn risk_score_is_rounded_to_two_decimals() {
        let prediction =
            predict_risk(&FixedClassifier::new(0.123456), &presbyopia(), 0.5).expect("prediction");

        assert_eq!(prediction.risk_score, 12.35);
        assert_eq!(prediction.risk_level, RiskLevel::Low);
    }

    #[test]
    fn unspecified_high_risk_is_flagged_high() {
        let quiet = AssessmentInput::new()
            .with("Age", 27)
            .with("Screen_Time_Hours", 2)
            .with("Sleep_Hours", 9);

        let prediction =
            predict_risk(&FixedClassifier::new(0.9), &quiet, 0.5).expect("prediction");

        assert_eq!(
            prediction.probable_condition,
            ProbableCondition::UnspecifiedHighRisk
        );
        assert_eq!(prediction.condition_risk_flag, ConditionRiskFlag::HighRisk);
        assert!((prediction.per_disease_probabilities.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn classifier_without_feature_names_is_unavailable() {
        let mut classifier = FixedClassifier::new(0.9);
        classifier.names.clear();

        let err = predict_risk(&classifier, &presbyopia(), 0.5).expect_err("no names");
        assert!(matches!(
            err,
            RiskError::ModelUnavailable(ModelError::MissingFeatureNames)
        ));
    }

    #[test]
    fn service_surfaces_missing_model() {
        let service = RiskAssessmentService::new(
            Arc::new(ModelHandle::from_path(
                std::env::temp_dir().join("eyecare-service-missing.json"),
            )),
            DEFAULT_HIGH_RISK_THRESHOLD,
        );

        let err = service.predict(&presbyopia()).expect_err("missing model");
        assert!(matches!(err, RiskError::ModelUnavailable(_)));
    }

    #[test]
    fn prediction_serializes_with_wire_labels() {
        let prediction =
            predict_risk(&FixedClassifier::new(0.8), &presbyopia(), 0.5).expect("prediction");

        let value = serde_json::to_value(&prediction).expect("serialize");
        assert_eq!(value["risk_label"], "HIGH");
        assert_eq!(value["risk_level"], "High");
        assert_eq!(value["probable_condition"], "Presbyopia");
        assert_eq!(value["condition_risk_flag"], "High Risk");
        assert_eq!(value["note"], json!(PREDICTION_NOTE));
    }
}
