//! Two-stage eye-health risk engine.
//!
//! Stage one asks an opaque [`risk::RiskClassifier`] for the overall risk
//! probability of an assessment. Only when that risk is HIGH does stage two
//! run the deterministic rule engine in [`inference`], which narrows the
//! finding to one probable condition with an auditable confidence level and
//! a per-condition probability distribution.

pub mod config;
pub mod error;
pub mod inference;
pub mod intake;
pub mod risk;
pub mod telemetry;

pub use inference::{
    distribute_probabilities, infer_probable_condition, recompute_legacy_probabilities,
    score_conditions, AssessmentInput, Condition, ConditionProbabilities, ConditionScores,
    ConfidenceLevel, ProbableCondition, RuleResult, CONDITIONS,
};
pub use risk::{predict_risk, ModelHandle, RiskAssessmentService, RiskClassifier, RiskPrediction};
