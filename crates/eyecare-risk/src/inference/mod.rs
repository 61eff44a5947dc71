//! Rule-based condition stage.
//!
//! Everything here is a pure function of the submitted assessment: the
//! feature normalizer resolves aliased keys, the rule table scores the seven
//! conditions, the selector picks one with its confidence, and the
//! distributor spreads the classifier's risk probability across conditions.
//! Stored records from before proportional redistribution are replayed
//! through the same path by [`legacy`].

pub mod conditions;
pub mod distribution;
pub mod features;
pub mod legacy;
pub(crate) mod policy;
pub(crate) mod rules;

#[cfg(test)]
mod tests;

pub use conditions::{
    Condition, ConditionCandidate, ConditionRiskFlag, ConditionScores, ConfidenceLevel,
    ProbableCondition, RuleResult, CONDITIONS,
};
pub use distribution::{distribute_probabilities, ConditionProbabilities, OTHER_UNSPECIFIED};
pub use features::{
    as_bool01, as_float, as_int, AssessmentInput, Feature, FeatureNormalizer, FeatureRow,
};
pub use legacy::{
    history_view, recompute_legacy_probabilities, AssessmentHistoryEntry, StoredAssessment,
    StoredRecordError,
};
pub use policy::{infer_probable_condition, select_condition};
pub use rules::score_conditions;
