use super::conditions::{
    Condition, ConditionCandidate, ConditionScores, ConfidenceLevel, ProbableCondition,
    RuleResult, CONDITIONS,
};
use super::features::AssessmentInput;
use super::rules::score_conditions;
use tracing::debug;

/// Score the input and pick one probable condition.
pub fn infer_probable_condition(input: &AssessmentInput) -> RuleResult {
    select_condition(&score_conditions(input))
}

/// Pick the highest-scoring candidate, ties going to the earlier entry of
/// [`CONDITIONS`], then apply the weak-evidence overrides.
pub fn select_condition(scores: &ConditionScores) -> RuleResult {
    let leader = leading_candidate(scores);

    if let Some(reason) = override_reason(leader, scores) {
        debug!(
            condition = leader.condition.label(),
            score = leader.score,
            reason,
            "falling back to unspecified high risk"
        );
        return RuleResult::unspecified();
    }

    RuleResult {
        probable_condition: ProbableCondition::Condition(leader.condition),
        triggered_rules: leader.triggered_rules.clone(),
        confidence_level: ConfidenceLevel::classify(leader.score, leader.triggered_rules.len()),
    }
}

fn leading_candidate(scores: &ConditionScores) -> &ConditionCandidate {
    let mut leader = scores.get(CONDITIONS[0]);
    for candidate in scores.iter().skip(1) {
        if candidate.score > leader.score {
            leader = candidate;
        }
    }
    leader
}

fn override_reason(leader: &ConditionCandidate, scores: &ConditionScores) -> Option<&'static str> {
    if leader.score == 0 {
        return Some("no condition scored");
    }

    match leader.condition {
        Condition::LightSensitivity if !scores.light_proxy_available() => {
            Some("no light-sensitivity proxy in input")
        }
        Condition::LightSensitivity | Condition::BlurredVision
            if leader.triggered_rules.is_empty() =>
        {
            Some("weak-proxy condition without triggered rules")
        }
        _ => None,
    }
}
