use super::conditions::{Condition, ConditionCandidate, ConditionScores, CONDITIONS};
use super::features::{as_bool01, as_float, AssessmentInput, Feature, FeatureNormalizer};

/// Threshold test against one or two normalized features.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Predicate {
    AtLeast(Feature, f64),
    AtMost(Feature, f64),
    Flag(Feature),
    Both(&'static Predicate, &'static Predicate),
}

impl Predicate {
    /// Description of the satisfied rule, or `None` when the rule does not
    /// fire or a feature is absent or unreadable.
    pub(crate) fn evaluate(&self, features: &FeatureNormalizer<'_>) -> Option<String> {
        match *self {
            Predicate::AtLeast(feature, threshold) => {
                let resolved = features.resolve(feature)?;
                let value = as_float(resolved.value)?;
                (value >= threshold).then(|| format!("{} >= {}", resolved.key, threshold))
            }
            Predicate::AtMost(feature, threshold) => {
                let resolved = features.resolve(feature)?;
                let value = as_float(resolved.value)?;
                (value <= threshold).then(|| format!("{} <= {}", resolved.key, threshold))
            }
            Predicate::Flag(feature) => {
                let resolved = features.resolve(feature)?;
                (as_bool01(resolved.value)? == 1).then(|| format!("{} == 1", resolved.key))
            }
            Predicate::Both(left, right) => {
                let left = left.evaluate(features)?;
                let right = right.evaluate(features)?;
                Some(format!("{left} AND {right}"))
            }
        }
    }
}

/// Rules sharing a cap group add their weight at most once per condition,
/// although every satisfied rule is still listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CapGroup {
    DryEyeEnvironment,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Rule {
    pub(crate) condition: Condition,
    pub(crate) predicate: Predicate,
    pub(crate) weight: u32,
    pub(crate) cap: Option<CapGroup>,
}

const fn rule(condition: Condition, predicate: Predicate, weight: u32) -> Rule {
    Rule {
        condition,
        predicate,
        weight,
        cap: None,
    }
}

const fn capped(condition: Condition, predicate: Predicate, group: CapGroup) -> Rule {
    Rule {
        condition,
        predicate,
        weight: 1,
        cap: Some(group),
    }
}

const SCREEN_TIME_AT_LEAST_8: Predicate = Predicate::AtLeast(Feature::ScreenTimeHours, 8.0);
const SLEEP_AT_MOST_5: Predicate = Predicate::AtMost(Feature::SleepHours, 5.0);

/// The rule table. Within a condition, rules are evaluated and reported in
/// table order.
pub(crate) const RULES: &[Rule] = &[
    rule(Condition::Presbyopia, Predicate::AtLeast(Feature::Age, 40.0), 2),
    rule(Condition::Presbyopia, Predicate::Flag(Feature::GlassesUsage), 1),
    rule(Condition::Presbyopia, Predicate::AtLeast(Feature::ReadingHours, 2.0), 1),
    rule(Condition::Presbyopia, Predicate::AtLeast(Feature::StudyHours, 3.0), 1),
    rule(Condition::Myopia, Predicate::AtMost(Feature::Age, 25.0), 2),
    rule(Condition::Myopia, Predicate::AtLeast(Feature::ScreenTimeHours, 6.0), 1),
    rule(Condition::Myopia, Predicate::AtMost(Feature::OutdoorExposure, 1.5), 1),
    rule(Condition::DryEye, Predicate::AtLeast(Feature::ScreenTimeHours, 6.0), 1),
    rule(Condition::DryEye, Predicate::AtMost(Feature::SleepHours, 6.0), 1),
    capped(
        Condition::DryEye,
        Predicate::AtMost(Feature::WaterIntakeLiters, 1.5),
        CapGroup::DryEyeEnvironment,
    ),
    capped(
        Condition::DryEye,
        Predicate::Flag(Feature::AcExposure),
        CapGroup::DryEyeEnvironment,
    ),
    capped(
        Condition::DryEye,
        Predicate::Flag(Feature::ContactLensUse),
        CapGroup::DryEyeEnvironment,
    ),
    rule(Condition::Hyperopia, Predicate::AtLeast(Feature::Age, 30.0), 1),
    rule(Condition::Hyperopia, Predicate::Flag(Feature::GlassesUsage), 1),
    rule(Condition::Hyperopia, Predicate::AtMost(Feature::OutdoorExposure, 1.5), 1),
    rule(Condition::Astigmatism, Predicate::Flag(Feature::GlassesUsage), 1),
    rule(Condition::Astigmatism, Predicate::AtLeast(Feature::ScreenTimeHours, 5.0), 1),
    rule(Condition::Astigmatism, Predicate::AtLeast(Feature::StudyHours, 4.0), 1),
    rule(Condition::Astigmatism, Predicate::Flag(Feature::FamilyHistory), 1),
    rule(Condition::LightSensitivity, Predicate::Flag(Feature::MigraineHistory), 1),
    rule(Condition::LightSensitivity, Predicate::AtLeast(Feature::UvExposure, 2.0), 1),
    rule(Condition::LightSensitivity, Predicate::Flag(Feature::NoSunglasses), 1),
    rule(
        Condition::BlurredVision,
        Predicate::Both(&SCREEN_TIME_AT_LEAST_8, &SLEEP_AT_MOST_5),
        1,
    ),
];

/// Conditions evaluated only when at least one of the listed proxies is
/// present in the input at all, whether or not it triggers.
pub(crate) const GATES: &[(Condition, &[Feature])] = &[(
    Condition::LightSensitivity,
    &[
        Feature::MigraineHistory,
        Feature::UvExposure,
        Feature::NoSunglasses,
    ],
)];

fn gate_open(condition: Condition, features: &FeatureNormalizer<'_>) -> bool {
    GATES
        .iter()
        .filter(|(gated, _)| *gated == condition)
        .all(|(_, proxies)| proxies.iter().any(|proxy| features.is_present(*proxy)))
}

/// Score every condition independently against the rule table.
pub fn score_conditions(input: &AssessmentInput) -> ConditionScores {
    score_features(&FeatureNormalizer::new(input))
}

pub(crate) fn score_features(features: &FeatureNormalizer<'_>) -> ConditionScores {
    let candidates = CONDITIONS
        .iter()
        .map(|condition| score_condition(*condition, features))
        .collect();

    ConditionScores::new(candidates, gate_open(Condition::LightSensitivity, features))
}

fn score_condition(condition: Condition, features: &FeatureNormalizer<'_>) -> ConditionCandidate {
    let mut candidate = ConditionCandidate::empty(condition);
    if !gate_open(condition, features) {
        return candidate;
    }

    let mut capped_groups: Vec<CapGroup> = Vec::new();
    for rule in RULES.iter().filter(|rule| rule.condition == condition) {
        let Some(description) = rule.predicate.evaluate(features) else {
            continue;
        };

        candidate.triggered_rules.push(description);
        match rule.cap {
            None => candidate.score += rule.weight,
            Some(group) if !capped_groups.contains(&group) => {
                capped_groups.push(group);
                candidate.score += rule.weight;
            }
            Some(_) => {}
        }
    }

    candidate
}
