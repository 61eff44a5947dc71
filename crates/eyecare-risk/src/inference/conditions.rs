use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed taxonomy of probable conditions. Declaration order is the tie-break
/// priority: an earlier variant wins an exact score tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    Presbyopia,
    Myopia,
    #[serde(rename = "Dry Eye")]
    DryEye,
    Hyperopia,
    Astigmatism,
    #[serde(rename = "Light Sensitivity")]
    LightSensitivity,
    #[serde(rename = "Blurred Vision")]
    BlurredVision,
}

/// All conditions in priority order.
pub const CONDITIONS: [Condition; 7] = [
    Condition::Presbyopia,
    Condition::Myopia,
    Condition::DryEye,
    Condition::Hyperopia,
    Condition::Astigmatism,
    Condition::LightSensitivity,
    Condition::BlurredVision,
];

impl Condition {
    pub fn label(self) -> &'static str {
        match self {
            Condition::Presbyopia => "Presbyopia",
            Condition::Myopia => "Myopia",
            Condition::DryEye => "Dry Eye",
            Condition::Hyperopia => "Hyperopia",
            Condition::Astigmatism => "Astigmatism",
            Condition::LightSensitivity => "Light Sensitivity",
            Condition::BlurredVision => "Blurred Vision",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        CONDITIONS
            .iter()
            .copied()
            .find(|condition| condition.label() == trimmed)
    }

    /// Position in [`CONDITIONS`]; lower wins ties.
    pub fn priority(self) -> usize {
        self as usize
    }

    /// User-facing severity flag for a selected condition.
    pub fn risk_flag(self) -> ConditionRiskFlag {
        match self {
            Condition::Myopia | Condition::DryEye | Condition::Presbyopia => {
                ConditionRiskFlag::HighRisk
            }
            Condition::Astigmatism | Condition::Hyperopia => ConditionRiskFlag::ModerateRisk,
            Condition::BlurredVision | Condition::LightSensitivity => ConditionRiskFlag::LowRisk,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome label of the condition stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbableCondition {
    Condition(Condition),
    /// Risk is HIGH but no condition has trustworthy evidence.
    UnspecifiedHighRisk,
    /// The condition stage was skipped because risk is LOW.
    NotApplicable,
}

impl ProbableCondition {
    pub const UNSPECIFIED_LABEL: &'static str = "Unspecified High Risk";
    pub const NOT_APPLICABLE_LABEL: &'static str = "N/A";

    pub fn label(self) -> &'static str {
        match self {
            ProbableCondition::Condition(condition) => condition.label(),
            ProbableCondition::UnspecifiedHighRisk => Self::UNSPECIFIED_LABEL,
            ProbableCondition::NotApplicable => Self::NOT_APPLICABLE_LABEL,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            Self::UNSPECIFIED_LABEL => Some(ProbableCondition::UnspecifiedHighRisk),
            Self::NOT_APPLICABLE_LABEL => Some(ProbableCondition::NotApplicable),
            other => Condition::from_label(other).map(ProbableCondition::Condition),
        }
    }

    pub fn condition(self) -> Option<Condition> {
        match self {
            ProbableCondition::Condition(condition) => Some(condition),
            _ => None,
        }
    }

    pub fn risk_flag(self) -> ConditionRiskFlag {
        match self {
            ProbableCondition::Condition(condition) => condition.risk_flag(),
            ProbableCondition::UnspecifiedHighRisk => ConditionRiskFlag::HighRisk,
            ProbableCondition::NotApplicable => ConditionRiskFlag::NotApplicable,
        }
    }
}

impl fmt::Display for ProbableCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ProbableCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ProbableCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ProbableCondition::from_label(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown condition '{raw}'")))
    }
}

/// Severity flag surfaced next to the probable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionRiskFlag {
    #[serde(rename = "High Risk")]
    HighRisk,
    #[serde(rename = "Moderate Risk")]
    ModerateRisk,
    #[serde(rename = "Low Risk")]
    LowRisk,
    #[serde(rename = "N/A")]
    NotApplicable,
}

/// Confidence attached to a selected condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Med,
    High,
}

impl ConfidenceLevel {
    /// HIGH on score >= 3 or at least three triggered rules, MED on a score of
    /// exactly 2, LOW otherwise.
    pub fn classify(score: u32, rule_count: usize) -> Self {
        if score >= 3 || rule_count >= 3 {
            ConfidenceLevel::High
        } else if score == 2 {
            ConfidenceLevel::Med
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Med => "MED",
            ConfidenceLevel::High => "HIGH",
        }
    }
}

/// Score and rule trail for one condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionCandidate {
    #[serde(skip)]
    pub condition: Condition,
    pub score: u32,
    pub triggered_rules: Vec<String>,
}

impl ConditionCandidate {
    pub fn empty(condition: Condition) -> Self {
        Self {
            condition,
            score: 0,
            triggered_rules: Vec::new(),
        }
    }
}

/// Scores for every condition, always holding exactly one candidate per
/// entry of [`CONDITIONS`] in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionScores {
    candidates: Vec<ConditionCandidate>,
    light_proxy_available: bool,
}

impl ConditionScores {
    /// Conditions missing from `candidates` score zero; a later duplicate
    /// replaces an earlier one.
    pub fn new(candidates: Vec<ConditionCandidate>, light_proxy_available: bool) -> Self {
        let mut slots: Vec<ConditionCandidate> = CONDITIONS
            .iter()
            .copied()
            .map(ConditionCandidate::empty)
            .collect();
        for candidate in candidates {
            let index = candidate.condition.priority();
            slots[index] = candidate;
        }

        Self {
            candidates: slots,
            light_proxy_available,
        }
    }

    pub fn get(&self, condition: Condition) -> &ConditionCandidate {
        &self.candidates[condition.priority()]
    }

    pub fn score(&self, condition: Condition) -> u32 {
        self.get(condition).score
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConditionCandidate> {
        self.candidates.iter()
    }

    /// Whether any light-sensitivity proxy was present in the input.
    pub fn light_proxy_available(&self) -> bool {
        self.light_proxy_available
    }
}

impl Serialize for ConditionScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.candidates.len()))?;
        for candidate in &self.candidates {
            map.serialize_entry(candidate.condition.label(), candidate)?;
        }
        map.end()
    }
}

/// Result of the condition stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub probable_condition: ProbableCondition,
    pub triggered_rules: Vec<String>,
    pub confidence_level: ConfidenceLevel,
}

impl RuleResult {
    pub fn unspecified() -> Self {
        Self {
            probable_condition: ProbableCondition::UnspecifiedHighRisk,
            triggered_rules: Vec::new(),
            confidence_level: ConfidenceLevel::Low,
        }
    }

    pub fn not_applicable() -> Self {
        Self {
            probable_condition: ProbableCondition::NotApplicable,
            triggered_rules: Vec::new(),
            confidence_level: ConfidenceLevel::Low,
        }
    }
}
