use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::conditions::{Condition, ConditionScores, CONDITIONS};

/// Key receiving the leftover mass when no alternative condition has evidence.
pub const OTHER_UNSPECIFIED: &str = "Other / Unspecified";

const TOLERANCE: f64 = 1e-6;

/// Per-condition probability map handed to the UI and persisted by callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionProbabilities(BTreeMap<String, f64>);

impl ConditionProbabilities {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn condition(&self, condition: Condition) -> f64 {
        self.get(condition.label()).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(key, value)| (key.as_str(), *value))
    }

    /// A record stored before proportional redistribution existed: the
    /// predicted key holds 1.0, every other key 0.0, and there is no
    /// [`OTHER_UNSPECIFIED`] key.
    pub fn is_legacy_one_hot(&self, predicted: &str) -> bool {
        let Some(predicted_value) = self.get(predicted) else {
            return false;
        };
        if (predicted_value - 1.0).abs() > TOLERANCE {
            return false;
        }

        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != predicted)
            .all(|(key, value)| key != OTHER_UNSPECIFIED && value.abs() <= TOLERANCE)
    }

    fn set(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value);
    }
}

impl From<BTreeMap<String, f64>> for ConditionProbabilities {
    fn from(value: BTreeMap<String, f64>) -> Self {
        Self(value)
    }
}

fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Spread one unit of probability across the conditions.
///
/// The predicted condition receives the clamped risk probability. The
/// remainder goes to the other conditions with a positive score in
/// proportion to their scores, or entirely to [`OTHER_UNSPECIFIED`] when none
/// has evidence. With no predicted condition (unspecified) the predicted
/// mass itself is also booked under [`OTHER_UNSPECIFIED`], so the map still
/// sums to one.
pub fn distribute_probabilities(
    risk_probability: f64,
    scores: &ConditionScores,
    predicted: Option<Condition>,
) -> ConditionProbabilities {
    let predicted_p = clamp_probability(risk_probability);
    let remainder = (1.0 - predicted_p).max(0.0);

    let mut distribution = ConditionProbabilities::default();
    for condition in CONDITIONS {
        distribution.set(condition.label(), 0.0);
    }
    let mut unassigned = 0.0;
    match predicted {
        Some(condition) => distribution.set(condition.label(), predicted_p),
        None => unassigned += predicted_p,
    }

    let alternatives: Vec<(Condition, u32)> = CONDITIONS
        .iter()
        .copied()
        .filter(|condition| Some(*condition) != predicted)
        .map(|condition| (condition, scores.score(condition)))
        .filter(|(_, score)| *score > 0)
        .collect();
    let alternative_total: u32 = alternatives.iter().map(|(_, score)| score).sum();

    if remainder > 0.0 && alternative_total > 0 {
        for (condition, score) in alternatives {
            let share = remainder * f64::from(score) / f64::from(alternative_total);
            distribution.set(condition.label(), share);
        }
    } else {
        unassigned += remainder;
    }

    if unassigned > 0.0 {
        distribution.set(OTHER_UNSPECIFIED, unassigned);
    }

    distribution
}
