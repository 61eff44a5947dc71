use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::conditions::Condition;
use super::distribution::{distribute_probabilities, ConditionProbabilities};
use super::features::{as_float, AssessmentInput};
use super::rules::score_conditions;

/// Regenerate the probability view of a stored record from its raw
/// assessment data, using `confidence_score` (0-100) as the predicted
/// condition's weight.
pub fn recompute_legacy_probabilities(
    assessment_data: &AssessmentInput,
    predicted_disease: &str,
    confidence_score: f64,
) -> ConditionProbabilities {
    let scores = score_conditions(assessment_data);
    distribute_probabilities(
        confidence_score / 100.0,
        &scores,
        Condition::from_label(predicted_disease),
    )
}

#[derive(Debug, Error)]
pub enum StoredRecordError {
    #[error("stored {column} is not valid JSON: {source}")]
    MalformedJson {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored {column} is not a JSON object")]
    NotAnObject { column: &'static str },
}

/// A previously persisted assessment result as read back from storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredAssessment {
    #[serde(default)]
    pub assessment_id: Option<String>,
    #[serde(default)]
    pub predicted_disease: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub assessment_data: Option<Value>,
    #[serde(default)]
    pub per_disease_scores: Option<Value>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub assessed_at: Option<NaiveDateTime>,
}

/// A stored record plus its derived probability view.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentHistoryEntry {
    #[serde(flatten)]
    pub record: StoredAssessment,
    pub disease_probabilities: ConditionProbabilities,
    pub recomputed: bool,
}

impl StoredAssessment {
    /// Derived probability map. Legacy one-hot records are recomputed; any
    /// unreadable column yields an empty map.
    pub fn disease_probabilities(&self) -> ConditionProbabilities {
        self.derive().0
    }

    fn derive(&self) -> (ConditionProbabilities, bool) {
        match self.try_derive() {
            Ok(derived) => derived,
            Err(err) => {
                warn!(
                    assessment_id = self.assessment_id.as_deref().unwrap_or("unknown"),
                    error = %err,
                    "could not derive disease probabilities for stored assessment"
                );
                (ConditionProbabilities::default(), false)
            }
        }
    }

    fn try_derive(&self) -> Result<(ConditionProbabilities, bool), StoredRecordError> {
        let stored = stored_probabilities(self.per_disease_scores.as_ref())?;
        let predicted = self.predicted_disease.as_deref().unwrap_or_default();

        if !stored.is_legacy_one_hot(predicted) {
            return Ok((stored, false));
        }

        let data = json_object("assessment_data", self.assessment_data.as_ref())?;
        let input = AssessmentInput::from(data.unwrap_or_default());
        let confidence = self.confidence_score.unwrap_or(0.0);
        debug!(
            assessment_id = self.assessment_id.as_deref().unwrap_or("unknown"),
            predicted, confidence, "recomputing legacy one-hot probabilities"
        );

        Ok((
            recompute_legacy_probabilities(&input, predicted, confidence),
            true,
        ))
    }
}

/// Attach derived probabilities to each record. A failing record gets an
/// empty map and never affects the others.
pub fn history_view(records: Vec<StoredAssessment>) -> Vec<AssessmentHistoryEntry> {
    records
        .into_iter()
        .map(|record| {
            let (disease_probabilities, recomputed) = record.derive();
            AssessmentHistoryEntry {
                record,
                disease_probabilities,
                recomputed,
            }
        })
        .collect()
}

fn json_object(
    column: &'static str,
    value: Option<&Value>,
) -> Result<Option<serde_json::Map<String, Value>>, StoredRecordError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(None),
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
            .map_err(|source| StoredRecordError::MalformedJson { column, source })?,
        Some(other) => other.clone(),
    };

    match parsed {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        _ => Err(StoredRecordError::NotAnObject { column }),
    }
}

fn stored_probabilities(value: Option<&Value>) -> Result<ConditionProbabilities, StoredRecordError> {
    let Some(map) = json_object("per_disease_scores", value)? else {
        return Ok(ConditionProbabilities::default());
    };

    let numeric: BTreeMap<String, f64> = map
        .iter()
        .filter_map(|(key, value)| as_float(value).map(|number| (key.clone(), number)))
        .collect();
    Ok(ConditionProbabilities::from(numeric))
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_datetime))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
pub(crate) fn parse_datetime_for_tests(value: &str) -> Option<NaiveDateTime> {
    parse_datetime(value)
}
