use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw assessment as submitted: feature name to loosely typed value.
///
/// No schema is enforced; unknown keys are carried along and ignored by the
/// rule engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentInput(BTreeMap<String, Value>);

impl AssessmentInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for AssessmentInput {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self(value)
    }
}

impl From<serde_json::Map<String, Value>> for AssessmentInput {
    fn from(value: serde_json::Map<String, Value>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for AssessmentInput {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Canonical features understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Age,
    Gender,
    Bmi,
    ScreenTimeHours,
    SleepHours,
    DietScore,
    WaterIntakeLiters,
    GlassesUsage,
    FamilyHistory,
    OutdoorExposure,
    MigraineHistory,
    UvExposure,
    NoSunglasses,
    AcExposure,
    ContactLensUse,
    PreviousEyeSurgery,
    PhysicalActivityLevel,
    ReadingHours,
    StudyHours,
    Smoker,
    AlcoholUse,
    Diabetes,
    Hypertension,
}

/// How a feature's value is coerced before it reaches the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Numeric,
    Flag,
    Category,
    ActivityLevel,
}

pub const FEATURES: [Feature; 23] = [
    Feature::Age,
    Feature::Gender,
    Feature::Bmi,
    Feature::ScreenTimeHours,
    Feature::SleepHours,
    Feature::DietScore,
    Feature::WaterIntakeLiters,
    Feature::GlassesUsage,
    Feature::FamilyHistory,
    Feature::OutdoorExposure,
    Feature::MigraineHistory,
    Feature::UvExposure,
    Feature::NoSunglasses,
    Feature::AcExposure,
    Feature::ContactLensUse,
    Feature::PreviousEyeSurgery,
    Feature::PhysicalActivityLevel,
    Feature::ReadingHours,
    Feature::StudyHours,
    Feature::Smoker,
    Feature::AlcoholUse,
    Feature::Diabetes,
    Feature::Hypertension,
];

impl Feature {
    /// Dataset column name.
    pub fn column(self) -> &'static str {
        match self {
            Feature::Age => "Age",
            Feature::Gender => "Gender",
            Feature::Bmi => "BMI",
            Feature::ScreenTimeHours => "Screen_Time_Hours",
            Feature::SleepHours => "Sleep_Hours",
            Feature::DietScore => "Diet_Score",
            Feature::WaterIntakeLiters => "Water_Intake_Liters",
            Feature::GlassesUsage => "Glasses_Usage",
            Feature::FamilyHistory => "Family_History_Eye_Disease",
            Feature::OutdoorExposure => "Outdoor_Exposure_Hours",
            Feature::MigraineHistory => "Migraine_History",
            Feature::UvExposure => "UV_Exposure_Hours",
            Feature::NoSunglasses => "No_Sunglasses",
            Feature::AcExposure => "AC_Exposure",
            Feature::ContactLensUse => "Contact_Lens_Use",
            Feature::PreviousEyeSurgery => "Previous_Eye_Surgery",
            Feature::PhysicalActivityLevel => "Physical_Activity_Level",
            Feature::ReadingHours => "Reading_Hours",
            Feature::StudyHours => "Study_Hours",
            Feature::Smoker => "Smoker",
            Feature::AlcoholUse => "Alcohol_Use",
            Feature::Diabetes => "Diabetes",
            Feature::Hypertension => "Hypertension",
        }
    }

    /// Accepted spellings, tried in order; the first present one wins.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Feature::OutdoorExposure => &[
                "Outdoor_Time_Hours",
                "Outdoor_Exposure_Hours",
                "Outdoor_Exposure",
            ],
            Feature::FamilyHistory => &["Family_History", "Family_History_Eye_Disease"],
            // Outdoor exposure stands in for UV when no UV reading is given.
            Feature::UvExposure => &["UV_Exposure_Hours", "Outdoor_Exposure_Hours"],
            Feature::Age => &["Age"],
            Feature::Gender => &["Gender"],
            Feature::Bmi => &["BMI"],
            Feature::ScreenTimeHours => &["Screen_Time_Hours"],
            Feature::SleepHours => &["Sleep_Hours"],
            Feature::DietScore => &["Diet_Score"],
            Feature::WaterIntakeLiters => &["Water_Intake_Liters"],
            Feature::GlassesUsage => &["Glasses_Usage"],
            Feature::MigraineHistory => &["Migraine_History"],
            Feature::NoSunglasses => &["No_Sunglasses"],
            Feature::AcExposure => &["AC_Exposure"],
            Feature::ContactLensUse => &["Contact_Lens_Use"],
            Feature::PreviousEyeSurgery => &["Previous_Eye_Surgery"],
            Feature::PhysicalActivityLevel => &["Physical_Activity_Level"],
            Feature::ReadingHours => &["Reading_Hours"],
            Feature::StudyHours => &["Study_Hours"],
            Feature::Smoker => &["Smoker"],
            Feature::AlcoholUse => &["Alcohol_Use"],
            Feature::Diabetes => &["Diabetes"],
            Feature::Hypertension => &["Hypertension"],
        }
    }

    pub fn kind(self) -> FeatureKind {
        match self {
            Feature::GlassesUsage
            | Feature::FamilyHistory
            | Feature::MigraineHistory
            | Feature::NoSunglasses
            | Feature::AcExposure
            | Feature::ContactLensUse
            | Feature::PreviousEyeSurgery
            | Feature::Smoker
            | Feature::AlcoholUse
            | Feature::Diabetes
            | Feature::Hypertension => FeatureKind::Flag,
            Feature::Gender => FeatureKind::Category,
            Feature::PhysicalActivityLevel => FeatureKind::ActivityLevel,
            _ => FeatureKind::Numeric,
        }
    }

    /// Feature whose dataset column matches `name`, ignoring ASCII case.
    pub fn from_column(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        FEATURES
            .iter()
            .copied()
            .find(|feature| feature.column().eq_ignore_ascii_case(trimmed))
    }
}

/// Columns that must never be forwarded to the classifier.
const EXCLUDED_COLUMNS: [&str; 1] = ["Eye_Disease_Risk"];

/// A feature value together with the alias it was found under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFeature<'a> {
    pub key: &'static str,
    pub value: &'a Value,
}

/// Classifier input aligned to the classifier's own ordered column set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureRow {
    cells: Vec<(String, Value)>,
}

impl FeatureRow {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).map(|(_, value)| value)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Null-safe view over an [`AssessmentInput`] keyed by canonical features.
#[derive(Debug, Clone, Copy)]
pub struct FeatureNormalizer<'a> {
    input: &'a AssessmentInput,
}

impl<'a> FeatureNormalizer<'a> {
    pub fn new(input: &'a AssessmentInput) -> Self {
        Self { input }
    }

    /// First non-null, non-empty value among the feature's aliases. Each alias
    /// matches its exact spelling first and then any case variant of it, so
    /// snake_case keys resolve as well.
    pub fn resolve(&self, feature: Feature) -> Option<ResolvedFeature<'a>> {
        feature.aliases().iter().find_map(|&alias| {
            self.lookup(alias)
                .map(|value| ResolvedFeature { key: alias, value })
        })
    }

    pub fn is_present(&self, feature: Feature) -> bool {
        self.resolve(feature).is_some()
    }

    pub fn float(&self, feature: Feature) -> Option<f64> {
        self.resolve(feature).and_then(|resolved| as_float(resolved.value))
    }

    pub fn int(&self, feature: Feature) -> Option<i64> {
        self.resolve(feature).and_then(|resolved| as_int(resolved.value))
    }

    pub fn flag(&self, feature: Feature) -> Option<u8> {
        self.resolve(feature)
            .and_then(|resolved| as_bool01(resolved.value))
    }

    /// One cell per expected column, in order. Missing or uncoercible values
    /// become null so the classifier applies its own imputation.
    pub fn classifier_row(&self, columns: &[String]) -> FeatureRow {
        let cells = columns
            .iter()
            .map(|column| (column.clone(), self.classifier_value(column)))
            .collect();
        FeatureRow { cells }
    }

    fn classifier_value(&self, column: &str) -> Value {
        if EXCLUDED_COLUMNS
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(column.trim()))
        {
            return Value::Null;
        }

        let Some(feature) = Feature::from_column(column) else {
            return self.lookup(column.trim()).cloned().unwrap_or(Value::Null);
        };

        let Some(resolved) = self.resolve(feature) else {
            return Value::Null;
        };

        match feature.kind() {
            FeatureKind::Numeric => as_float(resolved.value)
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FeatureKind::Flag => as_bool01(resolved.value)
                .map(Value::from)
                .unwrap_or(Value::Null),
            FeatureKind::Category => normalize_gender(resolved.value),
            FeatureKind::ActivityLevel => activity_level(resolved.value)
                .map(Value::from)
                .unwrap_or(Value::Null),
        }
    }

    fn lookup(&self, key: &str) -> Option<&'a Value> {
        if let Some(value) = self.input.get(key).filter(|value| is_present(value)) {
            return Some(value);
        }

        self.input
            .iter()
            .find(|(candidate, value)| {
                candidate.trim().eq_ignore_ascii_case(key) && is_present(value)
            })
            .map(|(_, value)| value)
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    }
}

/// Numeric reading of a loosely typed value. Booleans read as 0/1.
pub fn as_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

/// Integer reading, truncating toward zero.
pub fn as_int(value: &Value) -> Option<i64> {
    as_float(value).map(|number| number.trunc() as i64)
}

/// 0/1 reading of a boolean-like value: 1/0, "1"/"0", true/false,
/// "true"/"false" and "yes"/"no". Any other non-zero number reads as 1.
pub fn as_bool01(value: &Value) -> Option<u8> {
    if let Value::String(text) = value {
        match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => return Some(1),
            "no" | "n" | "false" => return Some(0),
            _ => {}
        }
    }
    as_float(value).map(|number| u8::from(number != 0.0))
}

fn normalize_gender(value: &Value) -> Value {
    match value {
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Value::from("Male"),
            "female" | "f" => Value::from("Female"),
            _ => Value::from(text.trim()),
        },
        other => other.clone(),
    }
}

/// Activity level on the dataset's 1-4 scale.
fn activity_level(value: &Value) -> Option<i64> {
    if let Value::String(text) = value {
        match text.trim().to_ascii_lowercase().as_str() {
            "low" | "light" => return Some(1),
            "moderate" | "medium" => return Some(2),
            "high" => return Some(3),
            "very high" => return Some(4),
            _ => {}
        }
    }
    as_int(value)
}
