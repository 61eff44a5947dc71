use serde::{Deserialize, Serialize};

use super::service::{RiskLevel, RiskPrediction};
use crate::inference::features::{AssessmentInput, Feature, FeatureNormalizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationCategory {
    Medical,
    Prevention,
    Lifestyle,
    Nutrition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub priority: RecommendationPriority,
    pub category: RecommendationCategory,
}

impl Recommendation {
    fn new(
        text: &str,
        priority: RecommendationPriority,
        category: RecommendationCategory,
    ) -> Self {
        Self {
            text: text.to_string(),
            priority,
            category,
        }
    }
}

/// Follow-up advice: one medical item by risk level, then lifestyle items
/// for the habits present in the assessment.
pub fn recommendations(prediction: &RiskPrediction, input: &AssessmentInput) -> Vec<Recommendation> {
    use RecommendationCategory::*;
    use RecommendationPriority as Priority;

    let features = FeatureNormalizer::new(input);
    let mut items = vec![match prediction.risk_level {
        RiskLevel::High => Recommendation::new(
            "Schedule urgent eye exam within 1-3 months",
            Priority::High,
            Medical,
        ),
        RiskLevel::Moderate => Recommendation::new(
            "Schedule eye check-up within 3-6 months",
            Priority::Medium,
            Medical,
        ),
        RiskLevel::Low => Recommendation::new(
            "Maintain regular eye check-ups every 12 months",
            Priority::Low,
            Prevention,
        ),
    }];

    if features.float(Feature::ScreenTimeHours).unwrap_or(0.0) > 6.0 {
        items.push(Recommendation::new(
            "Reduce screen time and follow 20-20-20 rule",
            Priority::High,
            Lifestyle,
        ));
    }
    if features.float(Feature::SleepHours).unwrap_or(7.0) < 6.0 {
        items.push(Recommendation::new(
            "Improve sleep to 7-9 hours per night",
            Priority::High,
            Lifestyle,
        ));
    }
    if features.flag(Feature::Smoker) == Some(1) {
        items.push(Recommendation::new(
            "Quit smoking to reduce eye disease risk",
            Priority::High,
            Lifestyle,
        ));
    }
    if features.float(Feature::WaterIntakeLiters).unwrap_or(0.0) < 2.0 {
        items.push(Recommendation::new(
            "Increase water intake to 6-8 glasses daily",
            Priority::Medium,
            Nutrition,
        ));
    }

    items
}
