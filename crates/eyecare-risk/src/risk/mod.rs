//! Stage one: the risk classifier, its artifact cache, and the composed
//! two-stage prediction.

pub mod handle;
pub mod model;
pub mod recommendations;
pub mod router;
pub mod service;

pub use handle::ModelHandle;
pub use model::{LogisticRiskModel, ModelError, RiskClassifier};
pub use recommendations::{
    recommendations, Recommendation, RecommendationCategory, RecommendationPriority,
};
pub use router::{risk_router, PredictionResponse};
pub use service::{
    predict_risk, RiskAssessmentService, RiskError, RiskLabel, RiskLevel, RiskPrediction,
    DEFAULT_HIGH_RISK_THRESHOLD, PREDICTION_NOTE,
};
