use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;

use super::recommendations::{recommendations, Recommendation};
use super::service::{RiskAssessmentService, RiskPrediction};
use crate::error::AppError;
use crate::inference::features::AssessmentInput;
use crate::inference::legacy::{history_view, StoredAssessment};
use crate::inference::policy::infer_probable_condition;
use crate::inference::rules::score_conditions;

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    #[serde(flatten)]
    pub prediction: RiskPrediction,
    pub recommendations: Vec<Recommendation>,
}

/// Router exposing prediction, the rule engine and history recomputation.
pub fn risk_router(service: Arc<RiskAssessmentService>) -> Router {
    Router::new()
        .route("/api/v1/risk/predict", post(predict_handler))
        .route("/api/v1/conditions/score", post(score_handler))
        .route("/api/v1/conditions/infer", post(infer_handler))
        .route("/api/v1/assessments/history", post(history_handler))
        .with_state(service)
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<RiskAssessmentService>>,
    axum::Json(input): axum::Json<AssessmentInput>,
) -> Response {
    match service.predict(&input) {
        Ok(prediction) => {
            let recommendations = recommendations(&prediction, &input);
            let payload = PredictionResponse {
                prediction,
                recommendations,
            };
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn score_handler(axum::Json(input): axum::Json<AssessmentInput>) -> Response {
    (StatusCode::OK, axum::Json(score_conditions(&input))).into_response()
}

pub(crate) async fn infer_handler(axum::Json(input): axum::Json<AssessmentInput>) -> Response {
    (StatusCode::OK, axum::Json(infer_probable_condition(&input))).into_response()
}

pub(crate) async fn history_handler(
    axum::Json(records): axum::Json<Vec<StoredAssessment>>,
) -> Response {
    (StatusCode::OK, axum::Json(history_view(records))).into_response()
}
