use crate::config::ConfigError;
use crate::intake::AssessmentImportError;
use crate::risk::RiskError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Prediction(RiskError),
    Intake(AssessmentImportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Prediction(err) => write!(f, "prediction error: {}", err),
            AppError::Intake(err) => write!(f, "intake error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Prediction(err) => Some(err),
            AppError::Intake(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Prediction(RiskError::ModelUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Intake(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RiskError> for AppError {
    fn from(value: RiskError) -> Self {
        Self::Prediction(value)
    }
}

impl From<AssessmentImportError> for AppError {
    fn from(value: AssessmentImportError) -> Self {
        Self::Intake(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::ModelError;

    #[test]
    fn unavailable_model_maps_to_service_unavailable() {
        let error = AppError::from(RiskError::ModelUnavailable(ModelError::MissingFeatureNames));

        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn inference_failures_are_internal_errors() {
        let error = AppError::from(RiskError::Inference(ModelError::RowShape {
            expected: 3,
            actual: 1,
        }));

        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn intake_errors_are_bad_requests() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad upload");
        let error = AppError::from(AssessmentImportError::Io(io));

        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
