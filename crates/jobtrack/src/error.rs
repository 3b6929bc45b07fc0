use crate::config::ConfigError;
use crate::jobs::{MirrorError, RepositoryError, StoreError};
use crate::remote::{ApiError, SessionError};
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
    Api(ApiError),
    Session(SessionError),
    Store(StoreError),
    Mirror(MirrorError),
    Export(csv::Error),
    Usage(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Api(err) => write!(f, "api error: {}", err),
            AppError::Session(err) => write!(f, "session error: {}", err),
            AppError::Store(err) => write!(f, "{}", err),
            AppError::Mirror(err) => write!(f, "mirror error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Usage(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Api(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Mirror(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Usage(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Usage(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Store(StoreError::Repository(RepositoryError::Unauthorized(_)))
            | AppError::Api(ApiError::NotSignedIn) => StatusCode::UNAUTHORIZED,
            AppError::Store(StoreError::Repository(_)) | AppError::Api(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Session(_)
            | AppError::Mirror(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<ApiError> for AppError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<MirrorError> for AppError {
    fn from(value: MirrorError) -> Self {
        Self::Mirror(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{FieldError, ValidationErrors};

    #[test]
    fn store_errors_map_to_client_statuses() {
        let invalid = AppError::from(StoreError::from(ValidationErrors(vec![
            FieldError::MissingCompany,
        ])));
        assert_eq!(
            invalid.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let missing = AppError::from(StoreError::from(RepositoryError::NotFound));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let down = AppError::from(StoreError::from(RepositoryError::Unavailable(
            "timeout".to_string(),
        )));
        assert_eq!(down.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn usage_errors_display_their_message() {
        let err = AppError::Usage("pass --id".to_string());
        assert_eq!(err.to_string(), "pass --id");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
