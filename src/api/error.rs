use std::any::Any;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{ErrorCode, StorageError};
use crate::services::PlanGenerationError;

/// Error returned by every handler: `{ message, error_code, missing_fields? }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_code: ErrorCode,
    pub message: String,
    pub missing_fields: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    error_code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_fields: Option<&'a [String]>,
}

impl ApiError {
    pub fn new(status: StatusCode, error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code,
            message: message.into(),
            missing_fields: None,
        }
    }

    pub fn with_missing_fields(mut self, missing_fields: Vec<String>) -> Self {
        self.missing_fields = Some(missing_fields);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest, message)
    }

    pub fn plan_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::PlanNotFound, "Training plan not found")
    }

    pub fn profile_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::ProfileNotFound, "User profile not found")
    }

    pub fn server_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServerError,
            "An unexpected error occurred",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
            error_code: self.error_code,
            missing_fields: self.missing_fields.as_deref(),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<PlanGenerationError> for ApiError {
    fn from(err: PlanGenerationError) -> Self {
        let code = err.error_code();
        let status = match code {
            ErrorCode::ProfileIncomplete | ErrorCode::ProfileNotFound => StatusCode::BAD_REQUEST,
            ErrorCode::AiServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let api_error = ApiError::new(status, code, err.user_message());
        match err {
            PlanGenerationError::ProfileIncomplete { missing_fields } => {
                api_error.with_missing_fields(missing_fields)
            }
            _ => api_error,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, transient = err.is_transient(), "Storage failure");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::DatabaseError,
            "A database error occurred",
        )
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        ApiError::invalid_request(format!("Invalid profile fields: {}", fields.join(", ")))
            .with_missing_fields(fields)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

/// Turns a handler panic into the generic `SERVER_ERROR` body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "Handler panicked");

    ApiError::server_error().into_response()
}
