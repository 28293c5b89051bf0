use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Upstream request failed: {0}")]
    UpstreamFailed(String),

    #[error("Upstream rate limit exceeded")]
    UpstreamRateLimited,

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

#[derive(Serialize)]
struct ValidationBody {
    success: bool,
    message: String,
    errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct FieldError {
    field: String,
    message: String,
}

/// Rate-limit rejections keep the bare `{"error": …}` body the
/// front-end already expects.
#[derive(Serialize)]
struct RateLimitBody {
    error: String,
}

fn field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {}", field));
            out.push(FieldError {
                field: field.to_string(),
                message,
            });
        }
    }
    out
}

fn error_body(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            message,
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationBody {
                    success: false,
                    message: "Validation error".to_string(),
                    errors: field_errors(&errors),
                }),
            )
                .into_response(),
            AppError::BadRequest(err) => error_body(StatusCode::BAD_REQUEST, err.to_string()),
            AppError::TooManyRequests(message) => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(RateLimitBody { error: message }),
            )
                .into_response(),
            AppError::ConfigError(_) => error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
            ),
            AppError::UpstreamUnreachable(provider) => error_body(
                StatusCode::BAD_GATEWAY,
                format!("Unable to connect to {} API", provider),
            ),
            AppError::UpstreamFailed(provider) => error_body(
                StatusCode::BAD_GATEWAY,
                format!("{} API request failed", provider),
            ),
            AppError::UpstreamRateLimited => error_body(
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded - please try again later".to_string(),
            ),
            AppError::InternalError(err) => {
                tracing::error!("Unhandled internal error: {:#}", err);
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}
