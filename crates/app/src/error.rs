use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use services::FlowError;
use thiserror::Error;
use tracing::error;
use ui::{render_page, unavailable_page};

/// Request-level failures, mapped onto HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("question metadata is unavailable")]
    MetadataUnavailable,

    #[error("malformed form: {0}")]
    MalformedForm(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::MetadataUnavailable => AppError::MetadataUnavailable,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MetadataUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::CACHE_CONTROL, "no-store")],
                Html(render_page(unavailable_page())),
            )
                .into_response(),
            AppError::MalformedForm(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            AppError::Internal(_) => {
                error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
