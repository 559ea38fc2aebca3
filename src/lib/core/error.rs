use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TodoError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("invalid JSON body: {0}")]
    MalformedRequest(String),
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl TodoError {
    pub fn status(&self) -> StatusCode {
        match self {
            TodoError::Validation(_) | TodoError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            TodoError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            TodoError::Validation(msg) => *msg,
            TodoError::MalformedRequest(detail) => {
                tracing::debug!(error = %detail, "Rejected malformed request body");
                "invalid JSON body"
            }
            TodoError::Storage(e) => {
                tracing::error!(error = ?e, "Store operation failed");
                "internal server error"
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_malformed_map_to_bad_request() {
        assert_eq!(
            TodoError::Validation("text required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TodoError::MalformedRequest("expected value".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_maps_to_internal_error_and_keeps_context() {
        let err =
            TodoError::from(anyhow::anyhow!("disk I/O error").context("failed to insert todo"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let rendered = err.to_string();
        assert!(rendered.contains("failed to insert todo"));
        assert!(rendered.contains("disk I/O error"));
    }
}
