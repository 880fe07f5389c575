//! Error and body mapping for the JSON surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::RecoveryError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP status for an engine error.
pub fn status_for(error: &RecoveryError) -> StatusCode {
    match error {
        RecoveryError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        RecoveryError::AddressTooShort { .. } => StatusCode::BAD_REQUEST,
        RecoveryError::NotAuthenticated | RecoveryError::NotReady | RecoveryError::NoSubmission => {
            StatusCode::CONFLICT
        }
        RecoveryError::Configuration(_) | RecoveryError::Initialization(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for RecoveryError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&RecoveryError::SessionNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&RecoveryError::AddressTooShort { len: 3, min: 42 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&RecoveryError::NotReady), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&RecoveryError::Initialization("boom".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&RecoveryError::NoSubmission),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_error_response() {
        let response = RecoveryError::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
