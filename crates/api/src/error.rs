//! Mapping from domain errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use coffer_core::custody::CustodyError;
use coffer_core::storage::StorageError;
use coffer_shared::AppError;
use serde_json::json;
use tracing::error;

const INTERNAL_MESSAGE: &str = "An internal error occurred. Please try again later";

/// Error response body: `{"error": <code>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error response.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Client facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %err, "request failed");
        }
        Self::new(status, err.error_code(), err.public_message())
    }
}

impl From<CustodyError> for ApiError {
    fn from(err: CustodyError) -> Self {
        let (status, code, message) = match &err {
            // Unknown owner and unknown file read the same to the caller.
            CustodyError::OwnerNotFound(_) | CustodyError::FileNotFound(_) => (
                StatusCode::NOT_FOUND,
                "file_not_found",
                "File not found".to_string(),
            ),
            CustodyError::InvalidCode(_) => (
                StatusCode::FORBIDDEN,
                "invalid_code",
                "Invalid access code".to_string(),
            ),
            CustodyError::InvalidInput(reason) => {
                (StatusCode::BAD_REQUEST, "invalid_input", reason.clone())
            }
            CustodyError::ObjectTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "object_too_large",
                err.to_string(),
            ),
            CustodyError::BlobWriteFailed(_) | CustodyError::BlobDeleteFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                INTERNAL_MESSAGE.to_string(),
            ),
            CustodyError::RecordWriteFailed { .. } | CustodyError::RecordReadFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                INTERNAL_MESSAGE.to_string(),
            ),
            CustodyError::PartialDeleteFailure { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "partial_delete",
                "The file was removed but its record could not be cleaned up".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(
                error = %err,
                reconcile = err.needs_reconciliation(),
                "custody operation failed"
            );
        }
        Self::new(status, code, message)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        error!(error = %err, "reading stored object failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            INTERNAL_MESSAGE,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_core::custody::CompensationOutcome;
    use coffer_shared::{FileId, OwnerId};
    use rstest::rstest;

    #[rstest]
    #[case(CustodyError::OwnerNotFound(OwnerId(1)), StatusCode::NOT_FOUND, "file_not_found")]
    #[case(CustodyError::FileNotFound(FileId(1)), StatusCode::NOT_FOUND, "file_not_found")]
    #[case(CustodyError::InvalidCode(FileId(1)), StatusCode::FORBIDDEN, "invalid_code")]
    #[case(
        CustodyError::InvalidInput("object must not be empty".into()),
        StatusCode::BAD_REQUEST,
        "invalid_input"
    )]
    #[case(
        CustodyError::ObjectTooLarge { size: 10, max: 5 },
        StatusCode::PAYLOAD_TOO_LARGE,
        "object_too_large"
    )]
    #[case(
        CustodyError::BlobWriteFailed("s3 timeout".into()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_error"
    )]
    #[case(
        CustodyError::BlobDeleteFailed("s3 timeout".into()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_error"
    )]
    #[case(
        CustodyError::RecordWriteFailed {
            reason: "pool timed out".into(),
            compensation: CompensationOutcome::BlobRemoved,
        },
        StatusCode::INTERNAL_SERVER_ERROR,
        "database_error"
    )]
    #[case(
        CustodyError::RecordReadFailed("pool timed out".into()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "database_error"
    )]
    #[case(
        CustodyError::PartialDeleteFailure { file_id: FileId(1), reason: "pool timed out".into() },
        StatusCode::INTERNAL_SERVER_ERROR,
        "partial_delete"
    )]
    fn test_custody_error_mapping(
        #[case] err: CustodyError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let api = ApiError::from(err);
        assert_eq!(api.status(), status);
        assert_eq!(api.code(), code);
    }

    #[test]
    fn test_server_errors_hide_backend_detail() {
        let api = ApiError::from(CustodyError::RecordReadFailed(
            "relation \"files\" does not exist".into(),
        ));
        assert!(!api.message().contains("relation"));
    }

    #[test]
    fn test_app_error_mapping() {
        let api = ApiError::from(AppError::Conflict("User name is already taken".into()));
        assert_eq!(api.status(), StatusCode::CONFLICT);
        assert_eq!(api.code(), "conflict");
        assert_eq!(api.message(), "User name is already taken");
    }
}
