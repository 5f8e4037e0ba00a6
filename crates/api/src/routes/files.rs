//! File custody routes: upload, listing, code verification and deletion.

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use bytes::Bytes;
use coffer_core::custody::{FileSummary, sanitize_object_name};
use coffer_shared::{FileId, OwnerId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Multipart field carrying the object.
const FILE_FIELD: &str = "file";

/// Creates the file routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(list_files))
        .route("/files/upload", post(upload_file))
        .route("/files/verify", post(verify_file))
        .route("/files/{file_id}", delete(delete_file))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response after a successful upload. The access code is shown only here.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Human readable status.
    pub message: &'static str,
    /// Id of the new file.
    pub file_id: FileId,
    /// Plaintext access code.
    pub access_code: String,
}

/// Owner listing.
#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    /// Human readable status.
    pub message: String,
    /// Files, oldest first.
    pub data: Vec<FileSummary>,
}

/// Request body for retrieving a file with its access code.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// File to retrieve.
    #[serde(alias = "fileId")]
    pub file_id: FileId,
    /// Code issued at upload.
    #[serde(alias = "accessCode", alias = "uniqueCode")]
    pub access_code: String,
    /// Owner who shared the code; defaults to the caller.
    #[serde(default, alias = "ownerId")]
    pub owner_id: Option<OwnerId>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /files/upload - Store an object and issue its access code.
async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let (object_name, bytes) = read_file_field(&mut multipart).await?;

    let receipt = state
        .custody
        .upload(user.owner_id(), &object_name, bytes)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File stored",
            file_id: receipt.file_id,
            access_code: receipt.access_code.to_string(),
        }),
    ))
}

/// GET /files - List the caller's files without locators or codes.
async fn list_files(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ListFilesResponse>, ApiError> {
    let owner_id = user.owner_id();
    let data = state.custody.list_by_owner(owner_id).await?;

    Ok(Json(ListFilesResponse {
        message: format!("Files successfully retrieved for userId {owner_id}"),
        data,
    }))
}

/// POST /files/verify - Check an access code and return the object bytes.
async fn verify_file(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VerifyRequest>,
) -> Result<Response, ApiError> {
    let owner_id = payload.owner_id.unwrap_or_else(|| user.owner_id());

    let record = state
        .custody
        .verify_and_reveal(owner_id, payload.file_id, payload.access_code.trim())
        .await?;

    let bytes = state.storage.read(&record.blob_locator).await?;

    info!(
        owner_id = %owner_id,
        file_id = %record.id,
        caller = %user.owner_id(),
        "File released"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&record.object_name),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

/// DELETE /files/{file_id} - Remove one of the caller's files.
async fn delete_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(file_id): Path<FileId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner_id = user.owner_id();
    state.custody.delete(owner_id, file_id).await?;

    Ok(Json(serde_json::json!({
        "message": format!("File with id {file_id} deleted successfully"),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// Pulls the `file` part out of the form, skipping any other parts.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let object_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok((object_name, bytes));
    }

    Err(ApiError::new(
        StatusCode::BAD_REQUEST,
        "invalid_input",
        "File not found",
    ))
}

#[allow(clippy::needless_pass_by_value)]
fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::new(err.status(), "invalid_multipart", err.body_text())
}

/// `attachment; filename="..."` with a header-safe name.
fn content_disposition(object_name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"",
        sanitize_object_name(object_name)
    )
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn test_content_disposition_is_header_safe() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(
            content_disposition("evil\"\r\nSet-Cookie: x.txt"),
            "attachment; filename=\"evil___Set-Cookie__x.txt\""
        );
    }

    #[test]
    fn test_verify_request_accepts_camel_case() {
        let req: VerifyRequest =
            serde_json::from_str(r#"{"fileId": 4, "uniqueCode": "123456"}"#).unwrap();
        assert_eq!(req.file_id, FileId(4));
        assert_eq!(req.access_code, "123456");
        assert!(req.owner_id.is_none());

        let req: VerifyRequest = serde_json::from_str(
            r#"{"file_id": 4, "access_code": "123456", "owner_id": 9}"#,
        )
        .unwrap();
        assert_eq!(req.owner_id, Some(OwnerId(9)));
    }
}
