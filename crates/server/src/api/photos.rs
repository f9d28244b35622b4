//! Photo upload and job inspection handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use retrato_core::{ArtifactRecord, PhotoUpload, SubmitReceipt, UploadError};

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: error.into(),
        })
    }
}

/// Response for job status queries
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub state: String,
}

/// Upload a photo and start its aging transformation.
///
/// Multipart form: an `owner_id` text part and a `photo` file part.
/// Responds as soon as the original is stored; the transformation result
/// arrives later through the event stream and the artifact record.
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitReceipt>), (StatusCode, Json<ErrorResponse>)> {
    let mut owner_id: Option<String> = None;
    let mut upload: Option<PhotoUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(format!("malformed multipart body: {}", e)),
        )
    })? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("owner_id") => {
                let value = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        ErrorResponse::new(format!("unreadable owner_id: {}", e)),
                    )
                })?;
                owner_id = Some(value);
            }
            Some("photo") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        ErrorResponse::new(format!("unreadable photo: {}", e)),
                    )
                })?;
                upload = Some(PhotoUpload::new(bytes.to_vec(), content_type));
            }
            other => {
                debug!("ignoring unexpected multipart field {:?}", other);
            }
        }
    }

    let owner_id = owner_id.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("missing owner_id field"),
        )
    })?;
    let upload = upload.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("missing photo field"),
        )
    })?;

    match state.pipeline().submit(upload, &owner_id).await {
        Ok(receipt) => Ok((StatusCode::ACCEPTED, Json(receipt))),
        Err(e @ UploadError::InvalidInput { .. }) => {
            Err((StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string())))
        }
        Err(e @ UploadError::Storage(_)) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(e.to_string()),
        )),
    }
}

/// Point-in-time state of a tracked job.
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.pipeline().job_status(&job_id).await {
        Some(job_state) => Ok(Json(JobStatusResponse {
            job_id,
            state: job_state.to_string(),
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            ErrorResponse::new(format!("job not tracked: {}", job_id)),
        )),
    }
}

/// Request cancellation of a job. Advisory only.
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> StatusCode {
    state.pipeline().cancel(&job_id).await;
    StatusCode::ACCEPTED
}

/// Fetch the artifact record for an owner.
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<Json<ArtifactRecord>, (StatusCode, Json<ErrorResponse>)> {
    match state.records().get(&owner_id) {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            ErrorResponse::new(format!("no record for owner: {}", owner_id)),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(e.to_string()),
        )),
    }
}
