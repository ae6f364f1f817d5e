use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;

use crate::application::{
    ConfirmLaunchInput, ConfirmedLaunch, CreatedLaunch, ImageUpload, LaunchServiceError,
    PreparedLaunch,
};
use crate::domain::token::LaunchMetadata;
use crate::http::{ApiError, AppState};

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

pub async fn prepare(
    State(state): State<AppState>,
    body: Result<Json<LaunchMetadata>, JsonRejection>,
) -> Result<Json<PreparedLaunch>, ApiError> {
    let Json(metadata) = body?;
    Ok(Json(state.launches.prepare(metadata).await?))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<LaunchMetadata>, JsonRejection>,
) -> Result<Json<CreatedLaunch>, ApiError> {
    let Json(metadata) = body?;
    Ok(Json(state.launches.create(metadata).await?))
}

pub async fn confirm(
    State(state): State<AppState>,
    body: Result<Json<ConfirmLaunchInput>, JsonRejection>,
) -> Result<Json<ConfirmedLaunch>, ApiError> {
    let Json(input) = body?;
    Ok(Json(state.launches.confirm(input).await?))
}

/// Image upload from the `file` field of a multipart form
pub async fn upload_metadata(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImageUpload>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        let upload = state
            .launches
            .upload_image(&file_name, &content_type, bytes.to_vec())
            .await?;
        return Ok(Json(upload));
    }

    Err(LaunchServiceError::NoFile.into())
}
