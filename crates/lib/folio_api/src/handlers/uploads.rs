//! Upload request handlers.

use axum::Json;
use axum::extract::{Multipart, State};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::UploadResponse;
use crate::services::uploads;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// `POST /api/uploads/images`: store one image from the `image` field.
pub async fn upload_image_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("image field has no file name".into()))?;
        let bytes = field.bytes().await?;
        let url = uploads::save_image(
            &state.config.upload_dir,
            &file_name,
            &bytes,
            state.config.max_upload_bytes,
        )
        .await?;
        return Ok(Json(UploadResponse { url }));
    }
    Err(AppError::Validation(format!(
        "multipart field '{IMAGE_FIELD}' is required"
    )))
}
