//! Image upload storage.

use std::path::Path;

use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Accepted image extensions, compared case-insensitively.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Subdirectory of the upload root that holds images.
pub const IMAGE_SUBDIR: &str = "images";

/// Lowercased extension of `file_name` if it is an accepted image type.
pub fn image_extension(file_name: &str) -> AppResult<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| AppError::Validation("file has no extension".into()))?;
    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::Validation(format!(
            "only {} images are allowed",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

/// Write `bytes` as `<upload_dir>/images/<uuid>.<ext>` and return its public URL.
pub async fn save_image(
    upload_dir: &Path,
    file_name: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> AppResult<String> {
    let ext = image_extension(file_name)?;
    if bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "file exceeds {max_bytes} bytes"
        )));
    }

    let dir = upload_dir.join(IMAGE_SUBDIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("create {}: {e}", dir.display())))?;

    let stored_name = format!("{}.{ext}", Uuid::new_v4());
    let path = dir.join(&stored_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(format!("write {}: {e}", path.display())))?;

    info!(file = %stored_name, size = bytes.len(), "image stored");
    Ok(format!("/uploads/{IMAGE_SUBDIR}/{stored_name}"))
}
