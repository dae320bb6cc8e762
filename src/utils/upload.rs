use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use bytes::Bytes;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::{MAX_PROFILE_PICTURE_BYTES, MAX_SYLLABUS_FILE_BYTES};
use crate::error::{AppError, AppResult};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// A file part pulled out of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    pub fn size_mb(&self) -> f64 {
        self.data.len() as f64 / (1024.0 * 1024.0)
    }
}

pub async fn read_text_field(field: Field<'_>) -> AppResult<String> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::field(&name, format!("Failed to read field: {}", e.body_text())))
}

pub async fn read_file_field(field: Field<'_>) -> AppResult<UploadedFile> {
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field
        .file_name()
        .map(|f| sanitize_filename::sanitize(f).to_string())
        .filter(|f| !f.is_empty())
        .ok_or_else(|| {
            AppError::field(
                &name,
                "The submitted data was not a file. Check the encoding type on the form.",
            )
        })?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::field(&name, format!("Failed to read file: {}", e.body_text())))?;

    if data.is_empty() {
        return Err(AppError::field(&name, "The submitted file is empty."));
    }

    Ok(UploadedFile { file_name, data })
}

pub fn validate_pdf(file: &UploadedFile) -> AppResult<()> {
    if file.extension().as_deref() != Some("pdf") {
        return Err(AppError::field("syllabus_file", "Only PDF files are allowed."));
    }
    if file.data.len() > MAX_SYLLABUS_FILE_BYTES {
        return Err(AppError::field("syllabus_file", "File size must be under 5MB."));
    }
    Ok(())
}

fn looks_like_image(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8, 0xFF])
        || data.starts_with(b"\x89PNG\r\n\x1a\n")
        || data.starts_with(b"GIF87a")
        || data.starts_with(b"GIF89a")
        || (data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP")
}

pub fn validate_image(file: &UploadedFile) -> AppResult<()> {
    let ext_ok = file
        .extension()
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
    if !ext_ok || !looks_like_image(&file.data) {
        return Err(AppError::field(
            "profile_picture",
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
        ));
    }
    if file.data.len() > MAX_PROFILE_PICTURE_BYTES {
        return Err(AppError::field(
            "profile_picture",
            format!(
                "Image size must be under 5MB. Current size: {:.2}MB",
                file.size_mb()
            ),
        ));
    }
    Ok(())
}

/// `syllabi/YYYY/MM/DD`
pub fn dated_dir(prefix: &str) -> String {
    format!("{}/{}", prefix, Utc::now().format("%Y/%m/%d"))
}

pub fn profile_picture_name(email: &str, file: &UploadedFile) -> String {
    let ext = file.extension().unwrap_or_else(|| "jpg".to_string());
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    sanitize_filename::sanitize(format!("{email}_{timestamp}.{ext}")).to_string()
}

/// Writes `data` under `media_root/relative_dir` and returns the path relative to `media_root`.
/// An existing file with the same name gets a random suffix instead of being overwritten.
pub async fn store_file(
    media_root: &str,
    relative_dir: &str,
    file_name: &str,
    data: &[u8],
) -> AppResult<String> {
    let dir = PathBuf::from(media_root).join(relative_dir);
    fs::create_dir_all(&dir).await?;

    let mut name = file_name.to_string();
    if fs::try_exists(dir.join(&name)).await? {
        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("file");
        let suffix = &Uuid::new_v4().simple().to_string()[..8];
        name = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{stem}_{suffix}.{ext}"),
            None => format!("{stem}_{suffix}"),
        };
    }

    let mut output = fs::File::create(dir.join(&name)).await?;
    output.write_all(data).await?;
    output.flush().await?;

    let relative = format!("{}/{}", relative_dir.trim_end_matches('/'), name);
    tracing::info!("Stored upload {}", relative);
    Ok(relative)
}

/// Best effort; a missing file is not an error.
pub async fn remove_file(media_root: &str, relative_path: &str) {
    let path = PathBuf::from(media_root).join(relative_path);
    if let Err(e) = fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
