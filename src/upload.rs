//! Multipart extraction and filename handling for uploaded images.

use axum::extract::Multipart;

use crate::error::SummarizeError;

/// Form field carrying the image.
pub const IMAGE_FIELD: &str = "image";

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

const FALLBACK_FILENAME: &str = "upload";

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Lower-cased text after the last `.`, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.filename)
    }
}

pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn allowed_file(filename: &str) -> bool {
    extension_of(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to something safe to use as a single
/// path segment.
pub fn sanitize_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Pull the `image` field out of a multipart body. Other fields are skipped.
pub async fn read_image_field(
    mut multipart: Multipart,
) -> Result<Option<UploadedImage>, SummarizeError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SummarizeError::InvalidMultipart(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        // A part without a filename parameter is a plain form value, not a file.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| SummarizeError::InvalidMultipart(e.to_string()))?;

        return Ok(Some(UploadedImage {
            filename,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}
