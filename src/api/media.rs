//! Image upload helpers: MIME detection for the multipart part and
//! normalization of the upload response into a single URL.

use crate::error::ApiError;
use crate::transport::Payload;
use serde_json::Value;
use std::path::Path;

/// Multipart field name the backend reads the file from.
pub const UPLOAD_FIELD: &str = "file";
pub const UPLOAD_PATH: &str = "/media/upload";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = detect_mime(&bytes, Some(&file_name));
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }
}

pub fn detect_mime_from_extension(filename: &str) -> Option<mime::Mime> {
    let ext = filename.rsplit_once('.')?.1;
    let mime = match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().ok()?,
        "heic" => "image/heic".parse().ok()?,
        _ => return None,
    };
    Some(mime)
}

/// Magic bytes first, then the file extension, then octet-stream.
pub fn detect_mime(data: &[u8], filename: Option<&str>) -> String {
    infer::get(data)
        .map(|info| info.mime_type().to_string())
        .or_else(|| {
            filename
                .and_then(detect_mime_from_extension)
                .map(|mime| mime.to_string())
        })
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

/// Reduces any accepted upload response to the uploaded file's URL.
///
/// Shapes are tried in order: a bare string, `{url}`, then `{data: {url}}`.
/// An empty URL at one level falls through to the next.
pub fn upload_url(payload: Payload) -> Result<String, ApiError> {
    let value = payload.into_value();
    let found = match &value {
        Value::String(_) => non_empty(Some(&value)),
        Value::Object(object) => non_empty(object.get("url"))
            .or_else(|| non_empty(object.get("data").and_then(|data| data.get("url")))),
        _ => None,
    };
    found.ok_or_else(|| ApiError::ShapeMismatch {
        endpoint: UPLOAD_PATH.to_string(),
        detail: format!("no image url in {} response", describe(&value)),
    })
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
        .map(ToOwned::to_owned)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "empty",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "numeric",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
