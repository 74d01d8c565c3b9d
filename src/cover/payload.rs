//! Image payloads: self-contained `data:` URLs.

use crate::error::Result;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;
use std::path::Path;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Read a file and encode it as a data URL.
///
/// The MIME type comes from the extension, then from the content. The bytes
/// are not checked to be a decodable image.
pub async fn file_to_image_payload(path: &Path) -> Result<String> {
    let data = tokio::fs::read(path).await?;

    let mime = ImageFormat::from_path(path)
        .ok()
        .map(|f| f.to_mime_type())
        .unwrap_or_else(|| sniff_mime(&data));

    tracing::debug!(path = %path.display(), bytes = data.len(), mime, "Encoded cover file");
    Ok(encode(mime, &data))
}

/// Encode bytes already in memory, preferring an `image/*` content type.
pub fn bytes_to_image_payload(data: &[u8], content_type: Option<&str>) -> String {
    let mime = content_type
        .map(str::trim)
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or_else(|| sniff_mime(data));
    encode(mime, data)
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn decode_image_payload(payload: &str) -> Option<(String, Vec<u8>)> {
    let rest = payload.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(data.trim()).ok()?;

    let mime = if mime.is_empty() { FALLBACK_MIME } else { mime };
    Some((mime.to_string(), bytes))
}

fn sniff_mime(data: &[u8]) -> &'static str {
    image::guess_format(data)
        .map(|f| f.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}

fn encode(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_bytes_payload_prefers_content_type() {
        let payload = bytes_to_image_payload(b"abc", Some("image/gif"));
        assert_eq!(payload, "data:image/gif;base64,YWJj");
    }

    #[test]
    fn test_bytes_payload_sniffs_content() {
        let payload = bytes_to_image_payload(PNG_MAGIC, Some("application/octet-stream"));
        assert!(payload.starts_with("data:image/png;base64,"));

        let unknown = bytes_to_image_payload(b"plain", None);
        assert!(unknown.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_decode_payload() {
        let (mime, bytes) = decode_image_payload("data:image/gif;base64,YWJj").unwrap();
        assert_eq!(mime, "image/gif");
        assert_eq!(bytes, b"abc");

        assert!(decode_image_payload("https://example.com/cover.png").is_none());
        assert!(decode_image_payload("data:image/png,raw").is_none());
        assert!(decode_image_payload("data:image/png;base64,!!!").is_none());
    }

    #[tokio::test]
    async fn test_file_payload_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let payload = file_to_image_payload(&path).await.unwrap();
        assert!(payload.starts_with("data:image/jpeg;base64,"));

        let (_, bytes) = decode_image_payload(&payload).unwrap();
        assert_eq!(bytes, b"not really a jpeg");
    }

    #[tokio::test]
    async fn test_file_payload_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = file_to_image_payload(&dir.path().join("missing.png")).await;
        assert!(matches!(result, Err(crate::error::AppError::Io(_))));
    }
}
