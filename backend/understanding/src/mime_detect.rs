//! Upload type detection.
//!
//! Only PNG and JPEG uploads are accepted for OCR.

use std::path::Path;

use serde::Serialize;

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            _ => None,
        }
    }

    fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else {
            None
        }
    }
}

/// Detect the upload type.
///
/// A filename with an extension decides on its own; files without one
/// (and anonymous uploads) fall back to the leading magic bytes.
pub fn detect_image_kind(filename: Option<&str>, bytes: &[u8]) -> Option<ImageKind> {
    let ext = filename
        .map(Path::new)
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str());

    match ext {
        Some(ext) => ImageKind::from_extension(ext),
        None => ImageKind::from_magic(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_extension_wins() {
        assert_eq!(detect_image_kind(Some("problem.PNG"), b""), Some(ImageKind::Png));
        assert_eq!(detect_image_kind(Some("photo.jpeg"), b""), Some(ImageKind::Jpeg));
        assert_eq!(detect_image_kind(Some("photo.jpg"), b""), Some(ImageKind::Jpeg));
    }

    #[test]
    fn test_rejects_other_formats() {
        assert_eq!(detect_image_kind(Some("scan.gif"), PNG_MAGIC), None);
        assert_eq!(detect_image_kind(Some("notes.pdf"), b"%PDF"), None);
        assert_eq!(detect_image_kind(None, b"GIF89a"), None);
    }

    #[test]
    fn test_magic_fallback() {
        assert_eq!(detect_image_kind(None, PNG_MAGIC), Some(ImageKind::Png));
        assert_eq!(detect_image_kind(Some("upload"), &[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
    }
}
