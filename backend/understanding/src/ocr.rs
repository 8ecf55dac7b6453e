//! Optical Character Recognition (OCR)
//!
//! Reads a math problem out of an uploaded photo. Every failure is reported
//! as an outcome rather than an error: OCR problems never end a session.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use mathmentor_core::OcrEngine;

use crate::mime_detect::detect_image_kind;
use crate::preprocess::preprocess_bytes;

/// Result of one OCR attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum OcrOutcome {
    /// Non-empty, trimmed text.
    Extracted(String),
    /// The engine ran but found nothing legible.
    Unreadable,
    /// Unsupported upload, decode error, or engine failure.
    Failed(String),
}

impl OcrOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            OcrOutcome::Extracted(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OcrOutcome::Extracted(_))
    }

    /// Notice shown to the user after an upload.
    pub fn notice(&self) -> String {
        match self {
            OcrOutcome::Extracted(_) => {
                "Math problem extracted from image (not added to the text area)".to_string()
            }
            OcrOutcome::Unreadable => {
                "Could not extract readable text. Try uploading a clearer image.".to_string()
            }
            OcrOutcome::Failed(reason) => format!("OCR extraction failed: {reason}"),
        }
    }
}

/// Preprocesses uploads and runs them through the configured engine.
#[derive(Clone)]
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Extract problem text from an uploaded image. Single attempt.
    pub async fn extract(&self, filename: Option<&str>, bytes: &[u8]) -> OcrOutcome {
        let Some(kind) = detect_image_kind(filename, bytes) else {
            warn!(filename = ?filename, "Rejected upload with unsupported image type");
            return OcrOutcome::Failed(
                "unsupported image type; upload a png, jpg or jpeg file".to_string(),
            );
        };

        info!(
            engine = self.engine.name(),
            mime = kind.mime_type(),
            bytes = bytes.len(),
            "Running OCR on uploaded image"
        );

        let processed = match preprocess_bytes(bytes) {
            Ok(image) => image,
            Err(e) => return OcrOutcome::Failed(format!("{e:#}")),
        };

        match self.engine.recognize(&processed).await {
            Ok(raw) => {
                let text = raw.trim();
                if text.is_empty() {
                    OcrOutcome::Unreadable
                } else {
                    OcrOutcome::Extracted(text.to_string())
                }
            }
            Err(e) => {
                warn!(error = %e, "OCR engine failed");
                OcrOutcome::Failed(format!("{e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::StaticOcrEngine;
    use image::{ImageFormat, Luma, GrayImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = GrayImage::from_pixel(width, height, Luma([240]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_extracted_text_is_trimmed() {
        let engine = Arc::new(StaticOcrEngine::returning("  2x + 3 = 7\n\n"));
        let service = OcrService::new(engine.clone());
        let outcome = service.extract(Some("problem.png"), &png_bytes(20, 8)).await;
        assert_eq!(outcome, OcrOutcome::Extracted("2x + 3 = 7".into()));
        assert_eq!(engine.last_dimensions(), Some((20, 8)));
    }

    #[tokio::test]
    async fn test_whitespace_only_is_unreadable() {
        let service = OcrService::new(Arc::new(StaticOcrEngine::returning(" \n\t ")));
        let outcome = service.extract(Some("blurry.png"), &png_bytes(4, 4)).await;
        assert_eq!(outcome, OcrOutcome::Unreadable);
        assert!(outcome.notice().contains("clearer image"));
    }

    #[tokio::test]
    async fn test_engine_error_is_non_fatal_failure() {
        let service = OcrService::new(Arc::new(StaticOcrEngine::failing("engine crashed")));
        let outcome = service.extract(None, &png_bytes(4, 4)).await;
        assert_eq!(outcome, OcrOutcome::Failed("engine crashed".into()));
        assert!(outcome.notice().starts_with("OCR extraction failed"));
    }

    #[tokio::test]
    async fn test_unsupported_type_skips_engine() {
        let engine = Arc::new(StaticOcrEngine::returning("never"));
        let service = OcrService::new(engine.clone());
        let outcome = service.extract(Some("scan.gif"), &png_bytes(4, 4)).await;
        assert!(matches!(outcome, OcrOutcome::Failed(_)));
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_png_fails_to_decode() {
        let engine = Arc::new(StaticOcrEngine::returning("never"));
        let service = OcrService::new(engine.clone());
        let outcome = service.extract(Some("broken.png"), b"not really a png").await;
        assert!(matches!(outcome, OcrOutcome::Failed(ref r) if r.contains("decode")));
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(OcrOutcome::Extracted("x+1=2".into())).unwrap();
        assert_eq!(json["status"], "extracted");
        assert_eq!(json["detail"], "x+1=2");
    }
}
