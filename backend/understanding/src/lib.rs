//! Turning uploaded problem photos into text.
//!
//! The pipeline is fixed: detect the upload type, decode, preprocess
//! (grayscale, median filter, contrast boost) and hand the result to an
//! [`OcrEngine`](mathmentor_core::OcrEngine).

pub mod mime_detect;
pub mod mock;
pub mod ocr;
pub mod preprocess;
pub mod tesseract;

pub use mime_detect::{detect_image_kind, ImageKind};
pub use mock::StaticOcrEngine;
pub use ocr::{OcrOutcome, OcrService};
pub use preprocess::{enhance_contrast, median_filter, preprocess, preprocess_bytes, CONTRAST_FACTOR};
pub use tesseract::TesseractCli;
