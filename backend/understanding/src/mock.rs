use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use image::GrayImage;

use mathmentor_core::OcrEngine;

/// An OCR engine that returns a canned result, for tests and offline runs.
pub struct StaticOcrEngine {
    result: Result<String, String>,
    calls: AtomicUsize,
    last_dimensions: Mutex<Option<(u32, u32)>>,
}

impl StaticOcrEngine {
    pub fn returning(text: impl Into<String>) -> Self {
        Self::with_result(Ok(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_result(Err(message.into()))
    }

    fn with_result(result: Result<String, String>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_dimensions: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Dimensions of the last image handed to the engine.
    pub fn last_dimensions(&self) -> Option<(u32, u32)> {
        self.last_dimensions.lock().ok().and_then(|d| *d)
    }
}

#[async_trait]
impl OcrEngine for StaticOcrEngine {
    fn name(&self) -> &str {
        "static"
    }

    async fn recognize(&self, image: &GrayImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut dims) = self.last_dimensions.lock() {
            *dims = Some(image.dimensions());
        }
        self.result.clone().map_err(|e| anyhow!(e))
    }
}
