//! Tesseract OCR backend, driven as an external process.
//!
//! The binary location, page segmentation mode and languages come from
//! configuration; nothing here assumes an install path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use image::{GrayImage, ImageFormat};
use tokio::process::Command;
use tracing::debug;

use mathmentor_core::OcrEngine;

/// Page segmentation mode 6: assume a single uniform block of text.
pub const DEFAULT_PSM: u8 = 6;

pub struct TesseractCli {
    command: PathBuf,
    psm: u8,
    languages: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            psm: DEFAULT_PSM,
            languages: "eng".to_string(),
        }
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    fn args(&self, input: &Path) -> Vec<OsString> {
        vec![
            input.as_os_str().to_owned(),
            "stdout".into(),
            "--psm".into(),
            self.psm.to_string().into(),
            "-l".into(),
            self.languages.clone().into(),
        ]
    }

    /// First line of `tesseract --version`, used by `doctor`.
    pub async fn version(&self) -> Result<String> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.command.display()))?;
        if !output.status.success() {
            bail!("{} --version exited with {}", self.command.display(), output.status);
        }
        // Older releases print the banner on stderr
        let text = if output.stdout.is_empty() { output.stderr } else { output.stdout };
        Ok(String::from_utf8_lossy(&text)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &GrayImage) -> Result<String> {
        let tmp = tempfile::Builder::new()
            .prefix("mathmentor-ocr-")
            .suffix(".png")
            .tempfile()
            .context("failed to create temp file for OCR")?;
        image
            .save_with_format(tmp.path(), ImageFormat::Png)
            .context("failed to write temp image for OCR")?;

        debug!(command = %self.command.display(), psm = self.psm, "Running tesseract");

        let output = Command::new(&self.command)
            .args(self.args(tmp.path()))
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.command.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("tesseract exited with {}: {}", output.status, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
