//! `mathmentor ocr`: read problem text from an image without calling the API.

use std::path::Path;

use anyhow::{bail, Context, Result};

use mathmentor_understanding::{OcrOutcome, OcrService};

use crate::terminal_output::note_warn;

pub async fn run(ocr: &OcrService, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let filename = path.file_name().and_then(|n| n.to_str());

    match ocr.extract(filename, &bytes).await {
        OcrOutcome::Extracted(text) => {
            println!("{text}");
            Ok(())
        }
        outcome @ OcrOutcome::Unreadable => {
            note_warn(&outcome.notice());
            Ok(())
        }
        outcome @ OcrOutcome::Failed(_) => bail!(outcome.notice()),
    }
}
