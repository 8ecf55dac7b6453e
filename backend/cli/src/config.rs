//! Turns a loaded `MathMentorConfig` into the runtime pieces.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use mathmentor_config::{MathMentorConfig, RetryConfig};
use mathmentor_conversation::{ConversationClient, OpenAiCompatProvider, RetryPolicy};
use mathmentor_session::Tutor;
use mathmentor_understanding::{OcrService, TesseractCli};

/// Environment variable consulted for the key when no flag is given.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

pub fn retry_policy(retry: Option<&RetryConfig>) -> RetryPolicy {
    let defaults = RetryPolicy::default();
    let Some(retry) = retry else {
        return defaults;
    };
    RetryPolicy {
        max_attempts: retry.max_attempts.unwrap_or(defaults.max_attempts),
        base_delay_ms: retry.base_delay_ms.unwrap_or(defaults.base_delay_ms),
        backoff_factor: retry.backoff_factor.unwrap_or(defaults.backoff_factor),
        max_delay_ms: retry.max_delay_ms.unwrap_or(defaults.max_delay_ms),
    }
}

pub fn tesseract(config: &MathMentorConfig) -> TesseractCli {
    TesseractCli::new(config.ocr.tesseract_cmd())
        .with_psm(config.ocr.psm())
        .with_languages(config.ocr.languages())
}

pub fn ocr_service(config: &MathMentorConfig) -> OcrService {
    OcrService::new(Arc::new(tesseract(config)))
}

/// Wire the HTTP provider, retry policy and OCR engine into a `Tutor`.
pub fn build_tutor(config: &MathMentorConfig) -> Result<Tutor> {
    let provider = OpenAiCompatProvider::new(
        config.provider.base_url(),
        Duration::from_secs(config.provider.timeout_secs()),
    )
    .context("failed to build chat-completion client")?;

    let client = ConversationClient::new(Arc::new(provider), config.provider.model())
        .with_retry(retry_policy(config.provider.retry.as_ref()));

    Ok(Tutor::new(client, ocr_service(config)))
}

/// Pick the key to start with: explicit flag or env var, then the config file.
pub fn initial_api_key(flag: Option<String>, config: &MathMentorConfig) -> Option<String> {
    flag.filter(|k| !k.trim().is_empty())
        .or_else(|| config.provider.api_key().map(str::to_string))
}

/// Rolling log directory: configured, else `<config dir>/logs`.
pub fn log_dir(config: &MathMentorConfig) -> PathBuf {
    config
        .logging
        .dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| mathmentor_config::config_dir().join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_fills_gaps() {
        let policy = retry_policy(Some(&RetryConfig {
            max_attempts: Some(3),
            ..RetryConfig::default()
        }));
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay_ms, RetryPolicy::default().base_delay_ms);
        assert_eq!(retry_policy(None), RetryPolicy::default());
    }

    #[test]
    fn test_initial_key_precedence() {
        let mut config = MathMentorConfig::default();
        config.provider.api_key = Some("gsk_from_file".into());

        assert_eq!(initial_api_key(Some("gsk_flag".into()), &config).as_deref(), Some("gsk_flag"));
        assert_eq!(initial_api_key(Some("  ".into()), &config).as_deref(), Some("gsk_from_file"));

        config.provider.api_key = None;
        assert_eq!(initial_api_key(None, &config), None);
    }

    #[test]
    fn test_tesseract_from_config() {
        let mut config = MathMentorConfig::default();
        config.ocr.tesseract_cmd = Some("/opt/bin/tesseract".into());
        let engine = tesseract(&config);
        assert_eq!(engine.command(), std::path::Path::new("/opt/bin/tesseract"));
    }

    #[test]
    fn test_build_tutor_uses_model() {
        let tutor = build_tutor(&MathMentorConfig::default()).unwrap();
        assert_eq!(tutor.client().model(), mathmentor_conversation::DEFAULT_MODEL);
        assert_eq!(tutor.client().provider_name(), "groq");
    }
}
