//! `mathmentor config`: inspect or create the config file.

use std::path::Path;

use anyhow::{Context, Result};

use mathmentor_config::{apply_all_defaults, collect_redacted_paths, redact, write_config, MathMentorConfig};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

/// Effective config as YAML, with secrets masked.
pub fn render_redacted(config: &MathMentorConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("failed to render config as YAML")
}

pub fn show(config: &MathMentorConfig, path: &Path, load_error: Option<&str>) -> Result<()> {
    if let Some(e) = load_error {
        note_error(e);
        note_info("showing defaults instead");
    } else if !path.exists() {
        note_info(&format!("{} does not exist; showing defaults", path.display()));
    }
    print!("{}", render_redacted(config)?);

    let value = serde_json::to_value(config).context("failed to serialize config")?;
    for masked in collect_redacted_paths(&value) {
        note_info(&format!("{masked} is masked"));
    }
    Ok(())
}

pub fn path(path: &Path) {
    println!("{}", path.display());
}

/// Write a config file populated with every default.
pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        note_warn(&format!(
            "{} already exists; pass --force to overwrite (a backup is kept)",
            path.display()
        ));
        return Ok(());
    }
    let config = apply_all_defaults(MathMentorConfig::default());
    write_config(&config, path).await?;
    note_success(&format!("Wrote {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_output_hides_key() {
        let mut config = MathMentorConfig::default();
        config.provider.api_key = Some("gsk_abcdefghijklmnop".into());
        config.provider.model = Some("llama3-70b-8192".into());

        let yaml = render_redacted(&config).unwrap();
        assert!(yaml.contains("llama3-70b-8192"));
        assert!(!yaml.contains("abcdefghijklmnop"));
    }

    #[tokio::test]
    async fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        init(&path, false).await.unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(first.contains("baseUrl"));

        std::fs::write(&path, "provider:\n  model: custom\n").unwrap();
        init(&path, false).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("custom"));

        init(&path, true).await.unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("custom"));
    }
}
