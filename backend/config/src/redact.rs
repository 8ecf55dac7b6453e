//! Masking of secrets before a config is printed.

use serde_json::Value;

/// Field names whose string values are masked, compared case-insensitively.
const SECRET_FIELDS: [&str; 5] = ["apiKey", "api_key", "token", "secret", "password"];

fn is_secret(field: &str) -> bool {
    SECRET_FIELDS.iter().any(|s| s.eq_ignore_ascii_case(field))
}

/// Keep a four-character hint for long values (`gsk_***`), hide short ones.
fn mask(secret: &str) -> String {
    match secret.char_indices().nth(8) {
        Some(_) => format!("{}***", secret.chars().take(4).collect::<String>()),
        None => "***".to_string(),
    }
}

/// Copy of `value` with every non-empty secret field masked.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, child)| {
                    let child = match child {
                        Value::String(s) if is_secret(name) && !s.is_empty() => Value::String(mask(s)),
                        other => redact(other),
                    };
                    (name.clone(), child)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Dotted paths of the fields [`redact`] masks.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    walk_secrets(value, String::new(), &mut paths);
    paths
}

fn walk_secrets(value: &Value, prefix: String, out: &mut Vec<String>) {
    let Value::Object(fields) = value else { return };
    for (name, child) in fields {
        let path = if prefix.is_empty() { name.clone() } else { format!("{prefix}.{name}") };
        match child {
            Value::String(s) if is_secret(name) && !s.is_empty() => out.push(path),
            Value::Object(_) => walk_secrets(child, path, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_provider_key() {
        let v = json!({ "provider": { "apiKey": "gsk_abcdef1234567890", "model": "llama3-8b-8192" } });
        let redacted = redact(&v);
        assert_eq!(redacted["provider"]["apiKey"], "gsk_***");
        assert_eq!(redacted["provider"]["model"], "llama3-8b-8192");
    }

    #[test]
    fn short_and_empty_values() {
        assert_eq!(redact(&json!({ "token": "abc" }))["token"], "***");
        assert_eq!(redact(&json!({ "apiKey": "" }))["apiKey"], "");
    }

    #[test]
    fn lists_masked_paths() {
        let v = json!({ "provider": { "apiKey": "gsk_abcdef1234567890" }, "logging": { "level": "info" } });
        assert_eq!(collect_redacted_paths(&v), vec!["provider.apiKey".to_string()]);
    }
}
