//! Internal helpers for model validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use crate::{EngineError, ResultEngine};

/// Trim a user-supplied name and enforce its length bounds.
pub(crate) fn normalize_name(
    value: &str,
    label: &str,
    min: usize,
    max: usize,
) -> ResultEngine<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(EngineError::InvalidField(format!(
            "{label}: must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a `#RRGGBB` hex color.
pub(crate) fn validate_color(value: &str) -> ResultEngine<()> {
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[0] != b'#' || !bytes[1..].iter().all(u8::is_ascii_hexdigit) {
        return Err(EngineError::InvalidField(
            "color: must be in #RRGGBB format".to_string(),
        ));
    }
    Ok(())
}

/// Check that an opaque JSON payload is an object carrying the given keys.
pub(crate) fn require_json_keys(
    value: &serde_json::Value,
    keys: &[&str],
    label: &str,
) -> ResultEngine<()> {
    let Some(object) = value.as_object() else {
        return Err(EngineError::InvalidField(format!(
            "{label}: must be a JSON object"
        )));
    };
    for key in keys {
        if !object.contains_key(*key) {
            return Err(EngineError::InvalidField(format!(
                "{label}: missing required field {key}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_trims_and_bounds() {
        assert_eq!(normalize_name("  Rent  ", "name", 2, 30).unwrap(), "Rent");
        assert!(normalize_name("a", "name", 2, 30).is_err());
        assert!(normalize_name(&"x".repeat(31), "name", 2, 30).is_err());
    }

    #[test]
    fn color_format() {
        assert!(validate_color("#A1B2C3").is_ok());
        assert!(validate_color("#a1b2c3").is_ok());
        assert!(validate_color("A1B2C3").is_err());
        assert!(validate_color("#A1B2C").is_err());
        assert!(validate_color("#A1B2CZ").is_err());
    }

    #[test]
    fn json_keys_checked() {
        let value = serde_json::json!({"summary": "ok", "score": 1});
        assert!(require_json_keys(&value, &["summary", "score"], "analysis").is_ok());
        assert!(require_json_keys(&value, &["summary", "missing"], "analysis").is_err());
        assert!(require_json_keys(&serde_json::json!([1]), &[], "analysis").is_err());
    }
}
