//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, Money, ResultEngine};

/// Trim a display name and collapse inner whitespace. Empty names are rejected.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let display = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if display.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(display)
}

/// Lookup key for a name: accents stripped, lowercased, punctuation folded
/// into single spaces. `"Caffè  Roma"` and `"caffe roma"` share a key.
pub(crate) fn name_key(value: &str) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for ch in value.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn ensure_non_negative(amount_minor: i64, label: &str) -> ResultEngine<i64> {
    Money::from_minor(amount_minor)
        .non_negative(label)
        .map(Money::minor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_folds_accents_and_spacing() {
        assert_eq!(name_key("  Caffè   Roma "), "caffe roma");
        assert_eq!(name_key("CAFFE-ROMA"), "caffe roma");
        assert_eq!(name_key("Négoce #2"), "negoce 2");
    }

    #[test]
    fn required_name_rejects_blank() {
        assert_eq!(
            normalize_required_name("   ", "shop"),
            Err(EngineError::InvalidInput(
                "shop name must not be empty".to_string()
            ))
        );
        assert_eq!(
            normalize_required_name(" Main   Street ", "shop").unwrap(),
            "Main Street"
        );
    }

    #[test]
    fn non_negative_amounts_pass_through() {
        assert_eq!(ensure_non_negative(0, "amount"), Ok(0));
        assert!(ensure_non_negative(-1, "amount").is_err());
    }
}
