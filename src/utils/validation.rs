//! Input validation primitives.
//!
//! Replace verbose `ok_or_else` + `Error::validation_invalid_argument` chains.

use crate::error::{Error, Result};

/// Require an Option to contain a value.
pub fn require<T>(opt: Option<T>, field: &str, message: &str) -> Result<T> {
    opt.ok_or_else(|| Error::validation_invalid_argument(field, message, None, None))
}

/// Require a string to be non-empty after trimming.
///
/// Returns the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None, None))
    } else {
        Ok(trimmed)
    }
}

/// Require a collection to be non-empty; a missing list is a missing argument.
pub fn require_non_empty_vec<'a, T>(vec: &'a [T], field: &str) -> Result<&'a [T]> {
    if vec.is_empty() {
        Err(Error::validation_missing_argument(vec![field.to_string()]))
    } else {
        Ok(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_returns_value_when_some() {
        assert_eq!(require(Some("value"), "field", "msg").unwrap(), "value");
        assert!(require::<&str>(None, "field", "Missing field").is_err());
    }

    #[test]
    fn require_non_empty_trims_whitespace() {
        assert_eq!(require_non_empty("  url  ", "url", "msg").unwrap(), "url");
        assert!(require_non_empty("   ", "url", "Cannot be empty").is_err());
    }

    #[test]
    fn require_non_empty_vec_reports_missing_argument() {
        let empty: Vec<String> = Vec::new();
        let err = require_non_empty_vec(&empty, "names").unwrap_err();
        assert_eq!(err.code.as_str(), "validation.missing_argument");
        assert_eq!(err.details["args"][0], "names");
        assert!(require_non_empty_vec(&[1], "names").is_ok());
    }
}
