//! Boundary validation for catalog requests.
//!
//! Everything here runs before the store is touched: identifier format,
//! required fields, list limits and search terms. Failures are returned as
//! [`ValidationError`] values rather than raised.

use std::collections::BTreeMap;

use crate::models::{EntityId, ParseEntityIdError};

/// Inclusive bounds for list limits.
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 100;

/// Limit used by the top-series ranking when none (or a bad one) is given.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Limit applied to the comic listing when the caller gives none.
pub const DEFAULT_COMIC_LIST_LIMIT: usize = MAX_LIMIT;

/// Largest view count either backend can store (a signed 64-bit column).
pub const MAX_VIEWS: u64 = i64::MAX as u64;

/// Reasons keyed by the offending field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Structured validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required path parameter was absent.
    #[error("Parameter '{0}' is required")]
    MissingParameter(String),

    /// A reference did not match the identifier format.
    #[error("The value '{value}' is not a valid identifier for parameter '{param}'")]
    InvalidIdentifier { param: String, value: String },

    /// One or more fields were missing or malformed.
    #[error("{message}")]
    InvalidFields {
        message: String,
        fields: FieldErrors,
    },
}

impl ValidationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidFields {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), reason.clone());
        Self::InvalidFields {
            message: reason,
            fields,
        }
    }
}

/// Parse a path or body parameter expected to hold an entity reference.
pub fn parse_identifier(param: &str, value: &str) -> Result<EntityId, ValidationError> {
    value.parse().map_err(|e| match e {
        ParseEntityIdError::Empty => ValidationError::MissingParameter(param.to_string()),
        ParseEntityIdError::Malformed(_) => ValidationError::InvalidIdentifier {
            param: param.to_string(),
            value: value.to_string(),
        },
    })
}

/// Limit for listings that reject bad input outright.
///
/// Absent means [`DEFAULT_COMIC_LIST_LIMIT`]; anything that is not an integer
/// in `[MIN_LIMIT, MAX_LIMIT]` is an error.
pub fn parse_strict_limit(raw: Option<&str>) -> Result<usize, ValidationError> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(DEFAULT_COMIC_LIST_LIMIT);
    };

    match raw.parse::<i64>() {
        Ok(n) if (MIN_LIMIT as i64..=MAX_LIMIT as i64).contains(&n) => Ok(n as usize),
        Ok(_) => Err(ValidationError::invalid_field(
            "limit",
            format!("limit must be between {} and {}", MIN_LIMIT, MAX_LIMIT),
        )),
        Err(_) => Err(ValidationError::invalid_field(
            "limit",
            format!("'{}' is not a valid integer limit", raw),
        )),
    }
}

/// Limit for the top-series ranking, which never fails.
///
/// Absent, non-numeric and out-of-range values all fall back to
/// [`DEFAULT_TOP_LIMIT`].
pub fn parse_ranking_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| (MIN_LIMIT as i64..=MAX_LIMIT as i64).contains(n))
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_TOP_LIMIT)
}

/// Trimmed, non-blank free-text search term.
pub fn validate_search_term(raw: Option<&str>) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(term) if !term.is_empty() => Ok(term.to_string()),
        _ => Err(ValidationError::invalid_field(
            "q",
            "Search term 'q' is required",
        )),
    }
}

/// Collects field-level problems while a request body is checked.
#[derive(Debug, Default)]
pub struct FieldReport {
    missing: Vec<&'static str>,
    invalid: FieldErrors,
}

impl FieldReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required text field: must be present and non-blank.
    pub fn required_text(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => {
                self.missing.push(field);
                None
            }
        }
    }

    /// Required integer field: must be present and non-zero.
    pub fn required_int(&mut self, field: &'static str, value: Option<i32>) -> Option<i32> {
        match value {
            Some(v) if v != 0 => Some(v),
            _ => {
                self.missing.push(field);
                None
            }
        }
    }

    /// Required sequence: must be present and hold at least one element.
    pub fn required_list(
        &mut self,
        field: &'static str,
        value: Option<Vec<String>>,
    ) -> Option<Vec<String>> {
        match value {
            Some(v) if !v.is_empty() => Some(v),
            Some(_) => {
                self.invalid
                    .insert(field.to_string(), format!("'{}' must not be empty", field));
                None
            }
            None => {
                self.missing.push(field);
                None
            }
        }
    }

    /// Optional text field: when supplied it must be non-blank.
    pub fn optional_text(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if v.trim().is_empty() => {
                self.invalid
                    .insert(field.to_string(), format!("'{}' must not be blank", field));
                None
            }
            other => other,
        }
    }

    /// Optional integer field: when supplied it must be non-zero.
    pub fn optional_int(&mut self, field: &'static str, value: Option<i32>) -> Option<i32> {
        match value {
            Some(0) => {
                self.invalid
                    .insert(field.to_string(), format!("'{}' must not be zero", field));
                None
            }
            other => other,
        }
    }

    /// Optional counter: when supplied it must not exceed `max`.
    pub fn optional_count(
        &mut self,
        field: &'static str,
        value: Option<u64>,
        max: u64,
    ) -> Option<u64> {
        match value {
            Some(v) if v > max => {
                self.invalid
                    .insert(field.to_string(), format!("'{}' must not exceed {}", field, max));
                None
            }
            other => other,
        }
    }

    /// Optional sequence: when supplied it must hold at least one element.
    pub fn optional_list(
        &mut self,
        field: &'static str,
        value: Option<Vec<String>>,
    ) -> Option<Vec<String>> {
        match value {
            Some(v) if v.is_empty() => {
                self.invalid
                    .insert(field.to_string(), format!("'{}' must not be empty", field));
                None
            }
            other => other,
        }
    }

    /// Fail with every missing and invalid field listed, or succeed.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.missing.is_empty() && self.invalid.is_empty() {
            return Ok(());
        }

        let mut fields = self.invalid;
        for field in &self.missing {
            fields.insert(field.to_string(), format!("'{}' is required", field));
        }

        let message = if self.missing.is_empty() {
            "Validation failed".to_string()
        } else {
            format!("Missing required fields: {}", self.missing.join(", "))
        };

        Err(ValidationError::InvalidFields { message, fields })
    }
}
