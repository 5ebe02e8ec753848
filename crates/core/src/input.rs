//! Parsing helpers for raw request input.
//!
//! Request bodies arrive with every field optional; domain modules use these
//! helpers to turn them into typed commands before any business rule runs.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::RecordId;

/// An identifier as sent by clients: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(i64),
    Text(String),
}

impl LooseId {
    /// Parse into a typed id; `field` names the input key in error messages.
    pub fn parse<I: RecordId>(&self, field: &str) -> DomainResult<I> {
        let raw = match self {
            LooseId::Number(n) => Some(*n),
            LooseId::Text(s) => s.trim().parse::<i64>().ok(),
        };
        match raw {
            Some(raw) if raw > 0 => Ok(I::from_raw(raw)),
            _ => Err(DomainError::validation(format!("{field} must be a positive integer id"))),
        }
    }

    /// Parse a required id field.
    pub fn require<I: RecordId>(value: Option<&LooseId>, field: &str) -> DomainResult<I> {
        value
            .ok_or_else(|| DomainError::validation(format!("{field} is required")))?
            .parse(field)
    }
}

impl From<i64> for LooseId {
    fn from(value: i64) -> Self {
        LooseId::Number(value)
    }
}

/// Require a non-blank text field; the value is returned trimmed.
pub fn require_text(value: Option<String>, field: &str) -> DomainResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

/// Normalize an optional text field: blank strings count as absent.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate an email address (trimmed, `local@domain` shape).
pub fn validate_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email.to_string())
        }
        _ => Err(DomainError::validation("email is not a valid address")),
    }
}

/// Require a well-formed email field.
pub fn require_email(value: Option<String>) -> DomainResult<String> {
    validate_email(&require_text(value, "email")?)
}

/// Parse a calendar date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
pub fn parse_date(value: &str, field: &str) -> DomainResult<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.date_naive())
        .map_err(|_| DomainError::validation(format!("invalid date format for {field}")))
}

/// Parse a required date field.
pub fn require_date(value: Option<&str>, field: &str) -> DomainResult<NaiveDate> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_date(v, field),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EmployeeId;

    #[test]
    fn loose_id_accepts_numbers_and_numeric_strings() {
        let from_number: LooseId = serde_json::from_str("12").unwrap();
        let from_text: LooseId = serde_json::from_str("\"12\"").unwrap();

        assert_eq!(from_number.parse::<EmployeeId>("employeeId").unwrap(), EmployeeId::new(12));
        assert_eq!(from_text.parse::<EmployeeId>("employeeId").unwrap(), EmployeeId::new(12));
    }

    #[test]
    fn loose_id_rejects_garbage() {
        let err = LooseId::Text("twelve".into()).parse::<EmployeeId>("employeeId").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(LooseId::require::<EmployeeId>(None, "employeeId").is_err());
    }

    #[test]
    fn dates_parse_in_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert_eq!(parse_date("2024-09-01", "startDate").unwrap(), expected);
        assert_eq!(parse_date("2024-09-01T08:30:00Z", "startDate").unwrap(), expected);
        assert!(parse_date("01/09/2024", "startDate").is_err());
        assert!(require_date(Some("  "), "startDate").is_err());
    }

    #[test]
    fn email_needs_local_part_and_domain() {
        assert_eq!(validate_email(" a@b.test ").unwrap(), "a@b.test");
        assert!(validate_email("@b.test").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(require_email(None).is_err());
    }

    #[test]
    fn text_helpers_trim_and_reject_blank() {
        assert_eq!(require_text(Some("  HR ".into()), "name").unwrap(), "HR");
        assert!(require_text(Some("   ".into()), "name").is_err());
        assert_eq!(optional_text(Some(" ".into())), None);
    }
}
