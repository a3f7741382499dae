//! Record validation against the catalog schema
//!
//! Validation runs on untyped JSON so that records coming from files or
//! form submissions can be checked before they are deserialized. Every
//! check runs; all violations are reported together.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::record::{Category, ClosedSet, Complexity, Language, ServerRecord};

/// Fields that must be present and non-empty
pub const REQUIRED_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "author",
    "repository",
    "category",
    "language",
    "complexity",
    "features",
    "lastUpdated",
];

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("id pattern compiles"));

/// Validate a candidate record, returning one message per failed check
///
/// An empty result means the record is valid. A candidate that is not a
/// JSON object at all yields a single message.
pub fn validate(candidate: &Value) -> Vec<String> {
    let Some(fields) = candidate.as_object() else {
        return vec!["Record must be a JSON object".to_string()];
    };

    let mut errors = Vec::new();
    // Absent and falsy fields are treated alike
    let present = |name: &str| fields.get(name).filter(|v| is_truthy(v));

    for &field in REQUIRED_FIELDS {
        if present(field).is_none() {
            errors.push(format!("Missing required field: {field}"));
        }
    }

    check_member::<Category>(present(Category::FIELD), &mut errors);
    check_member::<Language>(present(Language::FIELD), &mut errors);
    check_member::<Complexity>(present(Complexity::FIELD), &mut errors);

    if present("features").is_some_and(|v| !v.is_array()) {
        errors.push("Features must be an array".to_string());
    }

    if present("tags").is_some_and(|v| !v.is_array()) {
        errors.push("Tags must be an array".to_string());
    }

    for field in ["repository", "documentation"] {
        if let Some(value) = present(field) {
            if !value.as_str().is_some_and(is_valid_url) {
                errors.push(format!("Invalid {field} URL: {}", display(value)));
            }
        }
    }

    if let Some(value) = present("lastUpdated") {
        if !value.as_str().is_some_and(is_valid_date) {
            errors.push(format!(
                "Invalid date format: {}. Expected YYYY-MM-DD",
                display(value)
            ));
        }
    }

    if let Some(value) = present("id") {
        if !value.as_str().is_some_and(is_valid_id) {
            errors.push(format!(
                "Invalid ID format: {}. Must be lowercase letters, numbers, and hyphens only",
                display(value)
            ));
        }
    }

    errors
}

/// Validate an already typed record
///
/// Typed records always carry valid enum values; the remaining string
/// checks (presence, URLs, date, id) still apply.
pub fn validate_record(record: &ServerRecord) -> Vec<String> {
    match serde_json::to_value(record) {
        Ok(value) => validate(&value),
        Err(e) => vec![format!("Record could not be serialized: {e}")],
    }
}

/// `true` when `value` parses as an absolute URL
pub fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// `true` for a real calendar date written exactly as `YYYY-MM-DD`
pub fn is_valid_date(value: &str) -> bool {
    if !DATE_RE.is_match(value) {
        return false;
    }

    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string() == value)
        .unwrap_or(false)
}

/// `true` for a slug made of lowercase ASCII letters, digits and hyphens
pub fn is_valid_id(value: &str) -> bool {
    ID_RE.is_match(value)
}

fn check_member<T: ClosedSet>(value: Option<&Value>, errors: &mut Vec<String>) {
    let Some(value) = value else {
        return;
    };

    if value.as_str().and_then(T::lookup).is_none() {
        errors.push(format!(
            "Invalid {}: {}. Must be one of: {}",
            T::FIELD,
            display(value),
            T::valid_values()
        ));
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
