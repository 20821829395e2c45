use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::{Map, Value};

use crate::error::ValidationErrors;

pub const NAME_MAX_CHARS: usize = 255;

const NAME_FIELD: &str = "name";
const COMPLETED_FIELD: &str = "completed";
const COMPLETED_AT_FIELD: &str = "completed_at";

const NAME_REQUIRED: &str = "The name field is required.";
const NAME_NOT_STRING: &str = "The name field must be a string.";
const NAME_TOO_LONG: &str = "The name field must not be greater than 255 characters.";
const COMPLETED_NOT_BOOLEAN: &str = "The completed field must be true or false.";
const COMPLETED_AT_NOT_DATE: &str = "The completed at field must be a valid date.";

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// A validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    name: String,
}

impl NewItem {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = match fields.get(NAME_FIELD) {
            None => {
                errors.add(NAME_FIELD, NAME_REQUIRED);
                None
            }
            Some(value) => name_from_value(value, &mut errors),
        };
        errors.into_result(Self {
            name: name.unwrap_or_default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A validated partial update. `None` leaves a column untouched; for
/// `completed_at`, `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChanges {
    name: Option<String>,
    completed: Option<bool>,
    completed_at: Option<Option<DateTimeWithTimeZone>>,
}

impl ItemChanges {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = fields
            .get(NAME_FIELD)
            .and_then(|value| name_from_value(value, &mut errors));
        let completed = fields
            .get(COMPLETED_FIELD)
            .and_then(|value| completed_from_value(value, &mut errors));
        let completed_at = fields
            .get(COMPLETED_AT_FIELD)
            .and_then(|value| completed_at_from_value(value, &mut errors));

        errors.into_result(Self {
            name,
            completed,
            completed_at,
        })
    }

    pub fn into_parts(
        self,
    ) -> (
        Option<String>,
        Option<bool>,
        Option<Option<DateTimeWithTimeZone>>,
    ) {
        (self.name, self.completed, self.completed_at)
    }
}

fn name_from_value(value: &Value, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        Value::Null => {
            errors.add(NAME_FIELD, NAME_REQUIRED);
            None
        }
        Value::String(name) => check_name(name, errors),
        _ => {
            errors.add(NAME_FIELD, NAME_NOT_STRING);
            None
        }
    }
}

fn check_name(raw: &str, errors: &mut ValidationErrors) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(NAME_FIELD, NAME_REQUIRED);
        return None;
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        errors.add(NAME_FIELD, NAME_TOO_LONG);
        return None;
    }
    Some(trimmed.to_string())
}

fn completed_from_value(value: &Value, errors: &mut ValidationErrors) -> Option<bool> {
    let parsed = match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(raw) => match raw.trim() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    if parsed.is_none() {
        errors.add(COMPLETED_FIELD, COMPLETED_NOT_BOOLEAN);
    }
    parsed
}

fn completed_at_from_value(
    value: &Value,
    errors: &mut ValidationErrors,
) -> Option<Option<DateTimeWithTimeZone>> {
    match value {
        Value::Null => Some(None),
        Value::String(raw) if raw.trim().is_empty() => Some(None),
        Value::String(raw) => match parse_timestamp(raw) {
            Some(ts) => Some(Some(ts)),
            None => {
                errors.add(COMPLETED_AT_FIELD, COMPLETED_AT_NOT_DATE);
                None
            }
        },
        _ => {
            errors.add(COMPLETED_AT_FIELD, COMPLETED_AT_NOT_DATE);
            None
        }
    }
}

/// RFC 3339, or a naive date/datetime taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTimeWithTimeZone> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}
