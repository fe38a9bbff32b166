//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Field rules applied to raw JSON request bodies

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use ::validator::ValidateEmail;

use super::error::{messages, FieldErrors, NON_FIELD_ERRORS};
use crate::model::EntityId;

const EMAIL_DOMAIN_ALLOWLIST: &[&str] = &["localhost"];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Check an address against the accepted email grammar.
///
/// On top of the `validator` check, the local part must be dot-separated
/// atoms and the domain must be qualified, an address literal, or allowlisted.
pub fn is_valid_email(value: &str) -> bool {
    if !value.validate_email() {
        return false;
    }
    let Some((user, domain)) = value.rsplit_once('@') else {
        return false;
    };
    let dotted_atoms = user.split('.').all(|atom| !atom.is_empty());
    let qualified = EMAIL_DOMAIN_ALLOWLIST.contains(&domain)
        || domain.starts_with('[')
        || domain.trim_end_matches('.').contains('.');
    dotted_atoms && qualified
}

/// Parse an ISO 8601 date-time. Values without an offset are taken as UTC.
/// Precision is kept to the microsecond.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let parsed = DateTime::parse_from_rfc3339(value)
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(value, format).ok())
        })
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
                .map(|naive| naive.and_utc())
        })?;
    Some(parsed.trunc_subsecs(6))
}

/// Python-style type name used in client-facing type errors
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Whether a write creates a record or partially updates one.
///
/// Required fields are only enforced on create; an update leaves every
/// field it does not name untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// Constraints on a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRule {
    pub max_len: usize,
    /// Required fields may be neither absent on create nor blank
    pub required: bool,
}

impl TextRule {
    pub const fn required(max_len: usize) -> Self {
        Self {
            max_len,
            required: true,
        }
    }

    pub const fn optional(max_len: usize) -> Self {
        Self {
            max_len,
            required: false,
        }
    }
}

/// Reads typed fields out of a JSON body, collecting every failure.
///
/// Fields the caller never asks for are ignored, which is how unknown
/// and read-only fields such as `id` are dropped.
pub struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    mode: WriteMode,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(value: &'a Value, mode: WriteMode) -> Self {
        let mut errors = FieldErrors::new();
        let object = match value {
            Value::Object(map) => Some(map),
            other => {
                errors.add(
                    NON_FIELD_ERRORS,
                    messages::expected_dictionary(json_type_name(other)),
                );
                None
            }
        };
        Self {
            object,
            mode,
            errors,
        }
    }

    pub fn finish(self) -> FieldErrors {
        self.errors
    }

    fn raw(&mut self, field: &str, required: bool) -> Option<&'a Value> {
        let object = self.object?;
        let value = object.get(field);
        if value.is_none() && required && self.mode == WriteMode::Create {
            self.errors.add(field, messages::REQUIRED);
        }
        value
    }

    /// Text field, trimmed. Numbers are accepted and kept as their text.
    pub fn text(&mut self, field: &str, rule: TextRule) -> Option<String> {
        let text = match self.raw(field, rule.required)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null => {
                self.errors.add(field, messages::NULL);
                return None;
            }
            _ => {
                self.errors.add(field, messages::NOT_A_STRING);
                return None;
            }
        };

        if text.is_empty() && rule.required {
            self.errors.add(field, messages::BLANK);
            return None;
        }
        if text.chars().count() > rule.max_len {
            self.errors.add(field, messages::max_length(rule.max_len));
            return None;
        }
        Some(text)
    }

    /// Required, well-formed email address
    pub fn email(&mut self, field: &str, max_len: usize) -> Option<String> {
        let email = self.text(field, TextRule::required(usize::MAX))?;
        let mut valid = true;
        if email.chars().count() > max_len {
            self.errors.add(field, messages::max_length(max_len));
            valid = false;
        }
        if !is_valid_email(&email) {
            self.errors.add(field, messages::INVALID_EMAIL);
            valid = false;
        }
        valid.then_some(email)
    }

    /// Calendar date in `YYYY-MM-DD` form
    pub fn date(&mut self, field: &str, required: bool) -> Option<NaiveDate> {
        let value = self.raw(field, required)?;
        let parsed = match value {
            Value::Null => {
                self.errors.add(field, messages::NULL);
                return None;
            }
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(field, messages::INVALID_DATE);
        }
        parsed
    }

    /// ISO 8601 date-time, see [`parse_datetime`]
    pub fn datetime(&mut self, field: &str, required: bool) -> Option<DateTime<Utc>> {
        let value = self.raw(field, required)?;
        let parsed = match value {
            Value::Null => {
                self.errors.add(field, messages::NULL);
                return None;
            }
            Value::String(s) => parse_datetime(s),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(field, messages::INVALID_DATETIME);
        }
        parsed
    }

    /// Reference to another record by bare id.
    ///
    /// Returns `Some(None)` for an explicit null on a nullable reference.
    /// Existence of the target is checked later against the store.
    pub fn reference(
        &mut self,
        field: &str,
        required: bool,
        nullable: bool,
    ) -> Option<Option<EntityId>> {
        let value = self.raw(field, required)?;
        let id = match value {
            Value::Null if nullable => return Some(None),
            Value::Null => {
                self.errors.add(field, messages::NULL);
                return None;
            }
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<EntityId>().ok(),
            _ => None,
        };
        match id {
            Some(id) => Some(Some(id)),
            None => {
                self.errors
                    .add(field, messages::incorrect_pk_type(json_type_name(value)));
                None
            }
        }
    }
}
