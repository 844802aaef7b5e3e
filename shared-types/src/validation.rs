//! Field rules for contact payloads.
//!
//! The server runs these on raw JSON bodies and the client runs them on its
//! form state before submitting, so both sides reject the same input with
//! the same messages.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use ts_rs::TS;

use crate::contact::{NewContact, UpdateContactRequest};

pub const NAME_REQUIRED: &str = "Name is required";
pub const PHONE_REQUIRED: &str = "Phone is required";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const REQUIRED: &str = "Required";

const EMAIL_PATTERN: &str =
    r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", summarize(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn is_valid_email(value: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

    !value.starts_with('.') && !value.contains("..") && re.is_match(value)
}

/// Validates a body for `POST /api/contacts`.
pub fn validate_create(payload: &Value) -> Result<NewContact, ValidationErrors> {
    let body = as_object(payload)?;
    let mut errors = ValidationErrors::default();

    let name = errors.check(
        "name",
        text(body, "name")
            .and_then(required)
            .and_then(|s| non_empty(s, NAME_REQUIRED)),
    );
    let email = errors.check(
        "email",
        text(body, "email").and_then(required).and_then(email_format),
    );
    let phone = errors.check(
        "phone",
        text(body, "phone")
            .and_then(required)
            .and_then(|s| non_empty(s, PHONE_REQUIRED)),
    );
    let address = errors.check("address", text(body, "address"));
    let company = errors.check("company", text(body, "company"));
    let job_title = errors.check("jobTitle", text(body, "jobTitle"));
    let is_favorite = errors.check("isFavorite", boolean(body, "isFavorite"));

    match (name, email, phone, address, company, job_title, is_favorite) {
        (
            Some(name),
            Some(email),
            Some(phone),
            Some(address),
            Some(company),
            Some(job_title),
            Some(is_favorite),
        ) if errors.is_empty() => Ok(NewContact {
            name,
            email,
            phone,
            address,
            company,
            job_title,
            is_favorite: is_favorite.unwrap_or(false),
        }),
        _ => Err(errors),
    }
}

/// Validates a body for `PUT /api/contacts/{id}`. Every field is optional;
/// supplied fields follow the creation rules.
pub fn validate_update(payload: &Value) -> Result<UpdateContactRequest, ValidationErrors> {
    let body = as_object(payload)?;
    let mut errors = ValidationErrors::default();

    let name = errors.check(
        "name",
        text(body, "name").and_then(|o| o.map(|s| non_empty(s, NAME_REQUIRED)).transpose()),
    );
    let email = errors.check(
        "email",
        text(body, "email").and_then(|o| o.map(email_format).transpose()),
    );
    let phone = errors.check(
        "phone",
        text(body, "phone").and_then(|o| o.map(|s| non_empty(s, PHONE_REQUIRED)).transpose()),
    );
    let address = errors.check("address", text(body, "address"));
    let company = errors.check("company", text(body, "company"));
    let job_title = errors.check("jobTitle", text(body, "jobTitle"));
    let is_favorite = errors.check("isFavorite", boolean(body, "isFavorite"));

    match (name, email, phone, address, company, job_title, is_favorite) {
        (
            Some(name),
            Some(email),
            Some(phone),
            Some(address),
            Some(company),
            Some(job_title),
            Some(is_favorite),
        ) if errors.is_empty() => Ok(UpdateContactRequest {
            name,
            email,
            phone,
            address,
            company,
            job_title,
            is_favorite,
        }),
        _ => Err(errors),
    }
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    match payload {
        Value::Object(body) => Ok(body),
        other => {
            let mut errors = ValidationErrors::default();
            errors.add("body", type_mismatch("object", other));
            Err(errors)
        }
    }
}

fn text(body: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match body.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(type_mismatch("string", other)),
    }
}

fn boolean(body: &Map<String, Value>, key: &str) -> Result<Option<bool>, String> {
    match body.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(type_mismatch("boolean", other)),
    }
}

fn required<T>(value: Option<T>) -> Result<T, String> {
    value.ok_or_else(|| REQUIRED.to_string())
}

fn non_empty(value: String, message: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(message.to_string())
    } else {
        Ok(value)
    }
}

fn email_format(value: String) -> Result<String, String> {
    if is_valid_email(&value) {
        Ok(value)
    } else {
        Err(INVALID_EMAIL.to_string())
    }
}

fn type_mismatch(expected: &str, received: &Value) -> String {
    let received = match received {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("Expected {}, received {}", expected, received)
}
