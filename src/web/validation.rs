//! Request body and path validation for the people API.
//!
//! Failures are collected into [`ValidationIssue`]s so a single 422 response
//! can report every problem with its location.

use crate::web::error::{ApiError, ValidationIssue};
use serde_json::{Map, Value};
use uuid::Uuid;

const OBJECT_MSG: &str = "Input should be a valid dictionary or object to extract fields from";

/// Fields of the `payload` object on `PUT /people/{id}`. Both keys must be
/// present; either may be `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonUpdatePayload {
    pub display_name: Option<String>,
    pub discord_id: Option<i64>,
}

pub fn parse_person_update(body: &[u8]) -> Result<PersonUpdatePayload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Validation(vec![ValidationIssue::missing(&[
            "body", "payload",
        ])]));
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        ApiError::Validation(vec![ValidationIssue::new(
            "json_invalid",
            &["body"],
            &format!("Invalid JSON: {}", e),
        )])
    })?;

    let body = value.as_object().ok_or_else(|| {
        ApiError::Validation(vec![ValidationIssue::new(
            "model_attributes_type",
            &["body"],
            OBJECT_MSG,
        )])
    })?;

    let payload = match body.get("payload") {
        None => {
            return Err(ApiError::Validation(vec![ValidationIssue::missing(&[
                "body", "payload",
            ])]))
        }
        Some(Value::Object(payload)) => payload,
        Some(_) => {
            return Err(ApiError::Validation(vec![ValidationIssue::new(
                "model_attributes_type",
                &["body", "payload"],
                OBJECT_MSG,
            )]))
        }
    };

    let mut issues = Vec::new();
    let display_name = nullable_string(payload, "display_name", &mut issues);
    let discord_id = nullable_int(payload, "discord_id", &mut issues);

    if !issues.is_empty() {
        return Err(ApiError::Validation(issues));
    }

    Ok(PersonUpdatePayload {
        display_name,
        discord_id,
    })
}

fn nullable_string(
    payload: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    let loc = ["body", "payload", field];
    match payload.get(field) {
        None => {
            issues.push(ValidationIssue::missing(&loc));
            None
        }
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issues.push(ValidationIssue::new(
                "string_type",
                &loc,
                "Input should be a valid string",
            ));
            None
        }
    }
}

fn nullable_int(
    payload: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<i64> {
    let loc = ["body", "payload", field];
    match payload.get(field) {
        None => {
            issues.push(ValidationIssue::missing(&loc));
            None
        }
        Some(Value::Null) => None,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Some(i),
            None => {
                issues.push(ValidationIssue::new(
                    "int_type",
                    &loc,
                    "Input should be a valid integer",
                ));
                None
            }
        },
        // Numeric strings are accepted, matching lax integer parsing.
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Some(i),
            Err(_) => {
                issues.push(ValidationIssue::new(
                    "int_parsing",
                    &loc,
                    "Input should be a valid integer, unable to parse string as an integer",
                ));
                None
            }
        },
        Some(_) => {
            issues.push(ValidationIssue::new(
                "int_type",
                &loc,
                "Input should be a valid integer",
            ));
            None
        }
    }
}

pub fn parse_person_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::Validation(vec![ValidationIssue::new(
            "uuid_parsing",
            &["path", "person_id"],
            "Input should be a valid UUID",
        )])
    })
}

pub fn parse_discord_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        ApiError::Validation(vec![ValidationIssue::new(
            "int_parsing",
            &["path", "discord_id"],
            "Input should be a valid integer, unable to parse string as an integer",
        )])
    })
}
