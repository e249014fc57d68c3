//! Validation error payloads from the backend, reduced to one readable line.
//!
//! Payloads look like `{ "message": ..., "errors": { field: [msgs] } }`, where
//! a field may instead hold a nested map (per-subtask errors or
//! `non_field_errors`). Field order is the order the server sent.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

pub const VALIDATION_FALLBACK: &str = "Please check your input and try again.";

const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Format a validation payload as `"<Field label>: <message>"`.
///
/// The first field (in payload order) with a non-empty error list wins. A
/// null payload is an error; other non-object payloads get the fallback.
pub fn format_validation_error(payload: &Value) -> Result<String> {
    if payload.is_null() {
        return Err(Error::MissingPayload);
    }

    if let Some(line) = payload
        .get("errors")
        .and_then(Value::as_object)
        .and_then(first_field_error)
    {
        return Ok(line);
    }

    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        if !message.is_empty() && !message.to_lowercase().contains("validation") {
            return Ok(message.to_string());
        }
    }

    tracing::debug!("No usable field error in validation payload");
    Ok(VALIDATION_FALLBACK.to_string())
}

/// Parse a raw response body, then format it
pub fn format_validation_body(body: &str) -> Result<String> {
    let payload: Value = serde_json::from_str(body)?;
    format_validation_error(&payload)
}

fn first_field_error(errors: &Map<String, Value>) -> Option<String> {
    for (field, value) in errors {
        if let Some(first) = first_message(value) {
            return Some(format!("{}: {}", field_label(field), first));
        }

        let Some(nested) = value.as_object() else {
            continue;
        };

        for (key, inner) in nested {
            if let Some(first) = first_message(inner) {
                if key == NON_FIELD_ERRORS {
                    return Some(format!("Error: {}", first));
                }
                return Some(format!("{}: {}", field_label(key), first));
            }
        }
    }
    None
}

/// First entry of a non-empty error list
fn first_message(value: &Value) -> Option<String> {
    let first = value.as_array()?.first()?;
    Some(match first {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

/// Display name for a form field key
pub fn field_label(key: &str) -> String {
    let known = match key {
        "title" => "Title",
        "description" => "Description",
        "estimated_budget" => "Estimated budget",
        "category_id" => "Category",
        "city_id" => "City",
        "address" => "Address",
        "postal_code" => "Postal code",
        "tasks" => "Tasks",
        "images" => "Images",
        "email" => "Email",
        "password" => "Password",
        "phone" => "Phone number",
        "name" => "Name",
        "first_name" => "First name",
        "last_name" => "Last name",
        _ => return title_case(key),
    };
    known.to_string()
}

/// `snake_case_key` → `Snake Case Key`
fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
