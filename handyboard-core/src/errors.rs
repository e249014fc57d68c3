//! User-facing messages for caught errors.
//!
//! A raw caught value (HTTP client error, thrown object, anything) is
//! classified once into a [`CaughtError`]. [`format_error_message`] then maps
//! that classification to one sentence that is safe to put in a banner or a
//! toast. The mapping is total: every input produces a non-empty string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
pub const NETWORK_MESSAGE: &str = "Unable to connect. Please check your internet connection.";
pub const CANCELLED_MESSAGE: &str = "Request was cancelled.";
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";

const TIMEOUT_MARKERS: &[&str] = &["timed out", "timeout", "Timeout"];
const NETWORK_MARKERS: &[&str] = &["network", "Network", "fetch", "Failed to fetch", "NetworkError"];
const ABORT_MARKERS: &[&str] = &["abort", "Abort"];

/// Three-digit status code at the start of a message, e.g. "404 Not Found"
static LEADING_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{3})\b").expect("leading status regex is valid"));

/// Markers of messages that leak implementation details
static TECHNICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)HTTP|JSON|parse|undefined|null|TypeError|ReferenceError|SyntaxError")
        .expect("technical pattern regex is valid")
});

/// A caught error, classified at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CaughtError {
    /// The server answered with an error status
    Http {
        status: u16,
        status_text: Option<String>,
        /// Client-side description, e.g. "Request failed with status code 504"
        message: Option<String>,
    },
    /// The request exceeded its deadline
    Timeout { message: String },
    /// Any error object carrying a message
    Generic { message: String },
    /// A thrown value with no recognizable error shape
    Unknown(Value),
}

impl CaughtError {
    /// Classify a raw caught value by its shape.
    ///
    /// Objects named `TimeoutError` are timeouts. Objects with a whole-number
    /// `status`, `statusCode` or `response.status` are HTTP errors. Objects
    /// with a string `message` are generic errors. Everything else
    /// (strings, numbers, null, arrays, bare objects) is unknown.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::Unknown(value.clone());
        };

        let message = map.get("message").and_then(Value::as_str);

        if map.get("name").and_then(Value::as_str) == Some("TimeoutError") {
            return Self::Timeout {
                message: message.unwrap_or_default().to_string(),
            };
        }

        if let Some(status) = status_code(map) {
            return Self::Http {
                status,
                status_text: map
                    .get("statusText")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                message: message.map(str::to_string),
            };
        }

        match message {
            Some(message) => Self::Generic {
                message: message.to_string(),
            },
            None => Self::Unknown(value.clone()),
        }
    }

    /// Classify JSON-encoded text; text that is not JSON is a thrown string
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::Unknown(Value::String(raw.to_string())),
        }
    }

    /// Wrap any `std::error::Error` as a generic error
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::Generic {
            message: err.to_string(),
        }
    }

    /// Short name of the classification, used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            CaughtError::Http { .. } => "http",
            CaughtError::Timeout { .. } => "timeout",
            CaughtError::Generic { .. } => "generic",
            CaughtError::Unknown(_) => "unknown",
        }
    }
}

fn status_code(map: &Map<String, Value>) -> Option<u16> {
    ["status", "statusCode"]
        .iter()
        .find_map(|key| map.get(*key).and_then(as_status))
        .or_else(|| {
            map.get("response")
                .and_then(|response| response.get("status"))
                .and_then(as_status)
        })
}

/// A JSON number with no fractional part that fits `u16`; `404.0` counts
fn as_status(value: &Value) -> Option<u16> {
    if let Some(code) = value.as_u64() {
        return u16::try_from(code).ok();
    }

    let code = value.as_f64()?;
    if code.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&code) {
        Some(code as u16)
    } else {
        None
    }
}

impl From<&reqwest::Error> for CaughtError {
    fn from(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            CaughtError::Timeout {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            CaughtError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().map(str::to_string),
                message: Some(err.to_string()),
            }
        } else if err.is_connect() {
            CaughtError::Generic {
                message: format!("NetworkError: {}", err),
            }
        } else {
            CaughtError::from_error(err)
        }
    }
}

impl From<reqwest::Error> for CaughtError {
    fn from(err: reqwest::Error) -> Self {
        CaughtError::from(&err)
    }
}

/// Fixed status code table
pub fn status_message(status: u16) -> Option<&'static str> {
    let message = match status {
        400 => "Invalid request. Please check your input.",
        401 => "Session expired. Please log in again.",
        403 => "You don't have permission to perform this action.",
        404 => "The requested resource was not found.",
        409 => "This action conflicts with the current state.",
        422 => "Invalid data. Please check your input.",
        429 => "Too many requests. Please wait a moment and try again.",
        500 => "Server error. Please try again later.",
        502 => "Server is temporarily unavailable. Please try again later.",
        503 => "Service unavailable. Please try again later.",
        504 => "Server took too long to respond. Please try again.",
        _ => return None,
    };
    Some(message)
}

/// Map a caught error to a user-facing sentence.
pub fn format_error_message(error: &CaughtError) -> String {
    let formatted = match error {
        CaughtError::Timeout { .. } => TIMEOUT_MESSAGE.to_string(),
        CaughtError::Http { message, .. } if message.as_deref().is_some_and(mentions_timeout) => {
            TIMEOUT_MESSAGE.to_string()
        }
        CaughtError::Http { status, .. } => status_message(*status)
            .unwrap_or(GENERIC_MESSAGE)
            .to_string(),
        CaughtError::Generic { message } => message_for(message),
        CaughtError::Unknown(_) => UNEXPECTED_MESSAGE.to_string(),
    };

    tracing::debug!(kind = error.kind(), text = %formatted, "Formatted caught error");
    formatted
}

/// Classify and format a raw caught value
pub fn format_error_value(value: &Value) -> String {
    format_error_message(&CaughtError::from_value(value))
}

/// Classify and format a JSON-encoded caught value.
///
/// Text that is not valid JSON is treated as a thrown string.
pub fn format_error_json(raw: &str) -> String {
    format_error_message(&CaughtError::from_json(raw))
}

fn contains_any(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| message.contains(marker))
}

fn has_url(message: &str) -> bool {
    message.contains("http://") || message.contains("https://")
}

// URL-bearing messages skip this check and are re-labelled by
// `url_message_label`, so "TimeoutError: http://..." and
// "Request timed out at http://..." differ.
fn mentions_timeout(message: &str) -> bool {
    !has_url(message) && contains_any(message, TIMEOUT_MARKERS)
}

fn message_for(message: &str) -> String {
    if message.trim().is_empty() {
        return UNEXPECTED_MESSAGE.to_string();
    }

    if mentions_timeout(message) {
        return TIMEOUT_MESSAGE.to_string();
    }

    if contains_any(message, NETWORK_MARKERS) {
        return NETWORK_MESSAGE.to_string();
    }

    if contains_any(message, ABORT_MARKERS) {
        return CANCELLED_MESSAGE.to_string();
    }

    if has_url(message) {
        return url_message_label(message).to_string();
    }

    if let Some(text) = LEADING_STATUS
        .captures(message)
        .and_then(|caps| caps[1].parse::<u16>().ok())
        .and_then(status_message)
    {
        return text.to_string();
    }

    if !TECHNICAL.is_match(message) {
        return message.to_string();
    }

    tracing::trace!(raw = message, "Technical error message hidden from user");
    UNEXPECTED_MESSAGE.to_string()
}

/// Pick a message from the label before the first colon; the URL itself is dropped
fn url_message_label(message: &str) -> &'static str {
    let label = message
        .split(':')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if label.contains("timeout") {
        TIMEOUT_MESSAGE
    } else if label.contains("network") {
        NETWORK_MESSAGE
    } else {
        GENERIC_MESSAGE
    }
}
