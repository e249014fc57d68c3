//! # handyboard-core
//!
//! Presentation helpers for the handyboard job marketplace, where
//! homeowners post jobs and handymen apply, make offers and file reports.
//!
//! This library provides:
//! - User-facing messages for caught errors and validation payloads
//! - Relative time formatting for offer expiry, postings and start dates
//! - Toast notification presets
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust
//! use handyboard_core::errors::format_error_value;
//! use handyboard_core::time::{FixedClock, TimeFormatter, Urgency};
//! use chrono::{Duration, FixedOffset, TimeZone, Utc};
//! use serde_json::json;
//!
//! let message = format_error_value(&json!({ "status": 404 }));
//! assert_eq!(message, "The requested resource was not found.");
//!
//! let now = Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap();
//! let formatter = TimeFormatter::new(FixedClock(now), FixedOffset::east_opt(0).unwrap());
//! assert_eq!(formatter.format_time_remaining(now + Duration::minutes(90)), "1h 30m");
//! assert_eq!(formatter.get_time_urgency(now + Duration::minutes(90)), Urgency::Urgent);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use errors::{format_error_message, CaughtError};
pub use time::{IntoMoment, Moment, TimeFormatter, TimeRemaining, Urgency};
pub use toast::{Notifier, Toast, ToastKind};
pub use validation::format_validation_error;

// Public modules
pub mod config;
pub mod error;
pub mod errors;
pub mod logging;
pub mod time;
pub mod toast;
pub mod validation;
