//! Toast notification presets.
//!
//! Screens never build toasts by hand: they call one of the helpers below,
//! which fills in a fixed title, message and icon and hands the result to a
//! [`Notifier`]. Rendering is the notifier's business.

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ToastConfig;
use crate::error::Result;
use crate::errors::{format_error_message, CaughtError};
use crate::validation::{format_validation_body, format_validation_error};

/// Visual style of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
        }
    }

    /// Default icon name for this kind
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "checkmark-circle",
            ToastKind::Error => "alert-circle",
            ToastKind::Info => "information-circle",
            ToastKind::Warning => "warning",
        }
    }
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    pub icon: &'static str,
}

impl Toast {
    pub fn new(kind: ToastKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: None,
            icon: kind.icon(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = icon;
        self
    }
}

/// Something that can display a toast
pub trait Notifier {
    fn notify(&self, toast: Toast);
}

/// Emits toasts as tracing events
#[derive(Debug)]
pub struct LogNotifier {
    enabled: bool,
    emitted: AtomicUsize,
}

impl LogNotifier {
    pub fn new(config: &ToastConfig) -> Self {
        Self {
            enabled: config.enabled,
            emitted: AtomicUsize::new(0),
        }
    }

    /// Number of toasts emitted so far; dropped toasts are not counted
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        if !self.enabled {
            tracing::trace!(title = %toast.title, "Toast dropped (disabled)");
            return;
        }

        self.emitted.fetch_add(1, Ordering::Relaxed);
        let message = toast.message.as_deref().unwrap_or_default();
        match toast.kind {
            ToastKind::Error | ToastKind::Warning => tracing::warn!(
                kind = toast.kind.as_str(),
                icon = toast.icon,
                title = %toast.title,
                body = message,
                "Toast"
            ),
            ToastKind::Success | ToastKind::Info => tracing::info!(
                kind = toast.kind.as_str(),
                icon = toast.icon,
                title = %toast.title,
                body = message,
                "Toast"
            ),
        }
    }
}

fn show(notifier: &dyn Notifier, kind: ToastKind, title: &str, message: Option<&str>) {
    let mut toast = Toast::new(kind, title);
    toast.message = message.map(str::to_string);
    notifier.notify(toast);
}

pub fn show_success(notifier: &dyn Notifier, title: &str, message: Option<&str>) {
    show(notifier, ToastKind::Success, title, message);
}

pub fn show_error(notifier: &dyn Notifier, title: &str, message: Option<&str>) {
    show(notifier, ToastKind::Error, title, message);
}

pub fn show_info(notifier: &dyn Notifier, title: &str, message: Option<&str>) {
    show(notifier, ToastKind::Info, title, message);
}

pub fn show_warning(notifier: &dyn Notifier, title: &str, message: Option<&str>) {
    show(notifier, ToastKind::Warning, title, message);
}

const VALIDATION_TITLE: &str = "Please fix the form";

/// Error toast whose body is the user-facing message for `error`.
///
/// Returns the message that was shown.
pub fn show_caught_error(notifier: &dyn Notifier, error: &CaughtError) -> String {
    let message = format_error_message(error);
    show_error(notifier, "Error", Some(&message));
    message
}

/// Error toast for a validation payload; returns the message shown
pub fn show_validation_error(notifier: &dyn Notifier, payload: &Value) -> Result<String> {
    let message = format_validation_error(payload)?;
    show_error(notifier, VALIDATION_TITLE, Some(&message));
    Ok(message)
}

/// [`show_validation_error`] for a raw response body
pub fn show_validation_body(notifier: &dyn Notifier, body: &str) -> Result<String> {
    let message = format_validation_body(body)?;
    show_error(notifier, VALIDATION_TITLE, Some(&message));
    Ok(message)
}

pub fn job_posted(notifier: &dyn Notifier) {
    show_success(
        notifier,
        "Job posted",
        Some("Handymen in your area can now apply."),
    );
}

pub fn application_sent(notifier: &dyn Notifier) {
    show_success(
        notifier,
        "Application sent",
        Some("The homeowner will be notified."),
    );
}

pub fn offer_sent(notifier: &dyn Notifier) {
    show_success(notifier, "Offer sent", Some("We'll let you know when they respond."));
}

pub fn offer_accepted(notifier: &dyn Notifier) {
    show_success(notifier, "Offer accepted", Some("The job has been added to your schedule."));
}

pub fn profile_updated(notifier: &dyn Notifier) {
    show_success(notifier, "Profile updated", None);
}

pub fn report_submitted(notifier: &dyn Notifier) {
    show_success(
        notifier,
        "Report submitted",
        Some("Your daily report has been sent to the homeowner."),
    );
}

pub fn reimbursement_submitted(notifier: &dyn Notifier) {
    show_success(
        notifier,
        "Reimbursement submitted",
        Some("You'll be notified once it is reviewed."),
    );
}

pub fn copied_to_clipboard(notifier: &dyn Notifier) {
    notifier.notify(Toast::new(ToastKind::Info, "Copied").with_icon("copy"));
}
