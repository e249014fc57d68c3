//! handyboard - format API errors and timestamps from the command line
//!
//! Runs the same formatters the app screens use, which is handy when
//! checking what a user will see for a given backend response or deadline.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/handyboard/config.toml (~/.config/handyboard/config.toml)
//! - Logs: $XDG_STATE_HOME/handyboard/ (~/.local/state/handyboard/)

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use handyboard_core::config::parse_utc_offset;
use handyboard_core::time::FixedClock;
use handyboard_core::toast::{self, LogNotifier};
use handyboard_core::{
    CaughtError, Config, Error, Moment, TimeFormatter, TimeRemaining, Toast, ToastKind, Urgency,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "handyboard")]
#[command(about = "Format API errors and timestamps the way the app shows them")]
#[command(version)]
struct Args {
    /// Freeze "now" at this timestamp (RFC 3339, zone-less local time or YYYY-MM-DD)
    #[arg(long, global = true)]
    now: Option<String>,

    /// UTC offset for calendar days, e.g. +02:00 (default: config, then local)
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Map a caught error (JSON, or any text as a thrown string) to a message
    Error {
        /// e.g. '{"status": 404}' or '{"message": "Network request failed"}'
        payload: String,
    },

    /// Reduce a validation error body to one line
    Validation {
        /// e.g. '{"errors": {"email": ["Invalid email format"]}}'
        payload: String,
    },

    /// Time left until an expiry, with its urgency
    Remaining {
        /// Expiry timestamp
        expiry: String,
    },

    /// "Posted X ago" for a timestamp
    Posted {
        /// Posting timestamp
        date: String,
    },

    /// "Starts on" label for a preferred start date
    Starts {
        /// Start date
        date: String,
    },
}

#[derive(Serialize)]
struct ErrorReport {
    kind: &'static str,
    message: String,
    toast: Toast,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemainingReport {
    #[serde(flatten)]
    remaining: TimeRemaining,
    formatted: String,
    urgency: Urgency,
}

#[derive(Serialize)]
struct TextReport {
    text: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        handyboard_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let notifier = LogNotifier::new(&config.toast);

    let offset = match args.utc_offset.as_deref() {
        Some(raw) => parse_utc_offset(raw).context("invalid --utc-offset")?,
        None => config.time.offset().context("invalid [time] configuration")?,
    };

    let now = match args.now.as_deref() {
        Some(raw) => Moment::parse(raw, offset)
            .instant()
            .ok_or_else(|| Error::InvalidTimestamp(raw.to_string()))
            .context("invalid --now")?,
        None => Utc::now(),
    };

    let formatter = TimeFormatter::new(FixedClock(now), offset);

    tracing::debug!(now = %now, offset = %offset, "Formatter ready");

    match args.command {
        Command::Error { payload } => {
            let caught = CaughtError::from_json(&payload);
            let message = toast::show_caught_error(&notifier, &caught);

            if args.format == OutputFormat::Json {
                let report = ErrorReport {
                    kind: caught.kind(),
                    toast: Toast::new(ToastKind::Error, "Error").with_message(message.clone()),
                    message,
                };
                print_json(&report)?;
            } else {
                println!("{}", message);
            }
        }

        Command::Validation { payload } => {
            let message = toast::show_validation_body(&notifier, &payload)
                .context("cannot format validation payload")?;

            output_text(args.format, message)?;
        }

        Command::Remaining { expiry } => {
            let expiry = formatter.parse(&expiry);
            let remaining = formatter.get_time_remaining(expiry);
            let formatted = formatter.format_time_remaining(expiry);
            let urgency = Urgency::from_remaining(&remaining);

            if urgency == Urgency::Urgent {
                toast::show_warning(&notifier, "Offer expiring soon", Some(&formatted));
            }

            if args.format == OutputFormat::Json {
                print_json(&RemainingReport {
                    remaining,
                    formatted,
                    urgency,
                })?;
            } else {
                println!("{} ({})", formatted, urgency);
            }
        }

        Command::Posted { date } => {
            output_text(args.format, formatter.format_offer_date(date.as_str()))?;
        }

        Command::Starts { date } => {
            output_text(
                args.format,
                formatter.format_preferred_start_date(date.as_str()),
            )?;
        }
    }

    tracing::debug!(toasts = notifier.emitted(), "Done");

    Ok(())
}

fn output_text(format: OutputFormat, text: String) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&TextReport { text }),
        OutputFormat::Text => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", rendered);
    Ok(())
}
