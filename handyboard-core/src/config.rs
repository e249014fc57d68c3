//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/handyboard/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/handyboard/` (~/.config/handyboard/)
//! - State/Logs: `$XDG_STATE_HOME/handyboard/` (~/.local/state/handyboard/)

use crate::error::{Error, Result};
use chrono::{FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Log files are `handyboard.YYYY-MM-DD.log`
pub const LOG_FILE_PREFIX: &str = "handyboard";
pub const LOG_FILE_SUFFIX: &str = "log";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Calendar settings for date formatting
    #[serde(default)]
    pub time: TimeConfig,

    /// Toast notification settings
    #[serde(default)]
    pub toast: ToastConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Calendar settings
///
/// Relative dates ("Today", "Tomorrow", weekday names) depend on which
/// calendar day "now" falls on, so the formatter needs a fixed UTC offset.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct TimeConfig {
    /// UTC offset such as `"+02:00"`, `"-05:30"` or `"Z"`.
    /// Falls back to the machine's local offset when unset.
    pub utc_offset: Option<String>,
}

impl TimeConfig {
    /// Resolve the configured offset, or the local one if none is set
    pub fn offset(&self) -> Result<FixedOffset> {
        match self.utc_offset.as_deref() {
            Some(raw) => parse_utc_offset(raw),
            None => Ok(Local::now().offset().fix()),
        }
    }
}

/// Parse `Z`, `+HH:MM`, `-HH:MM` or `+HHMM` into a fixed offset
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    let invalid = || Error::Config(format!("invalid utc_offset {:?}, expected +HH:MM", raw));

    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Toast notification settings
#[derive(Debug, Deserialize, Clone)]
pub struct ToastConfig {
    /// When false, the logging notifier drops toasts instead of emitting them
    #[serde(default = "default_toast_enabled")]
    pub enabled: bool,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            enabled: default_toast_enabled(),
        }
    }
}

fn default_toast_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        // Surface a bad offset at load time rather than on first format call
        config.time.offset()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/handyboard/config.toml` (~/.config/handyboard/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("handyboard").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/handyboard/` (~/.local/state/handyboard/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("handyboard")
    }

    /// Returns today's log file path
    ///
    /// `$XDG_STATE_HOME/handyboard/handyboard.YYYY-MM-DD.log`. Files roll over
    /// on UTC dates, so this is the file being written right now.
    pub fn log_path() -> PathBuf {
        Self::log_path_on(Utc::now().date_naive())
    }

    /// Log file written on `date` (UTC)
    pub fn log_path_on(date: NaiveDate) -> PathBuf {
        Self::state_dir().join(format!(
            "{}.{}.{}",
            LOG_FILE_PREFIX,
            date.format("%Y-%m-%d"),
            LOG_FILE_SUFFIX
        ))
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
