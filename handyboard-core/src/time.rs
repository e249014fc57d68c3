//! Relative time formatting for offers, postings and start dates.
//!
//! Every function reads "now" from a [`Clock`], so tests can pin it with
//! [`FixedClock`]. Calendar comparisons ("Today", "Tomorrow", weekday names)
//! use the formatter's fixed UTC offset.
//!
//! String timestamps without a zone are read as wall-clock time in that
//! offset; bare dates are UTC midnight.
//!
//! Unparseable timestamps become [`Moment::Invalid`] and flow through the
//! arithmetic as NaN instead of failing: a remaining-time breakdown of an
//! invalid expiry has NaN fields and is *not* expired.

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use serde::Serialize;
use std::fmt;

use crate::config::TimeConfig;
use crate::error::Result;

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;

const URGENT_MINUTES: f64 = 120.0;
const WARNING_MINUTES: f64 = 1440.0;

pub const EXPIRED_LABEL: &str = "Expired";
pub const INVALID_DATE: &str = "Invalid Date";

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A point in time, or the result of parsing garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    At(DateTime<Utc>),
    Invalid,
}

impl Moment {
    /// Parse an RFC 3339 timestamp, a zone-less `YYYY-MM-DDTHH:MM:SS[.fff]`
    /// (wall-clock time in `offset`) or a bare `YYYY-MM-DD` (UTC midnight).
    pub fn parse(raw: &str, offset: FixedOffset) -> Self {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Moment::At(dt.with_timezone(&Utc));
        }

        for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
                return match offset.from_local_datetime(&naive).single() {
                    Some(local) => Moment::At(local.with_timezone(&Utc)),
                    None => Moment::Invalid,
                };
            }
        }

        if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Moment::At(Utc.from_utc_datetime(&naive));
        }

        tracing::debug!(raw, "Unparseable timestamp");
        Moment::Invalid
    }

    /// The instant, if valid
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Moment::At(dt) => Some(*dt),
            Moment::Invalid => None,
        }
    }

    fn millis(&self) -> f64 {
        match self {
            Moment::At(dt) => dt.timestamp_millis() as f64,
            Moment::Invalid => f64::NAN,
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Moment {
    fn from(dt: DateTime<Tz>) -> Self {
        Moment::At(dt.with_timezone(&Utc))
    }
}

/// Anything a [`TimeFormatter`] accepts as a timestamp.
///
/// Strings are parsed in the formatter's offset, see [`Moment::parse`].
pub trait IntoMoment {
    fn into_moment(self, offset: FixedOffset) -> Moment;
}

impl IntoMoment for Moment {
    fn into_moment(self, _offset: FixedOffset) -> Moment {
        self
    }
}

impl<Tz: TimeZone> IntoMoment for DateTime<Tz> {
    fn into_moment(self, _offset: FixedOffset) -> Moment {
        Moment::from(self)
    }
}

impl IntoMoment for &str {
    fn into_moment(self, offset: FixedOffset) -> Moment {
        Moment::parse(self, offset)
    }
}

/// Time left until an expiry, broken down for display.
///
/// `days`, `hours` and `minutes` carry into each other (1d 1h 1m), while
/// `total_minutes` is the flat count used for urgency thresholds. The
/// fields hold whole numbers; they are `f64` so an invalid expiry can
/// carry NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRemaining {
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
    pub total_minutes: f64,
    pub is_expired: bool,
}

impl TimeRemaining {
    /// The all-zero record for a deadline that has passed
    pub fn expired() -> Self {
        Self {
            days: 0.0,
            hours: 0.0,
            minutes: 0.0,
            total_minutes: 0.0,
            is_expired: true,
        }
    }

    fn from_millis(diff: f64) -> Self {
        if diff <= 0.0 {
            return Self::expired();
        }

        let (day, hour, minute) = (MS_PER_DAY as f64, MS_PER_HOUR as f64, MS_PER_MINUTE as f64);
        Self {
            days: (diff / day).floor(),
            hours: ((diff % day) / hour).floor(),
            minutes: ((diff % hour) / minute).floor(),
            total_minutes: (diff / minute).floor(),
            is_expired: false,
        }
    }
}

/// Urgency bucket for an expiry badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Expired,
    /// Less than two hours left
    Urgent,
    /// Less than a day left
    Warning,
    Normal,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Expired => "expired",
            Urgency::Urgent => "urgent",
            Urgency::Warning => "warning",
            Urgency::Normal => "normal",
        }
    }

    pub fn from_remaining(remaining: &TimeRemaining) -> Self {
        if remaining.is_expired {
            Urgency::Expired
        } else if remaining.total_minutes < URGENT_MINUTES {
            Urgency::Urgent
        } else if remaining.total_minutes < WARNING_MINUTES {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Formats timestamps relative to a clock, in a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct TimeFormatter<C: Clock = SystemClock> {
    clock: C,
    offset: FixedOffset,
}

impl TimeFormatter<SystemClock> {
    /// Wall clock in the machine's local offset
    pub fn system() -> Self {
        Self::new(SystemClock, Local::now().offset().fix())
    }
}

impl Default for TimeFormatter<SystemClock> {
    fn default() -> Self {
        Self::system()
    }
}

impl<C: Clock> TimeFormatter<C> {
    pub fn new(clock: C, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// Use the offset from `[time]` config
    pub fn from_config(clock: C, config: &TimeConfig) -> Result<Self> {
        Ok(Self::new(clock, config.offset()?))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Parse a string timestamp in this formatter's offset
    pub fn parse(&self, raw: &str) -> Moment {
        Moment::parse(raw, self.offset)
    }

    /// Days/hours/minutes left until `expiry`
    pub fn get_time_remaining(&self, expiry: impl IntoMoment) -> TimeRemaining {
        let now = self.now().timestamp_millis() as f64;
        TimeRemaining::from_millis(expiry.into_moment(self.offset).millis() - now)
    }

    /// Compact remaining time: `"2d 3h"`, `"5h 7m"`, `"45m"` or `"Expired"`
    pub fn format_time_remaining(&self, expiry: impl IntoMoment) -> String {
        let remaining = self.get_time_remaining(expiry);

        if remaining.is_expired {
            EXPIRED_LABEL.to_string()
        } else if remaining.days > 0.0 {
            format!("{}d {}h", remaining.days, remaining.hours)
        } else if remaining.hours > 0.0 {
            format!("{}h {}m", remaining.hours, remaining.minutes)
        } else {
            format!("{}m", remaining.minutes)
        }
    }

    pub fn get_time_urgency(&self, expiry: impl IntoMoment) -> Urgency {
        Urgency::from_remaining(&self.get_time_remaining(expiry))
    }

    /// How long ago something was posted: `"Just now"`, `"5m ago"`,
    /// `"3h ago"`, `"Yesterday"`, `"4d ago"`, then a short date.
    pub fn format_offer_date(&self, date: impl IntoMoment) -> String {
        let Some(date) = date.into_moment(self.offset).instant() else {
            return INVALID_DATE.to_string();
        };

        let now = self.now();
        let diff = now.timestamp_millis() - date.timestamp_millis();
        let days = diff.div_euclid(MS_PER_DAY);

        if days < 1 {
            let hours = diff.div_euclid(MS_PER_HOUR);
            if hours >= 1 {
                return format!("{}h ago", hours);
            }
            let minutes = diff.div_euclid(MS_PER_MINUTE);
            return if minutes < 1 {
                "Just now".to_string()
            } else {
                format!("{}m ago", minutes)
            };
        }

        if days == 1 {
            return "Yesterday".to_string();
        }

        if days < 7 {
            return format!("{}d ago", days);
        }

        let local = date.with_timezone(&self.offset);
        if local.year() == now.with_timezone(&self.offset).year() {
            local.format("%b %-d").to_string()
        } else {
            local.format("%b %-d, %Y").to_string()
        }
    }

    /// When a job starts: `"Today"`, `"Tomorrow"`, a weekday name within
    /// the next week, otherwise the full date.
    pub fn format_preferred_start_date(&self, date: impl IntoMoment) -> String {
        let Some(date) = date.into_moment(self.offset).instant() else {
            return INVALID_DATE.to_string();
        };

        let now = self.now();
        let local = date.with_timezone(&self.offset);
        let today = now.with_timezone(&self.offset).date_naive();

        if local.date_naive() == today {
            return "Today".to_string();
        }

        if today.succ_opt() == Some(local.date_naive()) {
            return "Tomorrow".to_string();
        }

        let diff = (date.timestamp_millis() - now.timestamp_millis()) as f64;
        let days_away = (diff / MS_PER_DAY as f64).ceil();

        if days_away > 0.0 && days_away <= 7.0 {
            return local.format("%A").to_string();
        }

        if local.year() == today.year() {
            local.format("%A, %B %-d").to_string()
        } else {
            local.format("%A, %B %-d, %Y").to_string()
        }
    }
}

/// [`TimeFormatter::get_time_remaining`] against the wall clock
pub fn get_time_remaining(expiry: impl IntoMoment) -> TimeRemaining {
    TimeFormatter::system().get_time_remaining(expiry)
}

/// [`TimeFormatter::format_time_remaining`] against the wall clock
pub fn format_time_remaining(expiry: impl IntoMoment) -> String {
    TimeFormatter::system().format_time_remaining(expiry)
}

/// [`TimeFormatter::get_time_urgency`] against the wall clock
pub fn get_time_urgency(expiry: impl IntoMoment) -> Urgency {
    TimeFormatter::system().get_time_urgency(expiry)
}

/// [`TimeFormatter::format_offer_date`] against the wall clock
pub fn format_offer_date(date: impl IntoMoment) -> String {
    TimeFormatter::system().format_offer_date(date)
}

/// [`TimeFormatter::format_preferred_start_date`] against the wall clock
pub fn format_preferred_start_date(date: impl IntoMoment) -> String {
    TimeFormatter::system().format_preferred_start_date(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// Wednesday, 2026-03-11 12:00 UTC
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn formatter() -> TimeFormatter<FixedClock> {
        TimeFormatter::new(FixedClock(now()), utc())
    }

    #[test]
    fn test_remaining_breakdown_carries() {
        let remaining = formatter().get_time_remaining(now() + Duration::milliseconds(90_066_000));
        assert_eq!(remaining.days, 1.0);
        assert_eq!(remaining.hours, 1.0);
        assert_eq!(remaining.minutes, 1.0);
        assert_eq!(remaining.total_minutes, 1501.0);
        assert!(!remaining.is_expired);
    }

    #[test]
    fn test_remaining_expired() {
        let f = formatter();
        assert_eq!(
            f.get_time_remaining(now() - Duration::milliseconds(1)),
            TimeRemaining::expired()
        );
        // Zero difference counts as expired
        assert!(f.get_time_remaining(now()).is_expired);
    }

    #[test]
    fn test_invalid_expiry_propagates_nan() {
        let f = formatter();
        let remaining = f.get_time_remaining("not a date");
        assert!(remaining.days.is_nan());
        assert!(remaining.hours.is_nan());
        assert!(remaining.minutes.is_nan());
        assert!(remaining.total_minutes.is_nan());
        assert!(!remaining.is_expired);

        assert_eq!(f.format_time_remaining("not a date"), "NaNm");
        assert_eq!(f.get_time_urgency("not a date"), Urgency::Normal);
    }

    #[test]
    fn test_format_time_remaining() {
        let f = formatter();
        assert_eq!(
            f.format_time_remaining(now() + Duration::days(2) + Duration::hours(3)),
            "2d 3h"
        );
        assert_eq!(
            f.format_time_remaining(now() + Duration::hours(5) + Duration::minutes(7)),
            "5h 7m"
        );
        assert_eq!(f.format_time_remaining(now() + Duration::minutes(45)), "45m");
        assert_eq!(f.format_time_remaining(now() + Duration::seconds(30)), "0m");
        assert_eq!(f.format_time_remaining(now() - Duration::hours(1)), "Expired");
    }

    #[test]
    fn test_format_matches_breakdown() {
        let f = formatter();
        for offset_ms in [1_000, 59_000, 61_000, 3_600_000, 7_500_000, 90_066_000, 400_000_000] {
            let expiry = now() + Duration::milliseconds(offset_ms);
            let remaining = f.get_time_remaining(expiry);
            let formatted = f.format_time_remaining(expiry);

            let expected = if remaining.days > 0.0 {
                format!("{}d", remaining.days)
            } else if remaining.hours > 0.0 {
                format!("{}h", remaining.hours)
            } else {
                format!("{}m", remaining.minutes)
            };
            assert!(formatted.contains(&expected), "{formatted} vs {expected}");
        }
    }

    #[test]
    fn test_urgency_boundaries() {
        let f = formatter();
        assert_eq!(f.get_time_urgency(now() - Duration::minutes(1)), Urgency::Expired);
        assert_eq!(f.get_time_urgency(now() + Duration::minutes(119)), Urgency::Urgent);
        assert_eq!(f.get_time_urgency(now() + Duration::minutes(120)), Urgency::Warning);
        assert_eq!(f.get_time_urgency(now() + Duration::minutes(1439)), Urgency::Warning);
        assert_eq!(f.get_time_urgency(now() + Duration::minutes(1440)), Urgency::Normal);
    }

    #[test]
    fn test_format_offer_date_recent() {
        let f = formatter();
        assert_eq!(f.format_offer_date(now() - Duration::seconds(30)), "Just now");
        assert_eq!(f.format_offer_date(now() - Duration::minutes(5)), "5m ago");
        assert_eq!(f.format_offer_date(now() - Duration::minutes(59)), "59m ago");
        assert_eq!(f.format_offer_date(now() - Duration::minutes(60)), "1h ago");
        assert_eq!(f.format_offer_date(now() - Duration::hours(3)), "3h ago");
        assert_eq!(f.format_offer_date(now() - Duration::milliseconds(86_400_000)), "Yesterday");
        assert_eq!(f.format_offer_date(now() - Duration::days(3)), "3d ago");
        assert_eq!(f.format_offer_date(now() - Duration::days(6)), "6d ago");
        // Clock skew: a date slightly in the future
        assert_eq!(f.format_offer_date(now() + Duration::minutes(2)), "Just now");
    }

    #[test]
    fn test_format_offer_date_older() {
        let f = formatter();
        assert_eq!(f.format_offer_date(now() - Duration::days(7)), "Mar 4");
        assert_eq!(f.format_offer_date(now() - Duration::days(10)), "Mar 1");
        assert_eq!(
            f.format_offer_date(Utc.with_ymd_and_hms(2025, 12, 25, 9, 0, 0).unwrap()),
            "Dec 25, 2025"
        );
        assert_eq!(f.format_offer_date("garbage"), INVALID_DATE);
    }

    #[test]
    fn test_format_preferred_start_date() {
        let f = formatter();
        let at = |y, m, d, h| Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();

        assert_eq!(f.format_preferred_start_date(at(2026, 3, 11, 18)), "Today");
        assert_eq!(f.format_preferred_start_date(at(2026, 3, 11, 8)), "Today");
        assert_eq!(f.format_preferred_start_date(at(2026, 3, 12, 9)), "Tomorrow");
        assert_eq!(f.format_preferred_start_date(at(2026, 3, 14, 9)), "Saturday");
        assert_eq!(f.format_preferred_start_date(at(2026, 3, 18, 12)), "Wednesday");
        assert_eq!(
            f.format_preferred_start_date(at(2026, 3, 19, 12)),
            "Thursday, March 19"
        );
        assert_eq!(
            f.format_preferred_start_date(at(2026, 3, 10, 12)),
            "Tuesday, March 10"
        );
        assert_eq!(
            f.format_preferred_start_date(at(2027, 1, 4, 12)),
            "Monday, January 4, 2027"
        );
        assert_eq!(f.format_preferred_start_date("2026-13-45"), INVALID_DATE);
    }

    #[test]
    fn test_calendar_days_follow_offset() {
        // 23:30 UTC is already the next day at +02:00
        let late = Utc.with_ymd_and_hms(2026, 3, 11, 23, 30, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 3, 12, 10, 0, 0).unwrap();

        let in_utc = TimeFormatter::new(FixedClock(late), utc());
        let in_cest = TimeFormatter::new(FixedClock(late), FixedOffset::east_opt(7200).unwrap());

        assert_eq!(in_utc.format_preferred_start_date(start), "Tomorrow");
        assert_eq!(in_cest.format_preferred_start_date(start), "Today");
    }

    #[test]
    fn test_zoneless_timestamps_use_offset() {
        // 12:00 UTC on the 11th is 01:00 on the 12th at +13:00
        let plus13 = FixedOffset::east_opt(13 * 3600).unwrap();
        let f = TimeFormatter::new(FixedClock(now()), plus13);

        assert_eq!(f.format_preferred_start_date("2026-03-13T12:00:00"), "Tomorrow");
        assert_eq!(f.format_preferred_start_date("2026-03-13T12:00:00+13:00"), "Tomorrow");
        assert_eq!(
            f.parse("2026-03-13T12:00:00"),
            Moment::At(Utc.with_ymd_and_hms(2026, 3, 12, 23, 0, 0).unwrap())
        );
        // Bare dates stay at UTC midnight
        assert_eq!(
            f.parse("2026-03-13"),
            Moment::At(Utc.with_ymd_and_hms(2026, 3, 13, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_from_config() {
        let config = TimeConfig {
            utc_offset: Some("-05:00".to_string()),
        };
        let f = TimeFormatter::from_config(FixedClock(now()), &config).unwrap();
        assert_eq!(f.offset().local_minus_utc(), -18000);

        let bad = TimeConfig {
            utc_offset: Some("later".to_string()),
        };
        assert!(TimeFormatter::from_config(FixedClock(now()), &bad).is_err());
    }

    #[test]
    fn test_moment_parse() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap();
        let plus2 = FixedOffset::east_opt(7200).unwrap();
        assert_eq!(Moment::parse("2026-03-11T12:00:00Z", plus2), Moment::At(expected));
        assert_eq!(Moment::parse("2026-03-11T14:00:00+02:00", utc()), Moment::At(expected));
        assert_eq!(Moment::parse("2026-03-11T12:00:00", utc()), Moment::At(expected));
        assert_eq!(Moment::parse("2026-03-11T14:00:00", plus2), Moment::At(expected));
        assert_eq!(Moment::parse("2026-03-11 12:00:00.000", utc()), Moment::At(expected));
        assert_eq!(
            Moment::parse("2026-03-11", plus2),
            Moment::At(Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap())
        );
        assert_eq!(Moment::parse("", utc()), Moment::Invalid);
        assert_eq!(Moment::parse("yesterday", utc()), Moment::Invalid);
    }

    #[test]
    fn test_time_remaining_serializes_camel_case() {
        let json = serde_json::to_value(formatter().get_time_remaining(now() + Duration::hours(1)))
            .unwrap();
        assert_eq!(json["totalMinutes"], 60.0);
        assert_eq!(json["isExpired"], false);
    }
}
