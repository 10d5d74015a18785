//! Moment-style date formatting for `{{date}}` placeholders.
//!
//! Supports the token set note templates commonly use:
//!
//! | Token | Output |
//! |-------|--------|
//! | `YYYY` / `YY` / `Y` | 4-digit / 2-digit / plain year |
//! | `Q` / `Qo` | quarter (1-4), plain / ordinal |
//! | `MMMM` / `MMM` / `MM` / `M` / `Mo` | month name / short name / zero-padded / number / ordinal |
//! | `DDDD` / `DDD` / `DDDo` | day of year, zero-padded / plain / ordinal |
//! | `DD` / `D` / `Do` | day of month, zero-padded / plain / ordinal |
//! | `dddd` / `ddd` / `dd` / `d` / `do` | weekday name / short / 2-letter / number (Sunday = 0) / ordinal |
//! | `E` / `e` | ISO weekday (Monday = 1) / locale weekday (Sunday = 0) |
//! | `WW` / `W` / `Wo` | ISO week, zero-padded / plain / ordinal |
//! | `ww` / `w` / `wo` | locale week (weeks start Sunday, week 1 holds 1 January) |
//! | `GGGG` / `GG` / `gggg` / `gg` | ISO / locale week-year |
//! | `HH` / `H` / `hh` / `h` / `kk` / `k` | 24-hour / 12-hour / 1-24 clock |
//! | `mm` / `m` / `ss` / `s` | minutes / seconds |
//! | `SSS` / `SS` / `S` | milliseconds / hundredths / tenths |
//! | `A` / `a` | `AM`/`PM`, `am`/`pm` |
//! | `Z` / `ZZ` | UTC offset as `+02:00` / `+0200` |
//! | `X` / `x` | Unix timestamp in seconds / milliseconds |
//! | `LT` / `LTS` / `L` / `LL` / `LLL` / `LLLL` | English localized time and date formats |
//! | `l` / `ll` / `lll` / `llll` | short localized date formats |
//!
//! Text inside `[` `]` is copied literally, as is the character after a `\`.
//! Any character that does not start a token is copied through unchanged.

use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike};
use regex::Regex;
use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use crate::{Error, Result};

/// Format used by a bare `{{date}}` and as the fallback for invalid formats.
pub const DEFAULT_DATE_FORMAT: &str = "YYYY/MM/DD";

/// Tokens ordered so that longer tokens win over their prefixes.
const TOKENS: &[&str] = &[
    "YYYY", "YY", "Y", "Qo", "Q", "MMMM", "MMM", "MM", "Mo", "M", "DDDD", "DDDo", "DDD", "DD",
    "Do", "D", "dddd", "ddd", "dd", "do", "d", "E", "e", "WW", "Wo", "W", "ww", "wo", "w",
    "GGGG", "GG", "gggg", "gg", "HH", "H", "hh", "h", "kk", "k", "mm", "m", "ss", "s", "SSS",
    "SS", "S", "A", "a", "ZZ", "Z", "X", "x", "LLLL", "LLL", "LL", "LTS", "LT", "L", "llll",
    "lll", "ll", "l",
];

/// Matches `{{date}}` and `{{date:FORMAT}}`.
static DATE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{date(?::([^}]*))?\}\}").unwrap_or_else(|_| unreachable!())
});

/// Formats `when` with a moment-style format string.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the format is empty or has an unclosed
/// `[` escape.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use stacknotes::rendering::format_date;
///
/// let when = Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap();
/// assert_eq!(format_date("YYYY-MM-DD", &when).unwrap(), "2024-03-07");
/// assert_eq!(format_date("[Week] W, h:mm a", &when).unwrap(), "Week 10, 2:05 pm");
/// assert_eq!(format_date("LL", &when).unwrap(), "March 7, 2024");
/// ```
pub fn format_date<Tz: TimeZone>(format: &str, when: &DateTime<Tz>) -> Result<String> {
    if format.trim().is_empty() {
        return Err(Error::InvalidInput("empty date format".to_string()));
    }

    let mut out = String::with_capacity(format.len() + 8);
    write_format(&mut out, format, when)?;
    Ok(out)
}

fn write_format<Tz: TimeZone>(out: &mut String, format: &str, when: &DateTime<Tz>) -> Result<()> {
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            let Some(end) = rest.find(']') else {
                return Err(Error::InvalidInput(format!(
                    "unclosed '[' in date format '{format}'"
                )));
            };
            out.push_str(&rest[1..end]);
            rest = &rest[end + 1..];
            continue;
        }

        if c == '\\' {
            rest = &rest[1..];
            if let Some(escaped) = rest.chars().next() {
                out.push(escaped);
                rest = &rest[escaped.len_utf8()..];
            }
            continue;
        }

        let Some(token) = TOKENS.iter().find(|t| rest.starts_with(**t)) else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
            continue;
        };
        match localized(token) {
            Some(expansion) => write_format(out, expansion, when)?,
            None => push_token(out, token, when),
        }
        rest = &rest[token.len()..];
    }

    Ok(())
}

/// Replaces every `{{date}}` / `{{date:FORMAT}}` placeholder in `text`.
///
/// An invalid format logs a warning and that occurrence is rendered with
/// [`DEFAULT_DATE_FORMAT`]; other occurrences are unaffected.
pub fn render_date_placeholders<'a, Tz: TimeZone>(
    text: &'a str,
    when: &DateTime<Tz>,
) -> Cow<'a, str> {
    DATE_PLACEHOLDER.replace_all(text, |caps: &regex::Captures<'_>| {
        format_placeholder(caps.get(1).map(|m| m.as_str()), when)
    })
}

/// Renders one date placeholder given its optional format.
pub(crate) fn format_placeholder<Tz: TimeZone>(
    format: Option<&str>,
    when: &DateTime<Tz>,
) -> String {
    let format = format.unwrap_or(DEFAULT_DATE_FORMAT);
    format_date(format, when).unwrap_or_else(|e| {
        tracing::warn!("Invalid date format '{format}', using {DEFAULT_DATE_FORMAT}: {e}");
        default_date(when)
    })
}

fn default_date<Tz: TimeZone>(when: &DateTime<Tz>) -> String {
    format!("{:04}/{:02}/{:02}", when.year(), when.month(), when.day())
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

/// English expansions of the localized format tokens.
fn localized(token: &str) -> Option<&'static str> {
    match token {
        "LT" => Some("h:mm A"),
        "LTS" => Some("h:mm:ss A"),
        "L" => Some("MM/DD/YYYY"),
        "LL" => Some("MMMM D, YYYY"),
        "LLL" => Some("MMMM D, YYYY h:mm A"),
        "LLLL" => Some("dddd, MMMM D, YYYY h:mm A"),
        "l" => Some("M/D/YYYY"),
        "ll" => Some("MMM D, YYYY"),
        "lll" => Some("MMM D, YYYY h:mm A"),
        "llll" => Some("ddd, MMM D, YYYY h:mm A"),
        _ => None,
    }
}

const fn days_in_year(year: i32) -> u32 {
    if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
        366
    } else {
        365
    }
}

/// Locale week and its week-year. Weeks start on Sunday and week 1 is the
/// week holding 1 January.
fn locale_week<Tz: TimeZone>(when: &DateTime<Tz>) -> (i32, u32) {
    let weekday = when.weekday().num_days_from_sunday();
    let ordinal0 = when.ordinal0();
    if ordinal0 + (6 - weekday) >= days_in_year(when.year()) {
        return (when.year() + 1, 1);
    }
    let jan1 = (weekday + 7 - ordinal0 % 7) % 7;
    (when.year(), (ordinal0 + jan1) / 7 + 1)
}

// Writing to a String cannot fail.
#[allow(clippy::let_underscore_must_use)]
fn push_token<Tz: TimeZone>(out: &mut String, token: &str, when: &DateTime<Tz>) {
    let month = when.month0() as usize;
    let weekday = when.weekday().num_days_from_sunday();
    let day_name = WEEKDAYS[weekday as usize];
    let offset_secs = when.offset().fix().local_minus_utc();
    let nanos = when.nanosecond() % 1_000_000_000;
    let (week_year, week) = locale_week(when);
    let iso = when.iso_week();
    let _ = match token {
        "YYYY" => write!(out, "{:04}", when.year()),
        "YY" => write!(out, "{:02}", when.year().rem_euclid(100)),
        "Y" => write!(out, "{}", when.year()),
        "Qo" => write!(out, "{}{}", when.month0() / 3 + 1, ordinal_suffix(when.month0() / 3 + 1)),
        "Q" => write!(out, "{}", when.month0() / 3 + 1),
        "MMMM" => write!(out, "{}", MONTHS[month]),
        "MMM" => write!(out, "{}", &MONTHS[month][..3]),
        "MM" => write!(out, "{:02}", when.month()),
        "Mo" => write!(out, "{}{}", when.month(), ordinal_suffix(when.month())),
        "M" => write!(out, "{}", when.month()),
        "DDDD" => write!(out, "{:03}", when.ordinal()),
        "DDDo" => write!(out, "{}{}", when.ordinal(), ordinal_suffix(when.ordinal())),
        "DDD" => write!(out, "{}", when.ordinal()),
        "DD" => write!(out, "{:02}", when.day()),
        "Do" => write!(out, "{}{}", when.day(), ordinal_suffix(when.day())),
        "D" => write!(out, "{}", when.day()),
        "dddd" => write!(out, "{day_name}"),
        "ddd" => write!(out, "{}", &day_name[..3]),
        "dd" => write!(out, "{}", &day_name[..2]),
        "do" => write!(out, "{weekday}{}", ordinal_suffix(weekday)),
        "d" | "e" => write!(out, "{weekday}"),
        "E" => write!(out, "{}", when.weekday().number_from_monday()),
        "WW" => write!(out, "{:02}", iso.week()),
        "Wo" => write!(out, "{}{}", iso.week(), ordinal_suffix(iso.week())),
        "W" => write!(out, "{}", iso.week()),
        "ww" => write!(out, "{week:02}"),
        "wo" => write!(out, "{week}{}", ordinal_suffix(week)),
        "w" => write!(out, "{week}"),
        "GGGG" => write!(out, "{:04}", iso.year()),
        "GG" => write!(out, "{:02}", iso.year().rem_euclid(100)),
        "gggg" => write!(out, "{week_year:04}"),
        "gg" => write!(out, "{:02}", week_year.rem_euclid(100)),
        "HH" => write!(out, "{:02}", when.hour()),
        "H" => write!(out, "{}", when.hour()),
        "hh" => write!(out, "{:02}", twelve_hour(when.hour())),
        "h" => write!(out, "{}", twelve_hour(when.hour())),
        "kk" => write!(out, "{:02}", if when.hour() == 0 { 24 } else { when.hour() }),
        "k" => write!(out, "{}", if when.hour() == 0 { 24 } else { when.hour() }),
        "mm" => write!(out, "{:02}", when.minute()),
        "m" => write!(out, "{}", when.minute()),
        "ss" => write!(out, "{:02}", when.second()),
        "s" => write!(out, "{}", when.second()),
        "SSS" => write!(out, "{:03}", nanos / 1_000_000),
        "SS" => write!(out, "{:02}", nanos / 10_000_000),
        "S" => write!(out, "{}", nanos / 100_000_000),
        "A" => write!(out, "{}", if when.hour() < 12 { "AM" } else { "PM" }),
        "a" => write!(out, "{}", if when.hour() < 12 { "am" } else { "pm" }),
        "ZZ" | "Z" => {
            let sign = if offset_secs < 0 { '-' } else { '+' };
            let minutes = offset_secs.abs() / 60;
            let sep = if token == "Z" { ":" } else { "" };
            write!(out, "{sign}{:02}{sep}{:02}", minutes / 60, minutes % 60)
        },
        "X" => write!(out, "{}", when.timestamp()),
        "x" => write!(out, "{}", when.timestamp_millis()),
        _ => Ok(()),
    };
}
