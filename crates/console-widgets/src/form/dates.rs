//! Date formatting for day, month and period fields.
//!
//! Parsing is lenient about separators; anything that does not resolve to a
//! real calendar date formats as an empty string instead of failing.

use super::descriptor::FieldKind;
use super::value::Period;
use chrono::{Datelike, Local, NaiveDate};

pub const DAY_FORMAT: &str = "%Y-%m-%d";
pub const MONTH_FORMAT: &str = "%Y-%m";

/// Source of "today".
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parse a day in `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD` or `YYYYMMDD` form.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let digits = normalize(input)?;
    if digits.len() != 8 {
        return None;
    }
    ymd(&digits[0..4], &digits[4..6], &digits[6..8])
}

/// Parse a month in `YYYY-MM` or `YYYYMM` form. A full day is accepted and truncated.
pub fn parse_month(input: &str) -> Option<NaiveDate> {
    let digits = normalize(input)?;
    match digits.len() {
        6 => ymd(&digits[0..4], &digits[4..6], "01"),
        8 => ymd(&digits[0..4], &digits[4..6], &digits[6..8]).and_then(|d| d.with_day0(0)),
        _ => None,
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn normalize(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut digits = String::with_capacity(8);
    for c in trimmed.chars() {
        match c {
            '0'..='9' => digits.push(c),
            '-' | '/' | '.' => {}
            _ => return None,
        }
    }
    Some(digits)
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

pub fn format_month(date: NaiveDate) -> String {
    date.format(MONTH_FORMAT).to_string()
}

/// Parse a date at the precision of `kind`.
pub fn parse_for(kind: FieldKind, input: &str) -> Option<NaiveDate> {
    if kind.month_precision() {
        parse_month(input)
    } else {
        parse_day(input)
    }
}

/// Normalize `input` to the display format of `kind`; invalid input gives `""`.
pub fn format_for(kind: FieldKind, input: &str) -> String {
    match parse_for(kind, input) {
        Some(date) if kind.month_precision() => format_month(date),
        Some(date) => format_day(date),
        None => String::new(),
    }
}

/// Today at the precision of `kind`.
pub fn today_for(kind: FieldKind, clock: &dyn Clock) -> String {
    let today = clock.today();
    if kind.month_precision() {
        format_month(today)
    } else {
        format_day(today)
    }
}

/// Format both sides of a period. Each side that fails to parse becomes `""`.
pub fn format_period(kind: FieldKind, start: &str, end: &str) -> Period {
    Period {
        start: format_for(kind, start),
        end: format_for(kind, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day_separators() {
        assert_eq!(parse_day("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day("2024/03/05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day("20240305"), Some(date(2024, 3, 5)));
        assert_eq!(parse_day("2024-02-30"), None);
        assert_eq!(parse_day("yesterday"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-03"), Some(date(2024, 3, 1)));
        assert_eq!(parse_month("2024-03-17"), Some(date(2024, 3, 1)));
        assert_eq!(parse_month("2024-13"), None);
    }

    #[test]
    fn test_format_for_kind() {
        assert_eq!(format_for(FieldKind::Day, "20240305"), "2024-03-05");
        assert_eq!(format_for(FieldKind::Startmonth, "2024.03"), "2024-03");
        assert_eq!(format_for(FieldKind::Endday, "not a date"), "");
    }

    #[test]
    fn test_period_is_atomic_per_side() {
        let period = format_period(FieldKind::Dayperiod, "2024-01-15", "2024-01-99");
        assert_eq!(period, Period::new("2024-01-15", ""));

        let period = format_period(FieldKind::Monthperiod, "garbage", "2024-06");
        assert_eq!(period, Period::new("", "2024-06"));
    }

    #[test]
    fn test_today_for() {
        let clock = FixedClock(date(2024, 7, 9));
        assert_eq!(today_for(FieldKind::Day, &clock), "2024-07-09");
        assert_eq!(today_for(FieldKind::Monthperiod, &clock), "2024-07");
    }
}
