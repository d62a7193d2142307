//! Date expressions recognized in note titles and frontmatter.
//!
//! Two shapes are understood, nothing else:
//! - long form, as daily-note titles are written: `December 4th, 2025`
//! - ISO calendar date: `2025-12-04`
//!
//! Every parser returns `None` instead of failing. A match whose
//! year/month/day triple is not a real calendar date (`February 30th`)
//! is also `None`; dates are never clamped.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// English month names, January first. Matching is case-sensitive.
pub const MONTH_NAMES: [&str; 12] = [
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

fn long_form_pattern() -> String {
    format!(
        r"({}) ([0-9]{{1,2}})(?:st|nd|rd|th), ([0-9]{{4}})",
        MONTH_NAMES.join("|")
    )
}

static LONG_FORM_EXACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}$", long_form_pattern())).expect("valid long-form date regex")
});

static LONG_FORM_EMBEDDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\[\[{}\]\]", long_form_pattern()))
        .expect("valid embedded long-form date regex")
});

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid ISO date regex")
});

/// Parse a label that is exactly a long-form date, e.g. `August 12th, 2025`.
///
/// The ordinal suffix is required but not checked against the day
/// (`1th` is accepted).
#[must_use]
pub fn parse_long_form(label: &str) -> Option<NaiveDate> {
    LONG_FORM_EXACT_RE
        .captures(label)
        .and_then(|caps| long_form_from_captures(&caps))
}

/// Find the first `[[<long-form date>]]` wikilink inside a label.
///
/// Only the first bracketed date is considered; if it is not a real
/// calendar date the whole lookup declines.
#[must_use]
pub fn find_embedded_long_form(label: &str) -> Option<NaiveDate> {
    LONG_FORM_EMBEDDED_RE
        .captures(label)
        .and_then(|caps| long_form_from_captures(&caps))
}

/// Parse a string that is exactly an ISO date, e.g. `2025-10-07`.
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE_RE.captures(value)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month number (1-12) for a full English month name.
#[must_use]
pub fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

/// Milliseconds since the Unix epoch at midnight UTC of `date`.
#[must_use]
pub fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map_or(0, |dt| dt.and_utc().timestamp_millis())
}

fn long_form_from_captures(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let month = month_number(&caps[1])?;
    let day = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn long_form_parses_full_label() {
        assert_eq!(parse_long_form("December 4th, 2025"), Some(ymd(2025, 12, 4)));
        assert_eq!(parse_long_form("August 12th, 2025"), Some(ymd(2025, 8, 12)));
        assert_eq!(parse_long_form("March 01st, 2024"), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn long_form_ignores_suffix_correctness() {
        assert_eq!(parse_long_form("May 1th, 2025"), Some(ymd(2025, 5, 1)));
        assert_eq!(parse_long_form("May 3st, 2025"), Some(ymd(2025, 5, 3)));
    }

    #[test]
    fn long_form_requires_suffix_comma_and_full_month() {
        assert_eq!(parse_long_form("December 4, 2025"), None);
        assert_eq!(parse_long_form("December 4th 2025"), None);
        assert_eq!(parse_long_form("Dec 4th, 2025"), None);
        assert_eq!(parse_long_form("december 4th, 2025"), None);
        assert_eq!(parse_long_form("December 4th, 25"), None);
    }

    #[test]
    fn long_form_must_match_entire_label() {
        assert_eq!(parse_long_form("December 4th, 2025 standup"), None);
        assert_eq!(parse_long_form(" December 4th, 2025"), None);
        assert_eq!(parse_long_form("[[December 4th, 2025]]"), None);
    }

    #[test]
    fn impossible_calendar_dates_decline() {
        assert_eq!(parse_long_form("February 30th, 2025"), None);
        assert_eq!(parse_long_form("April 31st, 2025"), None);
        assert_eq!(parse_long_form("January 0th, 2025"), None);
        assert_eq!(parse_long_form("February 29th, 2023"), None);
        assert_eq!(parse_long_form("February 29th, 2024"), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_iso_date("2025-02-30"), None);
        assert_eq!(parse_iso_date("2025-13-01"), None);
        assert_eq!(parse_iso_date("2025-00-10"), None);
    }

    #[test]
    fn embedded_long_form_found_anywhere() {
        assert_eq!(
            find_embedded_long_form("# [[August 12th, 2025]] leadership call"),
            Some(ymd(2025, 8, 12))
        );
        assert_eq!(
            find_embedded_long_form("notes from [[June 2nd, 2024]]"),
            Some(ymd(2024, 6, 2))
        );
    }

    #[test]
    fn embedded_long_form_requires_double_brackets() {
        assert_eq!(find_embedded_long_form("call on August 12th, 2025"), None);
        assert_eq!(find_embedded_long_form("[August 12th, 2025]"), None);
        assert_eq!(find_embedded_long_form("[[August 12th, 2025]"), None);
    }

    #[test]
    fn embedded_long_form_only_considers_first_match() {
        assert_eq!(
            find_embedded_long_form("[[February 30th, 2025]] then [[March 1st, 2025]]"),
            None
        );
    }

    #[test]
    fn iso_date_requires_exact_widths() {
        assert_eq!(parse_iso_date("2025-10-07"), Some(ymd(2025, 10, 7)));
        assert_eq!(parse_iso_date("2025-1-07"), None);
        assert_eq!(parse_iso_date("25-10-07"), None);
        assert_eq!(parse_iso_date("2025-10-07T10:00"), None);
        assert_eq!(parse_iso_date(" 2025-10-07"), None);
    }

    #[test]
    fn non_ascii_digits_are_not_digits() {
        assert_eq!(parse_iso_date("٢٠٢٥-10-07"), None);
    }

    #[test]
    fn month_numbers() {
        assert_eq!(month_number("January"), Some(1));
        assert_eq!(month_number("December"), Some(12));
        assert_eq!(month_number("Sept"), None);
    }

    #[test]
    fn midnight_is_utc_day_start() {
        assert_eq!(midnight_millis(ymd(1970, 1, 1)), 0);
        assert_eq!(midnight_millis(ymd(1970, 1, 2)), 86_400_000);
        assert_eq!(midnight_millis(ymd(2025, 12, 4)), 1_764_806_400_000);
    }

    proptest! {
        #[test]
        fn every_real_date_round_trips_through_long_form(
            days in 0i64..200_000,
            suffix in prop::sample::select(vec!["st", "nd", "rd", "th"]),
        ) {
            let date = ymd(1900, 1, 1) + chrono::Duration::days(days);
            prop_assume!(date.format("%Y").to_string().len() == 4);
            let label = format!(
                "{} {}{}, {}",
                date.format("%B"),
                date.format("%-d"),
                suffix,
                date.format("%Y"),
            );
            prop_assert_eq!(parse_long_form(&label), Some(date));
        }

        #[test]
        fn every_real_date_round_trips_through_iso(days in 0i64..200_000) {
            let date = ymd(1900, 1, 1) + chrono::Duration::days(days);
            prop_assume!(date.format("%Y").to_string().len() == 4);
            let iso = date.format("%Y-%m-%d").to_string();
            prop_assert_eq!(parse_iso_date(&iso), Some(date));
        }
    }
}
