use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(st|nd|rd|th)").expect("valid ordinal regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

// All-digit forms with a four-digit year. The ISO form may carry a trailing time.
static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{1,2}-\d{1,2})(?:T.*|\s+\d{1,2}:.*)?$|^(\d{1,2}[/.]\d{1,2}[/.]\d{4})$")
        .expect("valid numeric date regex")
});

/// Numeric layouts tried in order; slashes are month-first, then day-first.
const NUMERIC_LAYOUTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

const WEEKDAYS: [&str; 7] = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

/// Render any JSON value the way the source column would print it.
/// `null`/absent becomes the empty string, which never parses.
pub fn coerce_to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Remove `st`/`nd`/`rd`/`th` after every run of digits, keeping the digits.
pub fn strip_ordinal_suffixes(text: &str) -> String {
    ORDINAL_SUFFIX.replace_all(text, "$1").into_owned()
}

/// Best-effort parse of a cleaned date string. Returns `None` on anything it
/// does not recognise.
///
/// The whole input must be consumed. Named-month forms are
/// `<month> <day> <year>`, `<day> <month> <year>` or `<month> <year>` (the
/// first of that month), with optional commas and a leading weekday. Years are
/// always four digits.
pub fn parse_loose_date(text: &str) -> Option<NaiveDate> {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    let candidate = collapsed.as_ref();
    if candidate.is_empty() {
        return None;
    }

    if let Some(caps) = NUMERIC_DATE.captures(candidate) {
        let date_part = caps.get(1).or_else(|| caps.get(2))?.as_str();
        return NUMERIC_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDate::parse_from_str(date_part, layout).ok());
    }

    parse_named_month(candidate)
}

fn parse_named_month(candidate: &str) -> Option<NaiveDate> {
    let mut tokens: Vec<&str> = candidate
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.len() > 1 && is_weekday(tokens[0]) {
        tokens.remove(0);
    }

    match tokens.as_slice() {
        [month, day, year] if month_number(month).is_some() => {
            NaiveDate::from_ymd_opt(year_number(year)?, month_number(month)?, day_number(day)?)
        }
        [day, month, year] => {
            NaiveDate::from_ymd_opt(year_number(year)?, month_number(month)?, day_number(day)?)
        }
        [month, year] => NaiveDate::from_ymd_opt(year_number(year)?, month_number(month)?, 1),
        _ => None,
    }
}

/// Full name, three-letter abbreviation or "sept", case-insensitive, with an
/// optional trailing period.
fn month_number(token: &str) -> Option<u32> {
    let name = token.strip_suffix('.').unwrap_or(token).to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|month| name == *month || name == month[..3] || (name == "sept" && *month == "september"))
        .map(|index| index as u32 + 1)
}

fn is_weekday(token: &str) -> bool {
    let name = token.strip_suffix('.').unwrap_or(token).to_ascii_lowercase();
    WEEKDAYS.iter().any(|day| name == *day || name == day[..3])
}

fn day_number(token: &str) -> Option<u32> {
    if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn year_number(token: &str) -> Option<i32> {
    if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Normalize a `date_of_death` value to a calendar date.
///
/// Total: malformed, empty or non-string input yields `None`.
pub fn normalize_date(value: Option<&Value>) -> Option<NaiveDate> {
    let text = coerce_to_text(value);
    parse_loose_date(&strip_ordinal_suffixes(&text))
}

/// Same as [`normalize_date`] but pre-serialized as `YYYY-MM-DD`, for write
/// paths that need text rather than a typed date.
pub fn normalize_date_iso(value: Option<&Value>) -> Option<String> {
    normalize_date(value).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn date(s: &str) -> Option<NaiveDate> {
        normalize_date(Some(&json!(s)))
    }

    #[test]
    fn test_strip_suffix_keeps_digits() {
        assert_eq!(strip_ordinal_suffixes("August 23rd, 1916"), "August 23, 1916");
        assert_eq!(strip_ordinal_suffixes("1st and 22nd"), "1 and 22");
        assert_eq!(strip_ordinal_suffixes("July 1, 1916"), "July 1, 1916");
    }

    #[test]
    fn test_every_suffix_parses() {
        let cases = [
            ("August 1st, 1914", ymd(1914, 8, 1)),
            ("March 2nd, 1915", ymd(1915, 3, 2)),
            ("April 23rd, 1917", ymd(1917, 4, 23)),
            ("August 29th, 1914", ymd(1914, 8, 29)),
            ("November 11th, 1918", ymd(1918, 11, 11)),
            ("July 1, 1916", ymd(1916, 7, 1)),
        ];
        for (input, expected) in cases {
            assert_eq!(date(input), Some(expected), "{}", input);
        }
    }

    #[test]
    fn test_other_layouts() {
        assert_eq!(date("13 October 1915"), Some(ymd(1915, 10, 13)));
        assert_eq!(date("13 October, 1915"), Some(ymd(1915, 10, 13)));
        assert_eq!(date("Oct 13th, 1915"), Some(ymd(1915, 10, 13)));
        assert_eq!(date("August 29,1914"), Some(ymd(1914, 8, 29)));
        assert_eq!(date("  september   25th,  1915 "), Some(ymd(1915, 9, 25)));
        assert_eq!(date("1916-07-01"), Some(ymd(1916, 7, 1)));
        assert_eq!(date("1916-07-01T00:00:00"), Some(ymd(1916, 7, 1)));
        assert_eq!(date("1916-07-01 00:00:00"), Some(ymd(1916, 7, 1)));
        assert_eq!(date("07/01/1916"), Some(ymd(1916, 7, 1)));
        assert_eq!(date("29.08.1914"), Some(ymd(1914, 8, 29)));
    }

    #[test]
    fn test_month_and_year_is_first_of_month() {
        assert_eq!(date("August 1914"), Some(ymd(1914, 8, 1)));
        assert_eq!(date("July 1916"), Some(ymd(1916, 7, 1)));
        assert_eq!(date("November 1918"), Some(ymd(1918, 11, 1)));
        assert_eq!(date("Sept. 1915"), Some(ymd(1915, 9, 1)));
    }

    #[test]
    fn test_two_digit_year_never_parses() {
        assert_eq!(date("August 19 14"), None);
        assert_eq!(date("August 29th, 14"), None);
        assert_eq!(date("08/29/14"), None);
        assert_eq!(date("August 191"), None);
    }

    #[test]
    fn test_year_alone_is_none() {
        assert_eq!(date("1914"), None);
        assert_eq!(date("c. 1916"), None);
    }

    #[test]
    fn test_abbreviated_months_with_period() {
        assert_eq!(date("Aug. 29th, 1914"), Some(ymd(1914, 8, 29)));
        assert_eq!(date("Sept 25th, 1915"), Some(ymd(1915, 9, 25)));
        assert_eq!(date("Sept. 25th, 1915"), Some(ymd(1915, 9, 25)));
        assert_eq!(date("25 Sep. 1915"), Some(ymd(1915, 9, 25)));
        assert_eq!(date("nov. 11, 1918"), Some(ymd(1918, 11, 11)));
    }

    #[test]
    fn test_leading_weekday_is_dropped() {
        assert_eq!(date("Saturday, August 29th, 1914"), Some(ymd(1914, 8, 29)));
        assert_eq!(date("Sat. 1 July 1916"), Some(ymd(1916, 7, 1)));
        assert_eq!(date("Saturday"), None);
    }

    #[test]
    fn test_slash_dates_fall_back_to_day_first() {
        assert_eq!(date("29/08/1914"), Some(ymd(1914, 8, 29)));
        assert_eq!(date("08/29/1914"), Some(ymd(1914, 8, 29)));
        assert_eq!(date("31/31/1914"), None);
    }

    #[test]
    fn test_garbage_is_none() {
        for input in [
            "",
            "N/A",
            "unknown",
            "None",
            "Augtober 3rd, 1916",
            "February 30th, 1916",
            "1916-07-01 garbage",
            "August 29th, 1914 or later",
            "Between August 1914",
        ] {
            assert_eq!(date(input), None, "{}", input);
        }
    }

    #[test]
    fn test_non_string_input_is_none() {
        assert_eq!(normalize_date(None), None);
        assert_eq!(normalize_date(Some(&Value::Null)), None);
        assert_eq!(normalize_date(Some(&json!(1914))), None);
        assert_eq!(normalize_date(Some(&json!(true))), None);
        assert_eq!(normalize_date(Some(&json!({"d": 1}))), None);
    }

    #[test]
    fn test_iso_text() {
        assert_eq!(
            normalize_date_iso(Some(&json!("August 4th, 1914"))).as_deref(),
            Some("1914-08-04")
        );
        assert_eq!(normalize_date_iso(Some(&json!("August 1914"))).as_deref(), Some("1914-08-01"));
        assert_eq!(normalize_date_iso(Some(&json!("nope"))), None);
    }
}
