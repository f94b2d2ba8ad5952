use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

/// Datetime layouts that carry their own UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M%z",
];

/// Datetime layouts without an offset; interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y at %I:%M %p",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

/// Date-only layouts; interpreted as midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%Y.%m.%d",
];

/// Parses a human-entered publication date as scraped from a page.
///
/// Tries RFC 3339 and RFC 2822 first, then a list of common blog layouts
/// (`2024-01-05 10:30`, `January 5th, 2024`, `Friday, 5 Jan 2024`,
/// `01/05/2024`, ...). Layouts without an offset are taken as UTC, and a
/// trailing `UTC`/`GMT` marker is accepted. Returns `None` when nothing fits.
///
/// # Examples
///
/// ```
/// use pagefeed::feed::parse_pub_date;
///
/// let date = parse_pub_date("January 5, 2024").unwrap();
/// assert_eq!(date.to_rfc3339(), "2024-01-05T00:00:00+00:00");
/// assert!(parse_pub_date("yesterday-ish").is_none());
/// ```
pub fn parse_pub_date(text: &str) -> Option<DateTime<Utc>> {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&text) {
        return Some(dt.with_timezone(&Utc));
    }

    let text = strip_utc_marker(strip_weekday(&text));
    let text = strip_ordinal_suffixes(text);

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }

    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops a leading weekday such as `Friday, ` or `Fri `.
fn strip_weekday(text: &str) -> &str {
    let is_separator = |c: char| c == ',' || c == ' ';
    let Some((first, rest)) = text.split_once(is_separator) else {
        return text;
    };
    if first.parse::<Weekday>().is_ok() {
        rest.trim_start_matches(is_separator)
    } else {
        text
    }
}

fn strip_utc_marker(text: &str) -> &str {
    ["UTC", "GMT", "Z"]
        .iter()
        .find_map(|marker| text.strip_suffix(marker))
        .filter(|rest| rest.ends_with(' ') || rest.ends_with(|c: char| c.is_ascii_digit()))
        .map(str::trim_end)
        .unwrap_or(text)
}

/// Turns `5th` into `5`, leaving words like `August` alone.
fn strip_ordinal_suffixes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices();
    let mut prev_digit = false;

    while let Some((i, c)) = chars.next() {
        if prev_digit {
            let suffix = text[i..].get(..2).map(str::to_ascii_lowercase);
            let is_ordinal = matches!(suffix.as_deref(), Some("st" | "nd" | "rd" | "th"));
            let ends_word = text[i..]
                .chars()
                .nth(2)
                .map_or(true, |next| !next.is_alphanumeric());
            if is_ordinal && ends_word {
                chars.next();
                prev_digit = false;
                continue;
            }
        }
        prev_digit = c.is_ascii_digit();
        out.push(c);
    }

    out
}
