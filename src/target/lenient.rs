//! Locale-aware fallback parsing for `/D` timeouts.
//!
//! Tries offset-carrying formats first, then numeric and month-name dates in
//! the configured field order combined with 24- or 12-hour times, then
//! date-only (midnight) and time-only (today) forms.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use super::{local_from_naive, DateOrder};

const YMD_DATES: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const MDY_DATES: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];
const DMY_DATES: &[&str] = &["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];
const NAMED_MONTH_DATES: &[&str] = &[
    "%A, %B %d, %Y",
    "%A, %d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
];

const TIMES: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
];

/// Parse `raw` with the lenient rules. Returns `None` when nothing matches.
pub fn parse_lenient(raw: &str, now: DateTime<Local>, order: DateOrder) -> Option<DateTime<Local>> {
    let text = normalize(raw);
    if text.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(&text) {
        return Some(at.with_timezone(&Local));
    }
    if let Ok(at) = DateTime::parse_from_rfc2822(&text) {
        return Some(at.with_timezone(&Local));
    }

    let dates = date_formats(order);

    for date in &dates {
        for time in TIMES {
            for separator in [" ", "T"] {
                let format = format!("{date}{separator}{time}");
                if let Ok(naive) = NaiveDateTime::parse_from_str(&text, &format) {
                    return local_from_naive(naive);
                }
            }
        }
    }

    for date in &dates {
        if let Ok(day) = NaiveDate::parse_from_str(&text, date) {
            return local_from_naive(day.and_time(NaiveTime::MIN));
        }
    }

    for time in TIMES {
        if let Ok(clock) = NaiveTime::parse_from_str(&text, time) {
            return local_from_naive(now.date_naive().and_time(clock));
        }
    }

    None
}

/// Collapse whitespace runs and uppercase so literal `T`/`Z` and AM/PM match.
///
/// chrono cannot build a time without minutes, so an hour-only 12-hour
/// time (`6 PM`, `6PM`) is rewritten to `6:00 PM`.
fn normalize(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let mut tokens: Vec<&str> = Vec::new();
    for token in upper.split_whitespace() {
        match split_meridiem(token) {
            Some((clock, meridiem)) => tokens.extend([clock, meridiem]),
            None => tokens.push(token),
        }
    }

    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let before_meridiem = tokens
            .get(i + 1)
            .is_some_and(|next| matches!(*next, "AM" | "PM"));
        if before_meridiem && is_bare_hour(token) {
            out.push(format!("{token}:00"));
        } else {
            out.push((*token).to_string());
        }
    }
    out.join(" ")
}

/// Split `6:30PM` into `6:30` and `PM`.
fn split_meridiem(token: &str) -> Option<(&str, &str)> {
    let at = token.len().checked_sub(2)?;
    if at == 0 || !token.is_char_boundary(at) {
        return None;
    }
    let (clock, meridiem) = token.split_at(at);
    let starts_with_digit = clock.starts_with(|c: char| c.is_ascii_digit());
    (matches!(meridiem, "AM" | "PM") && starts_with_digit).then_some((clock, meridiem))
}

fn is_bare_hour(token: &str) -> bool {
    (1..=2).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit())
}

/// Date patterns in preference order for `order`. Year-first and month-name
/// forms are unambiguous and always accepted.
fn date_formats(order: DateOrder) -> Vec<&'static str> {
    let numeric: &[&[&str]] = match order {
        DateOrder::MonthDayYear => &[MDY_DATES, YMD_DATES],
        DateOrder::DayMonthYear => &[DMY_DATES, YMD_DATES],
        DateOrder::YearMonthDay => &[YMD_DATES],
    };
    numeric
        .iter()
        .flat_map(|set| set.iter().copied())
        .chain(NAMED_MONTH_DATES.iter().copied())
        .collect()
}
