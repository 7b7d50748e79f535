//! Resolution of the command-line timeout into an absolute logoff time.

mod lenient;

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone};
use tracing::debug;

use crate::cli::InvocationMode;
use crate::error::TimeoutError;

pub use lenient::parse_lenient;

/// Exact local patterns tried before the lenient parser.
const STRICT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Timeout used in relative mode when none was given.
const DEFAULT_RELATIVE_TIMEOUT: &str = "0";

/// Field order for numeric dates such as `01/02/2030`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

/// The wall-clock moment at which the session should end.
///
/// May lie in the past; the countdown then finishes on its first check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeTarget(DateTime<Local>);

impl TimeTarget {
    pub fn new(at: DateTime<Local>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<Local> {
        self.0
    }
}

/// Turn the parsed invocation into a target time relative to `now`.
pub fn resolve_target(
    mode: &InvocationMode,
    now: DateTime<Local>,
    order: DateOrder,
) -> Result<TimeTarget, TimeoutError> {
    let raw = mode.raw_timeout.as_deref().unwrap_or_default();
    let at = if mode.date_mode {
        resolve_date(raw, now, order)?
    } else {
        resolve_relative(raw, now)?
    };
    debug!(target_time = %at, date_mode = mode.date_mode, "resolved logoff time");
    Ok(TimeTarget(at))
}

/// Date mode: empty means now, otherwise strict patterns then lenient forms.
fn resolve_date(
    raw: &str,
    now: DateTime<Local>,
    order: DateOrder,
) -> Result<DateTime<Local>, TimeoutError> {
    if raw.is_empty() {
        return Ok(now);
    }
    if let Some(at) = parse_strict(raw) {
        return Ok(at);
    }
    debug!(raw, "strict date patterns failed, trying lenient forms");
    parse_lenient(raw, now, order).ok_or_else(|| TimeoutError::Date(raw.to_string()))
}

/// Relative mode: a signed whole number of seconds from `now`.
fn resolve_relative(raw: &str, now: DateTime<Local>) -> Result<DateTime<Local>, TimeoutError> {
    let raw = if raw.is_empty() {
        DEFAULT_RELATIVE_TIMEOUT
    } else {
        raw
    };
    let seconds: i64 = raw
        .trim()
        .parse()
        .map_err(|_| TimeoutError::Number(raw.to_string()))?;
    TimeDelta::try_seconds(seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| TimeoutError::Number(raw.to_string()))
}

/// Match one of the exact `yyyy-MM-dd HH:mm[:ss]` forms in local time.
pub fn parse_strict(raw: &str) -> Option<DateTime<Local>> {
    let trimmed = raw.trim();
    STRICT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .and_then(local_from_naive)
}

/// Attach the local zone. A folded hour resolves to its earlier instant;
/// a skipped hour does not exist and yields `None`.
pub(crate) fn local_from_naive(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(at) => Some(at),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}
