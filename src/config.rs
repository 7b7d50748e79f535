//! Runtime settings resolved from the process environment.
//!
//! Nothing here reads files. Lookups go through an injected
//! `Fn(&str) -> Option<String>` so tests can supply a map instead of
//! mutating the real environment.

use crate::error::ConfigError;
use crate::target::DateOrder;

/// Default tracing filter: quiet unless something goes wrong.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Locales whose numeric dates are written month-first.
const MONTH_FIRST_LOCALES: &[&str] = &["en_US", "en_PH", "es_US", "C", "POSIX"];
/// Languages whose numeric dates are written year-first.
const YEAR_FIRST_LANGUAGES: &[&str] = &["zh", "ja", "ko", "hu", "lt", "sv"];

/// Settings that shape output and date parsing but not the scheduling rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
    /// Whether the banner may use terminal colors.
    pub color: bool,
    /// Field order used by the lenient date parser.
    pub date_order: DateOrder,
    /// Values that were present but unusable and replaced by a default.
    pub rejected: Vec<ConfigError>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            color: true,
            date_order: DateOrder::MonthDayYear,
            rejected: Vec::new(),
        }
    }
}

impl Settings {
    /// Resolve settings from the real process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(&|key: &str| std::env::var(key).ok())
    }

    /// Resolve settings through `env_lookup`. Empty values count as unset.
    ///
    /// Never fails: an unusable value is recorded in `rejected` and the
    /// setting falls back as if it were unset.
    pub fn from_env_with<FEnv>(env_lookup: &FEnv) -> Self
    where
        FEnv: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env_lookup(key).filter(|value| !value.trim().is_empty());

        let log_filter = lookup("LOGOFF_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let color = lookup("NO_COLOR").is_none()
            && !matches!(
                lookup("LOGOFF_COLOR").map(|v| v.trim().to_ascii_lowercase()).as_deref(),
                Some("0" | "false" | "never" | "off")
            );

        let mut rejected = Vec::new();
        let explicit_order = match lookup("LOGOFF_DATE_ORDER").map(|raw| parse_date_order(&raw)) {
            Some(Ok(order)) => Some(order),
            Some(Err(e)) => {
                rejected.push(e);
                None
            }
            None => None,
        };
        let date_order = explicit_order.unwrap_or_else(|| {
            let locale = ["LC_ALL", "LC_TIME", "LANG"]
                .into_iter()
                .find_map(|key| lookup(key));
            date_order_for_locale(locale.as_deref())
        });

        Self {
            log_filter,
            color,
            date_order,
            rejected,
        }
    }
}

fn parse_date_order(raw: &str) -> Result<DateOrder, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mdy" => Ok(DateOrder::MonthDayYear),
        "dmy" => Ok(DateOrder::DayMonthYear),
        "ymd" => Ok(DateOrder::YearMonthDay),
        _ => Err(ConfigError::Invalid(format!(
            "LOGOFF_DATE_ORDER `{raw}`: expected mdy, dmy or ymd"
        ))),
    }
}

/// Map a POSIX locale name such as `de_DE.UTF-8` to a numeric date order.
pub fn date_order_for_locale(locale: Option<&str>) -> DateOrder {
    let Some(locale) = locale else {
        return DateOrder::MonthDayYear;
    };
    // Strip codeset and modifier: `sr_RS.UTF-8@latin` -> `sr_RS`.
    let name = locale
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || MONTH_FIRST_LOCALES.contains(&name) {
        return DateOrder::MonthDayYear;
    }
    let language = name.split(['_', '-']).next().unwrap_or_default();
    if YEAR_FIRST_LANGUAGES.contains(&language) {
        DateOrder::YearMonthDay
    } else {
        DateOrder::DayMonthYear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_env_with(&|key: &str| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn log_filter_prefers_specific_variable() {
        let s = settings(&[("RUST_LOG", "info"), ("LOGOFF_LOG", "logoff=debug")]);
        assert_eq!(s.log_filter, "logoff=debug");
        let s = settings(&[("RUST_LOG", "info")]);
        assert_eq!(s.log_filter, "info");
    }

    #[test]
    fn color_can_be_disabled_two_ways() {
        assert!(!settings(&[("NO_COLOR", "1")]).color);
        assert!(!settings(&[("LOGOFF_COLOR", "Never")]).color);
        assert!(settings(&[("LOGOFF_COLOR", "auto")]).color);
        // An empty NO_COLOR counts as unset.
        assert!(settings(&[("NO_COLOR", "")]).color);
    }

    #[test]
    fn explicit_date_order_overrides_locale() {
        let s = settings(&[("LANG", "de_DE.UTF-8"), ("LOGOFF_DATE_ORDER", "YMD")]);
        assert_eq!(s.date_order, DateOrder::YearMonthDay);
    }

    #[test]
    fn invalid_date_order_falls_back_to_locale() {
        // The bad value is kept for a warning instead of failing the run.
        let s = settings(&[("LOGOFF_DATE_ORDER", "myd"), ("LANG", "de_DE.UTF-8")]);
        assert_eq!(s.date_order, DateOrder::DayMonthYear);
        assert_eq!(s.rejected.len(), 1);
        assert!(s.rejected[0].to_string().contains("LOGOFF_DATE_ORDER `myd`"));
        assert!(settings(&[("LOGOFF_DATE_ORDER", "dmy")]).rejected.is_empty());
    }

    #[test]
    fn locale_precedence_follows_posix() {
        // LC_ALL beats LC_TIME beats LANG.
        let s = settings(&[("LANG", "en_US.UTF-8"), ("LC_TIME", "fr_FR.UTF-8")]);
        assert_eq!(s.date_order, DateOrder::DayMonthYear);
        let s = settings(&[("LC_TIME", "fr_FR.UTF-8"), ("LC_ALL", "ja_JP.UTF-8")]);
        assert_eq!(s.date_order, DateOrder::YearMonthDay);
    }

    #[test]
    fn locale_names_map_to_date_orders() {
        assert_eq!(date_order_for_locale(None), DateOrder::MonthDayYear);
        assert_eq!(date_order_for_locale(Some("C")), DateOrder::MonthDayYear);
        assert_eq!(
            date_order_for_locale(Some("en_US.UTF-8")),
            DateOrder::MonthDayYear
        );
        assert_eq!(date_order_for_locale(Some("en_GB.UTF-8")), DateOrder::DayMonthYear);
        assert_eq!(
            date_order_for_locale(Some("sr_RS.UTF-8@latin")),
            DateOrder::DayMonthYear
        );
        assert_eq!(date_order_for_locale(Some("sv_SE")), DateOrder::YearMonthDay);
    }
}
