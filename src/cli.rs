//! Command-line token scanning.
//!
//! The command line uses DOS-style switches (`/D`, `/hide`, `/fake`, `/?`)
//! that are matched case-insensitively. Anything that is not a switch is the
//! timeout value, and only one of those is allowed.

use crate::build_info;
use crate::error::ArgumentError;

/// Token that prints usage and ends the run successfully.
pub const HELP_SWITCH: &str = "/?";
pub const DATE_SWITCH: &str = "/d";
pub const HIDE_SWITCH: &str = "/hide";
pub const FAKE_SWITCH: &str = "/fake";

/// Validated result of scanning the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationMode {
    /// The timeout is an absolute date/time instead of a second count.
    pub date_mode: bool,
    /// Suppress the countdown and detach from the console.
    pub hide_display: bool,
    /// Run everything except the termination request.
    pub dry_run: bool,
    /// The single positional token, lowercased, if one was given.
    pub raw_timeout: Option<String>,
}

/// What the caller should do after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `/?` was present; print usage and exit successfully.
    Help,
    /// Proceed with the scheduled logoff.
    Run(InvocationMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    Date,
    Hide,
    Fake,
}

impl Switch {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            DATE_SWITCH => Some(Self::Date),
            HIDE_SWITCH => Some(Self::Hide),
            FAKE_SWITCH => Some(Self::Fake),
            _ => None,
        }
    }

    fn slot(self, mode: &mut InvocationMode) -> &mut bool {
        match self {
            Self::Date => &mut mode.date_mode,
            Self::Hide => &mut mode.hide_display,
            Self::Fake => &mut mode.dry_run,
        }
    }
}

/// Scan raw process arguments (program name excluded).
///
/// `/?` anywhere wins over every other check. Otherwise each switch may
/// appear once and at most one positional value is accepted.
pub fn parse_args<I, S>(args: I) -> Result<Invocation, ArgumentError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens: Vec<String> = args
        .into_iter()
        .map(|arg| arg.as_ref().to_lowercase())
        .collect();

    if tokens.iter().any(|token| token == HELP_SWITCH) {
        return Ok(Invocation::Help);
    }

    let mut mode = InvocationMode::default();
    for token in tokens {
        if let Some(switch) = Switch::from_token(&token) {
            let slot = switch.slot(&mut mode);
            if *slot {
                return Err(ArgumentError::Duplicate(token));
            }
            *slot = true;
            continue;
        }
        if mode.raw_timeout.is_some() {
            return Err(ArgumentError::Unknown(token));
        }
        mode.raw_timeout = Some(token);
    }
    Ok(Invocation::Run(mode))
}

const USAGE_BODY: &str = r#"logoff [timeout] [/D] [/hide] [/fake]
logoff /?
Logs the user out of the current session

timeout  - Time until the user is logged off.
           The countdown runs inside this program; terminating it
           before the timeout expires cancels the logoff.
           A negative value is treated as zero.
           Without a timeout the user is logged off immediately.
/D       - The timeout is an absolute date and time. See below.
/hide    - Hides the countdown and detaches from the console.
           Only useful together with a timeout.
           To abort a pending logoff the process has to be killed.
           Without /hide the logoff can be aborted using CTRL+C
           or by closing the console window.
/fake    - Performs every step except the actual logoff.

Timeout without /D
==================
Digits 0-9 only, optionally signed.
The value is a number of seconds: 3600 is an hour, 86400 a day.

Timeout with /D
===============
The timeout is a local date and time. Quote it if it contains spaces.
Accepted forms are tried in this order:

1. yyyy-MM-dd HH:mm:ss or yyyy-MM-dd HH:mm
2. Common date/time forms for the current locale, for example
   "2030-01-31T18:00", "01/31/2030 6:00 pm" or "31.01.2030 18:00"
   (set LOGOFF_DATE_ORDER=mdy|dmy|ymd to override the field order)

If neither succeeds the program exits with code 2.
A date in the past logs the user off immediately.

Exit codes: 0 success, 1 argument error, 2 unparsable timeout"#;

/// Full usage text including build metadata.
pub fn usage_text() -> String {
    format!("{USAGE_BODY}\n\n{}", build_info::version_line())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> InvocationMode {
        match parse_args(args).expect("valid arguments") {
            Invocation::Run(mode) => mode,
            Invocation::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn empty_command_line_is_immediate_relative_logoff() {
        assert_eq!(run(&[]), InvocationMode::default());
    }

    #[test]
    fn switches_set_their_flags() {
        let mode = run(&["/D", "2030-01-01 12:00", "/hide", "/FAKE"]);
        assert!(mode.date_mode);
        assert!(mode.hide_display);
        assert!(mode.dry_run);
        assert_eq!(mode.raw_timeout.as_deref(), Some("2030-01-01 12:00"));
    }

    #[test]
    fn positional_value_may_appear_anywhere() {
        let mode = run(&["/hide", "5"]);
        assert!(mode.hide_display);
        assert!(!mode.date_mode);
        assert!(!mode.dry_run);
        assert_eq!(mode.raw_timeout.as_deref(), Some("5"));
    }

    #[test]
    fn timeout_is_lowercased() {
        let mode = run(&["/d", "Jan 2, 2030"]);
        assert_eq!(mode.raw_timeout.as_deref(), Some("jan 2, 2030"));
    }

    #[test]
    fn repeated_switch_is_rejected_by_name() {
        // Case differences still count as the same switch.
        assert_eq!(
            parse_args(["/hide", "10", "/HIDE"]),
            Err(ArgumentError::Duplicate("/hide".into()))
        );
        assert_eq!(
            parse_args(["/d", "/d"]),
            Err(ArgumentError::Duplicate("/d".into()))
        );
    }

    #[test]
    fn second_positional_is_unknown() {
        assert_eq!(
            parse_args(["10", "20"]),
            Err(ArgumentError::Unknown("20".into()))
        );
        assert_eq!(
            parse_args(["10", "/bogus"]),
            Err(ArgumentError::Unknown("/bogus".into()))
        );
    }

    #[test]
    fn help_short_circuits_everything() {
        // Malformed arguments around /? are never inspected.
        assert_eq!(parse_args(["/d", "/d", "/?", "a", "b"]), Ok(Invocation::Help));
        assert_eq!(parse_args(["/?"]), Ok(Invocation::Help));
    }

    #[test]
    fn usage_text_documents_every_switch() {
        let text = usage_text();
        for switch in ["/D", "/hide", "/fake", "/?"] {
            assert!(text.contains(switch), "missing {switch}");
        }
        assert!(text.contains(build_info::VERSION));
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_subset_of_switches_round_trips(
                date in any::<bool>(),
                hide in any::<bool>(),
                fake in any::<bool>(),
                timeout in proptest::option::of("[0-9]{1,6}"),
                seed in any::<u64>(),
            ) {
                let mut tokens: Vec<String> = Vec::new();
                if date { tokens.push("/D".into()); }
                if hide { tokens.push("/Hide".into()); }
                if fake { tokens.push("/fake".into()); }
                if let Some(t) = &timeout { tokens.push(t.clone()); }
                if !tokens.is_empty() {
                    let len = tokens.len();
                    tokens.rotate_left((seed as usize) % len);
                }

                let parsed = parse_args(&tokens).expect("valid");
                prop_assert_eq!(
                    parsed,
                    Invocation::Run(InvocationMode {
                        date_mode: date,
                        hide_display: hide,
                        dry_run: fake,
                        raw_timeout: timeout,
                    })
                );
            }

            #[test]
            fn duplicated_switch_always_fails(
                switch in prop_oneof![Just("/d"), Just("/hide"), Just("/fake")],
                prefix in proptest::option::of("[0-9]{1,3}"),
            ) {
                let mut tokens: Vec<String> = prefix.into_iter().collect();
                tokens.push(switch.to_string());
                tokens.push(switch.to_uppercase());
                prop_assert_eq!(
                    parse_args(&tokens),
                    Err(ArgumentError::Duplicate(switch.to_string()))
                );
            }
        }
    }
}
