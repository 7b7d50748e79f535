//! Ending the session once the countdown is over.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::{info, warn};

use crate::error::FlagError;
use crate::flags::{describe, ExitFlags, Flags, ReasonCodes};

/// Operating-system entry point that ends the caller's session.
pub trait SessionTerminationApi {
    /// Ask the system to act on `intent`. `true` means the request was
    /// accepted, not that the session is already gone.
    fn request(&mut self, intent: Flags<ExitFlags>, reason: Flags<ReasonCodes>) -> bool;
}

/// Intent used for every request: a plain logoff.
pub fn logoff_intent() -> Flags<ExitFlags> {
    Flags::from(ExitFlags::Logoff)
}

/// Reason used for every request. Logoff only accepts "no reason".
pub fn logoff_reason() -> Flags<ReasonCodes> {
    Flags::from(ReasonCodes::NoReason)
}

/// Render the audit line written before every termination request.
pub fn audit_line(
    intent: Flags<ExitFlags>,
    reason: Flags<ReasonCodes>,
) -> Result<String, FlagError> {
    Ok(format!(
        "Shutdown call: Flags={}; Reason={}",
        describe(intent)?,
        describe(reason)?
    ))
}

/// Log the request to `audit` and, unless `dry_run`, hand it to `api`.
///
/// Returns whether the request was accepted; a dry run always reports `true`.
pub fn terminate_session(
    api: &mut dyn SessionTerminationApi,
    dry_run: bool,
    audit: &mut dyn Write,
) -> Result<bool, FlagError> {
    let intent = logoff_intent();
    let reason = logoff_reason();
    let line = audit_line(intent, reason)?;
    // The audit line is user-facing; a closed stderr must not block the logoff.
    let _ = writeln!(audit, "{line}");
    let _ = audit.flush();
    info!(intent = ?intent, reason = ?reason, dry_run, "termination requested");

    if dry_run {
        return Ok(true);
    }
    let accepted = api.request(intent, reason);
    if !accepted {
        warn!("the system did not accept the logoff request");
    }
    Ok(accepted)
}

// ---------------------------------------------------------------------------
// SystemSession
// ---------------------------------------------------------------------------

/// Ends the session through the platform's own logoff command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSession;

impl SystemSession {
    /// Command that performs `intent`, or `None` if it is not supported here.
    fn command_for(intent: Flags<ExitFlags>) -> Option<Command> {
        if intent != logoff_intent() {
            return None;
        }
        Some(platform_logoff_command())
    }
}

#[cfg(windows)]
fn platform_logoff_command() -> Command {
    let mut cmd = Command::new("shutdown");
    cmd.arg("/l");
    cmd
}

#[cfg(not(windows))]
fn platform_logoff_command() -> Command {
    let mut cmd = Command::new("loginctl");
    cmd.args(["terminate-session", "self"]);
    cmd
}

impl SessionTerminationApi for SystemSession {
    fn request(&mut self, intent: Flags<ExitFlags>, reason: Flags<ReasonCodes>) -> bool {
        let Some(mut cmd) = Self::command_for(intent) else {
            warn!(intent = ?intent, "unsupported termination intent");
            return false;
        };
        if reason != logoff_reason() {
            warn!(reason = ?reason, "logoff only accepts NO_REASON");
            return false;
        }
        match run_status(&mut cmd) {
            Ok(true) => true,
            Ok(false) => {
                warn!(program = ?cmd.get_program(), "logoff command exited with failure");
                false
            }
            Err(e) => {
                warn!(program = ?cmd.get_program(), error = %e, "failed to launch logoff command");
                false
            }
        }
    }
}

fn run_status(cmd: &mut Command) -> io::Result<bool> {
    let status = cmd.stdin(Stdio::null()).status()?;
    Ok(status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in collaborator that records requests.
    #[derive(Default)]
    struct RecordingApi {
        calls: Vec<(u64, u64)>,
        accept: bool,
    }

    impl SessionTerminationApi for RecordingApi {
        fn request(&mut self, intent: Flags<ExitFlags>, reason: Flags<ReasonCodes>) -> bool {
            self.calls.push((intent.bits(), reason.bits()));
            self.accept
        }
    }

    #[test]
    fn audit_line_names_logoff_and_no_reason() {
        assert_eq!(
            audit_line(logoff_intent(), logoff_reason()).unwrap(),
            "Shutdown call: Flags=LOGOFF; Reason=NO_REASON"
        );
    }

    #[test]
    fn audit_line_shows_combined_and_unknown_bits() {
        let intent = Flags::from(ExitFlags::Shutdown) | ExitFlags::Poweroff;
        let reason = Flags::<ReasonCodes>::from_bits(0x8000_0000);
        assert_eq!(
            audit_line(intent, reason).unwrap(),
            "Shutdown call: Flags=SHUTDOWN|POWEROFF; Reason=2147483648"
        );
    }

    #[test]
    fn dry_run_logs_but_never_calls_the_system() {
        let mut api = RecordingApi::default();
        let mut audit = Vec::new();
        let accepted = terminate_session(&mut api, true, &mut audit).unwrap();
        assert!(accepted);
        assert!(api.calls.is_empty());
        assert_eq!(
            String::from_utf8(audit).unwrap(),
            "Shutdown call: Flags=LOGOFF; Reason=NO_REASON\n"
        );
    }

    #[test]
    fn live_run_issues_exactly_one_logoff_request() {
        let mut api = RecordingApi {
            accept: true,
            ..RecordingApi::default()
        };
        let mut audit = Vec::new();
        assert!(terminate_session(&mut api, false, &mut audit).unwrap());
        assert_eq!(api.calls, vec![(0, 0)]);
        assert!(!audit.is_empty());
    }

    #[test]
    fn rejected_request_is_reported_not_raised() {
        let mut api = RecordingApi::default();
        let mut audit = Vec::new();
        assert_eq!(terminate_session(&mut api, false, &mut audit), Ok(false));
        assert_eq!(api.calls.len(), 1);
    }

    #[test]
    fn system_session_only_knows_logoff() {
        assert!(SystemSession::command_for(logoff_intent()).is_some());
        assert!(SystemSession::command_for(Flags::from(ExitFlags::Reboot)).is_none());
        // Unsupported intents are refused without spawning anything.
        assert!(!SystemSession.request(Flags::from(ExitFlags::Shutdown), logoff_reason()));
    }
}
