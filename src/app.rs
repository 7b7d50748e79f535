//! The logoff pipeline: parse, resolve, count down, terminate.

use std::io::Write;

use tracing::{info, warn};

use crate::cli::{parse_args, Invocation};
use crate::config::Settings;
use crate::countdown::{run_countdown, Clock, CountdownDisplay};
use crate::display::{write_banner, Console, ConsoleRenderer};
use crate::error::LogoffError;
use crate::target::{resolve_target, TimeTarget};
use crate::terminate::{terminate_session, SessionTerminationApi};

/// External pieces the pipeline drives.
pub struct Collaborators<'a> {
    pub clock: &'a dyn Clock,
    pub console: Box<dyn Console>,
    pub session: &'a mut dyn SessionTerminationApi,
    /// Diagnostic stream receiving the termination audit line.
    pub audit: &'a mut dyn Write,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// `/?` was given; the caller prints usage.
    Help,
    Completed {
        target: TimeTarget,
        dry_run: bool,
        /// Whether the system accepted the termination request.
        accepted: bool,
    },
}

/// Run the whole pipeline for `args` (program name excluded).
///
/// Argument and timeout problems are returned before anything is drawn or
/// detached.
pub fn run<S: AsRef<str>>(
    args: &[S],
    settings: &Settings,
    collaborators: Collaborators<'_>,
) -> Result<RunOutcome, LogoffError> {
    let mode = match parse_args(args)? {
        Invocation::Help => return Ok(RunOutcome::Help),
        Invocation::Run(mode) => mode,
    };
    let target = resolve_target(&mode, collaborators.clock.now(), settings.date_order)?;
    info!(
        target_time = %target.at(),
        hide = mode.hide_display,
        dry_run = mode.dry_run,
        "logoff scheduled"
    );

    let Collaborators {
        clock,
        mut console,
        session,
        audit,
    } = collaborators;

    let mut renderer = if mode.hide_display {
        if let Err(e) = console.detach() {
            warn!(error = %e, "detaching from the console failed");
        }
        None
    } else {
        let color = settings.color && console.is_terminal();
        if let Err(e) = write_banner(console.as_mut(), color) {
            warn!(error = %e, "cannot write banner");
        }
        Some(ConsoleRenderer::attach(console))
    };

    let display = renderer.as_mut().map(|r| r as &mut dyn CountdownDisplay);
    run_countdown(clock, target, display);

    if let Some(renderer) = renderer {
        if let Err(e) = renderer.finish() {
            warn!(error = %e, "cannot write final line");
        }
    }

    let accepted = terminate_session(session, mode.dry_run, audit)?;
    Ok(RunOutcome::Completed {
        target,
        dry_run: mode.dry_run,
        accepted,
    })
}
