//! CLI entry point for logoff.

use std::io;

use tracing::warn;

use logoff::app::{run, Collaborators, RunOutcome};
use logoff::cli::usage_text;
use logoff::config::Settings;
use logoff::countdown::SystemClock;
use logoff::display::TerminalConsole;
use logoff::exit_codes;
use logoff::logging;
use logoff::terminate::SystemSession;

fn main() {
    let settings = Settings::from_env();
    logging::init(&settings.log_filter);
    for problem in &settings.rejected {
        warn!(%problem, "ignoring environment setting");
    }

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let mut session = SystemSession;
    let mut stderr = io::stderr();
    let outcome = run(
        &args,
        &settings,
        Collaborators {
            clock: &SystemClock,
            console: Box::new(TerminalConsole::new()),
            session: &mut session,
            audit: &mut stderr,
        },
    );

    match outcome {
        Ok(RunOutcome::Help) => {
            println!("{}", usage_text());
            std::process::exit(exit_codes::SUCCESS);
        }
        Ok(RunOutcome::Completed { .. }) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
