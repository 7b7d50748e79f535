//! Logoff: end the current user session after a countdown or at a set time.
//!
//! The crate is split along the pipeline the binary runs:
//!
//! 1. [`cli`] scans the command line into an [`cli::InvocationMode`].
//! 2. [`target`] resolves the timeout into an absolute [`target::TimeTarget`].
//! 3. [`countdown`] waits for the target, redrawing [`display`] every second.
//! 4. [`terminate`] writes an audit line built by [`flags`] and asks the
//!    system to end the session.
//!
//! Clock, console, and the OS logoff call are traits so the whole pipeline
//! can run against in-memory stand-ins.
//!
//! ```no_run
//! use logoff::app::{run, Collaborators};
//! use logoff::config::Settings;
//! use logoff::countdown::SystemClock;
//! use logoff::display::TerminalConsole;
//! use logoff::terminate::SystemSession;
//!
//! let mut session = SystemSession;
//! let mut stderr = std::io::stderr();
//! let outcome = run(
//!     &["30", "/fake"],
//!     &Settings::default(),
//!     Collaborators {
//!         clock: &SystemClock,
//!         console: Box::new(TerminalConsole::new()),
//!         session: &mut session,
//!         audit: &mut stderr,
//!     },
//! );
//! assert!(outcome.is_ok());
//! ```

pub mod app;
pub mod build_info;
pub mod cli;
pub mod config;
pub mod countdown;
pub mod display;
pub mod error;
pub mod exit_codes;
pub mod flags;
pub mod logging;
pub mod target;
pub mod terminate;
