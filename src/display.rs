//! In-place countdown rendering.
//!
//! The renderer remembers where the countdown starts (the anchor) and redraws
//! both lines there every tick. Each line is padded to the terminal width so a
//! shorter string fully overwrites a longer one from the previous tick.
//! Rows for the frame are reserved up front so a redraw never scrolls.

use std::io::{self, IsTerminal, Stdout, Write};

use chrono::{DateTime, Local, TimeDelta};
use crossterm::cursor::{self, MoveTo};
use crossterm::style::{Color, Print, Stylize};
use crossterm::{terminal, QueueableCommand};
use tracing::{debug, warn};

use crate::countdown::CountdownDisplay;

/// Width used when the terminal size cannot be queried.
pub const FALLBACK_COLUMNS: u16 = 80;

pub const BANNER_HEADLINE: &str = "This user is about to be logged out.";
pub const BANNER_DETAIL: &str = "Please save all unsaved work before the timer expires.";
pub const LOGOFF_LINE: &str = "LOGOFF";

const LABEL_REMAINING: &str = "Time remaining: ";
const LABEL_TARGET: &str = "Time of logoff: ";
const LONG_DATE_TIME: &str = "%A, %B %-d, %Y %H:%M:%S";

const SECONDS_PER_DAY: i64 = 86_400;

/// Rows covered by one countdown frame.
const FRAME_ROWS: u16 = 2;

/// Terminal operations the countdown needs.
pub trait Console {
    /// Current cursor position as `(column, row)`.
    fn cursor_position(&mut self) -> io::Result<(u16, u16)>;
    fn move_cursor(&mut self, column: u16, row: u16) -> io::Result<()>;
    /// Width of the screen buffer in columns.
    fn buffer_width(&self) -> u16;
    /// Visible rows, when known. Cursor rows are relative to this area.
    fn buffer_height(&self) -> Option<u16> {
        None
    }
    /// Whether output reaches a terminal that understands styling.
    fn is_terminal(&self) -> bool {
        false
    }
    /// Write text at the cursor without a trailing newline.
    fn write_text(&mut self, text: &str) -> io::Result<()>;
    fn write_line(&mut self, text: &str) -> io::Result<()>;
    /// Release the console for the rest of the process. The console is
    /// consumed and nothing can be drawn afterwards.
    fn detach(self: Box<Self>) -> io::Result<()>;
}

/// Fixed screen position captured once before the countdown starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchor {
    pub column: u16,
    pub row: u16,
}

/// Redraws remaining time and logoff time at a fixed anchor.
pub struct ConsoleRenderer {
    console: Box<dyn Console>,
    anchor: Anchor,
}

impl ConsoleRenderer {
    /// Capture the anchor at the current cursor position.
    ///
    /// If the position cannot be read the top-left corner is used. When the
    /// frame would run past the bottom row, the screen is scrolled first and
    /// the anchor moved up by the same amount.
    pub fn attach(mut console: Box<dyn Console>) -> Self {
        let mut anchor = match console.cursor_position() {
            Ok((column, row)) => Anchor { column, row },
            Err(e) => {
                warn!(error = %e, "cannot read cursor position; drawing at top-left");
                Anchor::default()
            }
        };
        if let Some(height) = console.buffer_height() {
            let overflow = anchor.row.saturating_add(FRAME_ROWS).saturating_sub(height);
            for _ in 0..overflow {
                if let Err(e) = console.write_line("") {
                    warn!(error = %e, "cannot reserve countdown rows");
                    break;
                }
            }
            anchor.row = anchor.row.saturating_sub(overflow);
        }
        debug!(column = anchor.column, row = anchor.row, "countdown anchor captured");
        Self { console, anchor }
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Print the final line after the countdown ends and release the console.
    pub fn finish(mut self) -> io::Result<()> {
        self.console.write_line(LOGOFF_LINE)
    }
}

impl CountdownDisplay for ConsoleRenderer {
    fn render(&mut self, remaining: TimeDelta, target: DateTime<Local>) -> io::Result<()> {
        let width = usize::from(self.console.buffer_width());
        let frame = format!(
            "{}{}",
            pad_to_width(&format!("{LABEL_REMAINING}{}", format_remaining(remaining)), width),
            pad_to_width(&format!("{LABEL_TARGET}{}", format_target(target)), width),
        );
        self.console.move_cursor(self.anchor.column, self.anchor.row)?;
        self.console.write_text(&frame)
    }
}

/// Write the two-line warning shown before the countdown.
pub fn write_banner(console: &mut dyn Console, color: bool) -> io::Result<()> {
    if color {
        console.write_line(&BANNER_HEADLINE.with(Color::Yellow).bold().to_string())?;
        console.write_line(BANNER_DETAIL)
    } else {
        console.write_line(BANNER_HEADLINE)?;
        console.write_line(BANNER_DETAIL)
    }
}

/// Format a non-negative remaining duration as `[N day(s), ]hh:mm:ss`.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    let days = total / SECONDS_PER_DAY;
    let rest = total % SECONDS_PER_DAY;
    let clock = format!("{:02}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

/// Long-form local date and time, e.g. `Tuesday, January 1, 2030 12:00:00`.
pub fn format_target(target: DateTime<Local>) -> String {
    target.format(LONG_DATE_TIME).to_string()
}

fn pad_to_width(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

// ---------------------------------------------------------------------------
// TerminalConsole
// ---------------------------------------------------------------------------

/// Console backed by the process's stdout via crossterm.
///
/// When stdout is not a terminal, cursor movement is skipped and the
/// fallback width is used.
pub struct TerminalConsole {
    out: Stdout,
    interactive: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        let out = io::stdout();
        let interactive = out.is_terminal();
        Self { out, interactive }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn cursor_position(&mut self) -> io::Result<(u16, u16)> {
        if !self.interactive {
            return Ok((0, 0));
        }
        self.out.flush()?;
        cursor::position()
    }

    fn move_cursor(&mut self, column: u16, row: u16) -> io::Result<()> {
        if self.interactive {
            self.out.queue(MoveTo(column, row))?;
        }
        Ok(())
    }

    fn buffer_width(&self) -> u16 {
        if !self.interactive {
            return FALLBACK_COLUMNS;
        }
        terminal::size()
            .map(|(columns, _)| columns)
            .ok()
            .filter(|columns| *columns > 0)
            .unwrap_or(FALLBACK_COLUMNS)
    }

    fn buffer_height(&self) -> Option<u16> {
        if !self.interactive {
            return None;
        }
        terminal::size()
            .map(|(_, rows)| rows)
            .ok()
            .filter(|rows| *rows > 0)
    }

    fn is_terminal(&self) -> bool {
        self.interactive
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.out.queue(Print(text))?;
        self.out.flush()
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    fn detach(mut self: Box<Self>) -> io::Result<()> {
        debug!("detaching from console");
        self.out.flush()?;
        release_console()
    }
}

#[cfg(windows)]
fn release_console() -> io::Result<()> {
    // SAFETY: FreeConsole takes no arguments and only affects this process.
    unsafe { windows::Win32::System::Console::FreeConsole() }
        .map_err(|e| io::Error::other(e.to_string()))
}

/// Point every standard stream that is still a terminal at `/dev/null`.
/// Redirected streams are left alone.
#[cfg(unix)]
fn release_console() -> io::Result<()> {
    use std::fs::OpenOptions;
    use std::os::fd::AsRawFd;

    let null = OpenOptions::new().read(true).write(true).open("/dev/null")?;
    let attached = [
        io::stdin().is_terminal(),
        io::stdout().is_terminal(),
        io::stderr().is_terminal(),
    ];
    for fd in terminal_descriptors(attached) {
        // SAFETY: both descriptors are open for the duration of the call.
        if unsafe { libc::dup2(null.as_raw_fd(), fd) } == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn release_console() -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn terminal_descriptors(attached: [bool; 3]) -> Vec<libc::c_int> {
    [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO]
        .into_iter()
        .zip(attached)
        .filter_map(|(fd, tty)| tty.then_some(fd))
        .collect()
}
