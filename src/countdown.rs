//! Second-aligned countdown loop.
//!
//! Each sleep ends on the next wall-clock second boundary instead of lasting a
//! fixed second, so time spent drawing never accumulates into drift.

use std::io;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use tracing::{debug, warn};

use crate::target::TimeTarget;

const MILLIS_PER_SECOND: u32 = 1000;

/// Source of "now" and the blocking sleep used by the countdown.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
    fn sleep(&self, duration: Duration);
}

/// Real wall clock backed by the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Something that can show the remaining time once per tick.
pub trait CountdownDisplay {
    fn render(&mut self, remaining: TimeDelta, target: DateTime<Local>) -> io::Result<()>;
}

/// What happened during one countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountdownSummary {
    /// Loop iterations (each ends with one aligned sleep).
    pub ticks: u64,
    /// Successful redraws.
    pub renders: u64,
}

/// Milliseconds from `now` to the start of the next whole second.
pub fn millis_to_next_second(now: DateTime<Local>) -> u64 {
    // Leap seconds report 1000..=1999 ms; clamp so we still sleep at least 1ms.
    let into_second = now.timestamp_subsec_millis().min(MILLIS_PER_SECOND - 1);
    u64::from(MILLIS_PER_SECOND - into_second)
}

/// Block until `target` is reached, redrawing `display` once per second.
///
/// `None` means the display is suppressed and nothing is drawn. A target at
/// or before the first reading of the clock returns without sleeping.
pub fn run_countdown<C: Clock + ?Sized>(
    clock: &C,
    target: TimeTarget,
    mut display: Option<&mut dyn CountdownDisplay>,
) -> CountdownSummary {
    let target = target.at();
    let mut summary = CountdownSummary::default();
    let mut render_failed = false;

    loop {
        let now = clock.now();
        if now >= target {
            break;
        }

        if let Some(display) = display.as_deref_mut() {
            let remaining = target - now;
            if remaining >= TimeDelta::zero() {
                match display.render(remaining, target) {
                    Ok(()) => summary.renders += 1,
                    Err(e) if !render_failed => {
                        render_failed = true;
                        warn!(error = %e, "countdown redraw failed; continuing without it");
                    }
                    Err(e) => debug!(error = %e, "countdown redraw failed"),
                }
            }
        }

        let wait = millis_to_next_second(clock.now());
        clock.sleep(Duration::from_millis(wait));
        summary.ticks += 1;
    }

    debug!(ticks = summary.ticks, renders = summary.renders, "countdown finished");
    summary
}
