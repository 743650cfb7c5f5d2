//! System event monitoring: sleep/resume and wall-clock changes.
//!
//! - systemd-logind `PrepareForSleep` over the system bus
//! - a `CLOCK_REALTIME` timerfd armed with `TFD_TIMER_CANCEL_ON_SET`
//!
//! Both run on their own threads and feed the main loop's signal channel.
//! A clock jump caused by resuming from suspend is reported once, as a
//! resume, not a second time as a clock change.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use nix::errno::Errno;
use nix::sys::time::TimeSpec;
use nix::sys::timerfd::{ClockId, Expiration, TimerFd, TimerFlags, TimerSetTimeFlags};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use zbus::blocking::Connection;

use crate::io::signals::SignalMessage;

const MAX_MONITOR_RESTARTS: u8 = 3;
const MONITOR_RESTART_DELAY: Duration = Duration::from_secs(2);
const RESUME_GRACE_SECS: i64 = 5;

#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
trait LogindManager {
    /// `start` is true before suspend and false after resume.
    #[zbus(signal)]
    fn prepare_for_sleep(&self, start: bool) -> zbus::Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SleepPhase {
    #[default]
    Awake,
    Sleeping,
    Resumed(DateTime<Utc>),
}

/// Sleep state shared by the logind and timerfd threads.
#[derive(Debug, Clone, Default)]
struct SleepTracker {
    phase: Arc<Mutex<SleepPhase>>,
}

impl SleepTracker {
    fn set(&self, phase: SleepPhase) {
        if let Ok(mut guard) = self.phase.lock() {
            *guard = phase;
        }
    }

    /// Whether a clock jump at `now` is explained by suspend/resume.
    fn explains_clock_jump(&self, now: DateTime<Utc>) -> bool {
        match self.phase.lock().map(|guard| *guard) {
            Ok(SleepPhase::Sleeping) => true,
            Ok(SleepPhase::Resumed(at)) => (now - at).num_seconds().abs() <= RESUME_GRACE_SECS,
            _ => false,
        }
    }
}

/// Start the sleep/resume and time change monitors.
///
/// Failures only disable the affected detector; the scheduler keeps working
/// on its own wake-up plan.
pub fn start_system_event_monitor(sender: Sender<SignalMessage>, debug_enabled: bool) {
    let tracker = SleepTracker::default();

    thread::spawn({
        let sender = sender.clone();
        let tracker = tracker.clone();
        move || run_sleep_monitor(sender, debug_enabled, tracker)
    });

    thread::spawn(move || {
        if let Err(e) = monitor_time_changes(&sender, debug_enabled, &tracker) {
            log_pipe!();
            log_warning!("Time change monitor error: {e:#}");
            log_indented!("Clock changes will be picked up at the next planned wake");
        }
    });
}

fn run_sleep_monitor(sender: Sender<SignalMessage>, debug_enabled: bool, tracker: SleepTracker) {
    let mut attempt = 0;
    loop {
        match monitor_sleep_signals(&sender, debug_enabled, &tracker) {
            Ok(()) => {
                if debug_enabled {
                    log_pipe!();
                    log_debug!("Sleep monitor exiting");
                }
                return;
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Sleep monitor error: {e:#}");
                if attempt >= MAX_MONITOR_RESTARTS {
                    log_indented!("Sleep/resume detection is not available");
                    return;
                }
                attempt += 1;
                log_indented!(
                    "Restarting sleep monitor (attempt {attempt}/{MAX_MONITOR_RESTARTS})"
                );
                thread::sleep(MONITOR_RESTART_DELAY);
            }
        }
    }
}

/// Returns `Ok` only when the main loop has gone away.
fn monitor_sleep_signals(
    sender: &Sender<SignalMessage>,
    debug_enabled: bool,
    tracker: &SleepTracker,
) -> Result<()> {
    let connection = Connection::system().context("Failed to connect to system D-Bus")?;
    let logind =
        LogindManagerProxyBlocking::new(&connection).context("Failed to create logind proxy")?;
    let signals = logind
        .receive_prepare_for_sleep()
        .context("Failed to subscribe to PrepareForSleep")?;

    if debug_enabled {
        log_debug!("Subscribed to logind PrepareForSleep");
    }

    for signal in signals {
        let going_to_sleep = match signal.args() {
            Ok(args) => args.start,
            Err(e) => {
                log_pipe!();
                log_warning!("Malformed PrepareForSleep signal: {e}");
                continue;
            }
        };

        if going_to_sleep {
            tracker.set(SleepPhase::Sleeping);
            log_pipe!();
            log_info!("System entering sleep");
            if sender.send(SignalMessage::Sleep { resuming: false }).is_err() {
                return Ok(());
            }
        } else {
            tracker.set(SleepPhase::Resumed(Utc::now()));
            log_pipe!();
            log_info!("System resumed from sleep, re-evaluating");
            if sender.send(SignalMessage::Sleep { resuming: true }).is_err() {
                return Ok(());
            }
        }
    }

    Err(anyhow!("PrepareForSleep signal stream ended"))
}

/// Far-future realtime timer that only fires when the clock is set.
struct ClockChangeTimer {
    timer: TimerFd,
}

impl ClockChangeTimer {
    fn new() -> nix::Result<Self> {
        let timer = TimerFd::new(ClockId::CLOCK_REALTIME, TimerFlags::empty())?;
        let mut clock_timer = Self { timer };
        clock_timer.arm()?;
        Ok(clock_timer)
    }

    fn arm(&mut self) -> nix::Result<()> {
        let flags =
            TimerSetTimeFlags::TFD_TIMER_ABSTIME | TimerSetTimeFlags::TFD_TIMER_CANCEL_ON_SET;
        let far_future = TimeSpec::new(i64::MAX / 1000, 0);
        self.timer.set(Expiration::OneShot(far_future), flags)
    }

    /// Block until the wall clock is changed.
    fn wait(&mut self) -> Result<()> {
        match self.timer.wait() {
            Ok(()) | Err(Errno::ECANCELED) => {
                self.arm().context("Failed to re-arm clock change timer")
            }
            Err(e) => Err(anyhow!("Clock change timer failed: {e}")),
        }
    }
}

fn monitor_time_changes(
    sender: &Sender<SignalMessage>,
    debug_enabled: bool,
    tracker: &SleepTracker,
) -> Result<()> {
    let mut timer = ClockChangeTimer::new().context("Failed to create clock change timer")?;

    if debug_enabled {
        log_pipe!();
        log_debug!("Watching for wall-clock changes");
    }

    loop {
        timer.wait()?;

        if tracker.explains_clock_jump(Utc::now()) {
            continue;
        }

        log_pipe!();
        log_info!("System time changed, re-evaluating");
        if sender.send(SignalMessage::TimeChange).is_err() {
            return Ok(());
        }
    }
}
