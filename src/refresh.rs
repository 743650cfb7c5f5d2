//! Wake-up planning for the scheduling loop.
//!
//! After every evaluation the host asks [`RefreshScheduler::plan_next_wake`]
//! for the single instant it should wake up at. Candidates are the decision's
//! transition, a local-midnight recomputation in automatic mode, and the
//! periodic location re-poll; the earliest future one wins.
//!
//! A transition that is already in the past means the host overslept. Rather
//! than spinning, the scheduler retries with exponential backoff
//! (1 s, 2 s, 4 s, ... capped at 60 s) until a fresh transition resets it.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::constants::{MAX_STALE_BACKOFF_SECS, STALE_RETRY_CAP, location_refresh_interval};
use crate::schedule::ScheduleDecision;
use crate::schedule::calendar::{ensure_future, start_of_next_day};

/// When the host should wake next. Always strictly after the `now` it was planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPlan {
    pub next_wake: DateTime<Utc>,
}

/// Host bookkeeping that influences the wake-up plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshInputs {
    /// Appearance follows the schedule (not forced light or dark).
    pub is_automatic_mode: bool,
    /// The active schedule depends on a detected location.
    pub requires_location: bool,
    pub last_location_poll: Option<DateTime<Utc>>,
}

/// Owns the stale retry counter across wake-ups.
#[derive(Debug, Default)]
pub struct RefreshScheduler {
    stale_retry_count: u32,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stale_retry_count(&self) -> u32 {
        self.stale_retry_count
    }

    /// Forget any backoff progress, e.g. after a config reload.
    pub fn reset(&mut self) {
        self.stale_retry_count = 0;
    }

    /// Pick the next wake-up instant, or `None` when nothing is pending.
    ///
    /// Fixed decisions contribute no candidate and leave the retry counter
    /// as it was.
    pub fn plan_next_wake<Tz: TimeZone>(
        &mut self,
        now: DateTime<Utc>,
        decision: &ScheduleDecision,
        inputs: &RefreshInputs,
        time_zone: &Tz,
    ) -> Option<RefreshPlan> {
        let mut candidates: Vec<DateTime<Utc>> = Vec::with_capacity(3);

        if let ScheduleDecision::Transition {
            next_transition, ..
        } = decision
        {
            if *next_transition > now {
                self.stale_retry_count = 0;
                candidates.push(*next_transition);
            } else {
                candidates.push(now + stale_backoff(self.stale_retry_count));
                self.stale_retry_count = (self.stale_retry_count + 1).min(STALE_RETRY_CAP);
            }
        }

        if inputs.is_automatic_mode {
            candidates.push(ensure_future(now, start_of_next_day(now, time_zone)));
        }

        if inputs.requires_location
            && let Some(last_poll) = inputs.last_location_poll
        {
            candidates.push(last_poll + location_refresh_interval());
        }

        candidates
            .into_iter()
            .filter(|candidate| *candidate > now)
            .min()
            .map(|next_wake| RefreshPlan { next_wake })
    }
}

/// Delay before retrying a stale transition: `min(60 s, 2^retry_count s)`.
pub fn stale_backoff(retry_count: u32) -> Duration {
    let exponent = retry_count.min(STALE_RETRY_CAP);
    Duration::seconds((1_i64 << exponent).min(MAX_STALE_BACKOFF_SECS))
}
