//! Refresh scheduling: debounce guard and next-wake computation.
//!
//! [`RefreshScheduler`] wraps a digest computation with a debounce guard
//! against overly frequent re-invocation and converts the digest into the
//! next wall-clock instant at which the caller should run the pipeline again.
//! The scheduler owns the only piece of long-lived state in the pipeline,
//! the instant of the last non-suppressed invocation, so its lifetime is the
//! caller's to manage and independent schedulers never interfere.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::digest::{Digest, build_digest};
use crate::event::EventInstance;

/// Configuration for the refresh scheduler. Plain durations; behavior is
/// fixed.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Minimum spacing between debounce-eligible refreshes.
    pub debounce_threshold: Duration,
    /// How far from `now` to schedule the next wake when no event supplies
    /// a usable flip instant.
    pub no_events_interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            debounce_threshold: Duration::from_secs(60),
            no_events_interval: Duration::from_secs(6 * 3600),
        }
    }
}

impl RefreshConfig {
    /// Builder: set the debounce threshold.
    pub fn with_debounce_threshold(mut self, threshold: Duration) -> Self {
        self.debounce_threshold = threshold;
        self
    }

    /// Builder: set the no-events fallback interval.
    pub fn with_no_events_interval(mut self, interval: Duration) -> Self {
        self.no_events_interval = interval;
        self
    }

    /// The fallback wake instant relative to `now`.
    ///
    /// Out-of-range configurations clamp to the far future instead of
    /// overflowing.
    pub fn fallback_wake(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match chrono::Duration::from_std(self.no_events_interval) {
            Ok(delay) => now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC),
            Err(_) => DateTime::<Utc>::MAX_UTC,
        }
    }
}

/// The result of one [`RefreshScheduler::refresh`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The call arrived inside the debounce window; nothing was computed and
    /// no state changed.
    Debounced,
    /// The digest was computed and a next wake instant derived.
    Completed(RefreshUpdate),
}

/// A completed refresh: the digest plus the scheduling decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshUpdate {
    /// The freshly built digest.
    pub digest: Digest,
    /// Whether the caller should produce a visible update. `false` only when
    /// a watched id was supplied and the watched event is outside the
    /// current display window.
    pub should_update: bool,
    /// The instant at which the caller must re-invoke the pipeline. Always
    /// strictly derived: either the primary event's flip instant (when in
    /// the future) or `now + no_events_interval`.
    pub next_wake: DateTime<Utc>,
}

/// Debounce state plus next-wake policy around [`build_digest`].
///
/// The invocation timestamp is guarded by a mutex because refreshes can be
/// triggered reentrantly from independent sources (a timer firing and a data
/// change notification arriving close together), and both paths read then
/// write the timestamp.
#[derive(Debug)]
pub struct RefreshScheduler<Tz: TimeZone> {
    tz: Tz,
    config: RefreshConfig,
    last_invocation: Mutex<Option<DateTime<Utc>>>,
}

impl<Tz: TimeZone> RefreshScheduler<Tz> {
    /// Creates a scheduler for the given local timezone and configuration.
    pub fn new(tz: Tz, config: RefreshConfig) -> Self {
        Self {
            tz,
            config,
            last_invocation: Mutex::new(None),
        }
    }

    /// Returns the instant of the last non-suppressed refresh, if any.
    pub fn last_invocation(&self) -> Option<DateTime<Utc>> {
        *self
            .last_invocation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one refresh: debounce gate, digest build, next-wake computation.
    ///
    /// With `consider_debounce` set and a previous invocation recorded, the
    /// call is suppressed when `|now - previous|` is below the configured
    /// threshold; a suppressed call computes nothing and leaves the recorded
    /// instant untouched. Otherwise `now` is recorded and the digest built.
    pub fn refresh(
        &self,
        events: &[EventInstance],
        watch_id: Option<&str>,
        now: DateTime<Utc>,
        consider_debounce: bool,
    ) -> RefreshOutcome {
        {
            let mut last = self
                .last_invocation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if consider_debounce && let Some(previous) = *last {
                let delta = (now - previous).abs();
                let threshold = chrono::Duration::from_std(self.config.debounce_threshold)
                    .unwrap_or(chrono::Duration::MAX);
                if delta < threshold {
                    debug!(delta_ms = delta.num_milliseconds(), "refresh suppressed by debounce");
                    return RefreshOutcome::Debounced;
                }
            }
            *last = Some(now);
        }

        let digest = build_digest(events, watch_id, now, &self.tz);
        let should_update = watch_id.is_none() || digest.watch_found;
        let next_wake = self.next_wake(&digest, events, now);

        RefreshOutcome::Completed(RefreshUpdate {
            digest,
            should_update,
            next_wake,
        })
    }

    /// Derives the next wake instant from a digest.
    ///
    /// The primary event's flip instant is the natural deadline: that is the
    /// moment the display content changes. When there is no primary, or the
    /// recomputed flip instant is not strictly in the future, fall back to a
    /// fixed interval from `now` so the pipeline is always re-invoked and
    /// can never go permanently idle.
    fn next_wake(
        &self,
        digest: &Digest,
        events: &[EventInstance],
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        match digest.primary_event(events) {
            Some(primary) => {
                let flip = primary.flip_instant(&self.tz);
                if flip > now {
                    flip
                } else {
                    warn!(flip = %flip, now = %now, "stale flip instant for primary event, using fallback wake");
                    self.config.fallback_wake(now)
                }
            }
            None => self.config.fallback_wake(now),
        }
    }
}
