//! Update orchestration: fetch, digest, render, schedule the next wake.
//!
//! [`WidgetEngine`] wires the refresh scheduler to its three collaborators:
//! an [`InstanceSource`] that answers window queries, a [`RenderSink`] that
//! owns the visual surface, and a [`WakeTimer`] that re-invokes the pipeline
//! later. One engine instance serves one display surface; all entry points
//! run the same pipeline and differ only in watch id and debounce handling.

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use upnext_core::{RefreshOutcome, RefreshScheduler, TimeWindow};

use crate::config::EngineConfig;
use crate::render::RenderSink;
use crate::source::InstanceSource;
use crate::wake::WakeTimer;

/// What one engine update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The display was refreshed and the next wake registered.
    Refreshed {
        /// The registered wake instant.
        next_wake: DateTime<Utc>,
    },
    /// The source failed; the empty view was shown and a fallback wake
    /// registered.
    SourceUnavailable {
        /// The registered wake instant.
        next_wake: DateTime<Utc>,
    },
    /// The update arrived inside the debounce window and was dropped.
    Debounced,
    /// A watched event changed outside the display window; nothing was
    /// rendered and no wake registered.
    Suppressed,
}

/// The update pipeline bound to its collaborators.
pub struct WidgetEngine<S, R, W, Tz: TimeZone> {
    config: EngineConfig,
    scheduler: RefreshScheduler<Tz>,
    source: S,
    sink: R,
    timer: W,
}

impl<S, R, W, Tz> WidgetEngine<S, R, W, Tz>
where
    S: InstanceSource,
    R: RenderSink,
    W: WakeTimer,
    Tz: TimeZone,
{
    /// Creates an engine for the given local timezone and collaborators.
    pub fn new(config: EngineConfig, tz: Tz, source: S, sink: R, timer: W) -> Self {
        let scheduler = RefreshScheduler::new(tz, config.refresh.clone());
        Self {
            config,
            scheduler,
            source,
            sink,
            timer,
        }
    }

    /// Runs an unconditional update, e.g. on startup or an explicit request.
    pub async fn update_all(&self) -> UpdateOutcome {
        self.perform_update(None, false, Utc::now()).await
    }

    /// Runs an update because a single upstream event changed.
    ///
    /// If the changed event is not part of the current display window, the
    /// update is suppressed: a change outside the window cannot alter what
    /// is shown.
    pub async fn instance_changed(&self, id: &str) -> UpdateOutcome {
        self.perform_update(Some(id), false, Utc::now()).await
    }

    /// Runs an update because time moved (a wake fired, the clock or
    /// timezone changed). Pass `consider_debounce` for triggers that can
    /// arrive in bursts.
    pub async fn time_changed(&self, consider_debounce: bool) -> UpdateOutcome {
        self.perform_update(None, consider_debounce, Utc::now()).await
    }

    async fn perform_update(
        &self,
        watch_id: Option<&str>,
        consider_debounce: bool,
        now: DateTime<Utc>,
    ) -> UpdateOutcome {
        let window = TimeWindow::from_now(now, self.config.search_window);
        let events = match self.source.fetch_instances(window).await {
            Ok(events) => events,
            Err(error) => {
                // An unreachable source means nothing usable to show; the
                // digest is skipped entirely and the wake falls back so the
                // pipeline retries later.
                warn!(%error, "event source unavailable, showing empty view");
                let next_wake = self.config.refresh.fallback_wake(now);
                self.sink.show_empty();
                self.timer.schedule(next_wake);
                return UpdateOutcome::SourceUnavailable { next_wake };
            }
        };

        match self.scheduler.refresh(&events, watch_id, now, consider_debounce) {
            RefreshOutcome::Debounced => UpdateOutcome::Debounced,
            RefreshOutcome::Completed(update) => {
                if !update.digest.has_current_events() {
                    self.sink.show_empty();
                } else if update.should_update {
                    self.sink.show_digest(&update.digest, &events);
                } else {
                    debug!("watched event outside display window, skipping update");
                    return UpdateOutcome::Suppressed;
                }

                info!(
                    next_wake = %update.next_wake,
                    delta = %describe_delta(update.next_wake, now),
                    "scheduled next refresh"
                );
                self.timer.schedule(update.next_wake);
                UpdateOutcome::Refreshed {
                    next_wake: update.next_wake,
                }
            }
        }
    }
}

/// Renders an instant as a signed offset from `now` for log lines.
fn describe_delta(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = at - now;
    if delta.num_minutes().abs() >= 1 {
        format!("{:+}m", delta.num_minutes())
    } else {
        format!("{:+}s", delta.num_seconds())
    }
}
