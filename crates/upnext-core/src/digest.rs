//! Digest building: selecting the events that deserve prominence right now.
//!
//! [`build_digest`] walks an already-sorted sequence of event instances and
//! produces a [`Digest`]: the current primary event (with any same-start
//! conflicts), the next secondary event (with its conflict count), and
//! whether a specific watched event was encountered. The scan is a single
//! linear pass with early termination, so the cost per refresh stays small
//! even when the query window spans many days.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::event::EventInstance;
use crate::time::flip_instant;

/// How many distinct start-time clusters the digest tracks: one primary and
/// one secondary. This is display capacity, not a data property; the scan
/// terminates at the first event beyond it.
pub const MAX_START_CLUSTERS: usize = 2;

/// The computed summary of which instances are primary/secondary/conflicting
/// for one point in time.
///
/// Indices point into the input sequence handed to [`build_digest`]; the
/// rendering side maps them back to fetch title, location, and color. A
/// digest is produced fresh on every invocation and shares no state with
/// previous ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    /// Index of the primary event, if any instance is still current.
    pub primary_index: Option<usize>,
    /// Index of the first event conflicting with the primary, if any.
    pub primary_conflict_index: Option<usize>,
    /// Number of events sharing the primary start time.
    pub primary_count: usize,
    /// Index of the secondary event, if any.
    pub secondary_index: Option<usize>,
    /// Number of events sharing the secondary start time.
    pub secondary_count: usize,
    /// Whether the watched event id was seen among still-current events.
    pub watch_found: bool,
}

impl Digest {
    /// Returns `true` if any instance is still current.
    pub fn has_current_events(&self) -> bool {
        self.primary_index.is_some()
    }

    /// Resolves the primary event against the input sequence.
    pub fn primary_event<'a>(&self, events: &'a [EventInstance]) -> Option<&'a EventInstance> {
        self.primary_index.and_then(|index| events.get(index))
    }

    /// Resolves the first primary conflict against the input sequence.
    pub fn primary_conflict_event<'a>(
        &self,
        events: &'a [EventInstance],
    ) -> Option<&'a EventInstance> {
        self.primary_conflict_index.and_then(|index| events.get(index))
    }

    /// Resolves the secondary event against the input sequence.
    pub fn secondary_event<'a>(&self, events: &'a [EventInstance]) -> Option<&'a EventInstance> {
        self.secondary_index.and_then(|index| events.get(index))
    }

    /// Number of primary events beyond the first, for "N more events" labels.
    pub fn additional_primary_count(&self) -> usize {
        self.primary_count.saturating_sub(1)
    }
}

/// A run of still-current events sharing one exact localized start time.
struct Cluster {
    first_index: usize,
    start: DateTime<Utc>,
    count: usize,
    second_index: Option<usize>,
}

/// Builds the digest for `now` from an ordered event sequence.
///
/// The sequence must already be sorted by ascending start day, all-day before
/// timed, then ascending start instant; the scan relies on that order and
/// never re-sorts. Events whose flip instant is strictly before `now` are
/// skipped without terminating the scan, because the input is sorted by start
/// and not by flip instant. Surviving events are grouped into clusters keyed
/// by exact localized start time; membership is checked against earlier
/// clusters first, so a late event sharing the primary start still counts as
/// a primary conflict. The first event belonging to no tracked cluster ends
/// the scan.
///
/// Conflict membership compares start times, not flip instants: an all-day
/// and a timed event whose starts coincide exactly stack together even though
/// they flip at different moments.
pub fn build_digest<Tz: TimeZone>(
    events: &[EventInstance],
    watch_id: Option<&str>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Digest {
    let mut clusters: Vec<Cluster> = Vec::with_capacity(MAX_START_CLUSTERS);
    let mut watch_found = false;

    for (index, event) in events.iter().enumerate() {
        let local_start = event.start.localize(tz);
        let local_end = event.end.localize(tz);
        let flip = flip_instant(local_start, local_end, event.is_all_day());

        if flip < now {
            trace!(id = %event.id, flip = %flip, "flip instant already passed, skipping");
            continue;
        }

        if watch_id.is_some_and(|id| id == event.id) {
            watch_found = true;
        }

        let position = clusters
            .iter()
            .position(|cluster| cluster.start == local_start);
        match position {
            Some(position) => {
                let cluster = &mut clusters[position];
                if cluster.second_index.is_none() {
                    cluster.second_index = Some(index);
                }
                cluster.count += 1;
            }
            None if clusters.len() < MAX_START_CLUSTERS => {
                clusters.push(Cluster {
                    first_index: index,
                    start: local_start,
                    count: 1,
                    second_index: None,
                });
            }
            // A third distinct start time: nothing further can belong to
            // either tracked cluster.
            None => break,
        }
    }

    let mut digest = Digest {
        watch_found,
        ..Digest::default()
    };
    if let Some(primary) = clusters.first() {
        digest.primary_index = Some(primary.first_index);
        digest.primary_conflict_index = primary.second_index;
        digest.primary_count = primary.count;
    }
    if let Some(secondary) = clusters.get(1) {
        digest.secondary_index = Some(secondary.first_index);
        digest.secondary_count = secondary.count;
    }
    digest
}
