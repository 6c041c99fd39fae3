//! The calendar event instance consumed by the digest pipeline.
//!
//! An [`EventInstance`] is one occurrence of a calendar event inside the
//! query window, as delivered by an upstream source: already filtered to
//! selected calendars and non-declined attendance, and already sorted by
//! ascending start day, all-day before timed, then ascending start instant.
//! The digest pipeline relies on that order and never re-sorts.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{self, EventTime};

/// One occurrence of a calendar event inside a query window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInstance {
    /// Opaque identifier, unique per instance.
    pub id: String,
    /// The event title/summary.
    pub title: String,
    /// When the instance starts.
    pub start: EventTime,
    /// When the instance ends.
    pub end: EventTime,
    /// Display color associated with the event, if any.
    pub color_tag: Option<String>,
    /// The event location, if any.
    pub location: Option<String>,
    /// The calendar this instance belongs to.
    pub calendar_id: String,
}

impl EventInstance {
    /// Creates a new instance with the required fields.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: EventTime,
        end: EventTime,
        calendar_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            color_tag: None,
            location: None,
            calendar_id: calendar_id.into(),
        }
    }

    /// Creates a timed instance from UTC start and end instants.
    pub fn timed(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendar_id: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            title,
            EventTime::from_utc(start),
            EventTime::from_utc(end),
            calendar_id,
        )
    }

    /// Creates an all-day instance spanning `[start, end)` in days.
    pub fn all_day(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        calendar_id: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            title,
            EventTime::from_date(start),
            EventTime::from_date(end),
            calendar_id,
        )
    }

    /// Builder method to set the color tag.
    pub fn with_color_tag(mut self, color: impl Into<String>) -> Self {
        self.color_tag = Some(color.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Returns `true` if this is an all-day instance.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Returns the start boundary on the local timeline of `tz`.
    pub fn local_start<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        self.start.localize(tz)
    }

    /// Returns the instant after which this instance is no longer the most
    /// relevant current item.
    ///
    /// Start and end are localized independently before the flip rule is
    /// applied; see [`time::flip_instant`].
    pub fn flip_instant<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        let local_start = self.start.localize(tz);
        let local_end = self.end.localize(tz);
        time::flip_instant(local_start, local_end, self.is_all_day())
    }
}
