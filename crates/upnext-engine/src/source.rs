//! The event-instance source seam.
//!
//! This module defines [`InstanceSource`], the abstraction over whatever
//! service answers "which event instances fall inside this window?". A
//! source is responsible for:
//! - Filtering to selected calendars and non-declined attendance
//! - Expanding recurring events into concrete instances
//! - Delivering instances sorted by ascending start day, all-day before
//!   timed, then ascending start instant
//!
//! The digest pipeline downstream relies on that sort order and never
//! re-sorts.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::TimeZone;
use thiserror::Error;

use upnext_core::{EventInstance, EventTime, TimeWindow};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors a source can report.
///
/// The engine treats every source failure as "no usable events"; these
/// variants exist for logging and diagnostics, not for caller recovery.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backing service could not be reached at all.
    #[error("event source unavailable: {message}")]
    Unavailable { message: String },

    /// The query ran but produced nothing usable.
    #[error("event query failed: {message}")]
    Query { message: String },
}

impl SourceError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A query service returning event instances in a time window.
pub trait InstanceSource: Send + Sync {
    /// Fetches the instances overlapping `window`.
    ///
    /// The returned sequence is finite, may be empty, and must already be
    /// sorted by ascending start day, all-day before timed, then ascending
    /// start instant.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the backing service is unreachable or
    /// the query fails.
    fn fetch_instances(&self, window: TimeWindow) -> BoxFuture<'_, SourceResult<Vec<EventInstance>>>;
}

impl<T: InstanceSource + ?Sized> InstanceSource for Arc<T> {
    fn fetch_instances(&self, window: TimeWindow) -> BoxFuture<'_, SourceResult<Vec<EventInstance>>> {
        (**self).fetch_instances(window)
    }
}

/// An in-memory source over a fixed set of instances.
///
/// Sorts its instances once at construction according to the delivery
/// contract, then answers window queries by raw-UTC overlap. Useful for
/// tests and for hosts that receive their event set through some other
/// channel.
#[derive(Debug, Clone)]
pub struct FixedSource {
    instances: Vec<EventInstance>,
}

impl FixedSource {
    /// Creates a source from instances in any order; `tz` determines the
    /// start day of timed instances for the sort.
    pub fn new<Tz: TimeZone>(mut instances: Vec<EventInstance>, tz: &Tz) -> Self {
        instances.sort_by_key(|instance| {
            let day = match &instance.start {
                EventTime::AllDay(date) => *date,
                EventTime::Timed(dt) => dt.with_timezone(tz).date_naive(),
            };
            // All-day first within a day: false orders before true.
            (day, !instance.is_all_day(), instance.start.raw_utc())
        });
        Self { instances }
    }

    /// Creates an empty source.
    pub fn empty() -> Self {
        Self {
            instances: Vec::new(),
        }
    }
}

impl InstanceSource for FixedSource {
    fn fetch_instances(&self, window: TimeWindow) -> BoxFuture<'_, SourceResult<Vec<EventInstance>>> {
        let matching: Vec<EventInstance> = self
            .instances
            .iter()
            .filter(|instance| window.overlaps(instance.start.raw_utc(), instance.end.raw_utc()))
            .cloned()
            .collect();
        Box::pin(async move { Ok(matching) })
    }
}

/// A source that always fails.
///
/// Placeholder for a backend that failed to initialize, and a convenient
/// way to exercise the unavailable path in tests.
#[derive(Debug)]
pub struct ErrorSource {
    message: String,
}

impl ErrorSource {
    /// Creates an error source with the given failure message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl InstanceSource for ErrorSource {
    fn fetch_instances(&self, _window: TimeWindow) -> BoxFuture<'_, SourceResult<Vec<EventInstance>>> {
        let error = SourceError::unavailable(self.message.clone());
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week_window() -> TimeWindow {
        TimeWindow::new(utc(2025, 2, 5, 0, 0, 0), utc(2025, 2, 12, 0, 0, 0))
    }

    #[tokio::test]
    async fn fixed_source_sorts_per_delivery_contract() {
        // Deliberately shuffled: a timed event on day two, an all-day event
        // on day one, and two timed events on day one out of order.
        let instances = vec![
            EventInstance::timed("later-day", "Review", utc(2025, 2, 6, 9, 0, 0), utc(2025, 2, 6, 10, 0, 0), "work"),
            EventInstance::timed("second", "Standup", utc(2025, 2, 5, 11, 0, 0), utc(2025, 2, 5, 11, 15, 0), "work"),
            EventInstance::all_day("banner", "Holiday", date(2025, 2, 5), date(2025, 2, 6), "home"),
            EventInstance::timed("first", "Breakfast", utc(2025, 2, 5, 8, 0, 0), utc(2025, 2, 5, 9, 0, 0), "home"),
        ];
        let source = FixedSource::new(instances, &Utc);

        let fetched = source.fetch_instances(week_window()).await.unwrap();
        let ids: Vec<&str> = fetched.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["banner", "first", "second", "later-day"]);
    }

    #[tokio::test]
    async fn fixed_source_filters_by_window_overlap() {
        let instances = vec![
            EventInstance::timed("inside", "A", utc(2025, 2, 5, 10, 0, 0), utc(2025, 2, 5, 11, 0, 0), "work"),
            EventInstance::timed("before", "B", utc(2025, 2, 4, 10, 0, 0), utc(2025, 2, 4, 11, 0, 0), "work"),
            EventInstance::timed("after", "C", utc(2025, 2, 20, 10, 0, 0), utc(2025, 2, 20, 11, 0, 0), "work"),
            // Starts before the window but runs into it.
            EventInstance::timed("straddle", "D", utc(2025, 2, 4, 23, 0, 0), utc(2025, 2, 5, 1, 0, 0), "work"),
        ];
        let source = FixedSource::new(instances, &Utc);

        let fetched = source.fetch_instances(week_window()).await.unwrap();
        let ids: Vec<&str> = fetched.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["straddle", "inside"]);
    }

    #[tokio::test]
    async fn empty_source_returns_no_instances() {
        let source = FixedSource::empty();
        let fetched = source.fetch_instances(week_window()).await.unwrap();
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn error_source_always_fails() {
        let source = ErrorSource::new("backend offline");
        let result = source.fetch_instances(week_window()).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("backend offline"));
    }
}
