//! Time types and normalization for calendar event instances.
//!
//! This module provides [`EventTime`] for representing event boundaries
//! (which may be either a specific instant or an all-day date), the
//! [`localize`](EventTime::localize) operation that maps both kinds onto one
//! comparable timeline, the [`flip_instant`] rule that decides when an event
//! stops being the most relevant one, and [`TimeWindow`] for query ranges.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A boundary of a calendar event instance.
///
/// Event boundaries come in two flavors:
/// - **Timed**: a specific point in time, stored as UTC
/// - **AllDay**: a date without a time of day
///
/// The all-day variant is anchored to UTC: its [`raw_utc`](Self::raw_utc)
/// reading is midnight UTC of that date. That reading is only meaningful for
/// coarse window math; any ordering or flip comparison must go through
/// [`localize`](Self::localize) first so that all-day boundaries land on the
/// viewer's local midnight instead of UTC midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific instant, stored in UTC.
    Timed(DateTime<Utc>),
    /// An all-day boundary (no specific time of day).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates a timed boundary from a UTC instant.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::Timed(dt)
    }

    /// Creates an all-day boundary from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is an all-day boundary.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the raw UTC-anchored reading of this boundary.
    ///
    /// For all-day boundaries this is midnight UTC of the date. It is the
    /// representation upstream sources deliver and what window overlap math
    /// operates on; it must not be compared against localized instants.
    pub fn raw_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Timed(dt) => *dt,
            Self::AllDay(date) => date.and_hms_opt(0, 0, 0).expect("valid time").and_utc(),
        }
    }

    /// Maps this boundary onto the local timeline of `tz`.
    ///
    /// Timed boundaries are already absolute and are returned unchanged.
    /// All-day boundaries re-render the same calendar date at midnight under
    /// `tz` and return the resulting absolute instant.
    ///
    /// Midnights made ambiguous by a backward clock shift resolve to the
    /// earlier offset; midnights erased by a forward shift keep the raw UTC
    /// reading.
    pub fn localize<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            Self::Timed(dt) => *dt,
            Self::AllDay(date) => {
                let midnight = date.and_hms_opt(0, 0, 0).expect("valid time");
                match tz.from_local_datetime(&midnight) {
                    LocalResult::Single(dt) => dt.with_timezone(&Utc),
                    LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
                    LocalResult::None => midnight.and_utc(),
                }
            }
        }
    }
}

/// Computes the flip instant of an event from its localized boundaries.
///
/// The flip instant is the moment the event stops being the most relevant
/// "current" item. All-day events flip at their own (localized) start: they
/// are banners for the start of the day, not ongoing items. Timed events flip
/// at the midpoint of `[local_start, local_end]`, so an event cedes
/// prominence once it is half over rather than only once it ends.
///
/// A `local_end` before `local_start` is an upstream data error; the midpoint
/// arithmetic is applied to it as given rather than rejected here.
pub fn flip_instant(
    local_start: DateTime<Utc>,
    local_end: DateTime<Utc>,
    all_day: bool,
) -> DateTime<Utc> {
    if all_day {
        local_start
    } else {
        local_start + (local_end - local_start) / 2
    }
}

/// A time window for querying upcoming event instances.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window starting at `now` and extending the given duration.
    pub fn from_now(now: DateTime<Utc>, duration: std::time::Duration) -> Self {
        // Out-of-range durations clamp to the far future.
        let length = Duration::from_std(duration).unwrap_or(Duration::MAX);
        let end = now.checked_add_signed(length).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start: now, end }
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if an instant falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if a `[start, end)` range overlaps this window.
    ///
    /// A range overlaps if it starts before the window ends AND ends after
    /// the window starts.
    pub fn overlaps(&self, range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> bool {
        range_start < self.end && range_end > self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc_offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    mod event_time {
        use super::*;

        #[test]
        fn timed_creation() {
            let dt = utc(2025, 2, 5, 10, 30, 0);
            let et = EventTime::from_utc(dt);
            assert!(!et.is_all_day());
            assert_eq!(et.raw_utc(), dt);
        }

        #[test]
        fn all_day_creation() {
            let et = EventTime::from_date(date(2025, 2, 5));
            assert!(et.is_all_day());
            assert_eq!(et.raw_utc(), utc(2025, 2, 5, 0, 0, 0));
        }

        #[test]
        fn localize_timed_is_identity() {
            let dt = utc(2025, 2, 5, 10, 30, 0);
            let et = EventTime::from_utc(dt);
            assert_eq!(et.localize(&Utc), dt);
            assert_eq!(et.localize(&utc_offset(5)), dt);
            assert_eq!(et.localize(&utc_offset(-8)), dt);
        }

        #[test]
        fn localize_all_day_east_of_utc() {
            // Midnight Feb 5 at UTC+5 is 19:00 Feb 4 in UTC.
            let et = EventTime::from_date(date(2025, 2, 5));
            assert_eq!(et.localize(&utc_offset(5)), utc(2025, 2, 4, 19, 0, 0));
        }

        #[test]
        fn localize_all_day_west_of_utc() {
            // Midnight Feb 5 at UTC-5 is 05:00 Feb 5 in UTC.
            let et = EventTime::from_date(date(2025, 2, 5));
            assert_eq!(et.localize(&utc_offset(-5)), utc(2025, 2, 5, 5, 0, 0));
        }

        #[test]
        fn localize_all_day_in_utc_matches_raw() {
            let et = EventTime::from_date(date(2025, 2, 5));
            assert_eq!(et.localize(&Utc), et.raw_utc());
        }

        #[test]
        fn serde_roundtrip() {
            let et_timed = EventTime::from_utc(utc(2025, 2, 5, 10, 30, 0));
            let json = serde_json::to_string(&et_timed).unwrap();
            let parsed: EventTime = serde_json::from_str(&json).unwrap();
            assert_eq!(et_timed, parsed);

            let et_all_day = EventTime::from_date(date(2025, 2, 5));
            let json = serde_json::to_string(&et_all_day).unwrap();
            let parsed: EventTime = serde_json::from_str(&json).unwrap();
            assert_eq!(et_all_day, parsed);
        }
    }

    mod flip {
        use super::*;

        #[test]
        fn timed_event_flips_at_midpoint() {
            let start = utc(2025, 2, 5, 10, 0, 0);
            let end = utc(2025, 2, 5, 11, 0, 0);
            assert_eq!(flip_instant(start, end, false), utc(2025, 2, 5, 10, 30, 0));
        }

        #[test]
        fn all_day_event_flips_at_start_regardless_of_end() {
            let tz = utc_offset(-5);
            let start = EventTime::from_date(date(2025, 2, 5)).localize(&tz);
            let short_end = EventTime::from_date(date(2025, 2, 6)).localize(&tz);
            let long_end = EventTime::from_date(date(2025, 2, 9)).localize(&tz);

            assert_eq!(flip_instant(start, short_end, true), start);
            assert_eq!(flip_instant(start, long_end, true), start);
        }

        #[test]
        fn malformed_range_keeps_midpoint_arithmetic() {
            // End before start is upstream garbage; the midpoint lands
            // halfway back toward the end rather than being rejected.
            let start = utc(2025, 2, 5, 10, 0, 0);
            let end = utc(2025, 2, 5, 9, 0, 0);
            assert_eq!(flip_instant(start, end, false), utc(2025, 2, 5, 9, 30, 0));
        }

        #[test]
        fn zero_length_event_flips_at_start() {
            let start = utc(2025, 2, 5, 10, 0, 0);
            assert_eq!(flip_instant(start, start, false), start);
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn creation() {
            let start = utc(2025, 2, 5, 9, 0, 0);
            let end = utc(2025, 2, 5, 17, 0, 0);
            let window = TimeWindow::new(start, end);
            assert_eq!(window.start, start);
            assert_eq!(window.end, end);
            assert_eq!(window.duration(), Duration::hours(8));
        }

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
        }

        #[test]
        fn from_now() {
            let now = utc(2025, 2, 5, 10, 0, 0);
            let window = TimeWindow::from_now(now, std::time::Duration::from_secs(7 * 24 * 3600));
            assert_eq!(window.start, now);
            assert_eq!(window.end, utc(2025, 2, 12, 10, 0, 0));
        }

        #[test]
        fn contains_half_open() {
            let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));

            assert!(window.contains(utc(2025, 2, 5, 9, 0, 0)));
            assert!(window.contains(utc(2025, 2, 5, 16, 59, 59)));
            assert!(!window.contains(utc(2025, 2, 5, 17, 0, 0)));
            assert!(!window.contains(utc(2025, 2, 5, 8, 59, 59)));
        }

        #[test]
        fn overlap_edges_are_exclusive() {
            let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));

            // Fully inside.
            assert!(window.overlaps(utc(2025, 2, 5, 10, 0, 0), utc(2025, 2, 5, 11, 0, 0)));
            // Straddling either edge.
            assert!(window.overlaps(utc(2025, 2, 5, 8, 0, 0), utc(2025, 2, 5, 10, 0, 0)));
            assert!(window.overlaps(utc(2025, 2, 5, 16, 0, 0), utc(2025, 2, 5, 18, 0, 0)));
            // Touching an edge does not overlap.
            assert!(!window.overlaps(utc(2025, 2, 5, 8, 0, 0), utc(2025, 2, 5, 9, 0, 0)));
            assert!(!window.overlaps(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 18, 0, 0)));
        }
    }
}
