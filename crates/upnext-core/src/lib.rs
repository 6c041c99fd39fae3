//! Core types: time normalization, event instances, digest building, refresh scheduling

pub mod digest;
pub mod event;
pub mod refresh;
pub mod time;
pub mod tracing;

pub use digest::{Digest, MAX_START_CLUSTERS, build_digest};
pub use event::EventInstance;
pub use refresh::{RefreshConfig, RefreshOutcome, RefreshScheduler, RefreshUpdate};
pub use time::{EventTime, TimeWindow, flip_instant};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
