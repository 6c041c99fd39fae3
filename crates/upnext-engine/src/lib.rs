//! Engine glue: collaborator seams and update orchestration.
//!
//! This crate wires the digest pipeline from `upnext-core` to the outside
//! world:
//! - [`InstanceSource`] — the query service answering "which instances fall
//!   in this window?"
//! - [`RenderSink`] — the display surface a digest is pushed to
//! - [`WakeTimer`] — the primitive that re-invokes the pipeline at the
//!   computed deadline
//! - [`WidgetEngine`] — the orchestration: fetch, digest, render, schedule
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Local;
//! use upnext_engine::{EngineConfig, FixedSource, LogSink, TokioWakeTimer, WidgetEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (timer, mut wakeups) = TokioWakeTimer::new();
//!     let engine = WidgetEngine::new(
//!         EngineConfig::default(),
//!         Local,
//!         FixedSource::empty(),
//!         LogSink,
//!         timer,
//!     );
//!
//!     engine.update_all().await;
//!     while wakeups.recv().await.is_some() {
//!         engine.time_changed(true).await;
//!     }
//! }
//! ```

mod config;
mod engine;
mod render;
mod source;
mod wake;

pub use config::EngineConfig;
pub use engine::{UpdateOutcome, WidgetEngine};
pub use render::{LogSink, RenderSink};
pub use source::{BoxFuture, ErrorSource, FixedSource, InstanceSource, SourceError, SourceResult};
pub use wake::{TokioWakeTimer, WakeTimer};
