//! The rendering seam.
//!
//! A [`RenderSink`] turns a digest into whatever visual surface the host
//! owns. The sink receives the digest together with the event sequence it
//! indexes into and is responsible for mapping indices back to titles,
//! locations, and colors, and for any localization of text.

use std::sync::Arc;

use tracing::{debug, info};

use upnext_core::{Digest, EventInstance};

/// Consumer of digest results on the display side.
pub trait RenderSink: Send + Sync {
    /// Presents a digest with at least one current event.
    fn show_digest(&self, digest: &Digest, events: &[EventInstance]);

    /// Presents the "no upcoming events" state.
    fn show_empty(&self);
}

impl<T: RenderSink + ?Sized> RenderSink for Arc<T> {
    fn show_digest(&self, digest: &Digest, events: &[EventInstance]) {
        (**self).show_digest(digest, events);
    }

    fn show_empty(&self) {
        (**self).show_empty();
    }
}

/// A sink that renders to the log.
///
/// Useful as a default while wiring a host, and as a template for real
/// sinks: it walks the digest the same way a visual renderer would.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn show_digest(&self, digest: &Digest, events: &[EventInstance]) {
        let Some(primary) = digest.primary_event(events) else {
            return;
        };
        info!(
            title = %primary.title,
            location = primary.location.as_deref().unwrap_or(""),
            stacked = digest.additional_primary_count(),
            "primary event"
        );
        if let Some(conflict) = digest.primary_conflict_event(events) {
            debug!(title = %conflict.title, "primary conflict");
        }
        if let Some(secondary) = digest.secondary_event(events) {
            info!(title = %secondary.title, stacked = digest.secondary_count, "secondary event");
        }
    }

    fn show_empty(&self) {
        info!("no upcoming events");
    }
}
