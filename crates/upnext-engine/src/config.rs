//! Engine configuration.

use std::time::Duration;

use upnext_core::RefreshConfig;

/// Configuration for the widget engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How far ahead of `now` the source is asked for instances.
    pub search_window: Duration,

    /// Debounce and fallback-wake settings for the refresh scheduler.
    pub refresh: RefreshConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_window: Duration::from_secs(7 * 24 * 3600),
            refresh: RefreshConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Builder: set the search window.
    pub fn with_search_window(mut self, window: Duration) -> Self {
        self.search_window = window;
        self
    }

    /// Builder: set the refresh configuration.
    pub fn with_refresh(mut self, refresh: RefreshConfig) -> Self {
        self.refresh = refresh;
        self
    }
}
