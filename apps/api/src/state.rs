use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::preview::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Open preview sessions, bounded by `config.max_preview_sessions`.
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let ttl_secs = i64::try_from(config.preview_session_ttl_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        let idle_ttl = Duration::seconds(ttl_secs);
        let sessions = Arc::new(SessionStore::new(config.max_preview_sessions, idle_ttl));
        Self { config, sessions }
    }
}
