use anyhow::{Context, Result};

use crate::layout::theme::{ColorSchemeId, TemplateId};

/// Application configuration loaded from environment variables.
/// Every variable is optional; unset ones fall back to `Config::default()`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub default_template: TemplateId,
    pub default_color_scheme: ColorSchemeId,
    pub max_preview_sessions: usize,
    /// Preview sessions not looked up for this long are dropped on the next create.
    pub preview_session_ttl_secs: u64,
    /// Horizontal space kept free on each side of a scaled preview page.
    pub preview_gutter_px: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            default_template: TemplateId::Usa,
            default_color_scheme: ColorSchemeId::Navy,
            max_preview_sessions: 256,
            preview_session_ttl_secs: 1800,
            preview_gutter_px: 32.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        let defaults = Config::default();

        Ok(Config {
            port: optional_env("PORT")
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("PORT must be a valid port number")?
                .unwrap_or(defaults.port),
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            default_template: optional_env("DEFAULT_TEMPLATE")
                .map(|v| v.parse::<TemplateId>().map_err(anyhow::Error::msg))
                .transpose()
                .context("DEFAULT_TEMPLATE must be one of india, usa, classic")?
                .unwrap_or(defaults.default_template),
            default_color_scheme: optional_env("DEFAULT_COLOR_SCHEME")
                .map(|v| v.parse::<ColorSchemeId>().map_err(anyhow::Error::msg))
                .transpose()
                .context("DEFAULT_COLOR_SCHEME must be one of navy, emerald, crimson, slate")?
                .unwrap_or(defaults.default_color_scheme),
            max_preview_sessions: optional_env("MAX_PREVIEW_SESSIONS")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MAX_PREVIEW_SESSIONS must be a non-negative integer")?
                .unwrap_or(defaults.max_preview_sessions),
            preview_session_ttl_secs: optional_env("PREVIEW_SESSION_TTL_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("PREVIEW_SESSION_TTL_SECS must be a non-negative integer")?
                .unwrap_or(defaults.preview_session_ttl_secs),
            preview_gutter_px: optional_env("PREVIEW_GUTTER_PX")
                .map(|v| v.parse::<f32>())
                .transpose()
                .context("PREVIEW_GUTTER_PX must be a number")?
                .unwrap_or(defaults.preview_gutter_px),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
