use std::env;
use std::time::Duration;

use crate::core::copy_state::COPY_FEEDBACK_WINDOW;

/// Syntect theme used when `CHAT_FENCE_THEME` is unset.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How long a copied code block shows its acknowledgement.
    pub copy_window: Duration,
    /// Syntect theme name for code highlighting.
    pub theme: String,
    /// Whether code blocks are syntax highlighted.
    pub highlight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            copy_window: COPY_FEEDBACK_WINDOW,
            theme: DEFAULT_THEME.to_string(),
            highlight: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CHAT_FENCE_COPY_WINDOW_MS must be a positive integer (got {0:?})")]
    InvalidCopyWindow(String),
}

/// Load configuration from the process environment.
///
/// - `CHAT_FENCE_COPY_WINDOW_MS`: copy acknowledgement window, default 2000
/// - `CHAT_FENCE_THEME`: syntect theme, default `base16-ocean.dark`
/// - `CHAT_FENCE_HIGHLIGHT`: 0, false or off to disable highlighting
pub fn load() -> Result<Config, ConfigError> {
    load_from(|key| env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    let defaults = Config::default();

    let copy_window = match lookup("CHAT_FENCE_COPY_WINDOW_MS") {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => Duration::from_millis(ms),
            _ => return Err(ConfigError::InvalidCopyWindow(raw)),
        },
        None => defaults.copy_window,
    };

    let theme = lookup("CHAT_FENCE_THEME")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(defaults.theme);

    let highlight = !lookup("CHAT_FENCE_HIGHLIGHT")
        .map(|s| {
            let s = s.trim();
            s == "0" || s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("off")
        })
        .unwrap_or(false);

    Ok(Config {
        copy_window,
        theme,
        highlight,
    })
}
