//! Environment overrides for [`GameConfig`]
//!
//! - `CASCADE_DROP_MS`: initial drop interval
//! - `CASCADE_SPEEDUP_MS`: interval reduction per cleared row
//! - `CASCADE_MIN_DROP_MS`: interval floor
//! - `CASCADE_SCORING`: `classic` selects the small score table
//!
//! Unset or unparsable values keep the default.

use crate::types::GameConfig;

/// Build a config from the process environment.
pub fn game_config_from_env() -> GameConfig {
    game_config_from_lookup(|key| std::env::var(key).ok())
}

/// Build a config from any key lookup (the environment, a test map).
pub fn game_config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GameConfig {
    let mut config = match lookup("CASCADE_SCORING") {
        Some(s) if s.trim().eq_ignore_ascii_case("classic") => GameConfig::classic(),
        _ => GameConfig::default(),
    };

    let number = |key: &str| -> Option<u32> { lookup(key).and_then(|s| s.trim().parse().ok()) };

    if let Some(ms) = number("CASCADE_DROP_MS").filter(|&ms| ms > 0) {
        config.initial_drop_ms = ms;
    }
    if let Some(ms) = number("CASCADE_SPEEDUP_MS") {
        config.speed_increase_per_line_ms = ms;
    }
    if let Some(ms) = number("CASCADE_MIN_DROP_MS").filter(|&ms| ms > 0) {
        config.min_drop_ms = ms;
    }
    config
}
