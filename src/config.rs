use std::path::PathBuf;

use crate::constants::STARTING_LIVES;

const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_RENDER_FPS: u64 = 120;

/// Runtime settings, read from `PACMAN_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Simulated milliseconds advanced by one tick.
    pub tick_ms: u64,
    pub render_fps: u64,
    pub lives: u32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            lives: STARTING_LIVES,
            seed: None,
            log_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing, unparsable or
    /// zero values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let positive = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
        };
        Self {
            tick_ms: positive("PACMAN_TICK_MS").unwrap_or(defaults.tick_ms),
            render_fps: positive("PACMAN_FPS").unwrap_or(defaults.render_fps),
            lives: positive("PACMAN_LIVES")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.lives),
            seed: lookup("PACMAN_SEED").and_then(|v| v.trim().parse().ok()),
            log_path: lookup("PACMAN_LOG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}
