//! Process-wide profiler configuration.

use std::num::NonZeroUsize;

use crate::error::{Result, TimetreeError};

/// Segment name used when a timer is stopped without a condition path.
pub const DEFAULT_SEGMENT: &str = "base";

/// Environment variable overriding [`Config::default_segment`].
pub const ENV_DEFAULT_SEGMENT: &str = "TIMETREE_DEFAULT_SEGMENT";

/// Environment variable overriding [`Config::available_cores`].
pub const ENV_CORES: &str = "TIMETREE_CORES";

/// Configuration shared by every node of a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the leaf a sample lands in when no condition is given.
    pub default_segment: String,
    /// Ceiling for per-profile thread counts.
    pub available_cores: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_segment: DEFAULT_SEGMENT.to_string(),
            available_cores: host_cores(),
        }
    }
}

impl Config {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default condition segment name.
    #[must_use]
    pub fn default_segment(mut self, name: impl Into<String>) -> Self {
        self.default_segment = name.into();
        self
    }

    /// Set the number of cores used as the thread-count ceiling.
    #[must_use]
    pub fn available_cores(mut self, cores: usize) -> Self {
        self.available_cores = cores;
        self
    }

    /// Check that the configuration can be used by a registry.
    pub fn validate(&self) -> Result<()> {
        if self.default_segment.is_empty() {
            return Err(TimetreeError::InvalidConfig(
                "default segment name must not be empty".to_string(),
            ));
        }
        if self.available_cores == 0 {
            return Err(TimetreeError::InvalidConfig(
                "available cores must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a configuration from the defaults overridden by
    /// `TIMETREE_DEFAULT_SEGMENT` and `TIMETREE_CORES`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_DEFAULT_SEGMENT) {
            config.default_segment = name;
        }
        if let Some(raw) = lookup(ENV_CORES) {
            config.available_cores = raw.trim().parse().map_err(|_| TimetreeError::InvalidEnv {
                var: ENV_CORES,
                value: raw.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Number of cores reported by the host, at least 1.
#[must_use]
pub fn host_cores() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
