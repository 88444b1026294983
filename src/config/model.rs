// src/config/model.rs

use serde::Deserialize;

use crate::logging::LogLevel;

/// Number of task bodies allowed to run at once within a layer by default.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Options for a single graph execution.
///
/// Maps the `[execute]` section of a config file:
///
/// ```toml
/// [execute]
/// worker_count = 8
/// debug_log = true
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecuteOptions {
    /// Upper bound on simultaneously running work functions in one layer.
    pub worker_count: usize,

    /// Emit the computed layer assignment and per-layer grouping at `info`
    /// level. Diagnostics only.
    pub debug_log: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            debug_log: false,
        }
    }
}

impl ExecuteOptions {
    /// Set the worker count. Zero is ignored and keeps the current value.
    pub fn with_worker_count(mut self, count: usize) -> Self {
        if count > 0 {
            self.worker_count = count;
        }
        self
    }

    pub fn with_debug_log(mut self, enable: bool) -> Self {
        self.debug_log = enable;
        self
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSection {
    /// Overrides `TASKDAG_LOG` when set.
    #[serde(default)]
    pub level: Option<LogLevel>,
}

/// Config exactly as deserialized from TOML, before validation.
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub execute: ExecuteOptions,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Validated configuration. Only constructible through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub execute: ExecuteOptions,
    pub logging: LoggingSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(execute: ExecuteOptions, logging: LoggingSection) -> Self {
        Self { execute, logging }
    }
}
