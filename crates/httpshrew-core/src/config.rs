//! Configuration for the bridge and its dispatcher
//!
//! Defaults match the reference behaviour: 16 workers, a queue of 128 tasks
//! and no response timeout. Guests built for WASI can override them through
//! the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `HTTPSHREW_WORKERS` | [`DispatcherConfig::workers`] |
//! | `HTTPSHREW_QUEUE_DEPTH` | [`DispatcherConfig::queue_depth`] |
//! | `HTTPSHREW_RESPONSE_TIMEOUT_MS` | [`DispatcherConfig::response_timeout`] |

use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 16;
pub const DEFAULT_QUEUE_DEPTH: usize = 128;

pub const WORKERS_ENV: &str = "HTTPSHREW_WORKERS";
pub const QUEUE_DEPTH_ENV: &str = "HTTPSHREW_QUEUE_DEPTH";
pub const RESPONSE_TIMEOUT_ENV: &str = "HTTPSHREW_RESPONSE_TIMEOUT_MS";

/// Configuration for the request dispatcher
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Number of long-lived worker threads
    pub workers: usize,

    /// Capacity of the task queue; submitting blocks while it is full
    pub queue_depth: usize,

    /// If set, `Handle` answers 504 when a response takes longer than this
    pub response_timeout: Option<Duration>,

    /// Whether to log pool lifecycle events
    pub enable_logging: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            response_timeout: None,
            enable_logging: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BridgeConfig {
    pub dispatcher: DispatcherConfig,
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Missing keys keep their default;
    /// unparsable or zero values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(workers) = positive(&lookup, WORKERS_ENV) {
            config.dispatcher.workers = workers;
        }
        if let Some(depth) = positive(&lookup, QUEUE_DEPTH_ENV) {
            config.dispatcher.queue_depth = depth;
        }
        if let Some(millis) = positive(&lookup, RESPONSE_TIMEOUT_ENV) {
            config.dispatcher.response_timeout = Some(Duration::from_millis(millis as u64));
        }
        config
    }
}

fn positive<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            log::warn!("ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}
