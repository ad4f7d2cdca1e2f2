//! Logging infrastructure for the bridge.
//!
//! Failures swallowed at the bridge boundary are only visible through these
//! logs, so hosts should install a subscriber early.

use crate::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

/// Log target used for every record emitted by the bridge operations
pub const LOG_TAG: &str = "SA.RN";

/// Handle for changing the default level after logging is up
pub struct LevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

impl LevelHandle {
    /// Switch the default level, e.g. once the config file is read
    ///
    /// Ignored when RUST_LOG was set, since the environment wins.
    pub fn set_default_level(&self, level: &str) -> Result<()> {
        if self.env_override {
            return Ok(());
        }
        self.handle
            .reload(EnvFilter::new(level))
            .map_err(|e| Error::Config(format!("Failed to change log level: {}", e)))
    }
}

/// Initialize logging with sensible defaults
///
/// Default level is INFO, but can be overridden with RUST_LOG env var.
pub fn init() -> LevelHandle {
    init_with_level("info")
}

/// Initialize logging with a specific default level
///
/// # Arguments
/// * `default_level` - Default log level (trace, debug, info, warn, error)
///
/// This can still be overridden by RUST_LOG environment variable. Calling it
/// twice is harmless; the second subscriber is ignored.
pub fn init_with_level(default_level: &str) -> LevelHandle {
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_override = from_env.is_some();
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(default_level));
    let (filter, handle) = reload::Layer::new(filter);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true))
        .try_init();

    LevelHandle {
        handle,
        env_override,
    }
}

/// Initialize logging for testing (captures logs for test output)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
