// ============================================================================
// pulsar-reactivity - Runtime Configuration
// Per-thread knobs for the reactive runtime
// ============================================================================

use super::constants::DEFAULT_MAX_NOTIFY_DEPTH;
use super::context::with_context;

/// Runtime configuration for the reactive system on the current thread.
///
/// Every thread owns its own reactive context, so configuration is per
/// thread too. Set it once at startup with [`configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactiveConfig {
    /// Maximum nesting of notification passes. A write issued from inside a
    /// subscriber at this depth is refused and its value is not committed.
    pub max_notify_depth: usize,
}

impl ReactiveConfig {
    /// Configuration with all defaults applied.
    pub const fn new() -> Self {
        Self {
            max_notify_depth: DEFAULT_MAX_NOTIFY_DEPTH,
        }
    }

    /// Override the notification depth limit (clamped to at least 1).
    pub const fn with_max_notify_depth(mut self, depth: usize) -> Self {
        self.max_notify_depth = if depth == 0 { 1 } else { depth };
        self
    }
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the configuration of the current thread, returning the old one.
pub fn configure(config: ReactiveConfig) -> ReactiveConfig {
    log::debug!("reactive config updated: {config:?}");
    with_context(|ctx| ctx.config.replace(config))
}

/// The configuration active on the current thread.
pub fn config() -> ReactiveConfig {
    with_context(|ctx| ctx.config.get())
}
