// ============================================================================
// pulsar-reactivity - Constants
// Flag bits for signals and effects, plus runtime defaults
// ============================================================================

// =============================================================================
// NODE TYPE FLAGS
// =============================================================================

/// Node is a signal (a value cell with subscribers)
pub const SIGNAL: u32 = 1 << 0;

/// Node is an effect (an observer that re-runs on change)
pub const EFFECT: u32 = 1 << 1;

// =============================================================================
// LIFECYCLE FLAGS
// =============================================================================

/// Node is live: reads and writes behave normally
pub const LIVE: u32 = 1 << 8;

/// Node has been disposed: value frozen, writes ignored
pub const DISPOSED: u32 = 1 << 9;

/// Effect body is currently executing
pub const RUNNING: u32 = 1 << 10;

/// Mask to clear the lifecycle bits (LIVE, DISPOSED)
pub const LIFECYCLE_MASK: u32 = !(LIVE | DISPOSED);

// =============================================================================
// RUNTIME DEFAULTS
// =============================================================================

/// How many notification passes may be nested inside one another before
/// further writes are refused.
pub const DEFAULT_MAX_NOTIFY_DEPTH: usize = 100;

// =============================================================================
// TESTS
// =============================================================================
