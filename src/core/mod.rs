// ============================================================================
// pulsar-reactivity - Core Module
// Fundamental types, traits, configuration and context for the reactive system
// ============================================================================

pub mod config;
pub mod constants;
pub mod context;
pub mod types;

// Re-export commonly used items
pub use config::{config, configure, ReactiveConfig};
pub use constants::*;
pub use context::{is_tracking, is_untracking, notify_depth, with_context, write_version, ReactiveContext};
pub use types::{
    default_equals, AnyObserver, AnySignal, Callback, EqualsFn, SignalInner, Subscriber,
    SubscriberId,
};
