// ============================================================================
// pulsar-reactivity - Primitives Module
// Core reactive primitives: signal, effect, scope, subscription
// ============================================================================

pub mod effect;
pub mod scope;
pub mod signal;
pub mod subscription;

// Re-export for convenience
pub use effect::{create_effect, CleanupFn, Effect, EffectFn, EffectInner};
pub use scope::{create_root, create_scope, current_scope, on_cleanup, Scope, ScopeCleanupFn};
pub use signal::{
    create_signal, create_signal_with_options, signal, signal_with_equals, ReadSignal, Signal,
    SignalOptions, WriteSignal,
};
pub use subscription::Subscription;
