// ============================================================================
// pulsar-reactivity - Fine-grained Reactive State for Rust
// ============================================================================
//
// Signals hold values and deliver every committed change synchronously to
// their subscribers. Effects re-run when the signals they read change.
// Scopes own signals and effects and tear them down together.
// ============================================================================

#[macro_use]
mod macros;

pub mod core;
pub mod demo;
pub mod error;
pub mod primitives;
pub mod reactivity;

// Re-export core items at crate root for ergonomic access
pub use crate::core::config::{config, configure, ReactiveConfig};
pub use crate::core::constants;
pub use crate::core::context::{
    is_tracking, is_untracking, notify_depth, with_context, write_version, ReactiveContext,
};
pub use crate::core::types::{
    default_equals, AnyObserver, AnySignal, Callback, EqualsFn, SubscriberId,
};
pub use error::ReactiveError;

// Re-export primitives at crate root
pub use primitives::effect::{create_effect, CleanupFn, Effect, EffectFn};
pub use primitives::scope::{
    create_root, create_scope, current_scope, on_cleanup, Scope, ScopeCleanupFn,
};
pub use primitives::signal::{
    create_signal, create_signal_with_options, signal, signal_with_equals, ReadSignal, Signal,
    SignalOptions, WriteSignal,
};
pub use primitives::subscription::Subscription;

// Re-export reactivity functions
pub use reactivity::equality::{equals, never_equals, ptr_equals, safe_equals_f32, safe_equals_f64};
pub use reactivity::tracking::{track_read, untrack};

// =============================================================================
// TESTS
// =============================================================================
