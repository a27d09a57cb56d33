// ============================================================================
// pulsar-reactivity - Reactive Context
// Thread-local state for tracking the current observer
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Weak;

use super::config::ReactiveConfig;
use super::types::{AnyObserver, SubscriberId};

// =============================================================================
// REACTIVE CONTEXT
// =============================================================================

/// Thread-local reactive context holding all global state for reactivity.
pub struct ReactiveContext {
    // =========================================================================
    // OBSERVER TRACKING
    // =========================================================================
    /// Observer whose body is currently executing (the tracking context)
    pub active_observer: RefCell<Option<Weak<dyn AnyObserver>>>,

    /// Whether reads are currently untracked
    pub untracking: Cell<bool>,

    // =========================================================================
    // NOTIFICATION
    // =========================================================================
    /// Number of notification passes currently on the stack
    pub notify_depth: Cell<usize>,

    /// Global write version - incremented on every committed signal write
    pub write_version: Cell<u32>,

    /// Next subscriber id to hand out
    pub next_subscriber_id: Cell<u64>,

    // =========================================================================
    // CONFIGURATION
    // =========================================================================
    /// Runtime configuration for this thread
    pub config: Cell<ReactiveConfig>,
}

impl ReactiveContext {
    /// Create a new reactive context with default values
    pub fn new() -> Self {
        Self {
            active_observer: RefCell::new(None),
            untracking: Cell::new(false),
            notify_depth: Cell::new(0),
            write_version: Cell::new(1),
            next_subscriber_id: Cell::new(1),
            config: Cell::new(ReactiveConfig::new()),
        }
    }

    // =========================================================================
    // OBSERVER TRACKING
    // =========================================================================

    /// Set the active observer, returning the previous one
    pub fn set_active_observer(
        &self,
        observer: Option<Weak<dyn AnyObserver>>,
    ) -> Option<Weak<dyn AnyObserver>> {
        self.active_observer.replace(observer)
    }

    /// Get the active observer
    pub fn get_active_observer(&self) -> Option<Weak<dyn AnyObserver>> {
        self.active_observer.borrow().clone()
    }

    /// Check if there's an active observer
    pub fn has_active_observer(&self) -> bool {
        self.active_observer.borrow().is_some()
    }

    /// Set untracking mode, returning previous value
    pub fn set_untracking(&self, value: bool) -> bool {
        self.untracking.replace(value)
    }

    /// Check if currently untracking
    pub fn is_untracking(&self) -> bool {
        self.untracking.get()
    }

    // =========================================================================
    // NOTIFICATION
    // =========================================================================

    /// Enter a notification pass, returns the new depth
    pub fn enter_notify(&self) -> usize {
        let depth = self.notify_depth.get() + 1;
        self.notify_depth.set(depth);
        depth
    }

    /// Leave a notification pass, returns the new depth
    pub fn exit_notify(&self) -> usize {
        let depth = self.notify_depth.get().saturating_sub(1);
        self.notify_depth.set(depth);
        depth
    }

    /// Current notification depth
    pub fn get_notify_depth(&self) -> usize {
        self.notify_depth.get()
    }

    /// Increment and return the write version
    pub fn increment_write_version(&self) -> u32 {
        let v = self.write_version.get().wrapping_add(1);
        self.write_version.set(v);
        v
    }

    /// Get the current write version
    pub fn get_write_version(&self) -> u32 {
        self.write_version.get()
    }

    /// Allocate a fresh subscriber id
    pub fn next_subscriber_id(&self) -> SubscriberId {
        let raw = self.next_subscriber_id.get();
        self.next_subscriber_id.set(raw + 1);
        SubscriberId::from_raw(raw)
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    /// The thread-local reactive context
    static CONTEXT: ReactiveContext = ReactiveContext::new();
}

/// Access the thread-local reactive context.
///
/// Never call back into user code from inside `f`: the closure runs while
/// the thread-local is borrowed.
pub fn with_context<R>(f: impl FnOnce(&ReactiveContext) -> R) -> R {
    CONTEXT.with(f)
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Check if reads are currently being tracked (inside an effect, not untracking)
pub fn is_tracking() -> bool {
    with_context(|ctx| ctx.has_active_observer() && !ctx.is_untracking())
}

/// Check if currently untracking
pub fn is_untracking() -> bool {
    with_context(|ctx| ctx.is_untracking())
}

/// Number of notification passes currently in progress
pub fn notify_depth() -> usize {
    with_context(|ctx| ctx.get_notify_depth())
}

/// Get the current write version
pub fn write_version() -> u32 {
    with_context(|ctx| ctx.get_write_version())
}

pub(crate) fn next_subscriber_id() -> SubscriberId {
    with_context(|ctx| ctx.next_subscriber_id())
}

// =============================================================================
// TESTS
// =============================================================================
