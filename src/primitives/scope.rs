// ============================================================================
// pulsar-reactivity - Scopes
//
// The owner of signals and effects. Tearing a scope down disposes
// everything created inside it.
// ============================================================================
//
// A Scope is what a mounted component or story render lives in: create a
// scope when mounting, dispose it when unmounting, and every signal created
// inside moves to the Disposed state (value frozen, writes ignored) while
// every effect stops.
//
// Key features:
// - run(fn) - Execute function with this scope as the owner
// - dispose() - Dispose effects, run cleanups, dispose children, freeze signals
// - Nested scopes (children disposed with their parent)
// - Detached roots (create_root) that no parent collects
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::types::AnySignal;
use crate::error::ReactiveError;
use crate::primitives::effect::{dispose_effect, EffectInner};
use crate::reactivity::tracking::active_observer;

// =============================================================================
// THREAD-LOCAL SCOPE STATE
// =============================================================================

thread_local! {
    /// Currently active scope (if any)
    static ACTIVE_SCOPE: RefCell<Option<Rc<ScopeInner>>> = const { RefCell::new(None) };
}

/// Get the currently active scope
fn get_active_scope() -> Option<Rc<ScopeInner>> {
    ACTIVE_SCOPE.with(|s| s.borrow().clone())
}

/// Set the active scope, returning the previous one
fn set_active_scope(scope: Option<Rc<ScopeInner>>) -> Option<Rc<ScopeInner>> {
    ACTIVE_SCOPE.with(|s| s.replace(scope))
}

// =============================================================================
// CLEANUP TYPE
// =============================================================================

/// Cleanup function type for scope disposal
pub type ScopeCleanupFn = Box<dyn FnOnce()>;

// =============================================================================
// SCOPE INNER
// =============================================================================

/// Internal scope implementation
pub(crate) struct ScopeInner {
    /// Whether the scope has been torn down
    disposed: Cell<bool>,

    /// Effects created within this scope
    effects: RefCell<Vec<Rc<EffectInner>>>,

    /// Signals created within this scope (weak: a scope never keeps values alive)
    signals: RefCell<Vec<Weak<dyn AnySignal>>>,

    /// Cleanup functions to run on dispose
    cleanups: RefCell<Vec<ScopeCleanupFn>>,

    /// Parent scope (for nested scopes)
    parent: RefCell<Option<Weak<ScopeInner>>>,

    /// Child scopes
    children: RefCell<Vec<Rc<ScopeInner>>>,
}

impl ScopeInner {
    /// Create a new scope, attached to the active scope unless detached
    fn new(detached: bool) -> Rc<Self> {
        let parent = if detached { None } else { get_active_scope() };

        let scope = Rc::new(Self {
            disposed: Cell::new(false),
            effects: RefCell::new(Vec::new()),
            signals: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            parent: RefCell::new(parent.as_ref().map(Rc::downgrade)),
            children: RefCell::new(Vec::new()),
        });

        if let Some(ref parent_scope) = parent {
            parent_scope.children.borrow_mut().push(scope.clone());
        }

        scope
    }

    /// Check if scope has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Dispose the scope and everything it owns
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }

        let effects: Vec<_> = self.effects.borrow_mut().drain(..).collect();
        let effect_count = effects.len();
        for effect in effects {
            dispose_effect(&effect);
        }

        // Cleanups run in reverse order for proper nesting
        let cleanups: Vec<_> = self.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups.into_iter().rev() {
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(cleanup)).is_err() {
                log::warn!("scope cleanup panicked; continuing teardown");
            }
        }

        let children: Vec<_> = self.children.borrow_mut().drain(..).collect();
        for child in children {
            child.dispose();
        }

        let signals: Vec<_> = self.signals.borrow_mut().drain(..).collect();
        let mut frozen = 0;
        for signal in signals.iter().filter_map(Weak::upgrade) {
            signal.dispose();
            frozen += 1;
        }

        // Remove from parent's child list
        let parent = self.parent.borrow_mut().take();
        if let Some(parent) = parent.and_then(|w| w.upgrade()) {
            parent
                .children
                .borrow_mut()
                .retain(|child| !std::ptr::eq(Rc::as_ptr(child), self));
        }

        log::debug!("scope disposed: {effect_count} effect(s), {frozen} signal(s) frozen");
    }

    /// Add an effect to this scope
    pub fn add_effect(&self, effect: Rc<EffectInner>) {
        self.effects.borrow_mut().push(effect);
    }

    /// Forget an effect that was disposed through its own handle
    pub fn remove_effect(&self, effect: &EffectInner) {
        let removed = {
            let mut effects = self.effects.borrow_mut();
            effects
                .iter()
                .position(|e| std::ptr::eq(Rc::as_ptr(e), effect))
                .map(|pos| effects.remove(pos))
        };
        drop(removed);
    }

    /// Add a signal to this scope
    pub fn add_signal(&self, signal: Weak<dyn AnySignal>) {
        let mut signals = self.signals.borrow_mut();
        signals.retain(|s| s.strong_count() > 0);
        signals.push(signal);
    }

    /// Add a cleanup function to this scope
    pub fn add_cleanup(&self, cleanup: ScopeCleanupFn) {
        self.cleanups.borrow_mut().push(cleanup);
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        if !self.disposed.get() {
            self.dispose();
        }
    }
}

/// Run `f` with `scope` active, restoring the previous scope on exit.
fn enter<R>(scope: &Rc<ScopeInner>, f: impl FnOnce() -> R) -> R {
    with_active_scope(Some(scope.clone()), f)
}

/// Run `f` with `scope` (or no scope) active, restoring the previous scope
/// on exit.
pub(crate) fn with_active_scope<R>(scope: Option<Rc<ScopeInner>>, f: impl FnOnce() -> R) -> R {
    struct ScopeGuard {
        prev: Option<Rc<ScopeInner>>,
    }

    impl Drop for ScopeGuard {
        fn drop(&mut self) {
            set_active_scope(self.prev.take());
        }
    }

    let _guard = ScopeGuard {
        prev: set_active_scope(scope),
    };
    f()
}

// =============================================================================
// SCOPE (Public wrapper)
// =============================================================================

/// An owning scope for signals and effects.
///
/// # Example
///
/// ```
/// use pulsar_reactivity::{create_scope, create_signal};
///
/// let scope = create_scope();
/// let (count, set_count) = scope.run(|| create_signal(1)).unwrap();
///
/// scope.dispose();
///
/// // Disposed: the setter is a no-op, the getter returns the frozen value
/// assert!(!set_count.set(2));
/// assert_eq!(count.get(), 1);
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

impl Scope {
    fn from_inner(inner: Rc<ScopeInner>) -> Self {
        Self { inner }
    }

    /// Whether the scope has been disposed
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Run a function with this scope as the owner.
    ///
    /// Returns None if the scope has been disposed.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        self.try_run(f).ok()
    }

    /// Like [`run`](Self::run), but reports a disposed scope as an error.
    pub fn try_run<R>(&self, f: impl FnOnce() -> R) -> Result<R, ReactiveError> {
        if self.inner.is_disposed() {
            return Err(ReactiveError::ScopeDisposed);
        }
        Ok(enter(&self.inner, f))
    }

    /// Register a cleanup to run when this scope is disposed. Runs
    /// immediately if the scope is already disposed.
    pub fn on_cleanup(&self, f: impl FnOnce() + 'static) {
        if self.inner.is_disposed() {
            f();
            return;
        }
        self.inner.add_cleanup(Box::new(f));
    }

    /// Tear the scope down:
    ///
    /// - all owned effects are disposed
    /// - all cleanups run (in reverse order)
    /// - all child scopes are disposed
    /// - all owned signals move to the Disposed state
    ///
    /// Calling it again does nothing.
    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        // Auto-dispose if this is the last strong reference
        if Rc::strong_count(&self.inner) == 1 {
            self.inner.dispose();
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("disposed", &self.is_disposed())
            .field("effects", &self.inner.effects.borrow().len())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create a scope owned by the active scope (if any).
///
/// Disposing the parent disposes this scope too.
pub fn create_scope() -> Scope {
    Scope::from_inner(ScopeInner::new(false))
}

/// Create a detached root scope and run `f` inside it.
///
/// No parent collects a root; it lives until disposed or until its last
/// handle is dropped.
///
/// # Example
///
/// ```
/// use pulsar_reactivity::{create_root, create_signal};
///
/// let (root, (count, set_count)) = create_root(|| create_signal(0));
/// set_count.set(3);
///
/// drop(root);
/// assert!(count.is_disposed());
/// assert_eq!(count.get(), 3);
/// ```
pub fn create_root<R>(f: impl FnOnce() -> R) -> (Scope, R) {
    let inner = ScopeInner::new(true);
    let result = enter(&inner, f);
    (Scope::from_inner(inner), result)
}

/// Get the currently active scope, if any.
pub fn current_scope() -> Option<Scope> {
    get_active_scope().map(Scope::from_inner)
}

/// Register a teardown.
///
/// Inside an effect body it runs before the effect's next run and when the
/// effect is disposed. Otherwise, inside a scope, it runs when the scope is
/// disposed. Outside both it is dropped with a warning.
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    if let Some(observer) = active_observer() {
        observer.add_cleanup(Box::new(f));
    } else if let Some(scope) = get_active_scope() {
        scope.add_cleanup(Box::new(f));
    } else {
        log::warn!("on_cleanup() called outside of an effect or scope; ignored");
    }
}

/// Register an effect with the current scope.
pub(crate) fn register_effect_with_scope(effect: &Rc<EffectInner>) {
    if let Some(scope) = get_active_scope() {
        effect.set_owner(Rc::downgrade(&scope));
        scope.add_effect(effect.clone());
    }
}

/// Register a signal with the current scope.
pub(crate) fn register_signal_with_scope(signal: &Rc<dyn AnySignal>) {
    if let Some(scope) = get_active_scope() {
        scope.add_signal(Rc::downgrade(signal));
    }
}

// =============================================================================
// TESTS
// =============================================================================
