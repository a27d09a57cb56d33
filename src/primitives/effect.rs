// ============================================================================
// pulsar-reactivity - Effects
// Observers that re-run when the signals they read change
// ============================================================================
//
// An effect is the tracking context of the reactive system: while its body
// runs, every tracked signal read subscribes the effect to that signal.
// Each run re-tracks from scratch: previous cleanups execute first, and
// signals that were read last time but not this time are unsubscribed
// afterwards. Signals read again keep the effect's existing place in their
// subscriber list, so notification order stays registration order.
//
// Ownership:
// - inside a scope, the scope holds the effect and disposes it on teardown
// - every run executes with the owning scope active (or none)
// - outside a scope, the last `Effect` handle disposes it on drop
// - signals only ever hold effects weakly
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::context::next_subscriber_id;
use crate::core::types::{same_signal, AnyObserver, AnySignal, SubscriberId};
use crate::primitives::scope::{register_effect_with_scope, with_active_scope, ScopeInner};
use crate::reactivity::tracking::run_as_observer;

// =============================================================================
// TYPE ALIASES
// =============================================================================

/// Teardown registered with `on_cleanup`
pub type CleanupFn = Box<dyn FnOnce()>;

/// Effect body
pub type EffectFn = Box<dyn FnMut()>;

// =============================================================================
// EFFECT INNER
// =============================================================================

/// The inner effect implementation.
pub struct EffectInner {
    /// Subscriber id shared by all of this effect's registrations
    id: SubscriberId,

    /// Flags bitmask for state tracking
    flags: Cell<u32>,

    /// The effect body; taken out while it runs
    func: RefCell<Option<EffectFn>>,

    /// Signals read during the last run
    deps: RefCell<Vec<Rc<dyn AnySignal>>>,

    /// Teardowns from the last run
    cleanups: RefCell<Vec<CleanupFn>>,

    /// Completed runs
    runs: Cell<u64>,

    /// Scope that owns this effect, if any
    owner: RefCell<Option<Weak<ScopeInner>>>,

    /// Weak reference to self, handed to signals as the observer
    self_weak: Weak<EffectInner>,
}

impl EffectInner {
    /// Create a new, not yet run, effect
    pub fn new(func: EffectFn) -> Rc<Self> {
        Rc::new_cyclic(|self_weak| Self {
            id: next_subscriber_id(),
            flags: Cell::new(EFFECT | LIVE),
            func: RefCell::new(Some(func)),
            deps: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            runs: Cell::new(0),
            owner: RefCell::new(None),
            self_weak: self_weak.clone(),
        })
    }

    /// Number of completed runs
    pub fn run_count(&self) -> u64 {
        self.runs.get()
    }

    pub(crate) fn set_owner(&self, scope: Weak<ScopeInner>) {
        *self.owner.borrow_mut() = Some(scope);
    }

    fn owner(&self) -> Option<Rc<ScopeInner>> {
        self.owner.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Unsubscribe from the signals in `previous` that the last run did not
    /// read again.
    fn release_stale(&self, previous: Vec<Rc<dyn AnySignal>>) {
        let stale: Vec<_> = {
            let current = self.deps.borrow();
            previous
                .into_iter()
                .filter(|old| !current.iter().any(|dep| same_signal(dep, old)))
                .collect()
        };
        for dep in stale {
            dep.remove_subscriber(self.id);
        }
    }

    /// Run and clear the registered cleanups, most recent first
    fn run_cleanups(&self) {
        let cleanups = std::mem::take(&mut *self.cleanups.borrow_mut());
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }
}

impl Drop for EffectInner {
    fn drop(&mut self) {
        if self.flags.get() & DISPOSED == 0 {
            self.clear_deps();
            self.run_cleanups();
        }
    }
}

// =============================================================================
// AnyObserver IMPLEMENTATION
// =============================================================================

impl AnyObserver for EffectInner {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn dep_count(&self) -> usize {
        self.deps.borrow().len()
    }

    fn add_dep(&self, source: Rc<dyn AnySignal>) {
        let mut deps = self.deps.borrow_mut();
        if !deps.iter().any(|dep| same_signal(dep, &source)) {
            deps.push(source);
        }
    }

    fn clear_deps(&self) {
        let deps = std::mem::take(&mut *self.deps.borrow_mut());
        for dep in deps {
            dep.remove_subscriber(self.id);
        }
    }

    fn add_cleanup(&self, cleanup: CleanupFn) {
        if self.is_disposed() {
            cleanup();
            return;
        }
        self.cleanups.borrow_mut().push(cleanup);
    }

    fn run(&self) {
        if let Some(rc_self) = self.self_weak.upgrade() {
            run_effect(&rc_self);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// RUN / DISPOSE
// =============================================================================

/// Execute an effect body with the effect as the tracking context and its
/// owning scope as the active scope.
///
/// A run requested while the same effect is already running (the body wrote
/// to a signal it reads) is skipped.
pub(crate) fn run_effect(effect: &Rc<EffectInner>) {
    let flags = effect.flags.get();
    if flags & DISPOSED != 0 {
        return;
    }
    if flags & RUNNING != 0 {
        log::trace!("effect {} re-entered itself; run skipped", effect.id);
        return;
    }

    effect.run_cleanups();

    let Some(func) = effect.func.borrow_mut().take() else {
        return;
    };

    // Restores the effect even if the body panics
    struct RunGuard<'a> {
        effect: &'a EffectInner,
        previous: Vec<Rc<dyn AnySignal>>,
        func: Option<EffectFn>,
    }

    impl Drop for RunGuard<'_> {
        fn drop(&mut self) {
            let effect = self.effect;
            effect.flags.set(effect.flags.get() & !RUNNING);
            effect.release_stale(std::mem::take(&mut self.previous));

            // Disposed by its own body: drop the closure instead of restoring it
            if let Some(func) = self.func.take() {
                if !effect.is_disposed() {
                    *effect.func.borrow_mut() = Some(func);
                }
            }
        }
    }

    let mut guard = RunGuard {
        effect,
        previous: std::mem::take(&mut *effect.deps.borrow_mut()),
        func: Some(func),
    };
    effect.flags.set(effect.flags.get() | RUNNING);

    let observer: Weak<dyn AnyObserver> = effect.self_weak.clone();
    let owner = effect.owner();
    if let Some(func) = guard.func.as_mut() {
        with_active_scope(owner, || run_as_observer(observer, || func()));
    }
    effect.runs.set(effect.runs.get() + 1);
}

/// Dispose an effect: unsubscribe from every dependency, run cleanups and
/// drop the body. Idempotent.
pub(crate) fn dispose_effect(effect: &EffectInner) {
    let flags = effect.flags.get();
    if flags & DISPOSED != 0 {
        return;
    }
    effect.flags.set((flags & LIFECYCLE_MASK) | DISPOSED);

    effect.clear_deps();
    effect.run_cleanups();
    let func = effect.func.borrow_mut().take();
    drop(func);

    if let Some(scope) = effect.owner() {
        scope.remove_effect(effect);
    }

    log::trace!("effect {} disposed after {} run(s)", effect.id, effect.runs.get());
}

// =============================================================================
// EFFECT HANDLE
// =============================================================================

/// Handle to a running effect.
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Get access to the inner effect
    pub fn inner(&self) -> &Rc<EffectInner> {
        &self.inner
    }

    /// Stop the effect: it will not run again and holds no subscriptions.
    pub fn dispose(&self) {
        dispose_effect(&self.inner);
    }

    /// Check if this effect is disposed
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Number of signals the effect currently depends on
    pub fn dep_count(&self) -> usize {
        self.inner.dep_count()
    }

    /// Number of completed runs
    pub fn run_count(&self) -> u64 {
        self.inner.run_count()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        // Last strong reference: nobody (no scope, no other handle) can
        // dispose it later.
        if Rc::strong_count(&self.inner) == 1 {
            self.dispose();
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("disposed", &self.is_disposed())
            .field("deps", &self.dep_count())
            .field("runs", &self.run_count())
            .finish()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create an effect.
///
/// The body runs once immediately, then again synchronously every time a
/// signal it read changes. Inside a scope the scope owns the effect;
/// otherwise keep the returned handle alive for as long as the effect
/// should run.
///
/// # Example
///
/// ```
/// use pulsar_reactivity::{create_effect, create_signal};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let (count, set_count) = create_signal(0);
/// let rendered = Rc::new(RefCell::new(String::new()));
///
/// let target = rendered.clone();
/// let _effect = create_effect(move || {
///     *target.borrow_mut() = format!("Count: {}", count.get());
/// });
/// assert_eq!(*rendered.borrow(), "Count: 0");
///
/// set_count.set(1);
/// assert_eq!(*rendered.borrow(), "Count: 1");
/// ```
pub fn create_effect(f: impl FnMut() + 'static) -> Effect {
    let inner = EffectInner::new(Box::new(f));
    register_effect_with_scope(&inner);
    log::trace!("effect {} created", inner.id);

    run_effect(&inner);
    Effect { inner }
}

// =============================================================================
// TESTS
// =============================================================================
