// ============================================================================
// pulsar-reactivity - Dependency Tracking
// Registering the running observer as a subscriber of the signals it reads
// ============================================================================
//
// The context never holds a RefCell borrow while calling out: observers are
// upgraded and handed back to the caller before any graph mutation happens.
// ============================================================================

use std::rc::{Rc, Weak};

use crate::core::context::with_context;
use crate::core::types::{AnyObserver, AnySignal};

// =============================================================================
// TRACK READ - Register dependency when reading a signal
// =============================================================================

/// Track a read of a signal, subscribing the active observer to it.
///
/// Called by every tracked getter. Does nothing outside an observer, inside
/// [`untrack`], or when the signal is already disposed. Registration is
/// deduplicated on both sides, so reading the same signal twice in one run
/// subscribes once, and an observer that was already subscribed from an
/// earlier run keeps its place in the signal's list.
pub fn track_read(source: Rc<dyn AnySignal>) {
    let observer = with_context(|ctx| {
        if ctx.is_untracking() {
            return None;
        }
        ctx.get_active_observer()
    });

    let Some(observer) = observer.and_then(|weak| weak.upgrade()) else {
        return;
    };
    if observer.is_disposed() {
        return;
    }

    if source.add_observer(observer.id(), Rc::downgrade(&observer)) {
        observer.add_dep(source);
    }
}

// =============================================================================
// OBSERVER SCOPE
// =============================================================================

/// Run `f` with `observer` as the active tracking context.
///
/// The previous observer and untrack flag are restored on exit, panics
/// included.
pub(crate) fn run_as_observer<R>(observer: Weak<dyn AnyObserver>, f: impl FnOnce() -> R) -> R {
    let (prev_observer, prev_untracking) = with_context(|ctx| {
        (
            ctx.set_active_observer(Some(observer)),
            ctx.set_untracking(false),
        )
    });

    struct ObserverGuard {
        prev_observer: Option<Weak<dyn AnyObserver>>,
        prev_untracking: bool,
    }

    impl Drop for ObserverGuard {
        fn drop(&mut self) {
            let prev_observer = self.prev_observer.take();
            with_context(|ctx| {
                ctx.set_active_observer(prev_observer);
                ctx.set_untracking(self.prev_untracking);
            });
        }
    }

    let _guard = ObserverGuard {
        prev_observer,
        prev_untracking,
    };
    f()
}

/// The observer currently running, if any.
pub(crate) fn active_observer() -> Option<Rc<dyn AnyObserver>> {
    with_context(|ctx| ctx.get_active_observer()).and_then(|weak| weak.upgrade())
}

// =============================================================================
// UNTRACK
// =============================================================================

/// Read signals without creating dependencies.
///
/// # Example
///
/// ```
/// use pulsar_reactivity::{create_effect, create_signal, untrack};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let (a, set_a) = create_signal(1);
/// let (b, set_b) = create_signal(2);
/// let runs = Rc::new(Cell::new(0));
///
/// let runs_clone = runs.clone();
/// let _effect = create_effect(move || {
///     let _ = a.get();                 // tracked
///     let _ = untrack(|| b.get());     // not tracked
///     runs_clone.set(runs_clone.get() + 1);
/// });
///
/// set_a.set(10);
/// assert_eq!(runs.get(), 2);
///
/// set_b.set(20);
/// assert_eq!(runs.get(), 2);
/// ```
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let prev = with_context(|ctx| ctx.set_untracking(true));

    struct UntrackGuard {
        prev: bool,
    }

    impl Drop for UntrackGuard {
        fn drop(&mut self) {
            with_context(|ctx| ctx.set_untracking(self.prev));
        }
    }

    let _guard = UntrackGuard { prev };
    f()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::*;
    use crate::core::context::{is_tracking, is_untracking, next_subscriber_id};
    use crate::core::types::{default_equals, same_signal, Callback, SignalInner, SubscriberId};
    use std::any::Any;
    use std::cell::{Cell, RefCell};

    /// Minimal observer that only records its dependencies
    struct TestObserver {
        id: SubscriberId,
        flags: Cell<u32>,
        deps: RefCell<Vec<Rc<dyn AnySignal>>>,
    }

    impl TestObserver {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                id: next_subscriber_id(),
                flags: Cell::new(EFFECT | LIVE),
                deps: RefCell::new(Vec::new()),
            })
        }
    }

    impl AnyObserver for TestObserver {
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
            for dep in std::mem::take(&mut *self.deps.borrow_mut()) {
                dep.remove_subscriber(self.id);
            }
        }

        fn add_cleanup(&self, _cleanup: Box<dyn FnOnce()>) {}

        fn run(&self) {}

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn source(value: i32) -> Rc<SignalInner<i32>> {
        Rc::new(SignalInner::new(value, default_equals, None))
    }

    fn weak(observer: &Rc<TestObserver>) -> Weak<dyn AnyObserver> {
        let weak: Weak<TestObserver> = Rc::downgrade(observer);
        weak
    }

    #[test]
    fn read_outside_observer_is_not_tracked() {
        let s = source(1);
        track_read(s.clone());
        assert_eq!(s.subscriber_count(), 0);
    }

    #[test]
    fn read_inside_observer_registers_both_sides() {
        let s = source(1);
        let observer = TestObserver::new();

        run_as_observer(weak(&observer), || {
            assert!(is_tracking());
            track_read(s.clone());
        });

        assert!(!is_tracking());
        assert_eq!(observer.dep_count(), 1);
        assert_eq!(s.subscriber_count(), 1);
        assert!(s.has_subscriber(observer.id()));
    }

    #[test]
    fn repeated_reads_register_once() {
        let s = source(1);
        let observer = TestObserver::new();

        run_as_observer(weak(&observer), || {
            track_read(s.clone());
            track_read(s.clone());
            track_read(s.clone());
        });

        assert_eq!(observer.dep_count(), 1);
        assert_eq!(s.subscriber_count(), 1);
    }

    #[test]
    fn untracked_reads_are_ignored() {
        let s = source(1);
        let observer = TestObserver::new();

        run_as_observer(weak(&observer), || {
            untrack(|| {
                assert!(is_untracking());
                track_read(s.clone());
            });
        });

        assert_eq!(observer.dep_count(), 0);
        assert_eq!(s.subscriber_count(), 0);
    }

    #[test]
    fn disposed_signal_is_not_tracked() {
        let s = source(1);
        s.dispose();
        let observer = TestObserver::new();

        run_as_observer(weak(&observer), || track_read(s.clone()));

        assert_eq!(observer.dep_count(), 0);
    }

    #[test]
    fn second_run_keeps_list_position() {
        let s = source(1);
        let observer = TestObserver::new();

        run_as_observer(weak(&observer), || track_read(s.clone()));
        let callback = s.add_callback(&Callback::new(|_: &i32| {})).unwrap();
        run_as_observer(weak(&observer), || track_read(s.clone()));

        let order: Vec<_> = s.snapshot_subscribers().iter().map(|sub| sub.id()).collect();
        assert_eq!(order, vec![observer.id(), callback]);
        assert_eq!(observer.dep_count(), 1);
    }

    #[test]
    fn clear_deps_unsubscribes() {
        let a = source(1);
        let b = source(2);
        let observer = TestObserver::new();

        run_as_observer(weak(&observer), || {
            track_read(a.clone());
            track_read(b.clone());
        });
        assert_eq!(observer.dep_count(), 2);

        observer.clear_deps();
        assert_eq!(observer.dep_count(), 0);
        assert_eq!(a.subscriber_count(), 0);
        assert_eq!(b.subscriber_count(), 0);
    }

    #[test]
    fn dropped_observer_is_pruned() {
        let s = source(1);
        {
            let observer = TestObserver::new();
            run_as_observer(weak(&observer), || track_read(s.clone()));
            assert_eq!(s.subscriber_count(), 1);
        }
        assert_eq!(s.subscriber_count(), 0);
        assert!(s.snapshot_subscribers().is_empty());
    }

    #[test]
    fn nested_observers_restore_previous() {
        let outer = TestObserver::new();
        let inner = TestObserver::new();
        let s = source(0);

        run_as_observer(weak(&outer), || {
            run_as_observer(weak(&inner), || track_read(s.clone()));
            assert_eq!(active_observer().map(|o| o.id()), Some(outer.id()));
        });

        assert!(active_observer().is_none());
        assert_eq!(inner.dep_count(), 1);
        assert_eq!(outer.dep_count(), 0);
    }
}
