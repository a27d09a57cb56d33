// ============================================================================
// pulsar-reactivity - Notification
// Synchronous, ordered delivery of a committed write to subscribers
// ============================================================================
//
// Delivery works on a snapshot of the subscriber list ("collect then
// notify"): no borrow of the signal is held while user code runs, so a
// subscriber may read the signal, write to it, subscribe or unsubscribe.
//
// Rules during a pass:
// - a subscriber removed earlier in the same pass is skipped
// - a nested write to the same signal supersedes the pass: the nested pass
//   already delivered the newer value to everyone, so the outer one stops
// - passes nest at most `ReactiveConfig::max_notify_depth` deep; writes
//   beyond that are refused before they commit
// ============================================================================

use std::collections::HashSet;

use crate::core::context::with_context;
use crate::core::types::{AnySignal, SignalInner, Subscriber, SubscriberId};
use crate::error::ReactiveError;

// =============================================================================
// DEPTH LIMIT
// =============================================================================

/// Check that a write issued now could be delivered.
pub(crate) fn check_notify_depth() -> Result<(), ReactiveError> {
    let (depth, limit) = with_context(|ctx| (ctx.get_notify_depth(), ctx.config.get().max_notify_depth));
    if depth >= limit {
        return Err(ReactiveError::NotifyDepthExceeded { depth, limit });
    }
    Ok(())
}

/// Keeps the context's notify depth raised for the duration of a pass.
struct NotifyGuard;

impl NotifyGuard {
    fn enter() -> Self {
        with_context(|ctx| ctx.enter_notify());
        NotifyGuard
    }
}

impl Drop for NotifyGuard {
    fn drop(&mut self) {
        with_context(|ctx| ctx.exit_notify());
    }
}

// =============================================================================
// NOTIFY
// =============================================================================

/// Deliver the current value of `source` to its subscribers in
/// registration order. Returns how many subscribers were invoked.
pub(crate) fn notify_subscribers<T: Clone + 'static>(source: &SignalInner<T>) -> usize {
    let subscribers = source.snapshot_subscribers();
    if subscribers.is_empty() {
        return 0;
    }

    let value = source.get();
    let version = source.write_version();
    let _guard = NotifyGuard::enter();

    // Ids still registered, rebuilt only after an unsubscribe during the pass
    let mut removals = source.removal_count();
    let mut live: Option<HashSet<SubscriberId>> = None;

    let mut notified = 0;
    for subscriber in subscribers {
        if source.is_disposed() {
            break;
        }
        if source.write_version() != version {
            log::trace!(
                "notification of {} superseded by a nested write",
                source.label().unwrap_or("<unnamed>")
            );
            break;
        }
        if source.removal_count() != removals {
            removals = source.removal_count();
            live = Some(source.subscriber_ids());
        }
        if live.as_ref().is_some_and(|ids| !ids.contains(&subscriber.id())) {
            continue;
        }

        match subscriber {
            Subscriber::Callback { callback, .. } => callback.call(&value),
            Subscriber::Observer { observer, .. } => match observer.upgrade() {
                Some(observer) => observer.run(),
                None => continue,
            },
        }
        notified += 1;
    }

    log::trace!(
        "signal {} notified {notified} subscriber(s)",
        source.label().unwrap_or("<unnamed>")
    );
    notified
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{configure, ReactiveConfig};
    use crate::core::context::notify_depth;
    use crate::core::types::{default_equals, Callback};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn source(value: i32) -> Rc<SignalInner<i32>> {
        Rc::new(SignalInner::new(value, default_equals, None))
    }

    #[test]
    fn empty_list_notifies_nobody() {
        let s = source(0);
        assert_eq!(notify_subscribers(&s), 0);
    }

    #[test]
    fn delivers_in_registration_order() {
        let s = source(5);
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let log = log.clone();
            s.add_callback(&Callback::new(move |v: &i32| log.borrow_mut().push((tag, *v))));
        }

        assert_eq!(notify_subscribers(&s), 3);
        assert_eq!(*log.borrow(), vec![("a", 5), ("b", 5), ("c", 5)]);
    }

    #[test]
    fn depth_is_raised_during_delivery() {
        let s = source(0);
        let seen = Rc::new(RefCell::new(0));
        let seen_clone = seen.clone();
        s.add_callback(&Callback::new(move |_: &i32| *seen_clone.borrow_mut() = notify_depth()));

        notify_subscribers(&s);
        assert_eq!(*seen.borrow(), 1);
        assert_eq!(notify_depth(), 0);
    }

    #[test]
    fn unsubscribed_mid_pass_is_skipped() {
        let s = source(0);
        let calls = Rc::new(RefCell::new(Vec::new()));

        let second_id = Rc::new(RefCell::new(None));
        let first = {
            let s = s.clone();
            let calls = calls.clone();
            let second_id = second_id.clone();
            Callback::new(move |_: &i32| {
                calls.borrow_mut().push(1);
                if let Some(id) = *second_id.borrow() {
                    s.remove_subscriber(id);
                }
            })
        };
        let second = {
            let calls = calls.clone();
            Callback::new(move |_: &i32| calls.borrow_mut().push(2))
        };

        s.add_callback(&first);
        *second_id.borrow_mut() = s.add_callback(&second);

        assert_eq!(notify_subscribers(&s), 1);
        assert_eq!(*calls.borrow(), vec![1]);
    }

    #[test]
    fn only_removed_entries_are_skipped() {
        let s = source(0);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let victim = Rc::new(RefCell::new(None));

        let remover = {
            let (s, calls, victim) = (s.clone(), calls.clone(), victim.clone());
            Callback::new(move |_: &i32| {
                calls.borrow_mut().push(0);
                if let Some(id) = victim.borrow_mut().take() {
                    s.remove_subscriber(id);
                }
            })
        };
        s.add_callback(&remover);
        for tag in 1..=3 {
            let calls = calls.clone();
            let id = s.add_callback(&Callback::new(move |_: &i32| calls.borrow_mut().push(tag)));
            if tag == 2 {
                *victim.borrow_mut() = id;
            }
        }

        assert_eq!(notify_subscribers(&s), 3);
        assert_eq!(*calls.borrow(), vec![0, 1, 3]);

        // Next pass: nothing removed, everyone left is called
        calls.borrow_mut().clear();
        assert_eq!(notify_subscribers(&s), 3);
        assert_eq!(*calls.borrow(), vec![0, 1, 3]);
    }

    #[test]
    fn depth_limit_is_reported() {
        let prev = configure(ReactiveConfig::new().with_max_notify_depth(1));
        assert!(check_notify_depth().is_ok());

        let guard = NotifyGuard::enter();
        assert_eq!(
            check_notify_depth(),
            Err(ReactiveError::NotifyDepthExceeded { depth: 1, limit: 1 })
        );
        drop(guard);

        configure(prev);
        assert!(check_notify_depth().is_ok());
    }
}
