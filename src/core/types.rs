// ============================================================================
// pulsar-reactivity - Type Definitions
// Type-erased traits and the value cell behind every signal
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use super::constants::*;
use super::context::next_subscriber_id;
use crate::error::ReactiveError;

// =============================================================================
// SUBSCRIBER IDS
// =============================================================================

/// Identity of one registration in a signal's subscriber list.
///
/// Ids are unique per thread and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

// =============================================================================
// TYPE-ERASED TRAITS
// =============================================================================
//
// Graph operations (subscribe an observer, unsubscribe, dispose) don't need
// the value type T. Effects keep Vec<Rc<dyn AnySignal>> as their dependency
// list and signals keep Weak<dyn AnyObserver> for tracked observers.
// =============================================================================

/// Type-erased signal interface used by observers and scopes.
pub trait AnySignal: Any {
    /// Get the flags bitmask
    fn flags(&self) -> u32;

    /// Debug label given at creation, if any
    fn label(&self) -> Option<&'static str>;

    /// Number of live registrations (callbacks plus observers)
    fn subscriber_count(&self) -> usize;

    /// Whether a registration with this id is present
    fn has_subscriber(&self, id: SubscriberId) -> bool;

    /// Register a tracked observer. An observer that is already subscribed
    /// keeps its existing place in the list. Returns whether the observer is
    /// subscribed after the call (false only when the signal is disposed).
    fn add_observer(&self, id: SubscriberId, observer: Weak<dyn AnyObserver>) -> bool;

    /// Remove a registration. Returns true if something was removed.
    fn remove_subscriber(&self, id: SubscriberId) -> bool;

    /// Move to the Disposed state: freeze the value and drop all subscribers
    fn dispose(&self);

    /// Check if this signal has been disposed
    fn is_disposed(&self) -> bool {
        self.flags() & DISPOSED != 0
    }

    /// Upcast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Type-erased observer interface: something that re-runs when a signal it
/// read changes. Implemented by `EffectInner`.
pub trait AnyObserver: Any {
    /// Subscriber id used for every registration of this observer
    fn id(&self) -> SubscriberId;

    /// Get the flags bitmask
    fn flags(&self) -> u32;

    /// Number of signals this observer currently depends on
    fn dep_count(&self) -> usize;

    /// Record a signal read during the current run. Recording the same
    /// signal twice keeps one entry.
    fn add_dep(&self, source: Rc<dyn AnySignal>);

    /// Unsubscribe from every dependency and forget them
    fn clear_deps(&self);

    /// Register a teardown to run before the next run or on disposal
    fn add_cleanup(&self, cleanup: Box<dyn FnOnce()>);

    /// Re-run the observer body (called on notification)
    fn run(&self);

    /// Check if this observer has been disposed
    fn is_disposed(&self) -> bool {
        self.flags() & DISPOSED != 0
    }

    /// Upcast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Whether two type-erased handles point at the same signal.
pub fn same_signal(a: &Rc<dyn AnySignal>, b: &Rc<dyn AnySignal>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

// =============================================================================
// CALLBACKS AND SUBSCRIBERS
// =============================================================================

/// Equality function type for comparing signal values
pub type EqualsFn<T> = fn(&T, &T) -> bool;

/// Default equality using PartialEq
pub fn default_equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// A change callback. Identity is the allocation: clones of one `Callback`
/// count as the same registration, two `Callback::new` calls never do.
pub struct Callback<T> {
    func: Rc<dyn Fn(&T)>,
}

impl<T> Callback<T> {
    /// Wrap a closure as a callback
    pub fn new(func: impl Fn(&T) + 'static) -> Self {
        Self { func: Rc::new(func) }
    }

    /// Whether both handles point at the same callback
    pub fn same_as(&self, other: &Callback<T>) -> bool {
        Rc::as_ptr(&self.func) as *const () == Rc::as_ptr(&other.func) as *const ()
    }

    /// Invoke the callback
    pub fn call(&self, value: &T) {
        (self.func)(value)
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
        }
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("ptr", &(Rc::as_ptr(&self.func) as *const ()))
            .finish()
    }
}

/// One entry in a signal's subscriber list
pub enum Subscriber<T> {
    /// Explicitly registered change callback
    Callback {
        id: SubscriberId,
        callback: Callback<T>,
    },
    /// Observer registered by a tracked read
    Observer {
        id: SubscriberId,
        observer: Weak<dyn AnyObserver>,
    },
}

impl<T> Subscriber<T> {
    /// Id of this registration
    pub fn id(&self) -> SubscriberId {
        match self {
            Self::Callback { id, .. } | Self::Observer { id, .. } => *id,
        }
    }

    fn is_dead(&self) -> bool {
        match self {
            Self::Callback { .. } => false,
            Self::Observer { observer, .. } => observer.strong_count() == 0,
        }
    }
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Callback { id, callback } => Self::Callback {
                id: *id,
                callback: callback.clone(),
            },
            Self::Observer { id, observer } => Self::Observer {
                id: *id,
                observer: observer.clone(),
            },
        }
    }
}

// =============================================================================
// SIGNAL INNER (the data behind every signal handle)
// =============================================================================

/// The internal data for a signal.
///
/// Separate from the public handles so it can be shared by the read and
/// write halves and stored as `Rc<dyn AnySignal>`.
pub struct SignalInner<T> {
    /// Flags bitmask (type + lifecycle)
    flags: Cell<u32>,

    /// The current value
    value: RefCell<T>,

    /// Registrations in subscription order
    subscribers: RefCell<Vec<Subscriber<T>>>,

    /// Write version - incremented when the value changes
    write_version: Cell<u32>,

    /// Bumped every time a registration is removed
    removals: Cell<u64>,

    /// Change-detection policy
    equals: EqualsFn<T>,

    /// Optional name used in logs and errors
    label: Option<&'static str>,
}

impl<T> SignalInner<T> {
    /// Create a new live signal cell
    pub fn new(value: T, equals: EqualsFn<T>, label: Option<&'static str>) -> Self {
        Self {
            flags: Cell::new(SIGNAL | LIVE),
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
            write_version: Cell::new(0),
            removals: Cell::new(0),
            equals,
            label,
        }
    }

    /// Get the current value (cloning)
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Get the current value with a closure (avoids clone)
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store `value` unless the equality policy says it equals the current
    /// one. Returns whether the value changed. Disposed cells never change.
    pub fn replace_if_changed(&self, value: T) -> Result<bool, ReactiveError> {
        if self.flags.get() & DISPOSED != 0 {
            return Err(ReactiveError::SignalDisposed { label: self.label });
        }

        let Ok(mut current) = self.value.try_borrow_mut() else {
            return Err(ReactiveError::ValueBorrowed { label: self.label });
        };
        if (self.equals)(&current, &value) {
            return Ok(false);
        }
        *current = value;
        drop(current);

        self.write_version.set(self.write_version.get().wrapping_add(1));
        Ok(true)
    }

    /// Get the write version
    pub fn write_version(&self) -> u32 {
        self.write_version.get()
    }

    /// Get the equality function
    pub fn equals_fn(&self) -> EqualsFn<T> {
        self.equals
    }

    /// Register a change callback. Registering the same callback twice
    /// returns the existing id. Returns None if the signal is disposed.
    pub fn add_callback(&self, callback: &Callback<T>) -> Option<SubscriberId> {
        if self.flags.get() & DISPOSED != 0 {
            return None;
        }

        let mut subscribers = self.subscribers.borrow_mut();
        let existing = subscribers.iter().find_map(|sub| match sub {
            Subscriber::Callback { id, callback: cb } if cb.same_as(callback) => Some(*id),
            _ => None,
        });
        if existing.is_some() {
            return existing;
        }

        let id = next_subscriber_id();
        subscribers.push(Subscriber::Callback {
            id,
            callback: callback.clone(),
        });
        Some(id)
    }

    /// How many times a registration has been removed. Notification uses it
    /// to notice unsubscribes made during a pass.
    pub fn removal_count(&self) -> u64 {
        self.removals.get()
    }

    /// Ids of every current registration
    pub fn subscriber_ids(&self) -> HashSet<SubscriberId> {
        self.subscribers.borrow().iter().map(Subscriber::id).collect()
    }

    /// Copy of the subscriber list for notification, dropping dead observers.
    ///
    /// Notification iterates the copy so subscribers can freely
    /// (un)subscribe or write back into this signal.
    pub fn snapshot_subscribers(&self) -> Vec<Subscriber<T>> {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|sub| !sub.is_dead());
        subscribers.clone()
    }
}

impl<T: 'static> AnySignal for SignalInner<T> {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn label(&self) -> Option<&'static str> {
        self.label
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|sub| !sub.is_dead())
            .count()
    }

    fn has_subscriber(&self, id: SubscriberId) -> bool {
        self.subscribers.borrow().iter().any(|sub| sub.id() == id)
    }

    fn add_observer(&self, id: SubscriberId, observer: Weak<dyn AnyObserver>) -> bool {
        if self.is_disposed() {
            return false;
        }

        let mut subscribers = self.subscribers.borrow_mut();
        if !subscribers.iter().any(|sub| sub.id() == id) {
            subscribers.push(Subscriber::Observer { id, observer });
        }
        true
    }

    fn remove_subscriber(&self, id: SubscriberId) -> bool {
        // Removed entries are dropped after the borrow is released: a
        // callback's captures may own handles that touch this signal.
        let removed: Vec<Subscriber<T>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            let (removed, kept) = std::mem::take(&mut *subscribers)
                .into_iter()
                .partition(|sub| sub.id() == id);
            *subscribers = kept;
            removed
        };
        if removed.is_empty() {
            return false;
        }
        self.removals.set(self.removals.get() + 1);
        true
    }

    fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.flags.set((self.flags.get() & LIFECYCLE_MASK) | DISPOSED);

        let dropped = std::mem::take(&mut *self.subscribers.borrow_mut());
        log::trace!(
            "signal {} disposed, dropped {} subscriber(s)",
            self.label.unwrap_or("<unnamed>"),
            dropped.len()
        );
        drop(dropped);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
