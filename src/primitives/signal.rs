// ============================================================================
// pulsar-reactivity - Signal Primitive
// The reactive value cell and its read/write handles
// ============================================================================

use std::fmt;
use std::rc::Rc;

use crate::core::context::with_context;
use crate::core::types::{default_equals, AnySignal, Callback, EqualsFn, SignalInner, SubscriberId};
use crate::error::ReactiveError;
use crate::primitives::scope::register_signal_with_scope;
use crate::primitives::subscription::Subscription;
use crate::reactivity::notify::{check_notify_depth, notify_subscribers};
use crate::reactivity::tracking::track_read;

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for creating a signal.
pub struct SignalOptions<T> {
    /// Change-detection policy. A write is dropped when this returns true.
    pub equals: EqualsFn<T>,
    /// Name used in logs and error messages
    pub label: Option<&'static str>,
}

impl<T: PartialEq> SignalOptions<T> {
    /// Value equality, no label.
    pub fn new() -> Self {
        Self {
            equals: default_equals,
            label: None,
        }
    }
}

impl<T> SignalOptions<T> {
    /// Use a different change-detection policy.
    pub fn with_equals(mut self, equals: EqualsFn<T>) -> Self {
        self.equals = equals;
        self
    }

    /// Attach a debug label.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }
}

impl<T: PartialEq> Default for SignalOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SignalOptions<T> {
    fn clone(&self) -> Self {
        Self {
            equals: self.equals,
            label: self.label,
        }
    }
}

// =============================================================================
// SHARED READ / WRITE PATHS
// =============================================================================

fn new_inner<T: 'static>(value: T, options: SignalOptions<T>) -> Rc<SignalInner<T>> {
    let inner = Rc::new(SignalInner::new(value, options.equals, options.label));
    register_signal_with_scope(&(inner.clone() as Rc<dyn AnySignal>));
    log::trace!("signal {} created", options.label.unwrap_or("<unnamed>"));
    inner
}

fn read_tracked<T: Clone + 'static>(inner: &Rc<SignalInner<T>>) -> T {
    track_read(inner.clone() as Rc<dyn AnySignal>);
    inner.get()
}

fn try_write<T: Clone + 'static>(inner: &SignalInner<T>, value: T) -> Result<bool, ReactiveError> {
    if inner.is_disposed() {
        return Err(ReactiveError::SignalDisposed {
            label: inner.label(),
        });
    }
    check_notify_depth()?;

    if !inner.replace_if_changed(value)? {
        return Ok(false);
    }

    with_context(|ctx| ctx.increment_write_version());
    notify_subscribers(inner);
    Ok(true)
}

fn write<T: Clone + 'static>(inner: &SignalInner<T>, value: T) -> bool {
    match try_write(inner, value) {
        Ok(changed) => changed,
        Err(err @ ReactiveError::NotifyDepthExceeded { .. }) => {
            log::warn!("{err}");
            false
        }
        Err(err) => {
            log::debug!("{err}");
            false
        }
    }
}

fn subscribe_callback<T: 'static>(inner: &Rc<SignalInner<T>>, callback: &Callback<T>) -> Subscription {
    let source = Rc::downgrade(&(inner.clone() as Rc<dyn AnySignal>));
    match inner.add_callback(callback) {
        Some(id) => Subscription::new(id, source),
        None => {
            log::debug!(
                "subscribe on disposed signal {} ignored",
                inner.label().unwrap_or("<unnamed>")
            );
            Subscription::inactive()
        }
    }
}

// =============================================================================
// SIGNAL<T> - Combined read/write handle
// =============================================================================

/// A reactive signal that holds a value of type T.
///
/// Cloning the handle shares the same cell. Use [`Signal::split`] to hand
/// out the read and write halves separately.
///
/// # Example
///
/// ```
/// use pulsar_reactivity::signal;
///
/// let count = signal(0);
/// assert_eq!(count.get(), 0);
///
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T: Clone + 'static> Signal<T> {
    /// Create a new signal using value equality.
    pub fn new(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::with_options(value, SignalOptions::new())
    }

    /// Create a new signal with explicit options.
    pub fn with_options(value: T, options: SignalOptions<T>) -> Self {
        Self {
            inner: new_inner(value, options),
        }
    }

    /// Get the current value (cloning), tracking the read.
    pub fn get(&self) -> T {
        read_tracked(&self.inner)
    }

    /// Get the current value without subscribing the running effect.
    pub fn get_untracked(&self) -> T {
        self.inner.get()
    }

    /// Access the current value with a closure (avoids cloning), tracking
    /// the read. Writing to this signal from inside `f` is refused.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        track_read(self.inner.clone() as Rc<dyn AnySignal>);
        self.inner.with(f)
    }

    /// Set the value. Returns true if the value changed and subscribers
    /// were notified. A no-op returning false once disposed.
    pub fn set(&self, value: T) -> bool {
        write(&self.inner, value)
    }

    /// Like [`set`](Self::set), but reports why a write was dropped.
    pub fn try_set(&self, value: T) -> Result<bool, ReactiveError> {
        try_write(&self.inner, value)
    }

    /// Clone the value, mutate the clone, and write it back through the
    /// equality policy.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.inner.get();
        f(&mut next);
        write(&self.inner, next)
    }

    /// Register a change callback (see [`ReadSignal::subscribe`]).
    pub fn subscribe(&self, callback: &Callback<T>) -> Subscription {
        subscribe_callback(&self.inner, callback)
    }

    /// Register a closure as a new change callback.
    pub fn on_change(&self, f: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe(&Callback::new(f))
    }

    /// Remove a registration by id. Returns true if it was present.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.remove_subscriber(id)
    }

    /// Number of current registrations.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    /// Freeze the value and drop every subscriber.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Whether the signal has moved to the Disposed state.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Split into independent read and write handles.
    pub fn split(&self) -> (ReadSignal<T>, WriteSignal<T>) {
        (self.read_only(), self.write_only())
    }

    /// A read-only handle to the same cell.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            inner: self.inner.clone(),
        }
    }

    /// A write-only handle to the same cell.
    pub fn write_only(&self) -> WriteSignal<T> {
        WriteSignal {
            inner: self.inner.clone(),
        }
    }

    /// Get a reference to the inner cell (for advanced use).
    pub fn inner(&self) -> &Rc<SignalInner<T>> {
        &self.inner
    }

    /// Get the inner cell as a type-erased AnySignal.
    pub fn as_any_signal(&self) -> Rc<dyn AnySignal> {
        self.inner.clone()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.with(|value| f.debug_struct("Signal").field("value", value).finish())
    }
}

// =============================================================================
// READ SIGNAL - The getter half
// =============================================================================

/// The read half of a signal.
pub struct ReadSignal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T: Clone + 'static> ReadSignal<T> {
    /// Get the current value.
    ///
    /// Inside an effect this subscribes the effect to the signal.
    pub fn get(&self) -> T {
        read_tracked(&self.inner)
    }

    /// Get the current value without tracking.
    pub fn get_untracked(&self) -> T {
        self.inner.get()
    }

    /// Access the current value by reference, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        track_read(self.inner.clone() as Rc<dyn AnySignal>);
        self.inner.with(f)
    }

    /// Register a change callback.
    ///
    /// Callbacks run synchronously after every committed change, in
    /// registration order. Subscribing a callback that is already registered
    /// returns a handle to the existing registration. On a disposed signal
    /// the returned subscription is inactive.
    pub fn subscribe(&self, callback: &Callback<T>) -> Subscription {
        subscribe_callback(&self.inner, callback)
    }

    /// Register a closure as a new change callback.
    pub fn on_change(&self, f: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe(&Callback::new(f))
    }

    /// Remove a registration by id. Returns true if it was present.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.remove_subscriber(id)
    }

    /// Number of current registrations.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    /// Whether the signal has moved to the Disposed state.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// A plain `() -> T` closure over this signal (tracked like `get`).
    pub fn getter(&self) -> Box<dyn Fn() -> T> {
        let inner = self.inner.clone();
        Box::new(move || read_tracked(&inner))
    }
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.with(|value| f.debug_struct("ReadSignal").field("value", value).finish())
    }
}

// =============================================================================
// WRITE SIGNAL - The setter half
// =============================================================================

/// The write half of a signal.
pub struct WriteSignal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T: Clone + 'static> WriteSignal<T> {
    /// Replace the value.
    ///
    /// If the new value differs from the current one (per the signal's
    /// equality policy) every subscriber is notified once, synchronously, in
    /// registration order. Returns true in that case. Equal writes and
    /// writes after disposal are no-ops returning false.
    pub fn set(&self, value: T) -> bool {
        write(&self.inner, value)
    }

    /// Like [`set`](Self::set), but reports why a write was dropped.
    pub fn try_set(&self, value: T) -> Result<bool, ReactiveError> {
        try_write(&self.inner, value)
    }

    /// Clone the value, mutate the clone, and write it back.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.inner.get();
        f(&mut next);
        write(&self.inner, next)
    }

    /// Freeze the value and drop every subscriber.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Whether the signal has moved to the Disposed state.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// A plain `(T) -> ()` closure over this signal.
    pub fn setter(&self) -> Box<dyn Fn(T)> {
        let inner = self.inner.clone();
        Box::new(move |value| {
            write(&inner, value);
        })
    }
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for WriteSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSignal").finish_non_exhaustive()
    }
}

// =============================================================================
// SIGNAL CREATION FUNCTIONS
// =============================================================================

/// Create a signal and return its getter/setter pair.
///
/// This is the primary entry point. The signal uses value equality: writing
/// a value equal to the current one notifies nobody.
///
/// # Example
///
/// ```
/// use pulsar_reactivity::create_signal;
///
/// let (count, set_count) = create_signal(0);
/// assert_eq!(count.get(), 0);
///
/// set_count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub fn create_signal<T>(initial: T) -> (ReadSignal<T>, WriteSignal<T>)
where
    T: Clone + PartialEq + 'static,
{
    Signal::new(initial).split()
}

/// Create a signal with explicit options and return its getter/setter pair.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use pulsar_reactivity::{create_signal_with_options, ptr_equals, SignalOptions};
///
/// let first = Rc::new(vec![1, 2, 3]);
/// let (items, set_items) = create_signal_with_options(
///     first.clone(),
///     SignalOptions::new().with_equals(ptr_equals).with_label("items"),
/// );
///
/// // Same allocation: not a change
/// assert!(!set_items.set(first.clone()));
/// // Equal contents, new allocation: a change
/// assert!(set_items.set(Rc::new(vec![1, 2, 3])));
/// assert_eq!(*items.get(), vec![1, 2, 3]);
/// ```
pub fn create_signal_with_options<T>(
    initial: T,
    options: SignalOptions<T>,
) -> (ReadSignal<T>, WriteSignal<T>)
where
    T: Clone + 'static,
{
    Signal::with_options(initial, options).split()
}

/// Create a combined read/write signal handle.
pub fn signal<T>(value: T) -> Signal<T>
where
    T: Clone + PartialEq + 'static,
{
    Signal::new(value)
}

/// Create a signal with a custom equality function.
///
/// # Example
///
/// ```
/// use pulsar_reactivity::signal_with_equals;
///
/// // Signal that always considers values different (always notifies)
/// let always_notify = signal_with_equals(0, |_, _| false);
/// assert!(always_notify.set(0));
/// ```
pub fn signal_with_equals<T>(value: T, equals: EqualsFn<T>) -> Signal<T>
where
    T: Clone + 'static,
{
    Signal::with_options(
        value,
        SignalOptions {
            equals,
            label: None,
        },
    )
}

// =============================================================================
// TESTS
// =============================================================================
