// ============================================================================
// pulsar-reactivity - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Rc` or `Signal` types
/// before moving them into a closure.
///
/// # Usage
///
/// ```rust
/// use pulsar_reactivity::{cloned, signal};
///
/// let a = signal(1);
/// let b = signal(2);
///
/// let sum = cloned!(a, b => move || a.get() + b.get());
/// a.set(10);
/// assert_eq!(sum(), 12);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Create an effect with automatic variable capturing.
///
/// Wraps `create_effect(cloned!(... => move || ...))`.
///
/// # Usage
///
/// ```rust
/// use pulsar_reactivity::{effect, signal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = signal(0);
/// let seen = Rc::new(Cell::new(0));
///
/// let _fx = effect!(count, seen => {
///     seen.set(count.get());
/// });
///
/// count.set(7);
/// assert_eq!(seen.get(), 7);
/// ```
#[macro_export]
macro_rules! effect {
    // Case 1: With dependencies
    ($($deps:ident),+ => $body:expr) => {
        $crate::create_effect($crate::cloned!($($deps),+ => move || { $body; }))
    };
    // Case 2: No dependencies
    ($body:expr) => {
        $crate::create_effect(move || { $body; })
    };
}
