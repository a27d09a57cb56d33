// ============================================================================
// pulsar-reactivity - Equality Functions
// Change-detection policies for signal writes
// ============================================================================
//
// A write only notifies subscribers when the policy says the new value
// differs from the current one. The default is value equality (PartialEq).
// Composites that should compare by reference are stored as Rc<U> and use
// `ptr_equals`.
// ============================================================================

use std::rc::Rc;

// =============================================================================
// VALUE EQUALITY (Default)
// =============================================================================

/// Value equality using PartialEq.
/// This is the default for `create_signal()` and `signal()`.
///
/// # Example
/// ```
/// use pulsar_reactivity::reactivity::equality::equals;
///
/// assert!(equals(&42, &42));
/// assert!(!equals(&42, &43));
/// assert!(equals(&"hello", &"hello"));
/// ```
pub fn equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

// =============================================================================
// REFERENCE EQUALITY
// =============================================================================

/// Reference equality for shared composites: two `Rc`s are equal only if
/// they point at the same allocation, whatever their contents.
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use pulsar_reactivity::reactivity::equality::ptr_equals;
///
/// let a = Rc::new(vec![1, 2, 3]);
/// let b = Rc::new(vec![1, 2, 3]);
///
/// assert!(ptr_equals(&a, &a.clone()));
/// assert!(!ptr_equals(&a, &b));
/// ```
pub fn ptr_equals<U: ?Sized>(a: &Rc<U>, b: &Rc<U>) -> bool {
    Rc::ptr_eq(a, b)
}

// =============================================================================
// FLOATING POINT
// =============================================================================

/// Equality for f64 values where NaN equals NaN.
///
/// With plain PartialEq a NaN signal would notify on every write of NaN.
///
/// # Example
/// ```
/// use pulsar_reactivity::reactivity::equality::safe_equals_f64;
///
/// assert!(safe_equals_f64(&1.0, &1.0));
/// assert!(!safe_equals_f64(&1.0, &2.0));
/// assert!(safe_equals_f64(&f64::NAN, &f64::NAN));
/// assert!(!safe_equals_f64(&f64::NAN, &1.0));
/// ```
pub fn safe_equals_f64(a: &f64, b: &f64) -> bool {
    if a.is_nan() {
        return b.is_nan();
    }
    a == b
}

/// Equality for f32 values where NaN equals NaN.
pub fn safe_equals_f32(a: &f32, b: &f32) -> bool {
    if a.is_nan() {
        return b.is_nan();
    }
    a == b
}

// =============================================================================
// FIXED POLICIES
// =============================================================================

/// Never equal: every write notifies, even of an identical value.
/// Useful for types without a meaningful PartialEq.
///
/// # Example
/// ```
/// use pulsar_reactivity::reactivity::equality::never_equals;
///
/// assert!(!never_equals(&42, &42));
/// ```
pub fn never_equals<T>(_a: &T, _b: &T) -> bool {
    false
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_equality() {
        assert!(equals(&vec![1, 2], &vec![1, 2]));
        assert!(!equals(&vec![1, 2], &vec![2, 1]));
        assert!(equals(&String::from("a"), &String::from("a")));
    }

    #[test]
    fn reference_equality_ignores_contents() {
        let a = Rc::new(String::from("same"));
        let b = Rc::new(String::from("same"));

        assert!(ptr_equals(&a, &a));
        assert!(ptr_equals(&a, &Rc::clone(&a)));
        assert!(!ptr_equals(&a, &b));
    }

    #[test]
    fn reference_equality_on_unsized() {
        let a: Rc<[i32]> = Rc::from(vec![1, 2, 3]);
        let b: Rc<[i32]> = Rc::from(vec![1, 2, 3]);
        assert!(ptr_equals(&a, &a.clone()));
        assert!(!ptr_equals(&a, &b));
    }

    #[test]
    fn nan_handling() {
        assert!(safe_equals_f64(&f64::NAN, &f64::NAN));
        assert!(!safe_equals_f64(&1.0, &f64::NAN));
        assert!(safe_equals_f32(&f32::NAN, &f32::NAN));
        assert!(!safe_equals_f32(&f32::NAN, &0.0));
        assert!(safe_equals_f32(&0.5, &0.5));
    }

    #[test]
    fn never_equals_always_false() {
        assert!(!never_equals(&(), &()));
        assert!(!never_equals(&1, &1));
    }
}
