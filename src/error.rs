// ============================================================================
// pulsar-reactivity - Errors
// Reasons a write or scope run was dropped
// ============================================================================
//
// None of these are fatal. The plain `set` / `run` APIs swallow them (after
// logging) and report `false` / `None`; `try_set` / `try_run` hand them back.
// ============================================================================

use thiserror::Error;

/// Why a reactive operation was not carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// The signal was disposed (its owning scope was torn down).
    #[error("signal {} is disposed; write ignored", .label.unwrap_or("<unnamed>"))]
    SignalDisposed { label: Option<&'static str> },

    /// The value is currently borrowed by a `with` closure on the same signal.
    #[error("signal {} is borrowed by a reader; write ignored", .label.unwrap_or("<unnamed>"))]
    ValueBorrowed { label: Option<&'static str> },

    /// Writing would nest notification passes deeper than allowed.
    #[error("notification depth {depth} reached the limit of {limit}; write ignored")]
    NotifyDepthExceeded { depth: usize, limit: usize },

    /// The scope was disposed before `run` was called.
    #[error("scope is disposed")]
    ScopeDisposed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_signal() {
        let err = ReactiveError::SignalDisposed { label: Some("count") };
        assert_eq!(err.to_string(), "signal count is disposed; write ignored");

        let err = ReactiveError::SignalDisposed { label: None };
        assert_eq!(err.to_string(), "signal <unnamed> is disposed; write ignored");
    }

    #[test]
    fn depth_message() {
        let err = ReactiveError::NotifyDepthExceeded { depth: 4, limit: 4 };
        assert_eq!(
            err.to_string(),
            "notification depth 4 reached the limit of 4; write ignored"
        );
    }
}
