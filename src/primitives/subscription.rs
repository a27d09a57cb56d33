// ============================================================================
// pulsar-reactivity - Subscriptions
// Handles for explicitly registered change callbacks
// ============================================================================

use std::rc::Weak;

use crate::core::types::{AnySignal, SubscriberId};

/// Handle to one callback registration on a signal.
///
/// Dropping the handle does NOT unregister the callback; call
/// [`Subscription::unsubscribe`] for that. The handle holds the signal
/// weakly and never keeps it alive.
#[derive(Clone)]
pub struct Subscription {
    id: Option<SubscriberId>,
    source: Option<Weak<dyn AnySignal>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, source: Weak<dyn AnySignal>) -> Self {
        Self {
            id: Some(id),
            source: Some(source),
        }
    }

    /// A subscription that was refused (the signal was already disposed).
    pub(crate) fn inactive() -> Self {
        Self {
            id: None,
            source: None,
        }
    }

    /// Registration id, or None if the subscription was refused.
    pub fn id(&self) -> Option<SubscriberId> {
        self.id
    }

    /// Whether the callback is still registered on a live signal.
    pub fn is_active(&self) -> bool {
        match (self.id, self.source.as_ref().and_then(Weak::upgrade)) {
            (Some(id), Some(source)) => source.has_subscriber(id),
            _ => false,
        }
    }

    /// Unregister the callback. Returns true if it was still registered.
    pub fn unsubscribe(&self) -> bool {
        match (self.id, self.source.as_ref().and_then(Weak::upgrade)) {
            (Some(id), Some(source)) => source.remove_subscriber(id),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
