// ============================================================================
// pulsar-reactivity - Reactivity Module
// Read tracking, change detection and subscriber notification
// ============================================================================

pub mod equality;
pub mod notify;
pub mod tracking;

// Re-export main tracking functions
pub use tracking::{track_read, untrack};

// Re-export equality policies
pub use equality::{equals, never_equals, ptr_equals, safe_equals_f32, safe_equals_f64};
