// ============================================================================
// pulsar-reactivity - Demo Module
// Small consumers of the reactive API, used by docs and integration tests
// ============================================================================

pub mod counter;

pub use counter::Counter;
