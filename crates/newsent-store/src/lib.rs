//! Durable storage for service-wide state.

pub mod counter;

pub use counter::{read_persisted_count, CounterError, RequestCounter};
