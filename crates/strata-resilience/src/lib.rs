//! # Strata Resilience
//!
//! Bounded waiting for calls to the store and the cache.
//! A [`Deadline`] travels with a request; [`TimeoutConfig`] caps every
//! individual call at the smaller of the time left and the component's
//! own budget.

pub mod deadline;
pub mod timeout;

pub use deadline::*;
pub use timeout::*;
