//! # Strata Server Library
//!
//! Dependency injection wiring and startup for the Strata server binary.

pub mod app;
pub mod di;
pub mod startup;
