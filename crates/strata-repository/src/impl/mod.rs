//! Repository layer implementations.
//!
//! Trait definitions live in the parent module (`traits.rs`).
//! This module contains concrete structs that implement those traits.

pub mod cached_user_repository;

pub use cached_user_repository::{CachePolicy, CachedUserRepository, CachedUserRepositoryParameters};
