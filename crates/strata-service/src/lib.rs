//! # Strata Service
//!
//! Use cases over the cache-backed user repository.
//! Validates incoming requests, maps them onto repository drafts and
//! patches, and reports cache warnings without failing the request.

pub mod dto;
pub mod r#impl;
pub mod user_service;

pub use dto::*;
pub use r#impl::UserServiceComponent;
pub use user_service::*;
