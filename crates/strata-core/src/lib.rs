//! # Strata Core
//!
//! Core types, traits, and error definitions for Strata.
//! Everything the store adapter, the cache adapter, and the cache-backed
//! repository agree on lives here: the user record, its draft and patch
//! shapes, typed identifiers, pagination, and the error taxonomy.

pub mod email;
pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod traits;
pub mod user;
pub mod validation;

pub use email::*;
pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
pub use user::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::{module, HasComponent, Interface};
