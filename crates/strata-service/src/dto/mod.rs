//! Data Transfer Objects (DTOs).

mod pagination;
mod user_dto;

pub use pagination::*;
pub use user_dto::*;
