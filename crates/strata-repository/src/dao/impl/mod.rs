//! DAO implementations.
//!
//! Trait definitions live in the parent `dao/` module (`user_dao.rs`).
//! Implementations are organized by backend.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryUserDao;
pub use postgres::PostgresUserDao;
