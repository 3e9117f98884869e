//! DAO (Data Access Object) layer.
//!
//! Hierarchy:
//! ```text
//! Service → Repository (cache + deadlines) → DAO (interface + impl) → DB
//! ```

pub mod r#impl;
pub mod user_dao;

pub use r#impl::{InMemoryUserDao, PostgresUserDao};
pub use user_dao::UserDao;
