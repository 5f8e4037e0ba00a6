//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! `FileRepository` and `UserRepository` also implement the custody store contracts.

pub mod file;
pub mod user;

pub use file::FileRepository;
pub use user::{UserRepository, is_unique_violation};
