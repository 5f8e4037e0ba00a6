//! `SeaORM` entity definitions.

pub mod files;
pub mod users;
