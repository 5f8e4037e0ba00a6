//! Database migration runner for Coffer.
//!
//! Usage:
//!   migrator up      - Apply the users and files schema
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations

use coffer_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    // DATABASE_URL may come from .env
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
