//! Initial schema: accounts and the file records they own.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(FILES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS files CASCADE;")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS users CASCADE;")
            .await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    user_name VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const FILES_SQL: &str = r"
-- blob_locator and code_digest never leave the server
CREATE TABLE files (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    file_name VARCHAR(255) NOT NULL,
    blob_locator TEXT NOT NULL,
    code_digest TEXT NOT NULL,
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Owner listing, oldest first
CREATE INDEX idx_files_user_uploaded ON files(user_id, uploaded_at, id);
";
