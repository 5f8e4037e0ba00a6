//! User repository for database operations.

use coffer_core::custody::{OwnerDirectory, RecordStoreError};
use coffer_shared::OwnerId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};
use tracing::error;

use crate::entities::users;

/// User repository for account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by user name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_user_name(&self, user_name: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::UserName.eq(user_name))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: OwnerId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails; a taken user name
    /// surfaces as a unique violation (see [`is_unique_violation`]).
    pub async fn create(&self, user_name: &str, password_hash: &str) -> Result<users::Model, DbErr> {
        let user = users::ActiveModel {
            id: NotSet,
            user_name: Set(user_name.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        user.insert(&self.db).await
    }

    /// Checks if a user name is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn user_name_exists(&self, user_name: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::UserName.eq(user_name))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}

/// True if `err` is a unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl OwnerDirectory for UserRepository {
    async fn exists(&self, owner_id: OwnerId) -> Result<bool, RecordStoreError> {
        self.find_by_id(owner_id)
            .await
            .map(|user| user.is_some())
            .map_err(|e| {
                error!(owner_id = %owner_id, error = %e, "owner lookup failed");
                RecordStoreError::new(e.to_string())
            })
    }
}
