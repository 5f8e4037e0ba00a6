//! File record repository for database operations.

use chrono::Utc;
use coffer_core::custody::{FileRecord, NewFileRecord, RecordStore, RecordStoreError, StoredFile};
use coffer_shared::{FileId, OwnerId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use tracing::error;

use crate::entities::files;

/// File repository backing the custody record store.
#[derive(Debug, Clone)]
pub struct FileRepository {
    db: DatabaseConnection,
}

impl FileRepository {
    /// Creates a new file repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a file row and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, record: NewFileRecord) -> Result<files::Model, DbErr> {
        let file = files::ActiveModel {
            id: NotSet,
            user_id: Set(record.owner_id.into_inner()),
            file_name: Set(record.object_name),
            blob_locator: Set(record.blob_locator),
            code_digest: Set(record.code_digest),
            uploaded_at: Set(Utc::now().into()),
        };

        file.insert(&self.db).await
    }

    /// Lists an owner's files, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<files::Model>, DbErr> {
        files::Entity::find()
            .filter(files::Column::UserId.eq(owner_id.into_inner()))
            .order_by_asc(files::Column::UploadedAt)
            .order_by_asc(files::Column::Id)
            .all(&self.db)
            .await
    }

    /// Finds a file by id, but only if `owner_id` owns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_owned(
        &self,
        id: FileId,
        owner_id: OwnerId,
    ) -> Result<Option<files::Model>, DbErr> {
        files::Entity::find_by_id(id.into_inner())
            .filter(files::Column::UserId.eq(owner_id.into_inner()))
            .one(&self.db)
            .await
    }

    /// Deletes a file row. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: FileId) -> Result<bool, DbErr> {
        let result = files::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

impl From<files::Model> for FileRecord {
    fn from(model: files::Model) -> Self {
        Self {
            id: FileId(model.id),
            owner_id: OwnerId(model.user_id),
            object_name: model.file_name,
            blob_locator: model.blob_locator,
            code_digest: model.code_digest,
            created_at: model.uploaded_at.with_timezone(&Utc),
        }
    }
}

fn store_error(operation: &'static str, err: &DbErr) -> RecordStoreError {
    error!(operation, error = %err, "file record query failed");
    RecordStoreError::new(err.to_string())
}

impl RecordStore for FileRepository {
    async fn insert(&self, record: NewFileRecord) -> Result<StoredFile, RecordStoreError> {
        let model = self
            .create(record)
            .await
            .map_err(|e| store_error("insert", &e))?;
        Ok(StoredFile {
            id: FileId(model.id),
            created_at: model.uploaded_at.with_timezone(&Utc),
        })
    }

    async fn select_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<FileRecord>, RecordStoreError> {
        let rows = self
            .find_by_owner(owner_id)
            .await
            .map_err(|e| store_error("select_by_owner", &e))?;
        Ok(rows.into_iter().map(FileRecord::from).collect())
    }

    async fn select_one(
        &self,
        id: FileId,
        owner_id: OwnerId,
    ) -> Result<Option<FileRecord>, RecordStoreError> {
        let row = self
            .find_owned(id, owner_id)
            .await
            .map_err(|e| store_error("select_one", &e))?;
        Ok(row.map(FileRecord::from))
    }

    async fn delete_by_id(&self, id: FileId) -> Result<(), RecordStoreError> {
        self.delete(id)
            .await
            .map_err(|e| store_error("delete_by_id", &e))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
