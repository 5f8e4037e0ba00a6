//! Tests for file repository against a mocked Postgres connection.

use chrono::{TimeZone, Utc};
use coffer_core::custody::{FileRecord, NewFileRecord, RecordStore};
use coffer_shared::{FileId, OwnerId};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

use super::FileRepository;
use crate::entities::files;

fn row(id: i64, user_id: i64, name: &str) -> files::Model {
    files::Model {
        id,
        user_id,
        file_name: name.to_string(),
        blob_locator: format!("memory://memory/{user_id}/{name}"),
        code_digest: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
        uploaded_at: Utc
            .with_ymd_and_hms(2026, 10, 19, 9, 30, 0)
            .unwrap()
            .fixed_offset(),
    }
}

fn new_record() -> NewFileRecord {
    NewFileRecord {
        owner_id: OwnerId(1),
        object_name: "a.txt".to_string(),
        blob_locator: "memory://memory/1/a.txt".to_string(),
        code_digest: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
    }
}

#[tokio::test]
async fn test_insert_returns_assigned_identity() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(11, 1, "a.txt")]])
        .into_connection();
    let repo = FileRepository::new(db);

    let stored = repo.insert(new_record()).await.expect("insert");
    assert_eq!(stored.id, FileId(11));
    assert_eq!(
        stored.created_at,
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    );
}

#[tokio::test]
async fn test_insert_failure_is_store_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_string())])
        .into_connection();
    let repo = FileRepository::new(db);

    let err = repo.insert(new_record()).await.unwrap_err();
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_select_by_owner_maps_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(1, 1, "a.txt"), row(2, 1, "b.txt")]])
        .into_connection();
    let repo = FileRepository::new(db);

    let records = repo.select_by_owner(OwnerId(1)).await.expect("select");
    let names: Vec<_> = records.iter().map(|r| r.object_name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt"]);
    assert!(records.iter().all(|r| r.owner_id == OwnerId(1)));
}

#[tokio::test]
async fn test_select_one_miss_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<files::Model>::new()])
        .into_connection();
    let repo = FileRepository::new(db);

    let record = repo.select_one(FileId(5), OwnerId(2)).await.expect("select");
    assert!(record.is_none());
}

#[tokio::test]
async fn test_select_one_hit() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(5, 2, "notes.md")]])
        .into_connection();
    let repo = FileRepository::new(db);

    let record = repo
        .select_one(FileId(5), OwnerId(2))
        .await
        .expect("select")
        .expect("row");
    assert_eq!(record.id, FileId(5));
    assert_eq!(record.blob_locator, "memory://memory/2/notes.md");
}

#[tokio::test]
async fn test_delete_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let repo = FileRepository::new(db);

    repo.delete_by_id(FileId(5)).await.expect("delete");
}

#[test]
fn test_model_conversion_keeps_utc_instant() {
    let model = row(3, 4, "c.txt");
    let record = FileRecord::from(model.clone());
    assert_eq!(record.id, FileId(3));
    assert_eq!(record.owner_id, OwnerId(4));
    assert_eq!(record.object_name, "c.txt");
    assert_eq!(record.created_at, model.uploaded_at);
}
