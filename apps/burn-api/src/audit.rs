//! Audit trail persistence

use chrono::Utc;
use field_burner::AuditRecord;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::DbAuditTrail;

/// Store one audit record, returning its row id.
pub async fn insert(db: &SqlitePool, record: &AuditRecord) -> anyhow::Result<String> {
    let id = Uuid::new_v4().to_string();
    let fields_json = serde_json::to_string(&record.fields)?;

    sqlx::query(
        r#"
        INSERT INTO audit_trails
            (id, document_id, original_hash, final_hash, signed_url, fields_json, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&record.document_id)
    .bind(&record.original_hash)
    .bind(&record.final_hash)
    .bind(&record.signed_url)
    .bind(&fields_json)
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(id)
}

/// All records for a document, newest first
pub async fn list_for_document(
    db: &SqlitePool,
    document_id: &str,
) -> Result<Vec<DbAuditTrail>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, document_id, original_hash, final_hash, signed_url, fields_json, created_at
        FROM audit_trails
        WHERE document_id = ?
        ORDER BY rowid DESC
        "#,
    )
    .bind(document_id)
    .fetch_all(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use pretty_assertions::assert_eq;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        AppState::with_pool(pool.clone(), dir.path().to_path_buf(), None)
            .await
            .unwrap();
        pool
    }

    fn record(document_id: &str, final_hash: &str) -> AuditRecord {
        AuditRecord {
            document_id: document_id.into(),
            original_hash: "orig".into(),
            final_hash: final_hash.into(),
            signed_url: format!("http://localhost/files/{}.pdf", final_hash),
            fields: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let db = memory_pool().await;
        insert(&db, &record("doc", "first")).await.unwrap();
        insert(&db, &record("doc", "second")).await.unwrap();
        insert(&db, &record("other", "third")).await.unwrap();

        let rows = list_for_document(&db, "doc").await.unwrap();
        let hashes: Vec<&str> = rows.iter().map(|r| r.final_hash.as_str()).collect();
        assert_eq!(hashes, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_unknown_document_has_no_rows() {
        let db = memory_pool().await;
        assert!(list_for_document(&db, "missing").await.unwrap().is_empty());
    }
}
