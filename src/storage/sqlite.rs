use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use super::{matches, Document, Storage, StorageError};

/// Document store over a single sqlite table. Documents are stored as opaque
/// JSON text; the `seq` column preserves insertion order.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: Pool<Sqlite>,
}

impl SqliteStorage {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn load(&self, collection: &str) -> Result<Vec<(i64, Document)>, StorageError> {
        let rows =
            sqlx::query("SELECT seq, doc FROM documents WHERE collection = ? ORDER BY seq")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|row| {
                let seq: i64 = row.get("seq");
                let doc: String = row.get("doc");
                Ok((seq, serde_json::from_str(&doc)?))
            })
            .collect()
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        doc.insert("id".to_string(), Value::String(id.clone()));
        let body = serde_json::to_string(&doc)?;

        sqlx::query("INSERT INTO documents (id, collection, doc) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(collection)
            .bind(&body)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Vec<Document>, StorageError> {
        // Filtering happens in process; the table stores opaque JSON.
        Ok(self
            .load(collection)
            .await?
            .into_iter()
            .map(|(_, doc)| doc)
            .filter(|doc| matches(doc, filter))
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Document,
        patch: &Document,
    ) -> Result<(), StorageError> {
        let (seq, mut doc) = self
            .load(collection)
            .await?
            .into_iter()
            .find(|(_, doc)| matches(doc, filter))
            .ok_or(StorageError::NotFound)?;

        for (key, value) in patch {
            doc.insert(key.clone(), value.clone());
        }
        let body = serde_json::to_string(&doc)?;

        // Read-modify-write without compare-and-swap; last writer wins.
        sqlx::query("UPDATE documents SET doc = ? WHERE seq = ?")
            .bind(&body)
            .bind(seq)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_one(&self, collection: &str, filter: &Document) -> Result<(), StorageError> {
        let (seq, _) = self
            .load(collection)
            .await?
            .into_iter()
            .find(|(_, doc)| matches(doc, filter))
            .ok_or(StorageError::NotFound)?;

        sqlx::query("DELETE FROM documents WHERE seq = ?")
            .bind(seq)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
