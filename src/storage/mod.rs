pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Collection holding the active participants.
pub const PARTICIPANTS: &str = "participants";
/// Collection holding the message history.
pub const MESSAGES: &str = "messages";

/// A stored document: a flat JSON object. The `"id"` field is assigned by the
/// backend on insert.
pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no document matched")]
    NotFound,

    #[error("document decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Document-store port shared by every core component. Each call is atomic on
/// its own document; there are no transactions and no compare-and-swap across
/// calls.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Inserts `doc`, assigning and returning its id. The id is also written
    /// into the stored document under `"id"`.
    async fn insert(&self, collection: &str, doc: Document) -> Result<String, StorageError>;

    /// Returns every document whose top-level fields equal all pairs in
    /// `filter`, in insertion order. An empty filter matches everything.
    async fn find_many(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Vec<Document>, StorageError>;

    /// Merges `patch` into the first document matching `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Document,
        patch: &Document,
    ) -> Result<(), StorageError>;

    /// Deletes the first document matching `filter`.
    async fn delete_one(&self, collection: &str, filter: &Document) -> Result<(), StorageError>;
}

/// Builds an equality filter (or a patch) from field/value pairs.
pub fn document<'a, I>(fields: I) -> Document
where
    I: IntoIterator<Item = (&'a str, Value)>,
{
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StorageError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

pub(crate) fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}
