use crate::chat::messages::MessageStore;
use crate::chat::models::Participant;
use crate::chat::now_millis;
use crate::error::AppError;
use crate::storage::{document, from_document, Document, Storage, PARTICIPANTS};

/// Owns participant identity and liveness timestamps.
pub struct ParticipantRegistry;

impl ParticipantRegistry {
    /// Adds `name` to the room and announces the join.
    pub async fn register(storage: &dyn Storage, name: &str) -> Result<String, AppError> {
        if name.is_empty() {
            return Err(AppError::Validation(vec![
                "name must be a non-empty string".to_string(),
            ]));
        }

        let taken = storage
            .find_many(PARTICIPANTS, &document([("name", name.into())]))
            .await?;
        if !taken.is_empty() {
            return Err(AppError::Conflict(format!(
                "\"{}\" is already in the room",
                name
            )));
        }

        // Check-then-insert: two concurrent registrations of the same name
        // can both pass the check above. Uniqueness is best-effort.
        let id = storage
            .insert(
                PARTICIPANTS,
                document([("name", name.into()), ("lastSeen", now_millis().into())]),
            )
            .await?;

        // Second, independent write. If it fails the participant stays
        // registered without a join notice.
        MessageStore::append_status(storage, name, "entra na sala...").await?;

        Ok(id)
    }

    pub async fn list(storage: &dyn Storage) -> Result<Vec<Participant>, AppError> {
        let docs = storage.find_many(PARTICIPANTS, &Document::new()).await?;

        let mut participants = Vec::with_capacity(docs.len());
        for doc in docs {
            participants.push(from_document(doc)?);
        }
        Ok(participants)
    }

    /// Records a liveness signal for `name`.
    pub async fn touch(storage: &dyn Storage, name: &str) -> Result<(), AppError> {
        let filter = document([("name", name.into())]);

        let active = storage.find_many(PARTICIPANTS, &filter).await?;
        if active.is_empty() {
            return Err(AppError::NotFound(format!(
                "no participant named \"{}\"",
                name
            )));
        }

        storage
            .update_one(
                PARTICIPANTS,
                &filter,
                &document([("lastSeen", now_millis().into())]),
            )
            .await?;
        Ok(())
    }

    /// Drops one participant by id. Messages referencing the name stay in
    /// history.
    pub async fn remove(storage: &dyn Storage, id: &str) -> Result<(), AppError> {
        storage
            .delete_one(PARTICIPANTS, &document([("id", id.into())]))
            .await?;
        Ok(())
    }
}
