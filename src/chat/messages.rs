use crate::chat::models::{Message, MessageKind, BROADCAST};
use crate::chat::wall_clock;
use crate::error::AppError;
use crate::storage::{document, from_document, Document, Storage, MESSAGES, PARTICIPANTS};

/// Owns the message history: creation, per-requester visibility, and
/// ownership-gated mutation.
pub struct MessageStore;

impl MessageStore {
    /// Posts a message from an active participant.
    pub async fn send(
        storage: &dyn Storage,
        from: &str,
        to: &str,
        text: &str,
        kind: MessageKind,
    ) -> Result<(), AppError> {
        validate_payload(to, text, kind)?;
        Self::require_active(storage, from).await?;

        storage
            .insert(
                MESSAGES,
                document([
                    ("from", from.into()),
                    ("to", to.into()),
                    ("text", text.into()),
                    ("type", kind.as_str().into()),
                    ("time", wall_clock().into()),
                ]),
            )
            .await?;
        Ok(())
    }

    /// Everything `requester` may see, oldest first. With a positive `limit`
    /// only the last `limit` visible entries are returned, still oldest
    /// first; any other `limit` means no cap.
    pub async fn list(
        storage: &dyn Storage,
        requester: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, AppError> {
        let docs = storage.find_many(MESSAGES, &Document::new()).await?;

        let mut visible = Vec::new();
        for doc in docs {
            let message: Message = from_document(doc)?;
            if message.visible_to(requester) {
                visible.push(message);
            }
        }

        match limit {
            Some(n) if n > 0 => {
                let keep = n as usize;
                if visible.len() > keep {
                    visible.drain(..visible.len() - keep);
                }
                Ok(visible)
            }
            _ => Ok(visible),
        }
    }

    /// Deletes a message; only the sender may do so.
    pub async fn remove(
        storage: &dyn Storage,
        message_id: &str,
        requester: &str,
    ) -> Result<(), AppError> {
        let message = Self::find_by_id(storage, message_id).await?;
        if message.from != requester {
            return Err(AppError::Forbidden(format!(
                "message {} does not belong to \"{}\"",
                message_id, requester
            )));
        }

        storage
            .delete_one(MESSAGES, &document([("id", message_id.into())]))
            .await?;
        Ok(())
    }

    /// Rewrites a message's text; only the sender may do so. The replacement
    /// `to` and `type` are validated but not persisted.
    pub async fn edit(
        storage: &dyn Storage,
        message_id: &str,
        requester: &str,
        to: &str,
        text: &str,
        kind: MessageKind,
    ) -> Result<(), AppError> {
        validate_payload(to, text, kind)?;

        let message = Self::find_by_id(storage, message_id).await?;
        if message.from != requester {
            return Err(AppError::Forbidden(format!(
                "message {} does not belong to \"{}\"",
                message_id, requester
            )));
        }

        storage
            .update_one(
                MESSAGES,
                &document([("id", message_id.into())]),
                &document([("text", text.into())]),
            )
            .await?;
        Ok(())
    }

    /// Appends a broadcast `status` notice (join/leave).
    pub async fn append_status(
        storage: &dyn Storage,
        from: &str,
        text: &str,
    ) -> Result<(), AppError> {
        storage
            .insert(
                MESSAGES,
                document([
                    ("from", from.into()),
                    ("to", BROADCAST.into()),
                    ("text", text.into()),
                    ("type", MessageKind::Status.as_str().into()),
                    ("time", wall_clock().into()),
                ]),
            )
            .await?;
        Ok(())
    }

    async fn find_by_id(storage: &dyn Storage, message_id: &str) -> Result<Message, AppError> {
        let mut docs = storage
            .find_many(MESSAGES, &document([("id", message_id.into())]))
            .await?;

        match docs.pop() {
            Some(doc) => Ok(from_document(doc)?),
            None => Err(AppError::NotFound(format!(
                "no message with id {}",
                message_id
            ))),
        }
    }

    async fn require_active(storage: &dyn Storage, name: &str) -> Result<(), AppError> {
        let active = storage
            .find_many(PARTICIPANTS, &document([("name", name.into())]))
            .await?;
        if active.is_empty() {
            return Err(AppError::Forbidden(format!(
                "\"{}\" is not in the room",
                name
            )));
        }
        Ok(())
    }
}

fn validate_payload(to: &str, text: &str, kind: MessageKind) -> Result<(), AppError> {
    // Every violation is reported, not just the first.
    let mut problems = Vec::new();
    if to.is_empty() {
        problems.push("to must be a non-empty string".to_string());
    }
    if text.is_empty() {
        problems.push("text must be a non-empty string".to_string());
    }
    if kind == MessageKind::Status {
        problems.push("type must be \"message\" or \"private_message\"".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ParticipantRegistry;
    use crate::storage::MemoryStorage;

    async fn room_with(storage: &MemoryStorage, names: &[&str]) {
        for name in names {
            ParticipantRegistry::register(storage, name).await.unwrap();
        }
    }

    #[tokio::test]
    async fn send_reports_every_violation_at_once() {
        let storage = MemoryStorage::new();
        room_with(&storage, &["Ana"]).await;

        let err = MessageStore::send(&storage, "Ana", "", "", MessageKind::Status)
            .await
            .unwrap_err();

        match err {
            AppError::Validation(problems) => assert_eq!(problems.len(), 3),
            other => panic!("expected validation error, got {}", other),
        }
    }

    #[tokio::test]
    async fn send_from_inactive_sender_is_forbidden() {
        let storage = MemoryStorage::new();

        let err = MessageStore::send(&storage, "Ana", BROADCAST, "hi", MessageKind::Message)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn private_messages_reach_only_their_two_ends() {
        let storage = MemoryStorage::new();
        room_with(&storage, &["Ana", "Bob", "Carol"]).await;

        MessageStore::send(&storage, "Ana", "Bob", "psst", MessageKind::PrivateMessage)
            .await
            .unwrap();

        let carol_sees = MessageStore::list(&storage, "Carol", None).await.unwrap();
        assert!(carol_sees.iter().all(|m| m.text != "psst"));

        let bob_sees = MessageStore::list(&storage, "Bob", None).await.unwrap();
        assert!(bob_sees.iter().any(|m| m.text == "psst"));

        let ana_sees = MessageStore::list(&storage, "Ana", None).await.unwrap();
        assert!(ana_sees.iter().any(|m| m.text == "psst"));
    }

    #[tokio::test]
    async fn public_messages_to_one_recipient_stay_off_other_listings() {
        let storage = MemoryStorage::new();
        room_with(&storage, &["Ana", "Bob", "Carol"]).await;

        MessageStore::send(&storage, "Ana", "Bob", "oi", MessageKind::Message)
            .await
            .unwrap();

        let carol_sees = MessageStore::list(&storage, "Carol", None).await.unwrap();
        assert!(carol_sees.iter().all(|m| m.text != "oi"));
    }

    #[tokio::test]
    async fn limit_keeps_the_most_recent_window_in_order() {
        let storage = MemoryStorage::new();
        room_with(&storage, &["Ana"]).await;

        for n in 1..=5 {
            MessageStore::send(&storage, "Ana", BROADCAST, &n.to_string(), MessageKind::Message)
                .await
                .unwrap();
        }

        let unlimited = MessageStore::list(&storage, "Ana", None).await.unwrap();
        let window = MessageStore::list(&storage, "Ana", Some(3)).await.unwrap();

        assert_eq!(window.len(), 3);
        let tail: Vec<_> = unlimited[unlimited.len() - 3..]
            .iter()
            .map(|m| m.text.clone())
            .collect();
        let got: Vec<_> = window.iter().map(|m| m.text.clone()).collect();
        assert_eq!(got, tail);
        assert_eq!(got, vec!["3", "4", "5"]);

        // Zero and oversized limits mean the whole listing.
        let zero = MessageStore::list(&storage, "Ana", Some(0)).await.unwrap();
        assert_eq!(zero.len(), unlimited.len());
        let oversized = MessageStore::list(&storage, "Ana", Some(99)).await.unwrap();
        assert_eq!(oversized.len(), unlimited.len());
    }

    #[tokio::test]
    async fn remove_is_gated_on_ownership() {
        let storage = MemoryStorage::new();
        room_with(&storage, &["Ana", "Bob"]).await;

        MessageStore::send(&storage, "Bob", BROADCAST, "mine", MessageKind::Message)
            .await
            .unwrap();
        let id = MessageStore::list(&storage, "Ana", None)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.text == "mine")
            .unwrap()
            .id;

        let err = MessageStore::remove(&storage, &id, "Ana").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        MessageStore::remove(&storage, &id, "Bob").await.unwrap();
        let listing = MessageStore::list(&storage, "Ana", None).await.unwrap();
        assert!(listing.iter().all(|m| m.id != id));
    }

    #[tokio::test]
    async fn remove_unknown_id_is_not_found() {
        let storage = MemoryStorage::new();

        let err = MessageStore::remove(&storage, "missing", "Ana")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_by_another_principal_changes_nothing() {
        let storage = MemoryStorage::new();
        room_with(&storage, &["Ana", "Bob"]).await;

        MessageStore::send(&storage, "Bob", BROADCAST, "original", MessageKind::Message)
            .await
            .unwrap();
        let id = MessageStore::list(&storage, "Ana", None)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.text == "original")
            .unwrap()
            .id;

        let err = MessageStore::edit(&storage, &id, "Ana", BROADCAST, "hacked", MessageKind::Message)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let kept = MessageStore::list(&storage, "Ana", None)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.id == id)
            .unwrap();
        assert_eq!(kept.text, "original");
    }

    #[tokio::test]
    async fn edit_replaces_text_and_nothing_else() {
        let storage = MemoryStorage::new();
        room_with(&storage, &["Ana", "Bob"]).await;

        MessageStore::send(&storage, "Ana", "Bob", "draft", MessageKind::PrivateMessage)
            .await
            .unwrap();
        let before = MessageStore::list(&storage, "Ana", None)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.text == "draft")
            .unwrap();

        // The payload retargets the message; only the text may change.
        MessageStore::edit(&storage, &before.id, "Ana", BROADCAST, "final", MessageKind::Message)
            .await
            .unwrap();

        let after = MessageStore::list(&storage, "Ana", None)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.id == before.id)
            .unwrap();
        assert_eq!(after.text, "final");
        assert_eq!(after.to, "Bob");
        assert_eq!(after.kind, MessageKind::PrivateMessage);
        assert_eq!(after.time, before.time);
    }
}
