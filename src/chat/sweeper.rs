use std::sync::Arc;
use std::time::Duration;

use crate::chat::messages::MessageStore;
use crate::chat::models::Participant;
use crate::chat::now_millis;
use crate::chat::registry::ParticipantRegistry;
use crate::error::AppError;
use crate::storage::Storage;

/// Evicts participants whose last liveness signal is older than
/// `stale_after`. One pass per call; the caller owns the schedule.
pub struct PresenceSweeper {
    storage: Arc<dyn Storage>,
    stale_after: Duration,
}

impl PresenceSweeper {
    pub fn new(storage: Arc<dyn Storage>, stale_after: Duration) -> Self {
        Self {
            storage,
            stale_after,
        }
    }

    /// Runs one eviction pass and returns how many participants left.
    pub async fn sweep(&self) -> Result<usize, AppError> {
        let participants = ParticipantRegistry::list(self.storage.as_ref()).await?;
        let cutoff = now_millis() - self.stale_after.as_millis() as i64;

        let mut evicted = 0;
        for participant in participants {
            if participant.last_seen >= cutoff {
                continue;
            }
            // Evictions are independent; one failure must not stop the rest.
            match Self::evict(self.storage.as_ref(), &participant).await {
                Ok(()) => evicted += 1,
                Err(err) => {
                    tracing::error!("failed to evict {}: {}", participant.name, err);
                }
            }
        }

        Ok(evicted)
    }

    async fn evict(storage: &dyn Storage, participant: &Participant) -> Result<(), AppError> {
        ParticipantRegistry::remove(storage, &participant.id).await?;
        // Leave notice is a second write; if it fails the participant is
        // already gone and no notice appears.
        MessageStore::append_status(storage, &participant.name, "sai da sala...").await?;
        Ok(())
    }
}
