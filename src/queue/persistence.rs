//! On-disk message persistence: one file per message, bincode-encoded.
//!
//! Layout mirrors `database::cache`'s disk-tier convention: messages live
//! under `<storage_path>/<queue_name>/<id>.bin`; dead-lettered messages
//! move to the sibling `<queue_name>_failed/` directory rather than being
//! deleted outright, so they can be inspected or replayed later.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

use super::error::{QueueError, Result};
use super::message::Message;

pub(crate) struct PersistenceLayer {
    queue_dir: PathBuf,
    dead_letter_dir: PathBuf,
}

impl PersistenceLayer {
    pub(crate) fn new(storage_path: &Path, queue_name: &str) -> Result<Self> {
        let queue_dir = storage_path.join(queue_name);
        let dead_letter_dir = storage_path.join(format!("{queue_name}_failed"));
        std::fs::create_dir_all(&queue_dir)?;
        std::fs::create_dir_all(&dead_letter_dir)?;
        Ok(Self {
            queue_dir,
            dead_letter_dir,
        })
    }

    fn message_path(&self, id: &str) -> PathBuf {
        self.queue_dir.join(format!("{id}.bin"))
    }

    fn dead_letter_path(&self, id: &str) -> PathBuf {
        self.dead_letter_dir.join(format!("{id}.bin"))
    }

    pub(crate) fn persist<P>(&self, message: &Message<P>) -> Result<()>
    where
        P: Serialize + DeserializeOwned,
    {
        std::fs::write(self.message_path(&message.id), message.encode())?;
        Ok(())
    }

    pub(crate) fn remove(&self, id: &str) -> Result<()> {
        let path = self.message_path(id);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Moves a message's persisted record into the dead-letter directory.
    pub(crate) fn move_to_dead_letter<P>(&self, message: &Message<P>) -> Result<()>
    where
        P: Serialize + DeserializeOwned,
    {
        std::fs::write(self.dead_letter_path(&message.id), message.encode())?;
        self.remove(&message.id)
    }

    /// Loads every persisted, non-dead-lettered message from disk, for
    /// rehydrating a queue on startup.
    pub(crate) fn load_all<P>(&self) -> Result<Vec<Message<P>>>
    where
        P: Serialize + DeserializeOwned,
    {
        let mut messages = Vec::new();
        for entry in std::fs::read_dir(&self.queue_dir)? {
            let entry = entry?;
            if entry.path().extension().and_then(|e| e.to_str()) != Some("bin") {
                continue;
            }
            let bytes = std::fs::read(entry.path())?;
            let message = Message::decode(&bytes).ok_or_else(|| {
                QueueError::Serialization(format!(
                    "could not decode persisted message at {:?}",
                    entry.path()
                ))
            })?;
            messages.push(message);
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::message::PublishOptions;

    #[test]
    fn persist_then_load_all_round_trips() {
        let dir = tempdir();
        let layer = PersistenceLayer::new(&dir, "orders").unwrap();
        let msg = Message::new("payload-a".to_string(), PublishOptions::default());
        layer.persist(&msg).unwrap();

        let loaded: Vec<Message<String>> = layer.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, msg.id);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn remove_after_dead_letter_move_clears_primary_copy() {
        let dir = tempdir();
        let layer = PersistenceLayer::new(&dir, "orders").unwrap();
        let msg = Message::new("payload-b".to_string(), PublishOptions::default());
        layer.persist(&msg).unwrap();
        layer.move_to_dead_letter(&msg).unwrap();

        let remaining: Vec<Message<String>> = layer.load_all().unwrap();
        assert!(remaining.is_empty());
        assert!(layer.dead_letter_path(&msg.id).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    fn tempdir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("corekit-queue-test-{}", uuid::Uuid::new_v4()));
        dir
    }
}
