use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::domain::ApplicationDraft;

/// Storage key for the single draft snapshot. One key, whole-draft
/// last-writer-wins; step position travels inside the snapshot.
pub const DRAFT_KEY: &str = "eventflow.artist_application_draft";

/// Durable per-browser string key-value storage, as exposed by the host
/// environment. Implementations must survive process restarts where the
/// platform allows it; the in-memory variant backs tests and the demo CLI.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// Process-local key-value store with local-storage semantics.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("key-value mutex poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("key-value mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .expect("key-value mutex poisoned")
            .remove(key);
    }
}

/// Persists in-progress application drafts between visits.
#[derive(Debug)]
pub struct DraftStore<S> {
    storage: S,
}

impl<S: KeyValueStore> DraftStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Restore the saved draft, including its step position. A corrupt
    /// snapshot is logged and treated as absent rather than failing the
    /// wizard mount.
    pub fn load(&self) -> Option<ApplicationDraft> {
        let raw = self.storage.get(DRAFT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(err) => {
                warn!(error = %err, "discarding unreadable application draft");
                None
            }
        }
    }

    /// Overwrite the stored snapshot wholesale and stamp the save time.
    pub fn save(&self, draft: &ApplicationDraft) -> DateTime<Utc> {
        let saved_at = Utc::now();
        let mut snapshot = draft.clone();
        snapshot.last_saved_at = Some(saved_at);

        match serde_json::to_string(&snapshot) {
            Ok(serialized) => self.storage.set(DRAFT_KEY, &serialized),
            Err(err) => warn!(error = %err, "failed to serialize application draft"),
        }

        saved_at
    }

    /// Drop the stored snapshot. Idempotent; called once after a confirmed
    /// submission so stale data cannot be resubmitted.
    pub fn clear(&self) {
        self.storage.remove(DRAFT_KEY);
    }
}
