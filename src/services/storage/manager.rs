use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::broadcast;

use crate::error::GifawayError;
use crate::events::GalleryUpdated;
use crate::services::storage::cache;
use crate::services::storage::kv::KeyValueStore;

pub const DEFAULT_STORAGE_KEY: &str = "gifawayStore";

/// Ordered stills from one completed capture run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    stills: Vec<String>,
}

impl Session {
    pub fn new(stills: Vec<String>) -> Self {
        Self { stills }
    }

    pub fn stills(&self) -> &[String] {
        &self.stills
    }

    pub fn len(&self) -> usize {
        self.stills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stills.is_empty()
    }

    /// Hex SHA-256 over the stills, stable across restarts.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for still in &self.stills {
            hasher.update((still.len() as u64).to_le_bytes());
            hasher.update(still.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// All sessions in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gallery {
    sessions: Vec<Arc<Session>>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, session: Arc<Session>) {
        self.sessions.push(session);
    }

    pub fn sessions(&self) -> &[Arc<Session>] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions newest first, paired with their capture index.
    pub fn most_recent_first(&self) -> impl Iterator<Item = (usize, &Arc<Session>)> {
        self.sessions.iter().enumerate().rev()
    }
}

impl From<Vec<Session>> for Gallery {
    fn from(sessions: Vec<Session>) -> Self {
        Self {
            sessions: sessions.into_iter().map(Arc::new).collect(),
        }
    }
}

/// The persisted gallery. Rehydrated once at startup, written back after
/// every append.
pub struct GalleryStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    gallery: Gallery,
    updates: broadcast::Sender<GalleryUpdated>,
}

impl GalleryStore {
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let gallery = cache::load(store.as_ref(), &key, Gallery::new());
        log::info!("Loaded {} sessions from '{}'", gallery.len(), key);
        let (updates, _) = broadcast::channel(16);
        Self {
            store,
            key,
            gallery,
            updates,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryUpdated> {
        self.updates.subscribe()
    }

    /// Append a session and persist the whole gallery.
    ///
    /// The in-memory gallery keeps the session even if the write fails.
    pub fn append(&mut self, session: Session) -> Result<Arc<Session>, GifawayError> {
        let session = Arc::new(session);
        self.gallery.push(Arc::clone(&session));
        let saved = cache::save(self.store.as_ref(), &self.key, &self.gallery);
        if let Err(e) = &saved {
            log::error!("Failed to persist gallery under '{}': {}", self.key, e);
        }

        let event = GalleryUpdated::new(self.gallery.len(), session.len());
        log::debug!("{}: {} sessions", event.name(), event.sessions);
        // No subscribers is fine.
        let _ = self.updates.send(event);

        saved.map(|_| session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::kv::MemoryStore;

    fn session(stills: &[&str]) -> Session {
        Session::new(stills.iter().map(|s| s.to_string()).collect())
    }

    fn round_trip(gallery: &Gallery) -> Gallery {
        let store = MemoryStore::default();
        cache::save(&store, DEFAULT_STORAGE_KEY, gallery).unwrap();
        cache::load(&store, DEFAULT_STORAGE_KEY, Gallery::from(vec![session(&["sentinel"])]))
    }

    #[test]
    fn persistence_round_trips() {
        let empty = Gallery::new();
        assert_eq!(round_trip(&empty), empty);

        let single = Gallery::from(vec![session(&["a", "b", "c"])]);
        assert_eq!(round_trip(&single), single);

        let multi = Gallery::from(vec![session(&[]), session(&["x"]), session(&[])]);
        assert_eq!(round_trip(&multi), multi);
    }

    #[test]
    fn persisted_shape_is_nested_string_arrays() {
        let gallery = Gallery::from(vec![session(&["a"]), session(&[])]);
        assert_eq!(serde_json::to_string(&gallery).unwrap(), r#"[["a"],[]]"#);
    }

    #[test]
    fn append_persists_every_time() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let mut gallery = GalleryStore::load(store.clone(), DEFAULT_STORAGE_KEY);
        assert!(gallery.gallery().is_empty());

        gallery.append(session(&["a"])).unwrap();
        assert_eq!(
            store.get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"[["a"]]"#)
        );
        gallery.append(session(&["b", "c"])).unwrap();

        let reloaded = GalleryStore::load(store, DEFAULT_STORAGE_KEY);
        assert_eq!(reloaded.gallery(), gallery.gallery());
    }

    #[test]
    fn corrupted_storage_starts_empty() {
        let store = Arc::new(MemoryStore::default());
        store.set(DEFAULT_STORAGE_KEY, "[[\"truncated").unwrap();
        let gallery = GalleryStore::load(store, DEFAULT_STORAGE_KEY);
        assert!(gallery.gallery().is_empty());
    }

    #[test]
    fn most_recent_first_order() {
        let mut gallery = Gallery::from(vec![session(&["A"]), session(&["B"])]);
        gallery.push(Arc::new(session(&["S"])));

        let order: Vec<(usize, &str)> = gallery
            .most_recent_first()
            .map(|(i, s)| (i, s.stills()[0].as_str()))
            .collect();
        assert_eq!(order, vec![(2, "S"), (1, "B"), (0, "A")]);
    }

    #[test]
    fn subscribers_hear_appends() {
        let mut gallery = GalleryStore::load(Arc::new(MemoryStore::default()), "k");
        let mut rx = gallery.subscribe();

        gallery.append(session(&["a", "b"])).unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.sessions, 1);
        assert_eq!(event.appended_frames, 2);
    }

    #[test]
    fn digest_depends_on_content_and_order() {
        let ab = session(&["a", "b"]);
        assert_eq!(ab.digest(), session(&["a", "b"]).digest());
        assert_ne!(ab.digest(), session(&["b", "a"]).digest());
        assert_ne!(session(&["ab"]).digest(), ab.digest());
        assert_eq!(ab.digest().len(), 64);
    }
}
