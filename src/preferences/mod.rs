//! Preference Store
//!
//! Favorite locations and assets, persisted as one JSON document.

pub mod storage;

pub use storage::{FileStore, KeyValueStore, MemoryStore};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::error::{Error, Result};

pub const PREFERENCES_KEY: &str = "user_preferences";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Location,
    Asset,
}

/// Persisted shape: `{"favoriteCities":[..],"favoriteCryptos":[..]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSet {
    #[serde(rename = "favoriteCities", default)]
    pub locations: Vec<String>,
    #[serde(rename = "favoriteCryptos", default)]
    pub assets: Vec<String>,
}

impl FavoriteSet {
    fn list(&self, kind: FavoriteKind) -> &Vec<String> {
        match kind {
            FavoriteKind::Location => &self.locations,
            FavoriteKind::Asset => &self.assets,
        }
    }

    fn list_mut(&mut self, kind: FavoriteKind) -> &mut Vec<String> {
        match kind {
            FavoriteKind::Location => &mut self.locations,
            FavoriteKind::Asset => &mut self.assets,
        }
    }
}

pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    favorites: RwLock<FavoriteSet>,
}

impl PreferenceStore {
    /// Read the saved set once. Missing or unreadable state starts empty.
    pub fn load(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let favorites = match read_favorites(storage.as_ref(), &key) {
            Ok(Some(set)) => set,
            Ok(None) => {
                tracing::debug!(key = %key, "No saved preferences, starting empty");
                FavoriteSet::default()
            }
            Err(e) => {
                tracing::warn!(key = %key, "Ignoring saved preferences: {}", e);
                FavoriteSet::default()
            }
        };

        PreferenceStore {
            storage,
            key,
            favorites: RwLock::new(favorites),
        }
    }

    /// Add `id` if absent, remove it if present, then persist the whole set.
    /// The write happens under the same lock as the change, so saved state
    /// follows toggles in order. Returns whether `id` is a favorite afterwards.
    pub fn toggle(&self, kind: FavoriteKind, id: &str) -> bool {
        let mut favorites = self.favorites.write();
        let list = favorites.list_mut(kind);
        let now_favorite = match list.iter().position(|f| f == id) {
            Some(index) => {
                list.remove(index);
                false
            }
            None => {
                list.push(id.to_string());
                true
            }
        };

        if let Err(e) = self.persist(&favorites) {
            tracing::warn!(key = %self.key, "Failed to save preferences: {}", e);
        }
        now_favorite
    }

    pub fn is_favorite(&self, kind: FavoriteKind, id: &str) -> bool {
        self.favorites.read().list(kind).iter().any(|f| f == id)
    }

    /// Favorites of one kind, in the order they were added.
    pub fn favorites(&self, kind: FavoriteKind) -> Vec<String> {
        self.favorites.read().list(kind).clone()
    }

    pub fn snapshot(&self) -> FavoriteSet {
        self.favorites.read().clone()
    }

    fn persist(&self, favorites: &FavoriteSet) -> Result<()> {
        let json = serde_json::to_string(favorites)
            .map_err(|e| Error::SerializationError(e.to_string()))?;
        self.storage.put(&self.key, &json)
    }
}

fn read_favorites(storage: &dyn KeyValueStore, key: &str) -> Result<Option<FavoriteSet>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| Error::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::storage::MockKeyValueStore;

    #[test]
    fn toggling_twice_restores_membership_with_two_writes() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get()
            .withf(|key| key == PREFERENCES_KEY)
            .times(1)
            .returning(|_| Ok(None));
        mock.expect_put()
            .withf(|key, _| key == PREFERENCES_KEY)
            .times(2)
            .returning(|_, _| Ok(()));

        let prefs = PreferenceStore::load(Arc::new(mock), PREFERENCES_KEY);
        assert!(prefs.toggle(FavoriteKind::Asset, "bitcoin"));
        assert!(prefs.is_favorite(FavoriteKind::Asset, "bitcoin"));
        assert!(!prefs.toggle(FavoriteKind::Asset, "bitcoin"));
        assert!(!prefs.is_favorite(FavoriteKind::Asset, "bitcoin"));
    }

    #[test]
    fn corrupt_state_falls_back_to_empty() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get().returning(|_| Ok(Some("{not json".to_string())));

        let prefs = PreferenceStore::load(Arc::new(mock), PREFERENCES_KEY);
        assert_eq!(prefs.snapshot(), FavoriteSet::default());
    }

    #[test]
    fn write_failure_still_updates_memory() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get().returning(|_| Ok(None));
        mock.expect_put()
            .times(1)
            .returning(|_, _| Err(Error::Storage("disk full".to_string())));

        let prefs = PreferenceStore::load(Arc::new(mock), PREFERENCES_KEY);
        assert!(prefs.toggle(FavoriteKind::Location, "London"));
        assert!(prefs.is_favorite(FavoriteKind::Location, "London"));
    }

    /// Sleeps inside the first `put` so a second toggle lands mid-write.
    struct SlowFirstWrite {
        inner: MemoryStore,
        delayed: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for SlowFirstWrite {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> Result<()> {
            if !self.delayed.swap(true, std::sync::atomic::Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(200));
            }
            self.inner.put(key, value)
        }
    }

    #[test]
    fn concurrent_toggles_persist_in_order() {
        let storage = Arc::new(SlowFirstWrite {
            inner: MemoryStore::new(),
            delayed: std::sync::atomic::AtomicBool::new(false),
        });
        let prefs = Arc::new(PreferenceStore::load(storage.clone(), PREFERENCES_KEY));

        let first = {
            let prefs = prefs.clone();
            std::thread::spawn(move || prefs.toggle(FavoriteKind::Asset, "bitcoin"))
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        let second = {
            let prefs = prefs.clone();
            std::thread::spawn(move || prefs.toggle(FavoriteKind::Asset, "solana"))
        };
        assert!(first.join().unwrap());
        assert!(second.join().unwrap());

        let reloaded = PreferenceStore::load(storage, PREFERENCES_KEY);
        assert_eq!(reloaded.favorites(FavoriteKind::Asset), prefs.favorites(FavoriteKind::Asset));
        assert_eq!(reloaded.favorites(FavoriteKind::Asset), vec!["bitcoin", "solana"]);
    }

    #[test]
    fn saved_document_uses_stored_field_names() {
        let storage = Arc::new(MemoryStore::new());
        let prefs = PreferenceStore::load(storage.clone(), PREFERENCES_KEY);
        prefs.toggle(FavoriteKind::Location, "Tokyo");
        prefs.toggle(FavoriteKind::Asset, "solana");

        let raw = storage.get(PREFERENCES_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"favoriteCities":["Tokyo"],"favoriteCryptos":["solana"]}"#);

        let reloaded = PreferenceStore::load(storage, PREFERENCES_KEY);
        assert_eq!(reloaded.favorites(FavoriteKind::Location), vec!["Tokyo"]);
        assert!(reloaded.is_favorite(FavoriteKind::Asset, "solana"));
    }
}
