//! Small browser-local persistence helpers.
//!
//! A [`PersistedSet`] is a set of strings stored as a single JSON array under
//! one key of a [`StorageBackend`]. It is meant for device-local guard state
//! (e.g. "things this browser already reacted to"), not for anything the
//! server is authoritative over: reads are lazy and cached, writes rewrite
//! the whole value, and a corrupt stored value is treated as empty rather
//! than an error.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageBackend;

use indexmap::IndexSet;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error("storage write failed: {0}")]
    WriteFailed(String),
}

/// A keyed string store. Implemented by browser `localStorage` on wasm and by
/// an in-memory map for tests and native builds.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<B: StorageBackend> StorageBackend for Rc<B> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// An insertion-ordered set of strings persisted as whole-value JSON.
pub struct PersistedSet<B> {
    backend: B,
    key: String,
    cache: RefCell<Option<IndexSet<String>>>,
}

impl<B: StorageBackend> PersistedSet<B> {
    /// The stored value is not read until the first membership query.
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            cache: RefCell::new(None),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.with_loaded(|set| set.contains(value))
    }

    /// Idempotent insert. Returns true if the value was newly added, in which
    /// case the whole set is rewritten to the backend.
    pub fn insert(&self, value: &str) -> bool {
        self.ensure_loaded();
        let mut cache = self.cache.borrow_mut();
        let set = cache.as_mut().expect("cache is loaded");
        if !set.insert(value.to_string()) {
            return false;
        }
        let serialized = serde_json::to_string(&set.iter().collect::<Vec<_>>())
            .expect("a set of strings always serializes");
        if let Err(e) = self.backend.write(&self.key, &serialized) {
            // The in-memory set stays ahead of storage; the guard still holds
            // for this page session.
            log::error!("failed to persist set {key}: {e}", key = self.key);
        }
        true
    }

    /// Current full membership, in insertion order.
    pub fn load_all(&self) -> Vec<String> {
        self.with_loaded(|set| set.iter().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.with_loaded(|set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_loaded<R>(&self, f: impl FnOnce(&IndexSet<String>) -> R) -> R {
        self.ensure_loaded();
        f(self.cache.borrow().as_ref().expect("cache is loaded"))
    }

    fn ensure_loaded(&self) {
        let mut cache = self.cache.borrow_mut();
        if cache.is_some() {
            return;
        }
        let set = match self.backend.read(&self.key) {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(values) => values.into_iter().collect(),
                Err(e) => {
                    log::error!(
                        "stored value under {key} is not a JSON string array, starting empty: {e}",
                        key = self.key
                    );
                    IndexSet::new()
                }
            },
            None => IndexSet::new(),
        };
        *cache = Some(set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let set = PersistedSet::new(MemoryBackend::new(), "liked");
        assert!(set.insert("a"));
        assert!(!set.insert("a"));
        assert_eq!(set.load_all(), vec!["a".to_string()]);
    }

    #[test]
    fn survives_a_new_instance_over_the_same_backend() {
        let backend = Rc::new(MemoryBackend::new());
        {
            let set = PersistedSet::new(backend.clone(), "liked");
            set.insert("t1");
            set.insert("t2");
        }
        let reloaded = PersistedSet::new(backend, "liked");
        assert!(reloaded.contains("t1"));
        assert_eq!(reloaded.load_all(), vec!["t1".to_string(), "t2".to_string()]);
    }

    #[test]
    fn preserves_insertion_order() {
        let set = PersistedSet::new(MemoryBackend::new(), "liked");
        for id in ["c", "a", "b"] {
            set.insert(id);
        }
        assert_eq!(set.load_all(), vec!["c", "a", "b"]);
    }

    #[test]
    fn corrupt_stored_value_starts_empty() {
        let backend = MemoryBackend::new();
        backend.write("liked", "{not json").unwrap();
        let set = PersistedSet::new(backend, "liked");
        assert!(set.is_empty());
        assert!(set.insert("t1"));
    }

    #[test]
    fn keys_are_independent() {
        let backend = Rc::new(MemoryBackend::new());
        let liked = PersistedSet::new(backend.clone(), "liked");
        let seen = PersistedSet::new(backend, "seen");
        liked.insert("x");
        assert!(!seen.contains("x"));
    }
}
