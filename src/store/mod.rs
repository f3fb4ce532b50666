//! Process-wide shared key/value memory.
//!
//! The one piece of state visible across sessions. Constructed once at
//! startup and passed as `Arc<MemoryStore>` into every protocol handler,
//! so lifetime and sharing are explicit at each call site.

use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory string map: no eviction, no size bound, no persistence.
/// `put` is last-write-wins; a `get` after a `put` observes it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, overwriting any previous entry.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.into(), value.into());
    }

    /// Fetch the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn put_then_get() {
        let store = MemoryStore::new();
        store.put("a", "1");
        assert_eq!(store.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn overwrite_is_last_write_wins() {
        let store = MemoryStore::new();
        store.put("k", "old");
        store.put("k", "new");
        assert_eq!(store.get("k").as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn visible_across_threads() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.put("shared", i.to_string()))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // Exactly one of the written values survived.
        let v: usize = store.get("shared").unwrap().parse().unwrap();
        assert!(v < 8);
        assert_eq!(store.len(), 1);
    }
}
