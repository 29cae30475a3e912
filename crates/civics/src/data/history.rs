//! Reading history
//!
//! Recently viewed items, most recent first, at most one entry per id and
//! bounded in length. A separate last-read pointer caches the head of the
//! list; both are persisted under their own keys.
//!
//! The two keys are written independently. A stored pointer that disagrees
//! with the list head is repaired from the head on the next load. An absent
//! pointer stays absent, since removing the last-read entry clears it on
//! purpose.

use crate::config::history::MAX_RECENT_ITEMS;
use crate::config::keys;
use crate::data::persist::PersistHandle;
use crate::data::prefs::{self, Preference, PreferenceStore};
use crate::data::storage::KeyValueStore;
use crate::data::types::HistoryEntry;
use crate::error::{CivicsError, Result};
use std::collections::HashSet;
use tracing::debug;

/// Recently viewed entries, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentList(Vec<HistoryEntry>);

impl Preference for RecentList {
    const KEY: &'static str = keys::RECENTLY_VIEWED;

    fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.0).map_err(|e| CivicsError::malformed(Self::KEY, e))
    }

    fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map(RecentList)
            .map_err(|e| CivicsError::malformed(Self::KEY, e))
    }
}

/// The most recently visited entry, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastRead(Option<HistoryEntry>);

impl Preference for LastRead {
    const KEY: &'static str = keys::LAST_READ;

    fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.0).map_err(|e| CivicsError::malformed(Self::KEY, e))
    }

    fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str::<HistoryEntry>(raw)
            .map(|entry| LastRead(Some(entry)))
            .map_err(|e| CivicsError::malformed(Self::KEY, e))
    }

    fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

/// Bounded, ordered, de-duplicated reading history
#[derive(Debug)]
pub struct HistoryStore {
    recent: PreferenceStore<RecentList>,
    last_read: PreferenceStore<LastRead>,
    capacity: usize,
}

impl HistoryStore {
    /// Load history with the default capacity
    pub fn load(store: &dyn KeyValueStore, persist: PersistHandle) -> Self {
        Self::load_with_capacity(store, persist, MAX_RECENT_ITEMS)
    }

    /// Load history keeping at most `capacity` entries (minimum 1)
    pub fn load_with_capacity(
        store: &dyn KeyValueStore,
        persist: PersistHandle,
        capacity: usize,
    ) -> Self {
        let capacity = capacity.max(1);
        let RecentList(mut entries) = prefs::read::<RecentList>(store);
        let LastRead(mut last) = prefs::read::<LastRead>(store);

        let mut seen = HashSet::new();
        entries.retain(|e| seen.insert(e.id.clone()));
        entries.truncate(capacity);

        // A stored pointer must mirror the list head
        if let Some(pointer) = &last {
            if entries.first().map(|e| &e.id) != Some(&pointer.id) {
                debug!(id = %pointer.id, "last-read pointer out of step with history, repairing");
                last = entries.first().cloned();
            }
        }

        Self {
            recent: PreferenceStore::with_value(RecentList(entries), persist.clone()),
            last_read: PreferenceStore::with_value(LastRead(last), persist),
            capacity,
        }
    }

    /// Record a visit: the entry moves (or is inserted) at the front with a
    /// fresh timestamp and becomes the last-read item.
    pub fn record_visit(&mut self, id: &str, title: &str, section: &str) -> Result<HistoryEntry> {
        let entry = HistoryEntry::new(id, title, section);
        let capacity = self.capacity;

        let list_result = self.recent.update(|RecentList(entries)| {
            entries.retain(|e| e.id != entry.id);
            entries.insert(0, entry.clone());
            entries.truncate(capacity);
            true
        });
        let pointer_result = self.last_read.set(LastRead(Some(entry.clone())));

        list_result?;
        pointer_result?;
        Ok(entry)
    }

    /// Remove the entry for `id`, clearing the pointer if it referred to it.
    /// Returns false if there was no such entry.
    pub fn remove_entry(&mut self, id: &str) -> Result<bool> {
        let list_result = self.recent.update(|RecentList(entries)| {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            entries.len() != before
        });

        let points_at_id = self.last_read().is_some_and(|e| e.id == id);
        let pointer_result = if points_at_id {
            self.last_read.set(LastRead(None))
        } else {
            Ok(())
        };

        let removed = list_result?;
        pointer_result?;
        Ok(removed || points_at_id)
    }

    /// Empty the history and clear the pointer; both keys are deleted
    pub fn clear_all(&mut self) -> Result<()> {
        let list_result = self.recent.reset();
        let pointer_result = self.last_read.reset();
        list_result?;
        pointer_result
    }

    /// Recent entries, most recent first
    pub fn recent(&self) -> &[HistoryEntry] {
        &self.recent.get().0
    }

    /// Most recently visited entry
    pub fn last_read(&self) -> Option<&HistoryEntry> {
        self.last_read.get().0.as_ref()
    }

    /// Maximum number of entries kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.recent().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::persist::Persister;
    use crate::data::storage::MemoryStore;
    use std::sync::Arc;

    fn setup(values: &[(&str, &str)]) -> (Arc<MemoryStore>, Persister) {
        let store = Arc::new(MemoryStore::with_values(values.iter().copied()));
        let persister = Persister::inline(store.clone());
        (store, persister)
    }

    fn empty_history() -> (Arc<MemoryStore>, Persister, HistoryStore) {
        let (store, persister) = setup(&[]);
        let history = HistoryStore::load(store.as_ref(), persister.handle());
        (store, persister, history)
    }

    fn ids(history: &HistoryStore) -> Vec<&str> {
        history.recent().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_default_capacity() {
        let (_store, _persister, history) = empty_history();
        assert_eq!(history.capacity(), 10);
        assert!(history.is_empty());
        assert!(history.last_read().is_none());
    }

    #[test]
    fn test_twelve_visits_evict_oldest() {
        let (_store, _persister, mut history) = empty_history();

        for i in 1..=12 {
            history.record_visit(&i.to_string(), "Title", "Section").unwrap();
        }

        assert_eq!(history.len(), 10);
        assert_eq!(
            ids(&history),
            ["12", "11", "10", "9", "8", "7", "6", "5", "4", "3"]
        );
    }

    #[test]
    fn test_revisit_moves_to_front_without_growing() {
        let (_store, _persister, mut history) = empty_history();
        history.record_visit("democracy", "Democracy", "Principles").unwrap();
        history.record_visit("federalism", "Federalism", "Principles").unwrap();
        let first = history.recent()[1].timestamp;

        std::thread::sleep(std::time::Duration::from_millis(2));
        let entry = history.record_visit("democracy", "Democracy", "Principles").unwrap();

        assert_eq!(ids(&history), ["democracy", "federalism"]);
        assert_eq!(history.recent()[0], entry);
        assert!(entry.timestamp > first);
    }

    #[test]
    fn test_repeated_visits_same_id() {
        let (_store, _persister, mut history) = empty_history();
        for _ in 0..25 {
            history.record_visit("flag", "United States Flag", "National Symbols").unwrap();
        }
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_invariants_hold_over_mixed_visits() {
        let (_store, _persister, mut history) = empty_history();
        let pattern = ["a", "b", "c", "a", "d", "e", "f", "b", "g", "h", "i", "j", "k", "a", "l", "c"];

        for id in pattern {
            let entry = history.record_visit(id, id, "s").unwrap();

            assert!(history.len() <= history.capacity());
            let unique: HashSet<_> = history.recent().iter().map(|e| &e.id).collect();
            assert_eq!(unique.len(), history.len());
            assert_eq!(history.last_read(), Some(&entry));
            assert_eq!(history.last_read(), history.recent().first());
        }
    }

    #[test]
    fn test_remove_last_read_clears_pointer() {
        let (store, _persister, mut history) = empty_history();
        history.record_visit("judicial", "Judicial Branch", "Branches").unwrap();
        history.record_visit("executive", "Executive Branch", "Branches").unwrap();

        assert!(history.remove_entry("executive").unwrap());

        assert!(history.last_read().is_none());
        assert_eq!(ids(&history), ["judicial"]);
        assert!(!store.contains("app_last_read_item"));
    }

    #[test]
    fn test_remove_other_entry_keeps_pointer() {
        let (_store, _persister, mut history) = empty_history();
        history.record_visit("judicial", "Judicial Branch", "Branches").unwrap();
        history.record_visit("executive", "Executive Branch", "Branches").unwrap();

        assert!(history.remove_entry("judicial").unwrap());
        assert_eq!(history.last_read().map(|e| e.id.as_str()), Some("executive"));
        assert!(!history.remove_entry("judicial").unwrap());
    }

    #[test]
    fn test_clear_all() {
        let (store, _persister, mut history) = empty_history();
        history.record_visit("anthem", "National Anthem", "National Hymns").unwrap();

        history.clear_all().unwrap();

        assert!(history.is_empty());
        assert!(history.last_read().is_none());
        assert!(!store.contains("app_recently_viewed"));
        assert!(!store.contains("app_last_read_item"));
    }

    #[test]
    fn test_reload_roundtrip() {
        let (store, persister, mut history) = empty_history();
        history.record_visit("flag", "United States Flag", "National Symbols").unwrap();
        history.record_visit("eagle", "Bald Eagle", "National Symbols").unwrap();

        let reloaded = HistoryStore::load(store.as_ref(), persister.handle());
        assert_eq!(reloaded.recent(), history.recent());
        assert_eq!(reloaded.last_read(), history.last_read());
    }

    #[test]
    fn test_corrupt_values_load_empty() {
        let (store, persister) = setup(&[
            ("app_recently_viewed", "[{\"id\":"),
            ("app_last_read_item", "null"),
        ]);
        let history = HistoryStore::load(store.as_ref(), persister.handle());
        assert!(history.is_empty());
        assert!(history.last_read().is_none());
    }

    #[test]
    fn test_load_repairs_stale_pointer() {
        let list = r#"[{"id":"b","title":"B","section":"S","timestamp":2},{"id":"a","title":"A","section":"S","timestamp":1}]"#;
        let pointer = r#"{"id":"a","title":"A","section":"S","timestamp":1}"#;
        let (store, persister) = setup(&[("app_recently_viewed", list), ("app_last_read_item", pointer)]);

        let history = HistoryStore::load(store.as_ref(), persister.handle());
        assert_eq!(history.last_read().map(|e| e.id.as_str()), Some("b"));
    }

    #[test]
    fn test_load_drops_pointer_without_list() {
        let pointer = r#"{"id":"a","title":"A","section":"S","timestamp":1}"#;
        let (store, persister) = setup(&[("app_last_read_item", pointer)]);

        let history = HistoryStore::load(store.as_ref(), persister.handle());
        assert!(history.last_read().is_none());
    }

    #[test]
    fn test_load_dedups_and_truncates() {
        let entries: Vec<_> = ["a", "b", "a", "c", "d", "e", "f"]
            .iter()
            .enumerate()
            .map(|(i, id)| HistoryEntry::at(*id, *id, "S", 100 - i as u64))
            .collect();
        let raw = serde_json::to_string(&entries).unwrap();
        let (store, persister) = setup(&[("app_recently_viewed", raw.as_str())]);

        let history = HistoryStore::load_with_capacity(store.as_ref(), persister.handle(), 5);
        assert_eq!(ids(&history), ["a", "b", "c", "d", "e"]);
        assert!(history.last_read().is_none());
    }

    #[test]
    fn test_cleared_pointer_survives_reload() {
        let (store, persister, mut history) = empty_history();
        history.record_visit("judicial", "Judicial Branch", "Branches").unwrap();
        history.record_visit("executive", "Executive Branch", "Branches").unwrap();
        history.remove_entry("executive").unwrap();
        assert!(history.last_read().is_none());

        let reloaded = HistoryStore::load(store.as_ref(), persister.handle());
        assert_eq!(ids(&reloaded), ["judicial"]);
        assert!(reloaded.last_read().is_none());
    }

    #[test]
    fn test_write_failure_keeps_memory() {
        let (store, _persister, mut history) = empty_history();
        store.fail_writes(true);

        assert!(history.record_visit("naturalization", "Naturalization", "Citizenship").is_err());
        assert_eq!(ids(&history), ["naturalization"]);
        assert_eq!(history.last_read().map(|e| e.id.as_str()), Some("naturalization"));
        assert!(!store.contains("app_recently_viewed"));
    }
}
