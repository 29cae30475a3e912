//! Favorites management
//!
//! The set of favorited content-item ids, kept in insertion order and
//! persisted as a JSON array after every change.

use crate::config::keys;
use crate::data::persist::PersistHandle;
use crate::data::prefs::{Preference, PreferenceStore};
use crate::data::storage::KeyValueStore;
use crate::error::{CivicsError, Result};
use std::collections::HashSet;

/// Favorited ids, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteIds(Vec<String>);

impl FavoriteIds {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|f| f == id)
    }
}

impl Preference for FavoriteIds {
    const KEY: &'static str = keys::FAVORITES;

    fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.0).map_err(|e| CivicsError::malformed(Self::KEY, e))
    }

    fn decode(raw: &str) -> Result<Self> {
        let ids: Vec<String> =
            serde_json::from_str(raw).map_err(|e| CivicsError::malformed(Self::KEY, e))?;

        // Older writers appended without checking; keep the first occurrence
        let mut seen = HashSet::new();
        Ok(FavoriteIds(
            ids.into_iter().filter(|id| seen.insert(id.clone())).collect(),
        ))
    }
}

/// Manages favorites in memory and mirrors them to storage
#[derive(Debug)]
pub struct FavoritesStore {
    inner: PreferenceStore<FavoriteIds>,
}

impl FavoritesStore {
    /// Load favorites; corrupt or missing data yields an empty set
    pub fn load(store: &dyn KeyValueStore, persist: PersistHandle) -> Self {
        Self {
            inner: PreferenceStore::load(store, persist),
        }
    }

    /// Add a favorite. Returns false (and writes nothing) if already present.
    pub fn add(&mut self, id: &str) -> Result<bool> {
        self.inner.update(|ids| {
            if ids.contains(id) {
                return false;
            }
            ids.0.push(id.to_string());
            true
        })
    }

    /// Remove a favorite. Returns false if it was not present.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        self.inner.update(|ids| {
            let before = ids.0.len();
            ids.0.retain(|f| f != id);
            ids.0.len() != before
        })
    }

    /// Toggle favorite status with a single write.
    /// Returns true if the id is a favorite afterwards.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let mut now_favorite = false;
        self.inner.update(|ids| {
            if ids.contains(id) {
                ids.0.retain(|f| f != id);
            } else {
                ids.0.push(id.to_string());
                now_favorite = true;
            }
            true
        })?;
        Ok(now_favorite)
    }

    /// Check if an id is favorited
    pub fn is_favorite(&self, id: &str) -> bool {
        self.inner.get().contains(id)
    }

    /// All favorited ids in insertion order
    pub fn ids(&self) -> &[String] {
        self.inner.get().as_slice()
    }

    /// Get number of favorites
    pub fn count(&self) -> usize {
        self.ids().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }

    /// Remove every favorite and delete the stored key
    pub fn clear_all(&mut self) -> Result<()> {
        self.inner.reset()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::data::persist::Persister;
    use crate::data::storage::MemoryStore;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    enum Action {
        Add(String),
        Remove(String),
        Toggle(String),
    }

    fn arb_id() -> impl Strategy<Value = String> {
        "[a-h]"
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            arb_id().prop_map(Action::Add),
            arb_id().prop_map(Action::Remove),
            arb_id().prop_map(Action::Toggle),
        ]
    }

    fn load(store: &Arc<MemoryStore>, persister: &Persister) -> FavoritesStore {
        FavoritesStore::load(store.as_ref(), persister.handle())
    }

    proptest! {
        /// Property: favorites never repeat an id and match a set model
        #[test]
        fn prop_no_duplicates(actions in prop::collection::vec(arb_action(), 0..50)) {
            let store = Arc::new(MemoryStore::new());
            let persister = Persister::inline(store.clone());
            let mut favorites = load(&store, &persister);
            let mut model = HashSet::new();

            for action in &actions {
                match action {
                    Action::Add(id) => {
                        prop_assert_eq!(favorites.add(id).unwrap(), model.insert(id.clone()));
                    }
                    Action::Remove(id) => {
                        prop_assert_eq!(favorites.remove(id).unwrap(), model.remove(id));
                    }
                    Action::Toggle(id) => {
                        let on = favorites.toggle(id).unwrap();
                        if on {
                            model.insert(id.clone());
                        } else {
                            model.remove(id);
                        }
                        prop_assert_eq!(on, model.contains(id));
                    }
                }

                let distinct: HashSet<_> = favorites.ids().iter().cloned().collect();
                prop_assert_eq!(distinct.len(), favorites.count());
                prop_assert_eq!(&distinct, &model);
            }

            let reloaded = load(&store, &persister);
            prop_assert_eq!(reloaded.ids(), favorites.ids());
        }

        /// Property: toggling the same id twice restores membership
        #[test]
        fn prop_toggle_twice_restores(
            initial in prop::collection::vec(arb_id(), 0..8),
            id in arb_id(),
        ) {
            let store = Arc::new(MemoryStore::new());
            let persister = Persister::inline(store.clone());
            let mut favorites = load(&store, &persister);
            for f in &initial {
                favorites.add(f).unwrap();
            }
            let before: HashSet<_> = favorites.ids().iter().cloned().collect();

            let first = favorites.toggle(&id).unwrap();
            let second = favorites.toggle(&id).unwrap();

            prop_assert_ne!(first, second);
            let after: HashSet<_> = favorites.ids().iter().cloned().collect();
            prop_assert_eq!(after, before);
            prop_assert_eq!(favorites.count(), favorites.ids().len());
        }
    }
}
