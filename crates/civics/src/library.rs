//! Application root
//!
//! `Library` owns every persisted store, the catalog and the background
//! writer. It is constructed once by the host and passed down by reference.

use crate::catalog::{Catalog, Route};
use crate::data::favorites::FavoritesStore;
use crate::data::history::HistoryStore;
use crate::data::persist::{PersistFailure, Persister};
use crate::data::prefs::PreferenceStore;
use crate::data::settings::{TextSize, Theme};
use crate::data::storage::KeyValueStore;
use crate::error::{CivicsError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// How durable writes are issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Writes run on a background thread
    #[default]
    Background,
    /// Writes run on the calling thread
    Inline,
}

/// Loaded reading state plus the content catalog
pub struct Library {
    catalog: Catalog,
    theme: PreferenceStore<Theme>,
    text_size: PreferenceStore<TextSize>,
    favorites: FavoritesStore,
    history: HistoryStore,
    // Dropped last so queued writes drain after the stores are gone
    persister: Persister,
}

impl Library {
    /// Load all state from `store` with background writes.
    ///
    /// Returns only after every value has been loaded, so nothing can observe
    /// a default that is about to be replaced.
    pub fn open(store: Arc<dyn KeyValueStore>, catalog: Catalog) -> Result<Self> {
        Self::open_with(store, catalog, WriteMode::Background)
    }

    /// Load all state from `store` with the given write mode
    pub fn open_with(store: Arc<dyn KeyValueStore>, catalog: Catalog, mode: WriteMode) -> Result<Self> {
        let persister = match mode {
            WriteMode::Background => Persister::spawn(store.clone())?,
            WriteMode::Inline => Persister::inline(store.clone()),
        };
        let handle = persister.handle();
        let store = store.as_ref();

        let library = Self {
            theme: PreferenceStore::load(store, handle.clone()),
            text_size: PreferenceStore::load(store, handle.clone()),
            favorites: FavoritesStore::load(store, handle.clone()),
            history: HistoryStore::load(store, handle),
            catalog,
            persister,
        };

        debug!(
            favorites = library.favorites.count(),
            history = library.history.len(),
            theme = %library.theme.get(),
            "library loaded"
        );
        Ok(library)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn theme(&self) -> Theme {
        *self.theme.get()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme.set(theme)
    }

    /// Flip light/dark and return the new theme
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let next = self.theme().toggled();
        self.theme.set(next)?;
        Ok(next)
    }

    pub fn text_size(&self) -> TextSize {
        *self.text_size.get()
    }

    pub fn set_text_size(&mut self, size: TextSize) -> Result<()> {
        self.text_size.set(size)
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Open a content item: record the visit and return where to show it.
    ///
    /// A failed history write is logged and does not prevent opening.
    pub fn open_item(&mut self, id: &str) -> Result<Route> {
        let found = self
            .catalog
            .find(id)
            .ok_or_else(|| CivicsError::NotFound(format!("No content item with id '{}'", id)))?;

        if let Err(e) = self
            .history
            .record_visit(found.id(), found.title(), found.section_title())
        {
            warn!(id, error = %e, "visit recorded in memory only");
        }

        Ok(Route::for_item(id))
    }

    /// Block until all issued writes have been applied
    pub fn flush(&self) {
        self.persister.flush();
    }

    /// Drain durable-write failures reported so far
    pub fn failures(&self) -> Vec<PersistFailure> {
        self.persister.failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::storage::MemoryStore;

    fn open_inline(store: &Arc<MemoryStore>) -> Library {
        Library::open_with(store.clone(), Catalog::bundled().unwrap(), WriteMode::Inline).unwrap()
    }

    #[test]
    fn test_fresh_library_defaults() {
        let store = Arc::new(MemoryStore::new());
        let library = open_inline(&store);

        assert_eq!(library.theme(), Theme::System);
        assert_eq!(library.text_size(), TextSize::Default);
        assert!(library.favorites().is_empty());
        assert!(library.history().is_empty());
    }

    #[test]
    fn test_open_item_records_visit_with_section() {
        let store = Arc::new(MemoryStore::new());
        let mut library = open_inline(&store);

        let route = library.open_item("federalism").unwrap();
        assert_eq!(route, Route::Detail("federalism".to_string()));

        let last = library.history().last_read().unwrap();
        assert_eq!(last.id, "federalism");
        assert_eq!(last.title, "Federalism");
        assert_eq!(last.section, "Principles and Ideologies");
    }

    #[test]
    fn test_open_founding_document() {
        let store = Arc::new(MemoryStore::new());
        let mut library = open_inline(&store);

        let route = library.open_item("constitution").unwrap();
        assert_eq!(route.to_string(), "/document/constitution");
    }

    #[test]
    fn test_open_unknown_item() {
        let store = Arc::new(MemoryStore::new());
        let mut library = open_inline(&store);

        let err = library.open_item("no-such-item").unwrap_err();
        assert!(matches!(err, CivicsError::NotFound(_)));
        assert!(library.history().is_empty());
    }

    #[test]
    fn test_open_item_survives_write_failure() {
        let store = Arc::new(MemoryStore::new());
        let mut library = open_inline(&store);
        store.fail_writes(true);

        assert!(library.open_item("judicial").is_ok());
        assert_eq!(library.history().len(), 1);
        assert_eq!(library.failures().len(), 2);
    }

    #[test]
    fn test_toggle_theme() {
        let store = Arc::new(MemoryStore::new());
        let mut library = open_inline(&store);

        assert_eq!(library.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(library.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(store.raw("app_theme_preference").as_deref(), Some("light"));
    }

    #[test]
    fn test_background_state_survives_reopen() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut library = Library::open(store.clone(), Catalog::bundled().unwrap()).unwrap();
            library.set_text_size(TextSize::Large).unwrap();
            library.favorites_mut().add("eagle").unwrap();
            library.open_item("flag").unwrap();
        }

        let library = open_inline(&store);
        assert_eq!(library.text_size(), TextSize::Large);
        assert!(library.favorites().is_favorite("eagle"));
        assert_eq!(library.history().last_read().map(|e| e.id.as_str()), Some("flag"));
    }
}
