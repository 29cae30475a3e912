//! Data persistence
//!
//! Storage backends, the background writer, and the persisted stores for
//! preferences, favorites and reading history.

pub mod favorites;
pub mod history;
pub mod persist;
pub mod prefs;
pub mod settings;
pub mod storage;
pub mod types;

// Re-export common types
pub use favorites::FavoritesStore;
pub use history::HistoryStore;
pub use persist::{PersistFailure, PersistHandle, PersistOp, Persister};
pub use prefs::{Preference, PreferenceStore};
pub use settings::{TextSize, Theme};
pub use storage::{data_dir, FileStore, KeyValueStore, MemoryStore};
pub use types::HistoryEntry;
