//! Generic persisted preference value
//!
//! A [`PreferenceStore`] holds one value loaded from storage at startup.
//! Updates change memory first and then hand the encoded value to the
//! persister, so the in-memory copy is always the user's latest intent even
//! when the durable write fails.

use crate::data::persist::PersistHandle;
use crate::data::storage::KeyValueStore;
use crate::error::Result;
use tracing::{debug, warn};

/// A value persisted under a fixed storage key
pub trait Preference: Default + Sized {
    /// Storage key
    const KEY: &'static str;

    /// Serialize for storage
    fn encode(&self) -> Result<String>;

    /// Parse a stored value
    fn decode(raw: &str) -> Result<Self>;

    /// Whether this value is stored as an absent key rather than encoded
    fn is_absent(&self) -> bool {
        false
    }
}

/// Read `T` from storage, falling back to the default on any failure
pub fn read<T: Preference>(store: &dyn KeyValueStore) -> T {
    let raw = match store.get(T::KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key = T::KEY, "no stored value, using default");
            return T::default();
        }
        Err(e) => {
            warn!(key = T::KEY, error = %e, "failed to read stored value, using default");
            return T::default();
        }
    };

    match T::decode(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key = T::KEY, error = %e, "discarding malformed stored value");
            T::default()
        }
    }
}

/// One loaded preference with optimistic, persisted updates
pub struct PreferenceStore<T: Preference> {
    value: T,
    persist: PersistHandle,
}

impl<T: Preference> PreferenceStore<T> {
    /// Load from storage. Never fails; missing or bad data yields the default.
    pub fn load(store: &dyn KeyValueStore, persist: PersistHandle) -> Self {
        Self::with_value(read(store), persist)
    }

    /// Wrap an already loaded value
    pub(crate) fn with_value(value: T, persist: PersistHandle) -> Self {
        Self { value, persist }
    }

    /// Current in-memory value
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and persist it.
    ///
    /// Memory is updated even when the write fails; the error is returned
    /// for the caller to log or retry.
    pub fn set(&mut self, value: T) -> Result<()> {
        self.value = value;
        self.persist_current()
    }

    /// Mutate the latest in-memory value in place.
    ///
    /// `f` returns whether it changed anything; only changes are persisted.
    /// Returns that flag.
    pub fn update<F>(&mut self, f: F) -> Result<bool>
    where
        F: FnOnce(&mut T) -> bool,
    {
        if !f(&mut self.value) {
            return Ok(false);
        }
        self.persist_current()?;
        Ok(true)
    }

    /// Reset to the default and delete the stored key
    pub fn reset(&mut self) -> Result<()> {
        self.value = T::default();
        self.persist.remove(T::KEY)
    }

    fn persist_current(&self) -> Result<()> {
        if self.value.is_absent() {
            return self.persist.remove(T::KEY);
        }
        let encoded = self.value.encode().inspect_err(|e| {
            warn!(key = T::KEY, error = %e, "failed to encode value, not persisted");
        })?;
        self.persist.set(T::KEY, encoded)
    }
}

impl<T: Preference + std::fmt::Debug> std::fmt::Debug for PreferenceStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("key", &T::KEY)
            .field("value", &self.value)
            .finish()
    }
}
