//! Key-value storage layer
//!
//! String-valued storage keyed by fixed names. `FileStore` keeps one file per
//! key in the data directory; `MemoryStore` is the in-process backend used by
//! tests and embedders without a filesystem.

use crate::config::app::NAME;
use crate::error::{CivicsError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Durable string key-value storage
///
/// All methods take `&self`; implementations use interior mutability so one
/// handle can be shared with the background writer.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; succeeds if the key was already absent
    fn remove(&self, key: &str) -> Result<()>;
}

/// Get the default data directory path
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(NAME))
        .ok_or_else(|| CivicsError::Config(
            "Could not determine data directory. HOME environment variable may not be set.".to_string()
        ))
}

// =============================================================================
// FileStore
// =============================================================================

/// Storage backed by one JSON file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store in the default data directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::with_dir(data_dir()?))
    }

    /// Open a store rooted at `dir` (created lazily on first write)
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the value files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        let content = match read_file(&path)? {
            Some(c) => c,
            None => return Ok(None),
        };

        // Empty file is treated as non-existent
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        create_dir_if_needed(&self.dir)?;
        write_file(&path, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        delete_at(&path)
    }
}

/// Keys become file names, so only a conservative character set is allowed
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CivicsError::Config(format!("Invalid storage key {:?}", key)))
    }
}

/// Create a directory if it doesn't exist, with proper error handling
fn create_dir_if_needed(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot create directory {:?}", path)
                }
                ErrorKind::NotFound => {
                    format!("Cannot create directory {:?}: parent path does not exist", path)
                }
                _ => {
                    format!("Failed to create directory {:?}: {}", path, e)
                }
            };
            Err(CivicsError::StorageWrite(msg))
        }
    }
}

fn read_file(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            ErrorKind::PermissionDenied => Err(CivicsError::StorageRead(format!(
                "Permission denied: cannot read {:?}",
                path
            ))),
            _ => Err(CivicsError::StorageRead(format!(
                "Failed to read {:?}: {}",
                path, e
            ))),
        },
    }
}

/// Write `content` to a sibling temp file, then rename it over `path`.
/// A crash mid-write leaves the old value in place.
fn write_file(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|e| write_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_error(path, e)
    })
}

fn write_error(path: &Path, e: std::io::Error) -> CivicsError {
    let msg = match e.kind() {
        ErrorKind::PermissionDenied => format!("Permission denied: cannot write to {:?}", path),
        ErrorKind::NotFound => {
            format!("Cannot write to {:?}: parent directory does not exist", path)
        }
        ErrorKind::ReadOnlyFilesystem => {
            format!("Cannot write to {:?}: filesystem is read-only", path)
        }
        ErrorKind::StorageFull => format!("Cannot write to {:?}: storage is full", path),
        _ => format!("Failed to write to {:?}: {}", path, e),
    };
    CivicsError::StorageWrite(msg)
}

fn delete_at(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(()), // Already gone, that's fine
            ErrorKind::PermissionDenied => Err(CivicsError::StorageWrite(format!(
                "Permission denied: cannot delete {:?}",
                path
            ))),
            _ => Err(CivicsError::StorageWrite(format!(
                "Failed to delete {:?}: {}",
                path, e
            ))),
        },
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory storage
///
/// Writes can be made to fail on demand to exercise the degraded paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.lock();
            for (k, v) in values {
                map.insert(k.into(), v.into());
            }
        }
        store
    }

    /// Make subsequent `set`/`remove` calls fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `get` calls fail (or succeed again)
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Raw value currently stored under `key`, bypassing failure injection
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Whether `key` currently has a value
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CivicsError::StorageRead(format!(
                "Simulated read failure for '{}'",
                key
            )));
        }
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CivicsError::StorageWrite(format!(
                "Simulated write failure for '{}'",
                key
            )));
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CivicsError::StorageWrite(format!(
                "Simulated delete failure for '{}'",
                key
            )));
        }
        self.lock().remove(key);
        Ok(())
    }
}
