//! Civics: reading state for a civic-education reader
//!
//! Persisted theme and text-size preferences, favorites and reading
//! history over a pluggable key-value store, plus the bundled content
//! catalog.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use civics::catalog::Catalog;
//! use civics::data::FileStore;
//! use civics::Library;
//!
//! let store = Arc::new(FileStore::open_default()?);
//! let mut library = Library::open(store, Catalog::bundled()?)?;
//! let route = library.open_item("constitution")?;
//! println!("{route}");
//! # Ok::<(), civics::error::CivicsError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod library;

pub use library::{Library, WriteMode};
