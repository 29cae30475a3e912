//! Content catalog
//!
//! Immutable topic → section → item tree with an id index built once at
//! construction.

pub mod route;
pub mod types;

pub use route::{is_founding_document, Route};
pub use types::{Item, ItemRef, Section, Topic};

use crate::error::{CivicsError, Result};
use std::collections::HashMap;

/// Catalog shipped with the crate
const BUNDLED_CATALOG: &str = include_str!("catalog.json");

/// Position of an item in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemLocation {
    topic: usize,
    section: usize,
    item: usize,
}

/// Read-only content tree with O(1) lookup by item id
#[derive(Debug, Clone)]
pub struct Catalog {
    topics: Vec<Topic>,
    index: HashMap<String, ItemLocation>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate item ids
    pub fn new(topics: Vec<Topic>) -> Result<Self> {
        let mut index = HashMap::new();

        for (t, topic) in topics.iter().enumerate() {
            for (s, section) in topic.sections.iter().enumerate() {
                for (i, item) in section.items.iter().enumerate() {
                    let location = ItemLocation {
                        topic: t,
                        section: s,
                        item: i,
                    };
                    if index.insert(item.id.clone(), location).is_some() {
                        return Err(CivicsError::Catalog(format!(
                            "Duplicate item id '{}' in section '{}'",
                            item.id, section.id
                        )));
                    }
                }
            }
        }

        Ok(Self { topics, index })
    }

    /// Parse a catalog from its JSON form (an array of topics)
    pub fn from_json(json: &str) -> Result<Self> {
        let topics: Vec<Topic> = serde_json::from_str(json)
            .map_err(|e| CivicsError::Catalog(format!("Failed to parse catalog: {}", e)))?;
        Self::new(topics)
    }

    /// The catalog bundled with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Look up an item by id
    pub fn find(&self, id: &str) -> Option<ItemRef<'_>> {
        let loc = self.index.get(id)?;
        let topic = &self.topics[loc.topic];
        let section = &topic.sections[loc.section];
        Some(ItemRef {
            item: &section.items[loc.item],
            section,
            topic,
        })
    }

    /// Check whether an item id exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All topics in catalog order
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Iterate over every item in catalog order
    pub fn items(&self) -> impl Iterator<Item = ItemRef<'_>> {
        self.topics.iter().flat_map(|topic| {
            topic.sections.iter().flat_map(move |section| {
                section.items.iter().map(move |item| ItemRef {
                    item,
                    section,
                    topic,
                })
            })
        })
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
