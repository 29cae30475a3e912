//! Content tree types

use serde::{Deserialize, Serialize};

/// Top-level topic (e.g. "Foundations")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Group of related items within a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A readable content item, addressed by a stable id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// An item together with the titles of its enclosing section and topic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemRef<'a> {
    pub item: &'a Item,
    pub section: &'a Section,
    pub topic: &'a Topic,
}

impl ItemRef<'_> {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn title(&self) -> &str {
        &self.item.title
    }

    pub fn section_title(&self) -> &str {
        &self.section.title
    }

    pub fn topic_title(&self) -> &str {
        &self.topic.title
    }
}
