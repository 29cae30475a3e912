//! Screen routing for content items

use crate::config::routes::FOUNDING_DOCUMENTS;
use std::fmt;

/// Screen an item opens in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Document reader, for the founding documents
    Document(String),
    /// Generic detail view
    Detail(String),
}

impl Route {
    /// Derive the route for an item id
    pub fn for_item(id: &str) -> Route {
        if is_founding_document(id) {
            Route::Document(id.to_string())
        } else {
            Route::Detail(id.to_string())
        }
    }

    /// Item id the route points at
    pub fn id(&self) -> &str {
        match self {
            Route::Document(id) | Route::Detail(id) => id,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Document(id) => write!(f, "/document/{}", id),
            Route::Detail(id) => write!(f, "/detail/{}", id),
        }
    }
}

/// Check whether `id` names one of the founding documents
pub fn is_founding_document(id: &str) -> bool {
    FOUNDING_DOCUMENTS.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_founding_documents_route_to_reader() {
        for id in ["declaration", "articles", "constitution", "bill-of-rights", "federalist-papers"] {
            let route = Route::for_item(id);
            assert_eq!(route, Route::Document(id.to_string()));
            assert_eq!(route.to_string(), format!("/document/{}", id));
        }
    }

    #[test]
    fn test_other_items_route_to_detail() {
        let route = Route::for_item("democracy");
        assert_eq!(route.to_string(), "/detail/democracy");
        assert_eq!(route.id(), "democracy");
    }

    #[test]
    fn test_unknown_id_still_routes() {
        assert_eq!(Route::for_item("no-such-item").to_string(), "/detail/no-such-item");
        assert!(!is_founding_document("Constitution"));
    }
}
