//! Configuration constants for civics

/// Application metadata
pub mod app {
    /// Application name (used for the data directory, etc.)
    pub const NAME: &str = "civics";
}

/// Storage keys, one per persisted value
pub mod keys {
    /// Theme preference (bare string)
    pub const THEME: &str = "app_theme_preference";

    /// Text size preference (bare string)
    pub const TEXT_SIZE: &str = "app_text_size_preference";

    /// Favorited item ids (JSON array of strings)
    pub const FAVORITES: &str = "favorites";

    /// Most recently visited item (JSON object)
    pub const LAST_READ: &str = "app_last_read_item";

    /// Recently viewed items, most recent first (JSON array)
    pub const RECENTLY_VIEWED: &str = "app_recently_viewed";
}

/// Reading history configuration
pub mod history {
    /// Maximum number of recently viewed items kept
    pub const MAX_RECENT_ITEMS: usize = 10;
}

/// Background persistence configuration
pub mod persist {
    /// Capacity of the failure channel; further failures are only logged when full
    pub const FAILURE_CHANNEL_CAPACITY: usize = 64;

    /// Name of the background writer thread
    pub const WRITER_THREAD_NAME: &str = "civics-persist";
}

/// Content routing
pub mod routes {
    /// Item ids that open in the document reader instead of the detail view
    pub const FOUNDING_DOCUMENTS: &[&str] = &[
        "declaration",
        "articles",
        "constitution",
        "bill-of-rights",
        "federalist-papers",
    ];
}
