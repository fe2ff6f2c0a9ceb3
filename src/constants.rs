pub mod placeholder {

    pub const COVER_BASE: &str = "https://placehold.co/400x600/e2e8f0/475569";

    pub const DEMO_COVER: &str = "https://placehold.co/400x600/e2e8f0/475569?text=Demo+Book";
}

pub mod affiliate {

    pub const DEFAULT_TAG: &str = "busybibliophi-20";

    pub const LEGACY_TAG: &str = "bibliophileai-20";

    pub const MARKETPLACE_SEARCH_URL: &str = "https://amazon.com/s";
}

pub mod limits {

    pub const MAX_TOPIC_CHARS: usize = 200;

    pub const DEFAULT_ITEM_COUNT: usize = 6;

    pub const REFRESH_ITEM_COUNT: usize = 3;
}

pub mod intervals {
    use std::time::Duration;

    pub const GENERATION_DEADLINE: Duration = Duration::from_secs(30);

    pub const COVER_REFRESH_PAUSE: Duration = Duration::from_millis(200);
}

pub mod env {

    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    pub const GOOGLE_BOOKS_API_KEY: &str = "GOOGLE_BOOKS_API_KEY";

    pub const AMAZON_TAG: &str = "AMAZON_TAG";
}

/// Image link fields of a Google Books volume, largest first.
pub const IMAGE_PREFERENCE: &[&str] = &[
    "extraLarge",
    "large",
    "medium",
    "thumbnail",
    "smallThumbnail",
];

pub const GENERIC_GENERATION_ERROR: &str = "Failed to generate collection";

pub const TOPIC_REQUIRED: &str = "Topic is required";
