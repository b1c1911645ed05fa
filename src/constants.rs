pub const UNKNOWN_TITLE: &str = "Unknown title";

pub mod sources {

    pub const SHIKIMORI_PRIORITY: u32 = 10;

    pub const JIKAN_PRIORITY: u32 = 20;

    pub const ANILIST_PRIORITY: u32 = 30;

    pub const UNKNOWN_PRIORITY: u32 = 999;

    pub const DEFAULT_SEARCH_SOURCES: &[&str] = &["jikan", "shikimori"];
}

pub mod limits {

    pub const DEFAULT_SEARCH_LIMIT: usize = 10;

    pub const MAX_SEARCH_LIMIT: usize = 50;

    pub const DEFAULT_RECENT_PROGRESS: u64 = 5;

    pub const MAX_RECENT_PROGRESS: u64 = 20;
}

pub mod cache {

    pub const SEARCH_CACHE_MAX_ENTRIES: usize = 500;

    pub const SEARCH_CACHE_TTL_SECONDS: u64 = 10 * 60;

    pub const TRANSLATION_CACHE_MAX_ENTRIES: usize = 2000;

    pub const TRANSLATION_CACHE_TTL_HOURS: u64 = 12;
}

pub mod ranking {

    pub const EXACT_SCORE: f64 = 1000.0;

    pub const PREFIX_BASE: f64 = 800.0;

    pub const SUBSTRING_BASE: f64 = 600.0;

    pub const FUZZY_WEIGHT: f64 = 500.0;

    pub const DEFAULT_RATIO_BONUS: f64 = 10.0;
}
