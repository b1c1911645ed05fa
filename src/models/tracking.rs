use serde::{Deserialize, Serialize};

use crate::models::anime::CanonicalAnimeRecord;

/// Identity of the person behind a write, as the chat frontend knows them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedUser {
    pub telegram_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub lang: Option<String>,
}

impl TrackedUser {
    #[must_use]
    pub fn new(telegram_id: impl Into<String>) -> Self {
        Self {
            telegram_id: telegram_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntry {
    #[serde(flatten)]
    pub anime: CanonicalAnimeRecord,
    pub watch_count: i32,
    pub added_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchBinding {
    pub uid: String,
    pub watch_source: String,
    pub watch_url: String,
    pub watch_title: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgressInput {
    pub anime_uid: String,
    pub episode_label: String,
    pub episode_number: Option<f64>,
    pub source: Option<String>,
    pub quality: Option<String>,
    pub started_via: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgressEntry {
    pub uid: String,
    /// Catalog row, when one exists for the uid.
    pub anime: Option<CanonicalAnimeRecord>,
    pub title: String,
    pub last_episode: String,
    pub last_episode_number: Option<f64>,
    pub last_source: Option<String>,
    pub last_quality: Option<String>,
    pub started_via: String,
    pub first_started_at: String,
    pub updated_at: String,
}
