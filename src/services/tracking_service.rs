//! Domain service for per-user tracking: lists, recommendations, watch
//! provider bindings and watch progress.
//!
//! Each write resolves the anime uid to its canonical form before touching
//! storage.

use thiserror::Error;

use crate::domain::Lang;
use crate::models::anime::CanonicalAnimeRecord;
use crate::models::tracking::{
    TrackedEntry, TrackedUser, WatchBinding, WatchProgressEntry, WatchProgressInput,
};

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Anime not found: {0}")]
    AnimeNotFound(String),

    #[error("Unsupported list type: {0}")]
    UnsupportedListType(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for TrackingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TrackingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait TrackingService: Send + Sync {
    /// Adds a title to one of the user's lists, storing the catalog record
    /// in the same transaction. Returns the canonical uid.
    ///
    /// # Errors
    ///
    /// - Returns [`TrackingError::UnsupportedListType`] for anything other
    ///   than `watched`, `planned` or `favorite`
    /// - Returns [`TrackingError::InvalidInput`] for a blank user or uid
    /// - Returns [`TrackingError::Database`] on connection failures
    async fn add_to_list(
        &self,
        user: &TrackedUser,
        list_type: &str,
        record: &CanonicalAnimeRecord,
    ) -> Result<String, TrackingError>;

    /// # Errors
    ///
    /// - Returns [`TrackingError::UnsupportedListType`] for an unknown list
    /// - Returns [`TrackingError::Database`] on connection failures
    async fn remove_from_list(
        &self,
        telegram_id: &str,
        list_type: &str,
        uid: &str,
    ) -> Result<bool, TrackingError>;

    /// The user's list, newest first, titles localized to the user's language.
    ///
    /// # Errors
    ///
    /// - Returns [`TrackingError::UnsupportedListType`] for an unknown list
    /// - Returns [`TrackingError::Database`] on connection failures
    async fn get_list(
        &self,
        telegram_id: &str,
        list_type: &str,
    ) -> Result<Vec<TrackedEntry>, TrackingError>;

    /// # Errors
    ///
    /// - Returns [`TrackingError::InvalidInput`] for a blank user or uid
    /// - Returns [`TrackingError::Database`] on connection failures
    async fn add_recommendation(
        &self,
        user: &TrackedUser,
        record: &CanonicalAnimeRecord,
    ) -> Result<String, TrackingError>;

    /// # Errors
    ///
    /// Returns [`TrackingError::Database`] on connection failures.
    async fn remove_recommendation(&self, telegram_id: &str, uid: &str)
    -> Result<bool, TrackingError>;

    /// Binds a catalog title to a page on a watch provider.
    ///
    /// # Errors
    ///
    /// - Returns [`TrackingError::InvalidInput`] when uid, source or url is blank
    /// - Returns [`TrackingError::AnimeNotFound`] when the catalog has no row
    /// - Returns [`TrackingError::Database`] on connection failures
    async fn set_watch_map(
        &self,
        uid: &str,
        source: &str,
        url: &str,
        title: Option<&str>,
    ) -> Result<WatchBinding, TrackingError>;

    /// # Errors
    ///
    /// Returns [`TrackingError::Database`] on connection failures.
    async fn get_watch_map(&self, uid: &str) -> Result<Option<WatchBinding>, TrackingError>;

    /// # Errors
    ///
    /// Returns [`TrackingError::Database`] on connection failures.
    async fn clear_watch_map(&self, uid: &str) -> Result<bool, TrackingError>;

    /// Records that the user started an episode. Returns the canonical uid.
    ///
    /// # Errors
    ///
    /// - Returns [`TrackingError::InvalidInput`] for a blank uid or episode,
    ///   or a `started_via` other than `webapp_quality` / `bot_source`
    /// - Returns [`TrackingError::Database`] on connection failures
    async fn upsert_watch_progress(
        &self,
        telegram_id: &str,
        input: &WatchProgressInput,
    ) -> Result<String, TrackingError>;

    /// # Errors
    ///
    /// Returns [`TrackingError::Database`] on connection failures.
    async fn delete_watch_progress(&self, telegram_id: &str, uid: &str)
    -> Result<bool, TrackingError>;

    /// Latest progress rows; `limit` defaults to 5 and is clamped to 1..=20.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Database`] on connection failures.
    async fn recent_watch_progress(
        &self,
        telegram_id: &str,
        limit: Option<u64>,
        lang: Option<Lang>,
    ) -> Result<Vec<WatchProgressEntry>, TrackingError>;
}
