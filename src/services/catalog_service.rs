//! Domain service for the persisted anime catalog.
//!
//! Every lookup resolves the incoming uid through the alias table first, so
//! callers may hold any provider uid the catalog has ever merged.

use thiserror::Error;

use crate::domain::Lang;
use crate::models::anime::CanonicalAnimeRecord;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Anime not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Domain service trait for catalog reads and writes.
///
/// # Examples
///
/// ```rust,ignore
/// use shiori::services::{CatalogError, CatalogService};
/// use std::sync::Arc;
///
/// async fn example(service: Arc<dyn CatalogService>) -> Result<(), CatalogError> {
///     let record = service.get_catalog_item("jikan:185").await?;
///     assert_eq!(record.uid, "mal:185");
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Canonical uid for `uid`; the input itself when nothing maps it.
    async fn resolve_uid(&self, uid: &str) -> String;

    /// Stores merged records and their aliases in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if any write fails; nothing is kept
    /// in that case.
    async fn upsert_catalog_items(
        &self,
        records: &[CanonicalAnimeRecord],
    ) -> Result<Vec<CanonicalAnimeRecord>, CatalogError>;

    /// # Errors
    ///
    /// - Returns [`CatalogError::InvalidInput`] for a blank uid
    /// - Returns [`CatalogError::NotFound`] when no row exists after resolution
    async fn get_catalog_item(&self, uid: &str) -> Result<CanonicalAnimeRecord, CatalogError>;

    /// Like [`Self::get_catalog_item`], with `title` replaced by the best
    /// title for `lang`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_catalog_item`].
    async fn get_catalog_item_localized(
        &self,
        uid: &str,
        lang: Option<Lang>,
    ) -> Result<CanonicalAnimeRecord, CatalogError>;

    /// Resolves every uid, drops duplicates and unknown rows, and keeps the
    /// order of first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures.
    async fn get_catalog_items_localized(
        &self,
        uids: &[String],
        lang: Option<Lang>,
    ) -> Result<Vec<CanonicalAnimeRecord>, CatalogError>;

    /// Makes sure a row exists for `uid`, inserting an "Unknown title"
    /// placeholder when needed. Returns the canonical uid.
    ///
    /// # Errors
    ///
    /// - Returns [`CatalogError::InvalidInput`] for a blank uid
    /// - Returns [`CatalogError::Database`] on connection failures
    async fn ensure_anime_stub(&self, uid: &str) -> Result<String, CatalogError>;
}
