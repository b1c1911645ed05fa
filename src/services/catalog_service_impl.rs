//! `SeaORM` implementation of the `CatalogService` trait.

use std::sync::Arc;

use tracing::info;

use crate::db::Store;
use crate::domain::Lang;
use crate::models::anime::CanonicalAnimeRecord;
use crate::services::alias::AliasResolver;
use crate::services::catalog_service::{CatalogError, CatalogService};

pub struct SeaOrmCatalogService {
    store: Arc<Store>,
    aliases: AliasResolver,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Arc<Store>, aliases: AliasResolver) -> Self {
        Self { store, aliases }
    }

    async fn resolve_required(&self, uid: &str) -> Result<String, CatalogError> {
        let uid = self.aliases.resolve_canonical_uid(uid).await;
        if uid.is_empty() {
            return Err(CatalogError::InvalidInput("uid is required".to_string()));
        }
        Ok(uid)
    }
}

#[async_trait::async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn resolve_uid(&self, uid: &str) -> String {
        self.aliases.resolve_canonical_uid(uid).await
    }

    async fn upsert_catalog_items(
        &self,
        records: &[CanonicalAnimeRecord],
    ) -> Result<Vec<CanonicalAnimeRecord>, CatalogError> {
        Ok(self.store.upsert_catalog(&self.aliases, records).await?)
    }

    async fn get_catalog_item(&self, uid: &str) -> Result<CanonicalAnimeRecord, CatalogError> {
        let uid = self.resolve_required(uid).await?;
        self.store
            .get_anime(&uid)
            .await?
            .ok_or(CatalogError::NotFound(uid))
    }

    async fn get_catalog_item_localized(
        &self,
        uid: &str,
        lang: Option<Lang>,
    ) -> Result<CanonicalAnimeRecord, CatalogError> {
        Ok(self.get_catalog_item(uid).await?.localized(lang))
    }

    async fn get_catalog_items_localized(
        &self,
        uids: &[String],
        lang: Option<Lang>,
    ) -> Result<Vec<CanonicalAnimeRecord>, CatalogError> {
        let mut resolved: Vec<String> = Vec::with_capacity(uids.len());
        for uid in uids {
            let uid = self.aliases.resolve_canonical_uid(uid).await;
            if !uid.is_empty() && !resolved.contains(&uid) {
                resolved.push(uid);
            }
        }

        let mut rows = self.store.catalog_repo().get_many(&resolved).await?;
        let mut out = Vec::with_capacity(rows.len());
        for uid in &resolved {
            if let Some(pos) = rows.iter().position(|r| &r.uid == uid) {
                out.push(rows.swap_remove(pos).localized(lang));
            }
        }
        Ok(out)
    }

    async fn ensure_anime_stub(&self, uid: &str) -> Result<String, CatalogError> {
        let uid = self.resolve_required(uid).await?;
        let repo = self.store.catalog_repo();
        if !repo.exists(&uid).await? {
            repo.ensure_stub(&uid).await?;
            info!(uid = %uid, "Created catalog placeholder");
        }
        Ok(uid)
    }
}
