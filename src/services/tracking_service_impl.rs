//! `SeaORM` implementation of the `TrackingService` trait.
//!
//! Writes that touch more than one table run in a single transaction, and
//! alias lookups join that transaction.

use std::sync::Arc;

use sea_orm::TransactionTrait;
use tracing::info;

use crate::constants::UNKNOWN_TITLE;
use crate::constants::limits::{DEFAULT_RECENT_PROGRESS, MAX_RECENT_PROGRESS};
use crate::db::repositories::{
    catalog::CatalogRepository, list::ListRepository, progress::ProgressRepository,
    recommendation::RecommendationRepository, user::UserRepository,
};
use crate::db::{ProgressUpdate, Store};
use crate::domain::{Lang, ListType, StartedVia};
use crate::models::anime::{CanonicalAnimeRecord, non_empty};
use crate::models::tracking::{
    TrackedEntry, TrackedUser, WatchBinding, WatchProgressEntry, WatchProgressInput,
};
use crate::services::alias::AliasResolver;
use crate::services::tracking_service::{TrackingError, TrackingService};

pub struct SeaOrmTrackingService {
    store: Arc<Store>,
    aliases: AliasResolver,
}

impl SeaOrmTrackingService {
    #[must_use]
    pub const fn new(store: Arc<Store>, aliases: AliasResolver) -> Self {
        Self { store, aliases }
    }

    /// Resolves `record.uid` and stores the record under the canonical uid,
    /// keeping the caller's uid among the legacy ones.
    async fn store_record<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        record: &CanonicalAnimeRecord,
    ) -> Result<String, TrackingError> {
        let raw_uid = record.uid.trim();
        if raw_uid.is_empty() {
            return Err(TrackingError::InvalidInput("anime uid is required".to_string()));
        }

        let uid = self.aliases.resolve_in(conn, raw_uid).await;
        let mut record = record.clone();
        if uid != raw_uid && !record.legacy_uids.iter().any(|u| u == raw_uid) {
            record.legacy_uids.push(raw_uid.to_string());
        }
        record.uid.clone_from(&uid);

        CatalogRepository::new(conn)
            .upsert(&self.aliases, &record)
            .await?;
        Ok(uid)
    }

    async fn user_id(&self, telegram_id: &str) -> Result<Option<i32>, TrackingError> {
        Ok(self.store.get_user(telegram_id).await?.map(|u| u.id))
    }
}

fn parse_list_type(raw: &str) -> Result<ListType, TrackingError> {
    raw.parse::<ListType>()
        .map_err(TrackingError::UnsupportedListType)
}

fn require_user(user: &TrackedUser) -> Result<(), TrackingError> {
    if user.telegram_id.trim().is_empty() {
        return Err(TrackingError::InvalidInput("user id is required".to_string()));
    }
    Ok(())
}

#[async_trait::async_trait]
impl TrackingService for SeaOrmTrackingService {
    async fn add_to_list(
        &self,
        user: &TrackedUser,
        list_type: &str,
        record: &CanonicalAnimeRecord,
    ) -> Result<String, TrackingError> {
        let list_type = parse_list_type(list_type)?;
        require_user(user)?;

        let txn = self.store.conn.begin().await?;
        let stored_user = UserRepository::new(&txn).ensure(user).await?;
        let uid = self.store_record(&txn, record).await?;
        ListRepository::new(&txn)
            .add(stored_user.id, &uid, list_type)
            .await?;
        txn.commit().await?;

        info!(user = %stored_user.telegram_id, uid = %uid, list = %list_type, "Added to list");
        Ok(uid)
    }

    async fn remove_from_list(
        &self,
        telegram_id: &str,
        list_type: &str,
        uid: &str,
    ) -> Result<bool, TrackingError> {
        let list_type = parse_list_type(list_type)?;
        let Some(user_id) = self.user_id(telegram_id).await? else {
            return Ok(false);
        };

        let uid = self.aliases.resolve_canonical_uid(uid).await;
        let removed = self
            .store
            .list_repo()
            .remove(user_id, &uid, list_type)
            .await?;

        if removed {
            info!(user = %telegram_id, uid = %uid, list = %list_type, "Removed from list");
        }
        Ok(removed)
    }

    async fn get_list(
        &self,
        telegram_id: &str,
        list_type: &str,
    ) -> Result<Vec<TrackedEntry>, TrackingError> {
        let list_type = parse_list_type(list_type)?;
        let Some(user) = self.store.get_user(telegram_id).await? else {
            return Ok(vec![]);
        };
        let lang = user.lang.as_deref().and_then(Lang::parse);

        let rows = self.store.list_repo().list(user.id, list_type).await?;
        Ok(rows
            .into_iter()
            .map(|(entry, anime)| TrackedEntry {
                anime: crate::db::repositories::catalog::record_from_model(anime).localized(lang),
                watch_count: entry.watch_count,
                added_at: entry.added_at,
            })
            .collect())
    }

    async fn add_recommendation(
        &self,
        user: &TrackedUser,
        record: &CanonicalAnimeRecord,
    ) -> Result<String, TrackingError> {
        require_user(user)?;

        let txn = self.store.conn.begin().await?;
        let stored_user = UserRepository::new(&txn).ensure(user).await?;
        let uid = self.store_record(&txn, record).await?;
        let added = RecommendationRepository::new(&txn)
            .add(stored_user.id, &uid)
            .await?;
        txn.commit().await?;

        if added {
            info!(user = %stored_user.telegram_id, uid = %uid, "Recommendation added");
        }
        Ok(uid)
    }

    async fn remove_recommendation(
        &self,
        telegram_id: &str,
        uid: &str,
    ) -> Result<bool, TrackingError> {
        let Some(user_id) = self.user_id(telegram_id).await? else {
            return Ok(false);
        };
        let uid = self.aliases.resolve_canonical_uid(uid).await;
        Ok(self
            .store
            .recommendation_repo()
            .remove(user_id, &uid)
            .await?)
    }

    async fn set_watch_map(
        &self,
        uid: &str,
        source: &str,
        url: &str,
        title: Option<&str>,
    ) -> Result<WatchBinding, TrackingError> {
        let uid = self.aliases.resolve_canonical_uid(uid).await;
        let source = source.trim().to_lowercase();
        let url = url.trim();

        if uid.is_empty() {
            return Err(TrackingError::InvalidInput("anime uid is required".to_string()));
        }
        if source.is_empty() || url.is_empty() {
            return Err(TrackingError::InvalidInput(
                "watch source and url are required".to_string(),
            ));
        }
        if !self.store.catalog_repo().exists(&uid).await? {
            return Err(TrackingError::AnimeNotFound(uid));
        }

        let repo = self.store.watch_map_repo();
        repo.upsert(&uid, &source, url, non_empty(title)).await?;

        info!(uid = %uid, source = %source, "Watch binding saved");
        repo.get(&uid)
            .await?
            .ok_or(TrackingError::AnimeNotFound(uid))
    }

    async fn get_watch_map(&self, uid: &str) -> Result<Option<WatchBinding>, TrackingError> {
        let uid = self.aliases.resolve_canonical_uid(uid).await;
        Ok(self.store.watch_map_repo().get(&uid).await?)
    }

    async fn clear_watch_map(&self, uid: &str) -> Result<bool, TrackingError> {
        let uid = self.aliases.resolve_canonical_uid(uid).await;
        Ok(self.store.watch_map_repo().delete(&uid).await?)
    }

    async fn upsert_watch_progress(
        &self,
        telegram_id: &str,
        input: &WatchProgressInput,
    ) -> Result<String, TrackingError> {
        let user = TrackedUser::new(telegram_id.trim());
        require_user(&user)?;

        let started_via = input.started_via.parse::<StartedVia>().map_err(|v| {
            TrackingError::InvalidInput(format!(
                "started_via must be webapp_quality or bot_source, got '{v}'"
            ))
        })?;
        let Some(episode_label) = non_empty(Some(&input.episode_label)) else {
            return Err(TrackingError::InvalidInput("episode is required".to_string()));
        };
        if input.anime_uid.trim().is_empty() {
            return Err(TrackingError::InvalidInput("anime uid is required".to_string()));
        }

        let txn = self.store.conn.begin().await?;
        let stored_user = UserRepository::new(&txn).ensure(&user).await?;
        let uid = self.aliases.resolve_in(&txn, &input.anime_uid).await;
        ProgressRepository::new(&txn)
            .upsert(
                stored_user.id,
                ProgressUpdate {
                    anime_uid: uid.clone(),
                    episode_label,
                    episode_number: input.episode_number.filter(|n| n.is_finite()),
                    source: non_empty(input.source.as_deref()),
                    quality: non_empty(input.quality.as_deref()),
                    started_via,
                },
            )
            .await?;
        txn.commit().await?;

        Ok(uid)
    }

    async fn delete_watch_progress(
        &self,
        telegram_id: &str,
        uid: &str,
    ) -> Result<bool, TrackingError> {
        let Some(user_id) = self.user_id(telegram_id).await? else {
            return Ok(false);
        };
        let uid = self.aliases.resolve_canonical_uid(uid).await;
        Ok(self.store.progress_repo().delete(user_id, &uid).await?)
    }

    async fn recent_watch_progress(
        &self,
        telegram_id: &str,
        limit: Option<u64>,
        lang: Option<Lang>,
    ) -> Result<Vec<WatchProgressEntry>, TrackingError> {
        let Some(user_id) = self.user_id(telegram_id).await? else {
            return Ok(vec![]);
        };
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_PROGRESS)
            .clamp(1, MAX_RECENT_PROGRESS);

        let rows = self.store.progress_repo().recent(user_id, limit).await?;
        let uids: Vec<String> = rows.iter().map(|r| r.anime_uid.clone()).collect();
        let catalog = self.store.catalog_repo().get_many(&uids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let anime = catalog.iter().find(|a| a.uid == row.anime_uid).cloned();
                let title = anime
                    .as_ref()
                    .map_or_else(|| UNKNOWN_TITLE.to_string(), |a| a.title_for(lang));
                WatchProgressEntry {
                    uid: row.anime_uid,
                    anime,
                    title,
                    last_episode: row.last_episode,
                    last_episode_number: row.last_episode_number,
                    last_source: row.last_source,
                    last_quality: row.last_quality,
                    started_via: row.started_via,
                    first_started_at: row.first_started_at,
                    updated_at: row.updated_at,
                }
            })
            .collect())
    }
}
