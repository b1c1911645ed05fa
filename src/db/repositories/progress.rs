use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::domain::StartedVia;
use crate::entities::{prelude::*, user_watch_progress};

/// One validated progress write.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub anime_uid: String,
    pub episode_label: String,
    pub episode_number: Option<f64>,
    pub source: Option<String>,
    pub quality: Option<String>,
    pub started_via: StartedVia,
}

pub struct ProgressRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProgressRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Records the latest episode. `first_started_at` is set once and kept.
    pub async fn upsert(&self, user_id: i32, update: ProgressUpdate) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let existing = UserWatchProgress::find()
            .filter(user_watch_progress::Column::UserId.eq(user_id))
            .filter(user_watch_progress::Column::AnimeUid.eq(update.anime_uid.as_str()))
            .one(self.conn)
            .await
            .context("Failed to query watch progress")?;

        if let Some(row) = existing {
            let mut active: user_watch_progress::ActiveModel = row.into();
            active.last_episode = Set(update.episode_label);
            active.last_episode_number = Set(update.episode_number);
            active.last_source = Set(update.source);
            active.last_quality = Set(update.quality);
            active.started_via = Set(update.started_via.as_str().to_string());
            active.updated_at = Set(now);
            active
                .update(self.conn)
                .await
                .context("Failed to update watch progress")?;
            return Ok(());
        }

        user_watch_progress::ActiveModel {
            user_id: Set(user_id),
            anime_uid: Set(update.anime_uid),
            last_episode: Set(update.episode_label),
            last_episode_number: Set(update.episode_number),
            last_source: Set(update.source),
            last_quality: Set(update.quality),
            started_via: Set(update.started_via.as_str().to_string()),
            first_started_at: Set(now.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to insert watch progress")?;

        Ok(())
    }

    pub async fn delete(&self, user_id: i32, anime_uid: &str) -> Result<bool> {
        let result = UserWatchProgress::delete_many()
            .filter(user_watch_progress::Column::UserId.eq(user_id))
            .filter(user_watch_progress::Column::AnimeUid.eq(anime_uid))
            .exec(self.conn)
            .await
            .context("Failed to delete watch progress")?;

        Ok(result.rows_affected > 0)
    }

    /// Most recently touched rows first.
    pub async fn recent(&self, user_id: i32, limit: u64) -> Result<Vec<user_watch_progress::Model>> {
        UserWatchProgress::find()
            .filter(user_watch_progress::Column::UserId.eq(user_id))
            .order_by_desc(user_watch_progress::Column::UpdatedAt)
            .order_by_desc(user_watch_progress::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await
            .context("Failed to load recent watch progress")
    }
}
