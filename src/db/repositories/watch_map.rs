use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, EntityTrait, Set};

use crate::entities::{prelude::*, watch_title_map};
use crate::models::tracking::WatchBinding;

pub struct WatchMapRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> WatchMapRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn upsert(
        &self,
        anime_uid: &str,
        watch_source: &str,
        watch_url: &str,
        watch_title: Option<String>,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let model = watch_title_map::ActiveModel {
            anime_uid: Set(anime_uid.to_string()),
            watch_source: Set(watch_source.to_string()),
            watch_url: Set(watch_url.to_string()),
            watch_title: Set(watch_title),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        WatchTitleMap::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(watch_title_map::Column::AnimeUid)
                    .update_columns([
                        watch_title_map::Column::WatchSource,
                        watch_title_map::Column::WatchUrl,
                        watch_title_map::Column::WatchTitle,
                        watch_title_map::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("Failed to upsert watch binding")?;

        Ok(())
    }

    pub async fn get(&self, anime_uid: &str) -> Result<Option<WatchBinding>> {
        let row = WatchTitleMap::find_by_id(anime_uid.to_string())
            .one(self.conn)
            .await
            .context("Failed to query watch binding")?;

        Ok(row.map(|r| WatchBinding {
            uid: r.anime_uid,
            watch_source: r.watch_source,
            watch_url: r.watch_url,
            watch_title: r.watch_title,
            updated_at: Some(r.updated_at),
        }))
    }

    pub async fn delete(&self, anime_uid: &str) -> Result<bool> {
        let result = WatchTitleMap::delete_by_id(anime_uid.to_string())
            .exec(self.conn)
            .await
            .context("Failed to delete watch binding")?;

        Ok(result.rows_affected > 0)
    }
}
