use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::ListType;
use crate::entities::{anime, prelude::*, user_anime_lists};

pub struct ListRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ListRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Adds `anime_uid` to a list. Marking something watched takes it off the
    /// planned list and bumps the watch count on repeats; the other lists
    /// ignore duplicates.
    pub async fn add(&self, user_id: i32, anime_uid: &str, list_type: ListType) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        if list_type == ListType::Watched {
            self.remove(user_id, anime_uid, ListType::Planned).await?;

            let existing = self.find(user_id, anime_uid, ListType::Watched).await?;
            if let Some(row) = existing {
                let count = row.watch_count + 1;
                let mut active: user_anime_lists::ActiveModel = row.into();
                active.watch_count = Set(count);
                active
                    .update(self.conn)
                    .await
                    .context("Failed to bump watch count")?;
                return Ok(());
            }

            user_anime_lists::ActiveModel {
                user_id: Set(user_id),
                anime_uid: Set(anime_uid.to_string()),
                list_type: Set(list_type.as_str().to_string()),
                watch_count: Set(1),
                added_at: Set(now),
                ..Default::default()
            }
            .insert(self.conn)
            .await
            .context("Failed to add watched entry")?;
            return Ok(());
        }

        let entry = user_anime_lists::ActiveModel {
            user_id: Set(user_id),
            anime_uid: Set(anime_uid.to_string()),
            list_type: Set(list_type.as_str().to_string()),
            watch_count: Set(0),
            added_at: Set(now),
            ..Default::default()
        };

        UserAnimeLists::insert(entry)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    user_anime_lists::Column::UserId,
                    user_anime_lists::Column::AnimeUid,
                    user_anime_lists::Column::ListType,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("Failed to add list entry")?;

        Ok(())
    }

    pub async fn find(
        &self,
        user_id: i32,
        anime_uid: &str,
        list_type: ListType,
    ) -> Result<Option<user_anime_lists::Model>> {
        UserAnimeLists::find()
            .filter(user_anime_lists::Column::UserId.eq(user_id))
            .filter(user_anime_lists::Column::AnimeUid.eq(anime_uid))
            .filter(user_anime_lists::Column::ListType.eq(list_type.as_str()))
            .one(self.conn)
            .await
            .context("Failed to query list entry")
    }

    pub async fn remove(&self, user_id: i32, anime_uid: &str, list_type: ListType) -> Result<bool> {
        let result = UserAnimeLists::delete_many()
            .filter(user_anime_lists::Column::UserId.eq(user_id))
            .filter(user_anime_lists::Column::AnimeUid.eq(anime_uid))
            .filter(user_anime_lists::Column::ListType.eq(list_type.as_str()))
            .exec(self.conn)
            .await
            .context("Failed to remove list entry")?;

        Ok(result.rows_affected > 0)
    }

    /// Entries with their catalog rows, newest first.
    pub async fn list(
        &self,
        user_id: i32,
        list_type: ListType,
    ) -> Result<Vec<(user_anime_lists::Model, anime::Model)>> {
        let rows = UserAnimeLists::find()
            .filter(user_anime_lists::Column::UserId.eq(user_id))
            .filter(user_anime_lists::Column::ListType.eq(list_type.as_str()))
            .order_by_desc(user_anime_lists::Column::AddedAt)
            .order_by_desc(user_anime_lists::Column::Id)
            .find_also_related(Anime)
            .all(self.conn)
            .await
            .context("Failed to load list")?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, anime)| anime.map(|a| (entry, a)))
            .collect())
    }
}
