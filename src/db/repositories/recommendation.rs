use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entities::{prelude::*, user_recommendations};

pub struct RecommendationRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RecommendationRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Returns whether a new row was written.
    pub async fn add(&self, user_id: i32, anime_uid: &str) -> Result<bool> {
        let model = user_recommendations::ActiveModel {
            recommender_user_id: Set(user_id),
            anime_uid: Set(anime_uid.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let inserted = UserRecommendations::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    user_recommendations::Column::RecommenderUserId,
                    user_recommendations::Column::AnimeUid,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("Failed to add recommendation")?;

        Ok(inserted > 0)
    }

    pub async fn remove(&self, user_id: i32, anime_uid: &str) -> Result<bool> {
        let result = UserRecommendations::delete_many()
            .filter(user_recommendations::Column::RecommenderUserId.eq(user_id))
            .filter(user_recommendations::Column::AnimeUid.eq(anime_uid))
            .exec(self.conn)
            .await
            .context("Failed to remove recommendation")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn exists(&self, user_id: i32, anime_uid: &str) -> Result<bool> {
        let row = UserRecommendations::find()
            .filter(user_recommendations::Column::RecommenderUserId.eq(user_id))
            .filter(user_recommendations::Column::AnimeUid.eq(anime_uid))
            .one(self.conn)
            .await
            .context("Failed to query recommendation")?;

        Ok(row.is_some())
    }
}
