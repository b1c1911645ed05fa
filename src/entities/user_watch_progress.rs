use sea_orm::entity::prelude::*;

/// Last episode a user started. Not foreign-keyed to `anime`: progress may be
/// recorded for titles the catalog has not stored yet.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_watch_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub anime_uid: String,
    pub last_episode: String,
    pub last_episode_number: Option<f64>,
    pub last_source: Option<String>,
    pub last_quality: Option<String>,
    pub started_via: String,
    pub first_started_at: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
