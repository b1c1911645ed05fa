use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "anime")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: String,
    pub source: Option<String>,
    #[sea_orm(indexed)]
    pub external_id: Option<String>,
    pub title: String,
    pub title_en: Option<String>,
    pub title_ru: Option<String>,
    pub title_uk: Option<String>,
    pub synopsis_en: Option<String>,
    pub synopsis_ru: Option<String>,
    pub synopsis_uk: Option<String>,
    pub episodes: Option<i32>,
    pub score: Option<f64>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    pub legacy_uids: Option<String>, // JSON array stored as string
    pub source_refs: Option<String>, // JSON object stored as string
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::anime_uid_aliases::Entity")]
    AnimeUidAliases,
    #[sea_orm(has_many = "super::user_anime_lists::Entity")]
    UserAnimeLists,
    #[sea_orm(has_many = "super::user_recommendations::Entity")]
    UserRecommendations,
    #[sea_orm(has_one = "super::watch_title_map::Entity")]
    WatchTitleMap,
}

impl Related<super::anime_uid_aliases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnimeUidAliases.def()
    }
}

impl Related<super::user_anime_lists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAnimeLists.def()
    }
}

impl Related<super::user_recommendations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRecommendations.def()
    }
}

impl Related<super::watch_title_map::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchTitleMap.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
