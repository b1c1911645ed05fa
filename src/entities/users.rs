use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub telegram_id: String,

    pub username: Option<String>,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    /// Preferred display language (`en`, `ru` or `uk`).
    pub lang: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_anime_lists::Entity")]
    UserAnimeLists,
    #[sea_orm(has_many = "super::user_recommendations::Entity")]
    UserRecommendations,
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

impl ActiveModelBehavior for ActiveModel {}
