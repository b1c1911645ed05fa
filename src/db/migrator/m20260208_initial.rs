use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::TelegramId)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string())
                    .col(ColumnDef::new(Users::FirstName).string())
                    .col(ColumnDef::new(Users::LastName).string())
                    .col(ColumnDef::new(Users::Lang).string_len(8))
                    .col(ColumnDef::new(Users::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Anime::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Anime::Uid)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Anime::Source).string_len(64))
                    .col(ColumnDef::new(Anime::ExternalId).string_len(128))
                    .col(ColumnDef::new(Anime::Title).string_len(512).not_null())
                    .col(ColumnDef::new(Anime::TitleEn).string_len(512))
                    .col(ColumnDef::new(Anime::TitleRu).string_len(512))
                    .col(ColumnDef::new(Anime::TitleUk).string_len(512))
                    .col(ColumnDef::new(Anime::SynopsisEn).text())
                    .col(ColumnDef::new(Anime::SynopsisRu).text())
                    .col(ColumnDef::new(Anime::SynopsisUk).text())
                    .col(ColumnDef::new(Anime::Episodes).integer())
                    .col(ColumnDef::new(Anime::Score).double())
                    .col(ColumnDef::new(Anime::Status).string_len(128))
                    .col(ColumnDef::new(Anime::Url).string_len(1024))
                    .col(ColumnDef::new(Anime::ImageSmall).string_len(1024))
                    .col(ColumnDef::new(Anime::ImageLarge).string_len(1024))
                    .col(ColumnDef::new(Anime::LegacyUids).text())
                    .col(ColumnDef::new(Anime::SourceRefs).text())
                    .col(ColumnDef::new(Anime::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Anime::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_anime_external_id")
                    .table(Anime::Table)
                    .col(Anime::ExternalId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAnimeLists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAnimeLists::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserAnimeLists::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserAnimeLists::AnimeUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAnimeLists::ListType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAnimeLists::WatchCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(UserAnimeLists::AddedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_anime_lists_user_id")
                            .from(UserAnimeLists::Table, UserAnimeLists::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_anime_lists_anime_uid")
                            .from(UserAnimeLists::Table, UserAnimeLists::AnimeUid)
                            .to(Anime::Table, Anime::Uid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_anime_lists_unique")
                    .table(UserAnimeLists::Table)
                    .col(UserAnimeLists::UserId)
                    .col(UserAnimeLists::AnimeUid)
                    .col(UserAnimeLists::ListType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserRecommendations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRecommendations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserRecommendations::RecommenderUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserRecommendations::AnimeUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserRecommendations::CreatedAt)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_recommendations_user_id")
                            .from(
                                UserRecommendations::Table,
                                UserRecommendations::RecommenderUserId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_recommendations_anime_uid")
                            .from(UserRecommendations::Table, UserRecommendations::AnimeUid)
                            .to(Anime::Table, Anime::Uid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_recommendations_unique")
                    .table(UserRecommendations::Table)
                    .col(UserRecommendations::RecommenderUserId)
                    .col(UserRecommendations::AnimeUid)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRecommendations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAnimeLists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Anime::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    TelegramId,
    Username,
    FirstName,
    LastName,
    Lang,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Anime {
    Table,
    Uid,
    Source,
    ExternalId,
    Title,
    TitleEn,
    TitleRu,
    TitleUk,
    SynopsisEn,
    SynopsisRu,
    SynopsisUk,
    Episodes,
    Score,
    Status,
    Url,
    ImageSmall,
    ImageLarge,
    LegacyUids,
    SourceRefs,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserAnimeLists {
    Table,
    Id,
    UserId,
    AnimeUid,
    ListType,
    WatchCount,
    AddedAt,
}

#[derive(DeriveIden)]
enum UserRecommendations {
    Table,
    Id,
    RecommenderUserId,
    AnimeUid,
    CreatedAt,
}
