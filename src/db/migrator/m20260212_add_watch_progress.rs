use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserWatchProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserWatchProgress::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserWatchProgress::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserWatchProgress::AnimeUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserWatchProgress::LastEpisode)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserWatchProgress::LastEpisodeNumber).double())
                    .col(ColumnDef::new(UserWatchProgress::LastSource).string_len(255))
                    .col(ColumnDef::new(UserWatchProgress::LastQuality).string_len(64))
                    .col(
                        ColumnDef::new(UserWatchProgress::StartedVia)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserWatchProgress::FirstStartedAt)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserWatchProgress::CreatedAt)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserWatchProgress::UpdatedAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_watch_progress_unique")
                    .table(UserWatchProgress::Table)
                    .col(UserWatchProgress::UserId)
                    .col(UserWatchProgress::AnimeUid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_watch_progress_user_updated")
                    .table(UserWatchProgress::Table)
                    .col(UserWatchProgress::UserId)
                    .col(UserWatchProgress::UpdatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserWatchProgress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserWatchProgress {
    Table,
    Id,
    UserId,
    AnimeUid,
    LastEpisode,
    LastEpisodeNumber,
    LastSource,
    LastQuality,
    StartedVia,
    FirstStartedAt,
    CreatedAt,
    UpdatedAt,
}
