use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WatchTitleMap::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WatchTitleMap::AnimeUid)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WatchTitleMap::WatchSource)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchTitleMap::WatchUrl)
                            .string_len(2048)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WatchTitleMap::WatchTitle).string_len(512))
                    .col(ColumnDef::new(WatchTitleMap::CreatedAt).string().not_null())
                    .col(ColumnDef::new(WatchTitleMap::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_title_map_anime_uid")
                            .from(WatchTitleMap::Table, WatchTitleMap::AnimeUid)
                            .to(Anime::Table, Anime::Uid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WatchTitleMap::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WatchTitleMap {
    Table,
    AnimeUid,
    WatchSource,
    WatchUrl,
    WatchTitle,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Anime {
    Table,
    Uid,
}
