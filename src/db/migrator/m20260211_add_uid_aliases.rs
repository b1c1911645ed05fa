use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnimeUidAliases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnimeUidAliases::AliasUid)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnimeUidAliases::CanonicalUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnimeUidAliases::CreatedAt)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnimeUidAliases::UpdatedAt)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_anime_uid_aliases_canonical_uid")
                            .from(AnimeUidAliases::Table, AnimeUidAliases::CanonicalUid)
                            .to(Anime::Table, Anime::Uid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_anime_uid_aliases_canonical_uid")
                    .table(AnimeUidAliases::Table)
                    .col(AnimeUidAliases::CanonicalUid)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnimeUidAliases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AnimeUidAliases {
    Table,
    AliasUid,
    CanonicalUid,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Anime {
    Table,
    Uid,
}
