use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, EntityTrait, Set};

use crate::entities::{anime_uid_aliases, prelude::*};

/// Raw access to `anime_uid_aliases`. Callers normally go through
/// [`crate::services::AliasResolver`], which adds the availability checks.
pub struct AliasRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AliasRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_canonical(&self, alias_uid: &str) -> Result<Option<String>> {
        let row = AnimeUidAliases::find_by_id(alias_uid.to_string())
            .one(self.conn)
            .await
            .context("Failed to query uid alias")?;

        Ok(row.map(|r| r.canonical_uid))
    }

    /// Points every alias at `canonical_uid`, overwriting existing targets.
    pub async fn upsert_many(&self, canonical_uid: &str, aliases: &[String]) -> Result<u64> {
        if aliases.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let models = aliases.iter().map(|alias| anime_uid_aliases::ActiveModel {
            alias_uid: Set(alias.clone()),
            canonical_uid: Set(canonical_uid.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
        });

        let written = AnimeUidAliases::insert_many(models)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(anime_uid_aliases::Column::AliasUid)
                    .update_columns([
                        anime_uid_aliases::Column::CanonicalUid,
                        anime_uid_aliases::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("Failed to upsert uid aliases")?;

        Ok(written)
    }
}
