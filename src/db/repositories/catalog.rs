use std::collections::BTreeMap;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;

use crate::domain::ExternalId;
use crate::entities::{anime, prelude::*};
use crate::models::anime::{CanonicalAnimeRecord, SourceRef};
use crate::services::alias::AliasResolver;

pub struct CatalogRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CatalogRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, uid: &str) -> Result<Option<CanonicalAnimeRecord>> {
        let row = Anime::find_by_id(uid.to_string())
            .one(self.conn)
            .await
            .context("Failed to query catalog item")?;

        Ok(row.map(record_from_model))
    }

    pub async fn exists(&self, uid: &str) -> Result<bool> {
        Ok(self.get(uid).await?.is_some())
    }

    /// Rows for `uids`, in no particular order. Missing uids are skipped.
    pub async fn get_many(&self, uids: &[String]) -> Result<Vec<CanonicalAnimeRecord>> {
        if uids.is_empty() {
            return Ok(vec![]);
        }

        let rows = Anime::find()
            .filter(anime::Column::Uid.is_in(uids.iter().cloned()))
            .all(self.conn)
            .await
            .context("Failed to query catalog items")?;

        Ok(rows.into_iter().map(record_from_model).collect())
    }

    /// Inserts `record`, or merges it into the stored row, then maps every
    /// legacy uid to it. Run inside a transaction so the row and its aliases
    /// land together.
    pub async fn upsert(
        &self,
        aliases: &AliasResolver,
        record: &CanonicalAnimeRecord,
    ) -> Result<CanonicalAnimeRecord> {
        let existing = Anime::find_by_id(record.uid.clone())
            .one(self.conn)
            .await
            .context("Failed to load catalog item for upsert")?;

        let now = chrono::Utc::now().to_rfc3339();

        let merged = match existing {
            Some(model) => {
                let created_at = model.created_at.clone();
                let merged = merge_into_stored(record_from_model(model), record);
                to_active_model(&merged, created_at, now)
                    .update(self.conn)
                    .await
                    .context("Failed to update catalog item")?;
                merged
            }
            None => {
                to_active_model(record, now.clone(), now)
                    .insert(self.conn)
                    .await
                    .context("Failed to insert catalog item")?;
                record.clone()
            }
        };

        let mut alias_uids = Vec::with_capacity(merged.legacy_uids.len() + 1);
        alias_uids.push(merged.uid.clone());
        alias_uids.extend(merged.legacy_uids.iter().cloned());
        aliases
            .upsert_uid_aliases(self.conn, &merged.uid, &alias_uids)
            .await?;

        Ok(merged)
    }

    /// Placeholder row so per-user tables can reference a uid the catalog
    /// has not fetched yet. Existing rows are left untouched.
    pub async fn ensure_stub(&self, uid: &str) -> Result<()> {
        if self.exists(uid).await? {
            return Ok(());
        }

        let (source, external_id) = parse_stub_uid(uid).map_or((None, None), |(s, id)| {
            (Some(s), Some(ExternalId::Numeric(id)))
        });
        let stub = CanonicalAnimeRecord::stub(uid, source, external_id);
        let now = chrono::Utc::now().to_rfc3339();

        Anime::insert(to_active_model(&stub, now.clone(), now))
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(anime::Column::Uid)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("Failed to insert catalog stub")?;

        Ok(())
    }
}

impl<C: ConnectionTrait + TransactionTrait> CatalogRepository<'_, C> {
    /// Upserts a batch in one transaction.
    pub async fn upsert_many(
        &self,
        aliases: &AliasResolver,
        records: &[CanonicalAnimeRecord],
    ) -> Result<Vec<CanonicalAnimeRecord>> {
        if records.is_empty() {
            return Ok(vec![]);
        }

        let txn = self.conn.begin().await?;
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            stored.push(CatalogRepository::new(&txn).upsert(aliases, record).await?);
        }
        txn.commit().await?;

        info!("Upserted {} catalog item(s)", stored.len());
        Ok(stored)
    }
}

/// Applies `incoming` on top of `stored`: only fields the new value carries
/// are overwritten, legacy uids are unioned with the newest order first, and
/// the first reference per source is kept.
#[must_use]
pub fn merge_into_stored(
    stored: CanonicalAnimeRecord,
    incoming: &CanonicalAnimeRecord,
) -> CanonicalAnimeRecord {
    let mut legacy_uids = incoming.legacy_uids.clone();
    for uid in stored.legacy_uids {
        if !legacy_uids.contains(&uid) {
            legacy_uids.push(uid);
        }
    }

    let mut source_refs = stored.source_refs;
    for (source, reference) in &incoming.source_refs {
        source_refs
            .entry(source.clone())
            .or_insert_with(|| reference.clone());
    }

    CanonicalAnimeRecord {
        uid: stored.uid,
        source: incoming.source.clone().or(stored.source),
        external_id: incoming.external_id.clone().or(stored.external_id),
        title: incoming.title.clone(),
        title_en: incoming.title_en.clone().or(stored.title_en),
        title_ru: incoming.title_ru.clone().or(stored.title_ru),
        title_uk: incoming.title_uk.clone().or(stored.title_uk),
        synopsis_en: incoming.synopsis_en.clone().or(stored.synopsis_en),
        synopsis_ru: incoming.synopsis_ru.clone().or(stored.synopsis_ru),
        synopsis_uk: incoming.synopsis_uk.clone().or(stored.synopsis_uk),
        episodes: incoming.episodes.or(stored.episodes),
        score: incoming.score.or(stored.score),
        status: incoming.status.clone().or(stored.status),
        url: incoming.url.clone().or(stored.url),
        image_small: incoming.image_small.clone().or(stored.image_small),
        image_large: incoming.image_large.clone().or(stored.image_large),
        legacy_uids,
        source_refs,
    }
}

/// Splits `jikan:123`-style uids into source and numeric id.
fn parse_stub_uid(uid: &str) -> Option<(String, i64)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)^(jikan|shikimori|anilist|mal):(\d+)$").expect("Invalid regex")
    });
    let caps = re.captures(uid.trim())?;
    let source = caps.get(1)?.as_str().to_ascii_lowercase();
    let id = caps.get(2)?.as_str().parse().ok()?;
    Some((source, id))
}

fn to_active_model(
    record: &CanonicalAnimeRecord,
    created_at: String,
    updated_at: String,
) -> anime::ActiveModel {
    anime::ActiveModel {
        uid: Set(record.uid.clone()),
        source: Set(record.source.clone()),
        external_id: Set(record.external_id.as_ref().map(ToString::to_string)),
        title: Set(record.title.clone()),
        title_en: Set(record.title_en.clone()),
        title_ru: Set(record.title_ru.clone()),
        title_uk: Set(record.title_uk.clone()),
        synopsis_en: Set(record.synopsis_en.clone()),
        synopsis_ru: Set(record.synopsis_ru.clone()),
        synopsis_uk: Set(record.synopsis_uk.clone()),
        episodes: Set(record.episodes),
        score: Set(record.score),
        status: Set(record.status.clone()),
        url: Set(record.url.clone()),
        image_small: Set(record.image_small.clone()),
        image_large: Set(record.image_large.clone()),
        legacy_uids: Set(serde_json::to_string(&record.legacy_uids).ok()),
        source_refs: Set(serde_json::to_string(&record.source_refs).ok()),
        created_at: Set(created_at),
        updated_at: Set(updated_at),
    }
}

#[must_use]
pub fn record_from_model(model: anime::Model) -> CanonicalAnimeRecord {
    let legacy_uids: Vec<String> = model
        .legacy_uids
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();
    let source_refs: BTreeMap<String, SourceRef> = model
        .source_refs
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    CanonicalAnimeRecord {
        uid: model.uid,
        source: model.source,
        external_id: model
            .external_id
            .as_deref()
            .and_then(|id| ExternalId::from(id).normalized()),
        title: model.title,
        title_en: model.title_en,
        title_ru: model.title_ru,
        title_uk: model.title_uk,
        synopsis_en: model.synopsis_en,
        synopsis_ru: model.synopsis_ru,
        synopsis_uk: model.synopsis_uk,
        episodes: model.episodes,
        score: model.score,
        status: model.status,
        url: model.url,
        image_small: model.image_small,
        image_large: model.image_large,
        legacy_uids,
        source_refs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uid: &str, legacy: &[&str]) -> CanonicalAnimeRecord {
        let mut r = CanonicalAnimeRecord::stub(uid, Some("jikan".to_string()), None);
        r.legacy_uids = legacy.iter().map(|s| (*s).to_string()).collect();
        r
    }

    #[test]
    fn test_merge_keeps_stored_fields_the_update_lacks() {
        let mut stored = record("mal:1", &["jikan:1"]);
        stored.title_ru = Some("Наруто".to_string());
        stored.episodes = Some(220);

        let mut incoming = record("mal:1", &["jikan:1"]);
        incoming.title = "Naruto".to_string();
        incoming.title_en = Some("Naruto".to_string());

        let merged = merge_into_stored(stored, &incoming);
        assert_eq!(merged.title, "Naruto");
        assert_eq!(merged.title_ru.as_deref(), Some("Наруто"));
        assert_eq!(merged.title_en.as_deref(), Some("Naruto"));
        assert_eq!(merged.episodes, Some(220));
    }

    #[test]
    fn test_merge_unions_legacy_uids_newest_first() {
        let stored = record("mal:1", &["jikan:1", "kitsu:7"]);
        let incoming = record("mal:1", &["shikimori:1", "jikan:1"]);

        let merged = merge_into_stored(stored, &incoming);
        assert_eq!(merged.legacy_uids, vec!["shikimori:1", "jikan:1", "kitsu:7"]);
    }

    #[test]
    fn test_merge_keeps_first_source_ref() {
        let mut stored = record("mal:1", &[]);
        stored.source_refs.insert(
            "jikan".to_string(),
            SourceRef {
                uid: "jikan:1".to_string(),
                external_id: Some(ExternalId::Numeric(1)),
                url: Some("old".to_string()),
                title: None,
            },
        );

        let mut incoming = record("mal:1", &[]);
        for (source, url) in [("jikan", "new"), ("shikimori", "shiki")] {
            incoming.source_refs.insert(
                source.to_string(),
                SourceRef {
                    uid: format!("{source}:1"),
                    external_id: Some(ExternalId::Numeric(1)),
                    url: Some(url.to_string()),
                    title: None,
                },
            );
        }

        let merged = merge_into_stored(stored, &incoming);
        assert_eq!(merged.source_refs.len(), 2);
        assert_eq!(merged.source_refs["jikan"].url.as_deref(), Some("old"));
        assert_eq!(merged.source_refs["shikimori"].url.as_deref(), Some("shiki"));
    }

    #[test]
    fn test_parse_stub_uid() {
        assert_eq!(parse_stub_uid("JIKAN:42"), Some(("jikan".to_string(), 42)));
        assert_eq!(parse_stub_uid("mal:7"), Some(("mal".to_string(), 7)));
        assert_eq!(parse_stub_uid("kitsu:7"), None);
        assert_eq!(parse_stub_uid("jikan:abc"), None);
    }

    #[test]
    fn test_model_round_trip_keeps_json_columns() {
        let mut r = record("mal:5", &["jikan:5", "shikimori:5"]);
        r.external_id = Some(ExternalId::Numeric(5));
        let active = to_active_model(&r, "t0".to_string(), "t1".to_string());

        let model = anime::Model {
            uid: active.uid.unwrap(),
            source: active.source.unwrap(),
            external_id: active.external_id.unwrap(),
            title: active.title.unwrap(),
            title_en: None,
            title_ru: None,
            title_uk: None,
            synopsis_en: None,
            synopsis_ru: None,
            synopsis_uk: None,
            episodes: None,
            score: None,
            status: None,
            url: None,
            image_small: None,
            image_large: None,
            legacy_uids: active.legacy_uids.unwrap(),
            source_refs: active.source_refs.unwrap(),
            created_at: "t0".to_string(),
            updated_at: "t1".to_string(),
        };

        assert_eq!(record_from_model(model), r);
    }
}
