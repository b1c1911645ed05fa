//! Cross-provider deduplication of search hits.
//!
//! Items are grouped by identity, never by title: Jikan and Shikimori share the
//! MyAnimeList id space, so their hits for the same numeric id collapse into one
//! `mal:<id>` record. Every other item is its own group.

use std::collections::{BTreeMap, HashSet};

use crate::constants::UNKNOWN_TITLE;
use crate::domain::{ExternalId, SourceKind, source_priority};
use crate::models::anime::{CanonicalAnimeRecord, RawSourceItem, SourceRef, non_empty};

/// Grouping key for one item. `idx` only matters when the uid is blank.
#[must_use]
pub fn group_key(item: &RawSourceItem, idx: usize) -> String {
    if let Some(mal_id) = mal_id(item) {
        return format!("mal:{mal_id}");
    }

    let uid = item.uid.trim();
    if uid.is_empty() {
        format!("uid:idx:{idx}")
    } else {
        format!("uid:{uid}")
    }
}

fn mal_id(item: &RawSourceItem) -> Option<i64> {
    let kind = SourceKind::parse(&item.source)?;
    if !kind.shares_mal_ids() {
        return None;
    }
    item.external_id.as_ref()?.as_positive_int()
}

/// Source priority, then uid, then the serialized item, so members that share
/// a uid still land in the same order whatever the input order was.
fn priority_key(item: &RawSourceItem) -> (u32, String, String) {
    (
        source_priority(&item.source),
        item.uid.clone(),
        serde_json::to_string(item).unwrap_or_default(),
    )
}

/// Merges provider hits into canonical records, sorted by group key.
///
/// The output depends only on the multiset of inputs: any permutation of
/// `items` yields an identical vector.
#[must_use]
pub fn merge_catalog_results(items: &[RawSourceItem]) -> Vec<CanonicalAnimeRecord> {
    let mut groups: BTreeMap<String, Vec<&RawSourceItem>> = BTreeMap::new();

    for (idx, item) in items.iter().enumerate() {
        groups.entry(group_key(item, idx)).or_default().push(item);
    }

    groups
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(key, mut members)| {
            members.sort_by_cached_key(|it| priority_key(it));
            match key.strip_prefix("mal:").and_then(|id| id.parse::<i64>().ok()) {
                Some(mal_id) => merge_group(&members, key.clone(), mal_id),
                None => pass_through(&members),
            }
        })
        .collect()
}

type Field = for<'a> fn(&'a RawSourceItem) -> Option<&'a str>;

fn title_of(it: &RawSourceItem) -> Option<&str> {
    Some(it.title.as_str())
}

fn title_en_of(it: &RawSourceItem) -> Option<&str> {
    it.title_en.as_deref()
}

fn title_ru_of(it: &RawSourceItem) -> Option<&str> {
    it.title_ru.as_deref()
}

fn title_uk_of(it: &RawSourceItem) -> Option<&str> {
    it.title_uk.as_deref()
}

fn synopsis_en_of(it: &RawSourceItem) -> Option<&str> {
    it.synopsis_en.as_deref()
}

fn synopsis_ru_of(it: &RawSourceItem) -> Option<&str> {
    it.synopsis_ru.as_deref()
}

fn synopsis_uk_of(it: &RawSourceItem) -> Option<&str> {
    it.synopsis_uk.as_deref()
}

fn status_of(it: &RawSourceItem) -> Option<&str> {
    it.status.as_deref()
}

fn url_of(it: &RawSourceItem) -> Option<&str> {
    it.url.as_deref()
}

fn image_small_of(it: &RawSourceItem) -> Option<&str> {
    it.image_small.as_deref()
}

fn image_large_of(it: &RawSourceItem) -> Option<&str> {
    it.image_large.as_deref()
}

/// First non-blank value, walking items in order and each item's fields in order.
fn first_text(items: &[&RawSourceItem], fields: &[Field]) -> Option<String> {
    items
        .iter()
        .find_map(|item| fields.iter().find_map(|get| non_empty(get(item))))
}

fn from_source<'a>(items: &[&'a RawSourceItem], kind: SourceKind) -> Vec<&'a RawSourceItem> {
    items
        .iter()
        .copied()
        .filter(|it| SourceKind::parse(&it.source) == Some(kind))
        .collect()
}

fn build_source_refs(items: &[&RawSourceItem]) -> BTreeMap<String, SourceRef> {
    let mut refs = BTreeMap::new();
    for item in items {
        let source = item.source.trim().to_ascii_lowercase();
        if source.is_empty() {
            continue;
        }
        refs.entry(source)
            .or_insert_with(|| SourceRef::from_item(item));
    }
    refs
}

fn ordered_unique<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

fn merge_group(ordered: &[&RawSourceItem], uid: String, mal_id: i64) -> CanonicalAnimeRecord {
    let en_native = from_source(ordered, SourceKind::Jikan);
    let ru_native = from_source(ordered, SourceKind::Shikimori);

    let title_en = first_text(&en_native, &[title_en_of as Field, title_of])
        .or_else(|| first_text(ordered, &[title_en_of as Field, title_of]));
    let title_ru = first_text(&ru_native, &[title_ru_of as Field, title_of])
        .or_else(|| first_text(ordered, &[title_ru_of as Field]));
    let title_uk = first_text(ordered, &[title_uk_of as Field]);

    let synopsis_en = first_text(&en_native, &[synopsis_en_of as Field])
        .or_else(|| first_text(ordered, &[synopsis_en_of as Field]));
    let synopsis_ru = first_text(&ru_native, &[synopsis_ru_of as Field])
        .or_else(|| first_text(ordered, &[synopsis_ru_of as Field]));
    let synopsis_uk = first_text(ordered, &[synopsis_uk_of as Field]);

    let title = title_ru
        .clone()
        .or_else(|| title_en.clone())
        .or_else(|| first_text(ordered, &[title_of as Field]))
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let primary_source = ordered
        .first()
        .map(|it| it.source.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty());

    CanonicalAnimeRecord {
        uid,
        source: primary_source,
        external_id: Some(ExternalId::Numeric(mal_id)),
        title,
        title_en,
        title_ru,
        title_uk,
        synopsis_en,
        synopsis_ru,
        synopsis_uk,
        episodes: ordered.iter().find_map(|it| it.episodes),
        score: ordered
            .iter()
            .find_map(|it| it.score.filter(|s| s.is_finite())),
        status: first_text(ordered, &[status_of as Field]),
        url: first_text(ordered, &[url_of as Field]),
        image_small: first_text(ordered, &[image_small_of as Field]),
        image_large: first_text(ordered, &[image_large_of as Field, image_small_of]),
        legacy_uids: ordered_unique(ordered.iter().map(|it| it.uid.as_str())),
        source_refs: build_source_refs(ordered),
    }
}

fn pass_through(group: &[&RawSourceItem]) -> CanonicalAnimeRecord {
    let item = group[0];

    CanonicalAnimeRecord {
        uid: item.uid.clone(),
        source: non_empty(Some(&item.source)),
        external_id: item.external_id.clone(),
        title: non_empty(Some(&item.title)).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        title_en: item.title_en.clone(),
        title_ru: item.title_ru.clone(),
        title_uk: item.title_uk.clone(),
        synopsis_en: item.synopsis_en.clone(),
        synopsis_ru: item.synopsis_ru.clone(),
        synopsis_uk: item.synopsis_uk.clone(),
        episodes: item.episodes,
        score: item.score,
        status: item.status.clone(),
        url: item.url.clone(),
        image_small: item.image_small.clone(),
        image_large: item.image_large.clone(),
        legacy_uids: ordered_unique([item.uid.as_str()]),
        source_refs: build_source_refs(group),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(uid: &str, source: &str, external_id: i64) -> RawSourceItem {
        RawSourceItem {
            uid: uid.to_string(),
            source: source.to_string(),
            external_id: Some(ExternalId::Numeric(external_id)),
            title: String::new(),
            ..Default::default()
        }
    }

    fn initial_d_pair() -> Vec<RawSourceItem> {
        let mut jikan = item("jikan:185", "jikan", 185);
        jikan.title = "Initial D First Stage".to_string();
        jikan.title_en = Some("Initial D First Stage".to_string());
        jikan.synopsis_en = Some("Street racing anime.".to_string());
        jikan.score = Some(8.36);

        let mut shiki = item("shikimori:185", "shikimori", 185);
        shiki.title = "Initial D First Stage".to_string();
        shiki.title_ru = Some("Инициал Ди: Первая стадия".to_string());
        shiki.synopsis_ru = Some("Аниме о уличных гонках.".to_string());
        shiki.score = Some(8.36);

        vec![jikan, shiki]
    }

    fn permutations(items: &[RawSourceItem]) -> Vec<Vec<RawSourceItem>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn test_merges_shared_mal_id() {
        let merged = merge_catalog_results(&initial_d_pair());

        assert_eq!(merged.len(), 1);
        let record = &merged[0];
        assert_eq!(record.uid, "mal:185");
        assert_eq!(record.source.as_deref(), Some("shikimori"));
        assert_eq!(record.external_id, Some(ExternalId::Numeric(185)));
        assert_eq!(record.title_ru.as_deref(), Some("Инициал Ди: Первая стадия"));
        assert_eq!(record.title_en.as_deref(), Some("Initial D First Stage"));
        assert_eq!(record.title, "Инициал Ди: Первая стадия");
        assert_eq!(record.synopsis_en.as_deref(), Some("Street racing anime."));
        assert_eq!(record.synopsis_ru.as_deref(), Some("Аниме о уличных гонках."));
        assert_eq!(record.legacy_uids, vec!["shikimori:185", "jikan:185"]);
        assert_eq!(record.source_refs.len(), 2);
        assert_eq!(
            record.source_refs["jikan"].external_id,
            Some(ExternalId::Numeric(185))
        );
        assert_eq!(
            record.source_refs["shikimori"].external_id,
            Some(ExternalId::Numeric(185))
        );
    }

    #[test]
    fn test_merge_is_idempotent_and_order_independent() {
        let mut items = initial_d_pair();
        let mut other = item("anilist:1", "anilist", 1);
        other.title = "Cowboy Bebop".to_string();
        items.push(other);
        let mut jikan_only = item("jikan:20", "jikan", 20);
        jikan_only.title = "Naruto".to_string();
        items.push(jikan_only);

        let expected = merge_catalog_results(&items);
        assert_eq!(merge_catalog_results(&items), expected);

        for permutation in permutations(&items) {
            assert_eq!(merge_catalog_results(&permutation), expected);
        }
    }

    #[test]
    fn test_duplicate_uids_merge_the_same_in_any_order() {
        let mut a = item("jikan:185", "jikan", 185);
        a.title = "A".to_string();
        a.title_en = Some("A".to_string());
        a.episodes = Some(1);
        let mut b = item("jikan:185", "jikan", 185);
        b.title = "B".to_string();
        b.title_en = Some("B".to_string());
        b.episodes = Some(2);

        let forward = merge_catalog_results(&[a.clone(), b.clone()]);
        let reversed = merge_catalog_results(&[b, a]);
        assert_eq!(forward, reversed);
        assert_eq!(forward[0].legacy_uids, vec!["jikan:185"]);
    }

    #[test]
    fn test_duplicate_singletons_pass_through_the_same_in_any_order() {
        let mut a = item("anilist:5", "anilist", 5);
        a.title = "A".to_string();
        let mut b = item("anilist:5", "anilist", 5);
        b.title = "B".to_string();

        let forward = merge_catalog_results(&[a.clone(), b.clone()]);
        let reversed = merge_catalog_results(&[b, a]);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_distinct_non_mal_ids_never_merge() {
        let mut a = item("anilist:100", "anilist", 100);
        a.title = "Same Title".to_string();
        let mut b = item("anilist:101", "anilist", 101);
        b.title = "Same Title".to_string();

        let merged = merge_catalog_results(&[a, b]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].uid, "anilist:100");
        assert_eq!(merged[1].uid, "anilist:101");
    }

    #[test]
    fn test_anilist_with_same_numeric_id_stays_separate() {
        let mut items = initial_d_pair();
        items.push(item("anilist:185", "anilist", 185));

        let merged = merge_catalog_results(&items);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].uid, "mal:185");
        assert_eq!(merged[1].uid, "anilist:185");
    }

    #[test]
    fn test_malformed_external_id_is_not_grouped() {
        let mut bad = item("jikan:abc", "jikan", 0);
        bad.external_id = Some(ExternalId::from("abc"));
        let mut missing = item("shikimori:x", "shikimori", 0);
        missing.external_id = None;
        let zero = item("jikan:0", "jikan", 0);

        assert_eq!(group_key(&bad, 0), "uid:jikan:abc");
        assert_eq!(group_key(&missing, 1), "uid:shikimori:x");
        assert_eq!(group_key(&zero, 2), "uid:jikan:0");
        assert_eq!(merge_catalog_results(&[bad, missing, zero]).len(), 3);
    }

    #[test]
    fn test_text_external_id_still_groups() {
        let mut shiki = item("shikimori:185", "shikimori", 0);
        shiki.external_id = Some(ExternalId::from("185"));
        let jikan = item("jikan:185", "jikan", 185);

        let merged = merge_catalog_results(&[jikan, shiki]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].uid, "mal:185");
    }

    #[test]
    fn test_singleton_passes_through() {
        let mut solo = item("anilist:5", "anilist", 5);
        solo.title = "Cowboy Bebop".to_string();
        solo.url = Some("https://anilist.co/anime/1".to_string());

        let merged = merge_catalog_results(&[solo]);
        let record = &merged[0];
        assert_eq!(record.uid, "anilist:5");
        assert_eq!(record.title, "Cowboy Bebop");
        assert_eq!(record.legacy_uids, vec!["anilist:5"]);
        assert_eq!(record.source_refs["anilist"].uid, "anilist:5");
        assert!(record.synopsis_uk.is_none());
    }

    #[test]
    fn test_scalar_fields_take_first_in_priority_order() {
        let mut jikan = item("jikan:1", "jikan", 1);
        jikan.episodes = Some(26);
        jikan.status = Some("Finished Airing".to_string());
        jikan.image_small = Some("https://img/j-small.jpg".to_string());

        let mut shiki = item("shikimori:1", "shikimori", 1);
        shiki.status = Some("released".to_string());
        shiki.image_large = Some("  ".to_string());

        let merged = merge_catalog_results(&[jikan, shiki]);
        let record = &merged[0];
        assert_eq!(record.episodes, Some(26));
        assert_eq!(record.status.as_deref(), Some("released"));
        assert_eq!(record.image_small.as_deref(), Some("https://img/j-small.jpg"));
        assert_eq!(record.image_large.as_deref(), Some("https://img/j-small.jpg"));
        assert_eq!(record.title, "Unknown title");
    }

    #[test]
    fn test_title_ru_falls_back_to_any_provider() {
        let mut jikan = item("jikan:7", "jikan", 7);
        jikan.title = "Mushishi".to_string();
        jikan.title_ru = Some("Мастер Муси".to_string());

        let merged = merge_catalog_results(&[jikan]);
        assert_eq!(merged[0].title_ru.as_deref(), Some("Мастер Муси"));
        assert_eq!(merged[0].title_en.as_deref(), Some("Mushishi"));
        assert_eq!(merged[0].title, "Мастер Муси");
    }

    #[test]
    fn test_groups_sorted_by_key() {
        let items = vec![
            item("anilist:2", "anilist", 2),
            item("jikan:30", "jikan", 30),
            item("jikan:4", "jikan", 4),
        ];

        let uids: Vec<String> = merge_catalog_results(&items)
            .into_iter()
            .map(|r| r.uid)
            .collect();
        assert_eq!(uids, vec!["mal:30", "mal:4", "anilist:2"]);
    }
}
