//! Tiered relevance scoring for catalog search.
//!
//! Tiers, checked per title variant: exact (1000), prefix (800 + bonus),
//! substring (600 + bonus), then edit-distance similarity scaled to at most
//! 500. A direct match always outranks a fuzzy one.

use std::cmp::Ordering;

use crate::constants::ranking::{
    DEFAULT_RATIO_BONUS, EXACT_SCORE, FUZZY_WEIGHT, PREFIX_BASE, SUBSTRING_BASE,
};
use crate::domain::source_priority;
use crate::models::anime::{CanonicalAnimeRecord, RawSourceItem};

/// Anything the ranker can order: raw provider hits or merged records.
pub trait RankCandidate {
    fn uid(&self) -> &str;
    fn source(&self) -> &str;
    /// `title`, `titleEn`, `titleRu`, `titleUk`, in that order.
    fn titles(&self) -> [Option<&str>; 4];
}

impl RankCandidate for RawSourceItem {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn titles(&self) -> [Option<&str>; 4] {
        [
            Some(self.title.as_str()),
            self.title_en.as_deref(),
            self.title_ru.as_deref(),
            self.title_uk.as_deref(),
        ]
    }
}

impl RankCandidate for CanonicalAnimeRecord {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn source(&self) -> &str {
        self.source.as_deref().unwrap_or_default()
    }

    fn titles(&self) -> [Option<&str>; 4] {
        [
            Some(self.title.as_str()),
            self.title_en.as_deref(),
            self.title_ru.as_deref(),
            self.title_uk.as_deref(),
        ]
    }
}

/// A candidate with everything its sort position depends on.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a, T> {
    pub item: &'a T,
    pub score: f64,
    pub source_priority: u32,
    pub uid: &'a str,
    pub original_index: usize,
}

impl<T> ScoredCandidate<'_, T> {
    fn sort_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.source_priority.cmp(&other.source_priority))
            .then_with(|| self.uid.cmp(other.uid))
            .then_with(|| self.original_index.cmp(&other.original_index))
    }
}

/// Lowercases, folds `ё` into `е`, replaces everything that is not a Latin or
/// Cyrillic letter or digit with a space, and collapses whitespace.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'ё' => 'е',
            '0'..='9' | 'a'..='z' | 'а'..='я' | 'і' | 'ї' | 'є' | 'ґ' => c,
            _ => ' ',
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `1 - distance / longest`, counted in chars, floored at 0.
#[allow(clippy::cast_precision_loss)]
fn similarity(query: &str, candidate: &str) -> f64 {
    if query == candidate {
        return 1.0;
    }
    let longest = query.chars().count().max(candidate.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(query, candidate);
    (1.0 - distance as f64 / longest as f64).max(0.0)
}

#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    ratio_bonus: f64,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_RATIO_BONUS)
    }
}

impl Ranker {
    /// `ratio_bonus` scales the `len(query)/len(candidate)` term added to the
    /// prefix and substring tiers. Keep it below 200 so tiers cannot overlap.
    #[must_use]
    pub const fn new(ratio_bonus: f64) -> Self {
        Self { ratio_bonus }
    }

    /// Best score of `query` against any of `titles`; 0 for a blank query.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score<'t>(&self, query: &str, titles: impl IntoIterator<Item = &'t str>) -> f64 {
        let q = normalize(query);
        if q.is_empty() {
            return 0.0;
        }
        let q_len = q.chars().count();

        titles
            .into_iter()
            .map(normalize)
            .filter(|c| !c.is_empty())
            .map(|c| {
                if c == q {
                    return EXACT_SCORE;
                }
                let ratio = q_len as f64 / c.chars().count().max(1) as f64;
                if c.starts_with(&q) {
                    PREFIX_BASE + ratio * self.ratio_bonus
                } else if c.contains(&q) {
                    SUBSTRING_BASE + ratio * self.ratio_bonus
                } else {
                    similarity(&q, &c) * FUZZY_WEIGHT
                }
            })
            .fold(0.0, f64::max)
    }

    /// Scores every candidate and returns them in final order.
    pub fn score_candidates<'a, T: RankCandidate>(
        &self,
        query: &str,
        items: &'a [T],
    ) -> Vec<ScoredCandidate<'a, T>> {
        let query = query.trim();

        let mut scored: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(original_index, item)| ScoredCandidate {
                item,
                score: self.score(query, item.titles().into_iter().flatten()),
                source_priority: source_priority(item.source()),
                uid: item.uid(),
                original_index,
            })
            .collect();

        scored.sort_by(ScoredCandidate::sort_cmp);
        scored
    }

    #[must_use]
    pub fn rank<T: RankCandidate + Clone>(&self, query: &str, items: &[T]) -> Vec<T> {
        self.score_candidates(query, items)
            .into_iter()
            .map(|c| c.item.clone())
            .collect()
    }
}

/// Ranks with the default bonus.
#[must_use]
pub fn rank_catalog_results<T: RankCandidate + Clone>(query: &str, items: &[T]) -> Vec<T> {
    Ranker::default().rank(query, items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(uid: &str, source: &str, title: &str) -> RawSourceItem {
        RawSourceItem {
            uid: uid.to_string(),
            source: source.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Naruto: Shippūden!! "), "naruto shipp den");
        assert_eq!(normalize("Ёлки-Палки"), "елки палки");
        assert_eq!(normalize("Атака   титанів"), "атака титанів");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_similarity_counts_chars() {
        assert!((similarity("naruto", "naruto") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("naruto", "nartuo") - (1.0 - 2.0 / 6.0)).abs() < 1e-9);
        assert!((similarity("наруто", "нарута") - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
        assert!(similarity("abc", "xyz").abs() < f64::EPSILON);
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tiers_strictly_decrease() {
        let ranker = Ranker::default();
        let exact = ranker.score("naruto", ["Naruto"]);
        let prefix = ranker.score("naruto", ["Naruto Shippuden"]);
        let substring = ranker.score("naruto", ["Best of Naruto moments"]);
        let fuzzy = ranker.score("naruto", ["Nartuo"]);

        assert!((exact - 1000.0).abs() < f64::EPSILON);
        assert!((prefix - 803.75).abs() < 1e-9);
        assert!(exact > prefix);
        assert!(prefix > substring);
        assert!(substring > 600.0);
        assert!(substring > fuzzy);
        assert!((fuzzy - 500.0 * (1.0 - 2.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_blank_query_scores_zero() {
        let ranker = Ranker::default();
        assert!(ranker.score("  ?! ", ["Naruto"]).abs() < f64::EPSILON);
        assert!(ranker.score("naruto", Vec::<&str>::new()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_best_variant_wins() {
        let ranker = Ranker::default();
        let score = ranker.score("наруто", ["Naruto", "Наруто"]);
        assert!((score - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_bonus_is_tunable() {
        let flat = Ranker::new(0.0);
        assert!((flat.score("naruto", ["Naruto Shippuden"]) - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let items = vec![
            candidate("jikan:4", "jikan", "Nartuo"),
            candidate("jikan:3", "jikan", "Best of Naruto moments"),
            candidate("jikan:2", "jikan", "Naruto Shippuden"),
            candidate("jikan:1", "jikan", "Naruto"),
        ];

        let uids: Vec<String> = rank_catalog_results("naruto", &items)
            .into_iter()
            .map(|c| c.uid)
            .collect();
        assert_eq!(uids, vec!["jikan:1", "jikan:2", "jikan:3", "jikan:4"]);
    }

    #[test]
    fn test_ties_break_by_priority_then_uid() {
        let items = vec![
            candidate("anilist:9", "anilist", "Monster"),
            candidate("jikan:19", "jikan", "Monster"),
            candidate("kitsu:1", "kitsu", "Monster"),
            candidate("shikimori:19", "shikimori", "Monster"),
            candidate("jikan:100", "jikan", "Monster"),
        ];

        let uids: Vec<String> = rank_catalog_results("monster", &items)
            .into_iter()
            .map(|c| c.uid)
            .collect();
        assert_eq!(
            uids,
            vec!["shikimori:19", "jikan:100", "jikan:19", "anilist:9", "kitsu:1"]
        );
    }

    #[test]
    fn test_rank_is_stable_under_reversal() {
        let items = vec![
            candidate("jikan:1", "jikan", "Monster"),
            candidate("shikimori:1", "shikimori", "Monster"),
            candidate("anilist:1", "anilist", "Monster Musume"),
            candidate("anilist:2", "anilist", "Monstr"),
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        assert_eq!(
            rank_catalog_results("monster", &items),
            rank_catalog_results("monster", &reversed)
        );
    }

    #[test]
    fn test_original_index_breaks_full_ties() {
        let items = vec![
            candidate("jikan:1", "jikan", "Same"),
            candidate("jikan:1", "jikan", "Same"),
        ];

        let scored = Ranker::default().score_candidates("same", &items);
        assert_eq!(scored[0].original_index, 0);
        assert_eq!(scored[1].original_index, 1);
    }
}
