//! Multi-provider catalog search: fan out, merge, localize, rank, cache.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::clients::SourceAdapter;
use crate::config::Config;
use crate::domain::{Lang, SourceKind};
use crate::models::anime::{CanonicalAnimeRecord, RawSourceItem};
use crate::services::cache::TtlCache;
use crate::services::localization::{LocalizationFiller, Translator};
use crate::services::merge::merge_catalog_results;
use crate::services::ranking::Ranker;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,
}

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
    pub lang: Option<Lang>,
    /// Provider names; unknown ones are ignored.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub limit: usize,
    pub lang: Option<Lang>,
    pub sources: Vec<SourceKind>,
    pub items: Vec<CanonicalAnimeRecord>,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub default_limit: usize,
    pub max_limit: usize,
    pub default_sources: Vec<SourceKind>,
}

impl SearchSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_limit: config.catalog.default_limit,
            max_limit: config.catalog.max_limit,
            default_sources: config.default_source_kinds(),
        }
    }

    fn clamp_limit(&self, limit: Option<usize>) -> usize {
        let max = self.max_limit.max(1);
        limit.unwrap_or(self.default_limit).clamp(1, max)
    }

    /// Trimmed, lowercased, deduplicated known sources, or the defaults when
    /// none remain.
    fn normalize_sources(&self, requested: &[String]) -> Vec<SourceKind> {
        let mut out: Vec<SourceKind> = Vec::new();
        for kind in requested.iter().filter_map(|s| SourceKind::parse(s)) {
            if !out.contains(&kind) {
                out.push(kind);
            }
        }
        if out.is_empty() {
            out.clone_from(&self.default_sources);
        }
        out
    }
}

/// `q:<query>|limit:<n>|lang:<lang|na>|src:<a,b>`
#[must_use]
pub fn cache_key(query: &str, limit: usize, lang: Option<Lang>, sources: &[SourceKind]) -> String {
    let lang = lang.map_or("na", |l| l.code());
    let sources: Vec<&str> = sources.iter().map(SourceKind::as_str).collect();
    format!("q:{query}|limit:{limit}|lang:{lang}|src:{}", sources.join(","))
}

pub struct CatalogSearchService {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    localizer: Option<LocalizationFiller>,
    ranker: Ranker,
    cache: TtlCache<SearchResponse>,
    settings: SearchSettings,
}

impl CatalogSearchService {
    #[must_use]
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        localizer: Option<LocalizationFiller>,
        ranker: Ranker,
        cache: TtlCache<SearchResponse>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            adapters,
            localizer,
            ranker,
            cache,
            settings,
        }
    }

    /// Wires the service from config. `translator` is ignored when
    /// localization is disabled.
    #[must_use]
    pub fn from_config(
        config: &Config,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        translator: Option<Arc<dyn Translator>>,
    ) -> Self {
        let localizer = translator
            .filter(|_| config.localization.enabled)
            .map(LocalizationFiller::new);

        Self::new(
            adapters,
            localizer,
            Ranker::new(config.catalog.match_ratio_bonus),
            TtlCache::new(config.catalog.cache_max_entries, config.catalog.cache_ttl()),
            SearchSettings::from_config(config),
        )
    }

    /// Runs a search, answering from the cache when an identical request
    /// was served recently. Provider failures only shrink the result set.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let query = request.query.trim().to_string();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let limit = self.settings.clamp_limit(request.limit);
        let sources = self.settings.normalize_sources(&request.sources);
        let key = cache_key(&query, limit, request.lang, &sources);

        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let raw = self.fetch_all(&query, limit, &sources).await;
        let merged = merge_catalog_results(&raw);
        let localized = match &self.localizer {
            Some(filler) => filler.fill_all(merged).await,
            None => merged,
        };
        let items: Vec<CanonicalAnimeRecord> = self
            .ranker
            .rank(&query, &localized)
            .into_iter()
            .map(|r| match request.lang {
                Some(lang) => r.localized(Some(lang)),
                None => r,
            })
            .collect();

        debug!(query = %query, raw = raw.len(), merged = items.len(), "Catalog search done");

        let response = SearchResponse {
            query,
            limit,
            lang: request.lang,
            sources,
            items,
        };
        self.cache.set(key, response.clone());
        Ok(response)
    }

    async fn fetch_all(&self, query: &str, limit: usize, sources: &[SourceKind]) -> Vec<RawSourceItem> {
        let adapters: Vec<&Arc<dyn SourceAdapter>> = sources
            .iter()
            .filter_map(|kind| self.adapters.iter().find(|a| a.kind() == *kind))
            .collect();

        let results = join_all(adapters.iter().map(|adapter| async move {
            match adapter.search(query, limit).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(source = %adapter.kind(), error = %e, "Source search failed");
                    vec![]
                }
            }
        }))
        .await;

        results.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExternalId;
    use crate::services::localization::tests::RecordingTranslator;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StaticAdapter {
        kind: SourceKind,
        items: Vec<RawSourceItem>,
        fail: bool,
        calls: AtomicUsize,
        limits: Mutex<Vec<usize>>,
    }

    impl StaticAdapter {
        fn new(kind: SourceKind, items: Vec<RawSourceItem>) -> Arc<Self> {
            Arc::new(Self {
                kind,
                items,
                fail: false,
                calls: AtomicUsize::new(0),
                limits: Mutex::new(vec![]),
            })
        }

        fn failing(kind: SourceKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                items: vec![],
                fail: true,
                calls: AtomicUsize::new(0),
                limits: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait::async_trait]
    impl SourceAdapter for StaticAdapter {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn search(&self, _query: &str, limit: usize) -> anyhow::Result<Vec<RawSourceItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.limits.lock().unwrap().push(limit);
            if self.fail {
                anyhow::bail!("provider down");
            }
            Ok(self.items.clone())
        }
    }

    fn item(source: &str, id: i64, title: &str) -> RawSourceItem {
        RawSourceItem {
            uid: format!("{source}:{id}"),
            source: source.to_string(),
            external_id: Some(ExternalId::Numeric(id)),
            title: title.to_string(),
            title_en: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn settings() -> SearchSettings {
        SearchSettings {
            default_limit: 10,
            max_limit: 50,
            default_sources: vec![SourceKind::Jikan, SourceKind::Shikimori],
        }
    }

    fn service(adapters: Vec<Arc<dyn SourceAdapter>>) -> CatalogSearchService {
        CatalogSearchService::new(
            adapters,
            None,
            Ranker::default(),
            TtlCache::new(16, Duration::from_secs(60)),
            settings(),
        )
    }

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_merges_and_ranks_across_providers() {
        let jikan = StaticAdapter::new(
            SourceKind::Jikan,
            vec![item("jikan", 1735, "Naruto Shippuden"), item("jikan", 20, "Naruto")],
        );
        let mut shiki_item = item("shikimori", 20, "Naruto");
        shiki_item.title_ru = Some("Наруто".to_string());
        let shikimori = StaticAdapter::new(SourceKind::Shikimori, vec![shiki_item]);

        let svc = service(vec![jikan, shikimori]);
        let response = svc.search(request("naruto")).await.unwrap();

        let uids: Vec<&str> = response.items.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids, vec!["mal:20", "mal:1735"]);
        assert_eq!(response.items[0].legacy_uids, vec!["shikimori:20", "jikan:20"]);
        assert_eq!(response.sources, vec![SourceKind::Jikan, SourceKind::Shikimori]);
    }

    #[tokio::test]
    async fn test_failing_provider_contributes_nothing() {
        let jikan = StaticAdapter::new(SourceKind::Jikan, vec![item("jikan", 20, "Naruto")]);
        let shikimori = StaticAdapter::failing(SourceKind::Shikimori);

        let svc = service(vec![jikan, shikimori.clone()]);
        let response = svc.search(request("naruto")).await.unwrap();

        assert_eq!(response.items.len(), 1);
        assert_eq!(shikimori.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_query_is_cached() {
        let jikan = StaticAdapter::new(SourceKind::Jikan, vec![item("jikan", 20, "Naruto")]);
        let svc = service(vec![jikan.clone()]);

        let first = svc.search(request(" naruto ")).await.unwrap();
        let second = svc.search(request("naruto")).await.unwrap();

        assert_eq!(jikan.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.items, second.items);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let svc = service(vec![]);
        assert_eq!(svc.search(request("   ")).await.unwrap_err(), SearchError::EmptyQuery);
    }

    #[tokio::test]
    async fn test_limit_is_clamped_and_passed_to_providers() {
        let anilist = StaticAdapter::new(SourceKind::Anilist, vec![]);
        let svc = service(vec![anilist.clone()]);

        let response = svc
            .search(SearchRequest {
                query: "x".to_string(),
                limit: Some(500),
                lang: None,
                sources: vec![" AniList ".to_string(), "kitsu".to_string(), "anilist".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(response.limit, 50);
        assert_eq!(response.sources, vec![SourceKind::Anilist]);
        assert_eq!(*anilist.limits.lock().unwrap(), vec![50]);
    }

    #[tokio::test]
    async fn test_localizes_when_translator_present() {
        let mut shiki_item = item("shikimori", 20, "Naruto");
        shiki_item.title_ru = Some("Наруто".to_string());
        let shikimori = StaticAdapter::new(SourceKind::Shikimori, vec![shiki_item]);

        let translator = Arc::new(RecordingTranslator::default());
        let svc = CatalogSearchService::new(
            vec![shikimori],
            Some(LocalizationFiller::new(translator.clone())),
            Ranker::default(),
            TtlCache::new(16, Duration::from_secs(60)),
            settings(),
        );

        let response = svc
            .search(SearchRequest {
                query: "naruto".to_string(),
                lang: Some(Lang::Uk),
                sources: vec!["shikimori".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        let record = &response.items[0];
        assert_eq!(record.title_uk.as_deref(), Some("uk(Наруто)"));
        assert_eq!(record.title, "uk(Наруто)");
        assert_eq!(translator.calls.lock().unwrap()[0].1, Lang::Ru);
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(
            cache_key("naruto", 10, None, &[SourceKind::Jikan, SourceKind::Shikimori]),
            "q:naruto|limit:10|lang:na|src:jikan,shikimori"
        );
        assert_eq!(
            cache_key("x", 1, Some(Lang::Ru), &[SourceKind::Anilist]),
            "q:x|limit:1|lang:ru|src:anilist"
        );
    }
}
