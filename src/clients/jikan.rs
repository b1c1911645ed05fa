use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use super::{SourceAdapter, check_status, first_text, score_to_number};
use crate::constants::UNKNOWN_TITLE;
use crate::domain::{ExternalId, SourceKind};
use crate::models::anime::{RawSourceItem, non_empty};

#[derive(Debug, Deserialize)]
pub struct JikanSearchResponse {
    #[serde(default)]
    pub data: Vec<MalAnime>,
}

#[derive(Debug, Deserialize)]
pub struct MalAnime {
    pub mal_id: i64,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub episodes: Option<i32>,
    pub score: Option<serde_json::Value>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub synopsis: Option<String>,
    pub images: Option<MalImages>,
}

#[derive(Debug, Deserialize)]
pub struct MalImages {
    pub jpg: Option<MalImageSet>,
}

#[derive(Debug, Deserialize)]
pub struct MalImageSet {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

/// Maps one Jikan search hit. Jikan mirrors MyAnimeList ids.
#[must_use]
pub fn map_jikan_anime(anime: MalAnime) -> RawSourceItem {
    let title_en = first_text([
        anime.title_english.as_deref(),
        anime.title.as_deref(),
        anime.title_japanese.as_deref(),
    ]);
    let jpg = anime.images.and_then(|i| i.jpg);
    let image_small = jpg.as_ref().and_then(|j| non_empty(j.image_url.as_deref()));
    let image_large = jpg
        .as_ref()
        .and_then(|j| non_empty(j.large_image_url.as_deref()))
        .or_else(|| image_small.clone());

    RawSourceItem {
        uid: format!("jikan:{}", anime.mal_id),
        source: SourceKind::Jikan.as_str().to_string(),
        external_id: Some(ExternalId::Numeric(anime.mal_id)),
        title: title_en.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        title_en,
        synopsis_en: non_empty(anime.synopsis.as_deref()),
        episodes: anime.episodes,
        score: score_to_number(anime.score.as_ref()),
        status: non_empty(anime.status.as_deref()),
        url: non_empty(anime.url.as_deref()),
        image_small,
        image_large,
        ..Default::default()
    }
}

#[derive(Clone)]
pub struct JikanClient {
    client: Client,
    base_url: String,
}

impl JikanClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search_anime(&self, query: &str, limit: usize) -> Result<Vec<MalAnime>> {
        let url = format!(
            "{}/anime?q={}&limit={}&sfw=true",
            self.base_url,
            urlencoding::encode(query),
            limit
        );
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = check_status(response, "Jikan").await?;

        let body: JikanSearchResponse = response.json().await?;
        Ok(body.data)
    }
}

#[async_trait::async_trait]
impl SourceAdapter for JikanClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Jikan
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawSourceItem>> {
        let hits = self.search_anime(query, limit).await?;
        Ok(hits.into_iter().map(map_jikan_anime).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_FIXTURE: &str = r#"{
        "data": [
            {
                "mal_id": 185,
                "url": "https://myanimelist.net/anime/185/Initial_D_First_Stage",
                "images": {
                    "jpg": {
                        "image_url": "https://cdn.myanimelist.net/images/anime/9/185.jpg",
                        "large_image_url": "https://cdn.myanimelist.net/images/anime/9/185l.jpg"
                    }
                },
                "title": "Initial D First Stage",
                "title_english": null,
                "title_japanese": "頭文字〈イニシャル〉D FIRST STAGE",
                "episodes": 26,
                "status": "Finished Airing",
                "score": 8.36,
                "synopsis": "Street racing anime."
            },
            {
                "mal_id": 7,
                "title": "",
                "title_japanese": "  ",
                "images": { "jpg": { "image_url": "https://cdn/7.jpg" } }
            }
        ]
    }"#;

    fn fixture() -> Vec<RawSourceItem> {
        let body: JikanSearchResponse = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        body.data.into_iter().map(map_jikan_anime).collect()
    }

    #[test]
    fn test_maps_search_hit() {
        let items = fixture();
        let item = &items[0];

        assert_eq!(item.uid, "jikan:185");
        assert_eq!(item.source, "jikan");
        assert_eq!(item.external_id, Some(ExternalId::Numeric(185)));
        assert_eq!(item.title, "Initial D First Stage");
        assert_eq!(item.title_en.as_deref(), Some("Initial D First Stage"));
        assert!(item.title_ru.is_none());
        assert_eq!(item.synopsis_en.as_deref(), Some("Street racing anime."));
        assert_eq!(item.episodes, Some(26));
        assert_eq!(item.score, Some(8.36));
        assert_eq!(
            item.image_large.as_deref(),
            Some("https://cdn.myanimelist.net/images/anime/9/185l.jpg")
        );
    }

    #[test]
    fn test_sparse_hit_falls_back() {
        let items = fixture();
        let item = &items[1];

        assert_eq!(item.title, UNKNOWN_TITLE);
        assert!(item.title_en.is_none());
        assert_eq!(item.image_large.as_deref(), Some("https://cdn/7.jpg"));
        assert!(item.score.is_none());
    }
}
