use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use super::{SourceAdapter, check_status, first_text, score_to_number};
use crate::constants::UNKNOWN_TITLE;
use crate::domain::{ExternalId, SourceKind};
use crate::models::anime::{RawSourceItem, non_empty};

#[derive(Debug, Deserialize)]
pub struct ShikimoriAnime {
    pub id: i64,
    pub name: Option<String>,
    pub russian: Option<String>,
    pub description: Option<String>,
    pub episodes: Option<i32>,
    pub score: Option<serde_json::Value>,
    pub status: Option<String>,
    pub image: Option<ShikimoriImage>,
}

#[derive(Debug, Deserialize)]
pub struct ShikimoriImage {
    pub original: Option<String>,
    pub preview: Option<String>,
}

/// Absolute URL for a Shikimori asset path, which the API often returns
/// relative to the site origin.
#[must_use]
pub fn asset_url(origin: &str, path: Option<&str>) -> Option<String> {
    let path = non_empty(path)?;
    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path);
    }
    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{origin}{path}"))
    } else {
        Some(format!("{origin}/{path}"))
    }
}

/// Maps one Shikimori search hit. Shikimori ids are MyAnimeList ids.
#[must_use]
pub fn map_shikimori_anime(anime: ShikimoriAnime, web_url: &str) -> RawSourceItem {
    let name = non_empty(anime.name.as_deref());
    let russian = non_empty(anime.russian.as_deref());
    let title = first_text([name.as_deref(), russian.as_deref()])
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let origin = site_origin(web_url);
    let image = anime.image.as_ref();

    RawSourceItem {
        uid: format!("shikimori:{}", anime.id),
        source: SourceKind::Shikimori.as_str().to_string(),
        external_id: Some(ExternalId::Numeric(anime.id)),
        title_en: Some(name.unwrap_or_else(|| title.clone())),
        title_ru: russian,
        title,
        synopsis_ru: non_empty(anime.description.as_deref()),
        episodes: anime.episodes,
        score: score_to_number(anime.score.as_ref()),
        status: non_empty(anime.status.as_deref()),
        url: Some(format!("{}/animes/{}", web_url.trim_end_matches('/'), anime.id)),
        image_small: asset_url(&origin, image.and_then(|i| i.preview.as_deref())),
        image_large: asset_url(&origin, image.and_then(|i| i.original.as_deref())),
        ..Default::default()
    }
}

/// Scheme and host of `web_url`; the input itself if it does not parse.
fn site_origin(web_url: &str) -> String {
    url::Url::parse(web_url).map_or_else(
        |_| web_url.trim_end_matches('/').to_string(),
        |u| u.origin().ascii_serialization(),
    )
}

#[derive(Clone)]
pub struct ShikimoriClient {
    client: Client,
    base_url: String,
    web_url: String,
}

impl ShikimoriClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str, web_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            web_url: web_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search_anime(&self, query: &str, limit: usize) -> Result<Vec<ShikimoriAnime>> {
        let url = format!(
            "{}/animes?search={}&limit={}",
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
        let response = check_status(response, "Shikimori").await?;

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ShikimoriClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Shikimori
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawSourceItem>> {
        let hits = self.search_anime(query, limit).await?;
        Ok(hits
            .into_iter()
            .map(|a| map_shikimori_anime(a, &self.web_url))
            .collect())
    }
}
