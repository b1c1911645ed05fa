use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SourceAdapter, check_status, first_text};
use crate::constants::UNKNOWN_TITLE;
use crate::domain::{ExternalId, SourceKind};
use crate::models::anime::{RawSourceItem, non_empty};

const SEARCH_QUERY: &str = r"
    query ($search: String, $perPage: Int) {
        Page(page: 1, perPage: $perPage) {
            media(search: $search, type: ANIME) {
                id
                title { romaji english native }
                coverImage { medium large }
                episodes
                averageScore
                status
                siteUrl
            }
        }
    }
";

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
struct Variables<'a> {
    search: &'a str,
    #[serde(rename = "perPage")]
    per_page: usize,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    pub data: Option<Data>,
}

#[derive(Debug, Deserialize)]
pub struct Data {
    #[serde(rename = "Page")]
    pub page: Option<Page>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
pub struct Media {
    pub id: i64,
    pub title: Option<Title>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<CoverImage>,
    pub episodes: Option<i32>,
    #[serde(rename = "averageScore")]
    pub average_score: Option<f64>,
    pub status: Option<String>,
    #[serde(rename = "siteUrl")]
    pub site_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Title {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverImage {
    pub medium: Option<String>,
    pub large: Option<String>,
}

/// Maps one AniList media node. AniList ids are their own id space and are
/// never merged with MyAnimeList ones.
#[must_use]
pub fn map_anilist_media(media: Media) -> RawSourceItem {
    let title_en = media.title.as_ref().and_then(|t| {
        first_text([
            t.english.as_deref(),
            t.romaji.as_deref(),
            t.native.as_deref(),
        ])
    });
    let cover = media.cover_image.as_ref();
    let image_small = cover.and_then(|c| non_empty(c.medium.as_deref()));
    let image_large = cover
        .and_then(|c| non_empty(c.large.as_deref()))
        .or_else(|| image_small.clone());

    RawSourceItem {
        uid: format!("anilist:{}", media.id),
        source: SourceKind::Anilist.as_str().to_string(),
        external_id: Some(ExternalId::Numeric(media.id)),
        title: title_en.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        title_en,
        episodes: media.episodes,
        score: media
            .average_score
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| s / 10.0),
        status: non_empty(media.status.as_deref()),
        url: non_empty(media.site_url.as_deref()),
        image_small,
        image_large,
        ..Default::default()
    }
}

#[derive(Clone)]
pub struct AnilistClient {
    client: Client,
    api_url: String,
}

impl AnilistClient {
    #[must_use]
    pub fn new(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
        }
    }

    pub async fn search_anime(&self, query: &str, limit: usize) -> Result<Vec<Media>> {
        let request_body = GraphQLRequest {
            query: SEARCH_QUERY,
            variables: Variables {
                search: query,
                per_page: limit,
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request_body)
            .send()
            .await?;
        let response = check_status(response, "AniList").await?;

        let body: GraphQLResponse = response.json().await?;
        Ok(body
            .data
            .and_then(|d| d.page)
            .map(|p| p.media)
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl SourceAdapter for AnilistClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Anilist
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawSourceItem>> {
        let media = self.search_anime(query, limit).await?;
        Ok(media.into_iter().map(map_anilist_media).collect())
    }
}
