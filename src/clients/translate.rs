use std::time::Duration;

use anyhow::Result;
use reqwest::Client;

use super::{check_status, http_client};
use crate::config::LocalizationConfig;
use crate::domain::Lang;
use crate::services::cache::TtlCache;
use crate::services::localization::Translator;

/// Best-effort client for the public `gtx` translate endpoint, with its own
/// result cache.
pub struct TranslateClient {
    client: Client,
    endpoint: String,
    cache: TtlCache<String>,
}

impl TranslateClient {
    #[must_use]
    pub fn new(client: Client, endpoint: &str, cache: TtlCache<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            cache,
        }
    }

    #[must_use]
    pub fn from_config(config: &LocalizationConfig, user_agent: &str) -> Self {
        let cache = TtlCache::new(
            config.cache_max_entries,
            Duration::from_secs(config.cache_ttl_hours.saturating_mul(3600)),
        );
        Self::new(
            http_client(user_agent, config.request_timeout_seconds),
            &config.endpoint,
            cache,
        )
    }
}

/// Concatenates the translated segments of a `gtx` response
/// (`json[0][i][0]`).
#[must_use]
pub fn join_gtx_segments(body: &serde_json::Value) -> String {
    body.get(0)
        .and_then(serde_json::Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get(0).and_then(serde_json::Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[async_trait::async_trait]
impl Translator for TranslateClient {
    async fn translate(&self, text: &str, from: Lang, to: Lang) -> Result<String> {
        let input = text.trim();
        if input.is_empty() {
            anyhow::bail!("Nothing to translate");
        }
        if from == to {
            return Ok(input.to_string());
        }

        let key = format!("{from}:{to}:{input}");
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let url = format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.endpoint,
            from.code(),
            to.code(),
            urlencoding::encode(input)
        );
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = check_status(response, "Translate").await?;

        let body: serde_json::Value = response.json().await?;
        let translated = join_gtx_segments(&body);
        if translated.is_empty() {
            anyhow::bail!("Translate API returned no text");
        }

        self.cache.set(key, translated.clone());
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_gtx_segments() {
        let body = json!([
            [["Наруто. ", "Наруто. ", null], ["Історія ніндзя.", "История ниндзя.", null]],
            null,
            "ru"
        ]);
        assert_eq!(join_gtx_segments(&body), "Наруто. Історія ніндзя.");
    }

    #[test]
    fn test_join_gtx_segments_handles_garbage() {
        assert_eq!(join_gtx_segments(&json!({"error": 1})), "");
        assert_eq!(join_gtx_segments(&json!([null])), "");
    }

    #[tokio::test]
    async fn test_same_language_skips_network() {
        let client = TranslateClient::new(
            Client::new(),
            "http://127.0.0.1:9/unused",
            TtlCache::new(4, Duration::from_secs(60)),
        );
        let out = client.translate(" Naruto ", Lang::En, Lang::En).await.unwrap();
        assert_eq!(out, "Naruto");
        assert!(client.translate("  ", Lang::Ru, Lang::Uk).await.is_err());
    }

    #[tokio::test]
    async fn test_cached_translation_is_reused() {
        let cache = TtlCache::new(4, Duration::from_secs(60));
        cache.set("ru:uk:Наруто", "Наруто (uk)".to_string());
        let client = TranslateClient::new(Client::new(), "http://127.0.0.1:9/unused", cache);

        let out = client.translate("Наруто", Lang::Ru, Lang::Uk).await.unwrap();
        assert_eq!(out, "Наруто (uk)");
    }
}
