//! Metadata provider adapters and the translation client.
//!
//! Each adapter turns one provider's search response into [`RawSourceItem`]s.
//! Mapping lives in pure `map_*` functions so it can be tested against
//! recorded JSON without the network.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::warn;

use crate::config::SourcesConfig;
use crate::domain::SourceKind;
use crate::models::anime::{RawSourceItem, non_empty};

pub mod anilist;
pub mod jikan;
pub mod shikimori;
pub mod translate;

pub use anilist::AnilistClient;
pub use jikan::JikanClient;
pub use shikimori::ShikimoriClient;
pub use translate::TranslateClient;

/// One metadata provider's search endpoint.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Searches the provider for `query`, asking for at most `limit` hits.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures, non-2xx statuses and bodies
    /// that do not parse.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawSourceItem>>;
}

/// All known adapters, built from the `[sources]` config.
#[must_use]
pub fn build_adapters(config: &SourcesConfig) -> Vec<Arc<dyn SourceAdapter>> {
    let client = http_client(&config.user_agent, config.request_timeout_seconds);
    vec![
        Arc::new(ShikimoriClient::new(
            client.clone(),
            &config.shikimori_url,
            &config.shikimori_web_url,
        )),
        Arc::new(JikanClient::new(client.clone(), &config.jikan_url)),
        Arc::new(AnilistClient::new(client, &config.anilist_url)),
    ]
}

/// Client with the configured User-Agent and timeout. A failed build falls
/// back to a bare client and logs, since Shikimori rejects requests without
/// a User-Agent.
pub(crate) fn http_client(user_agent: &str, timeout_seconds: u64) -> Client {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, user_agent, "Failed to build HTTP client, using defaults");
            Client::new()
        })
}

/// Fails with the status and body on a non-2xx response.
pub(crate) async fn check_status(
    response: reqwest::Response,
    provider: &str,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(anyhow::anyhow!("{} API error: {} - {}", provider, status, body))
}

/// First non-blank value, trimmed.
pub(crate) fn first_text<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    values.into_iter().find_map(non_empty)
}

/// Providers send scores as numbers or numeric strings.
pub(crate) fn score_to_number(value: Option<&serde_json::Value>) -> Option<f64> {
    let n = match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}
