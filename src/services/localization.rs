//! Fills Ukrainian title and synopsis for catalog records.
//!
//! Russian is the preferred source text since it translates into Ukrainian far
//! better than English does; English is used only when Russian is missing.

use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::domain::Lang;
use crate::models::anime::{CanonicalAnimeRecord, non_empty};

/// Text translation collaborator.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` from `from` into `to`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unreachable or answers with
    /// something unusable. Callers treat that as "no translation".
    async fn translate(&self, text: &str, from: Lang, to: Lang) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct LocalizationFiller {
    translator: Arc<dyn Translator>,
}

impl LocalizationFiller {
    #[must_use]
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Populates `title_uk` and `synopsis_uk` when absent. Present values are
    /// never replaced, and a failed translation leaves the field `None`.
    pub async fn fill(&self, mut record: CanonicalAnimeRecord) -> CanonicalAnimeRecord {
        record.title_uk = non_empty(record.title_uk.as_deref());
        record.synopsis_uk = non_empty(record.synopsis_uk.as_deref());

        if record.title_uk.is_none() {
            record.title_uk = self
                .to_ukrainian(record.title_ru.as_deref(), record.title_en.as_deref())
                .await;
        }

        if record.synopsis_uk.is_none() {
            record.synopsis_uk = self
                .to_ukrainian(record.synopsis_ru.as_deref(), record.synopsis_en.as_deref())
                .await;
        }

        record
    }

    /// Localizes every record concurrently, keeping input order.
    pub async fn fill_all(&self, records: Vec<CanonicalAnimeRecord>) -> Vec<CanonicalAnimeRecord> {
        join_all(records.into_iter().map(|r| self.fill(r))).await
    }

    async fn to_ukrainian(&self, ru: Option<&str>, en: Option<&str>) -> Option<String> {
        let (text, from) = match (non_empty(ru), non_empty(en)) {
            (Some(ru), _) => (ru, Lang::Ru),
            (None, Some(en)) => (en, Lang::En),
            (None, None) => return None,
        };

        match self.translator.translate(&text, from, Lang::Uk).await {
            Ok(out) => non_empty(Some(&out)),
            Err(e) => {
                debug!(from = %from, error = %e, "Translation unavailable");
                None
            }
        }
    }
}
