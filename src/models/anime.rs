use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::UNKNOWN_TITLE;
use crate::domain::{ExternalId, Lang};

/// One provider's search hit, mapped into the shared schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceItem {
    pub uid: String,
    pub source: String,
    pub external_id: Option<ExternalId>,
    pub title: String,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_ru: Option<String>,
    #[serde(default)]
    pub title_uk: Option<String>,
    #[serde(default)]
    pub synopsis_en: Option<String>,
    #[serde(default)]
    pub synopsis_ru: Option<String>,
    #[serde(default)]
    pub synopsis_uk: Option<String>,
    #[serde(default)]
    pub episodes: Option<i32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_small: Option<String>,
    #[serde(default)]
    pub image_large: Option<String>,
}

/// Where a canonical record came from on one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub uid: String,
    pub external_id: Option<ExternalId>,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl SourceRef {
    #[must_use]
    pub fn from_item(item: &RawSourceItem) -> Self {
        Self {
            uid: item.uid.clone(),
            external_id: item.external_id.as_ref().and_then(ExternalId::normalized),
            url: non_empty(item.url.as_deref()),
            title: non_empty(Some(&item.title)),
        }
    }
}

/// The merged, persisted view of one real-world title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalAnimeRecord {
    pub uid: String,
    pub source: Option<String>,
    pub external_id: Option<ExternalId>,
    pub title: String,
    pub title_en: Option<String>,
    pub title_ru: Option<String>,
    pub title_uk: Option<String>,
    pub synopsis_en: Option<String>,
    pub synopsis_ru: Option<String>,
    pub synopsis_uk: Option<String>,
    pub episodes: Option<i32>,
    pub score: Option<f64>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    #[serde(default)]
    pub legacy_uids: Vec<String>,
    #[serde(default)]
    pub source_refs: BTreeMap<String, SourceRef>,
}

impl CanonicalAnimeRecord {
    /// Placeholder row for an identifier the catalog has not fetched yet.
    #[must_use]
    pub fn stub(uid: &str, source: Option<String>, external_id: Option<ExternalId>) -> Self {
        Self {
            uid: uid.to_string(),
            source,
            external_id,
            title: UNKNOWN_TITLE.to_string(),
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
            legacy_uids: Vec::new(),
            source_refs: BTreeMap::new(),
        }
    }

    /// Title to show a user who reads `lang`.
    #[must_use]
    pub fn title_for(&self, lang: Option<Lang>) -> String {
        pick_title_by_lang(
            self.title_en.as_deref().or(Some(self.title.as_str())),
            self.title_ru.as_deref(),
            self.title_uk.as_deref(),
            lang,
        )
    }

    /// Copy with `title` replaced by the localized title.
    #[must_use]
    pub fn localized(mut self, lang: Option<Lang>) -> Self {
        self.title = self.title_for(lang);
        self
    }
}

/// `ru` and `uk` readers get their locale when present; everyone else gets
/// English, then whatever exists.
#[must_use]
pub fn pick_title_by_lang(
    en: Option<&str>,
    ru: Option<&str>,
    uk: Option<&str>,
    lang: Option<Lang>,
) -> String {
    let en = en.map(str::trim).filter(|s| !s.is_empty());
    let ru = ru.map(str::trim).filter(|s| !s.is_empty());
    let uk = uk.map(str::trim).filter(|s| !s.is_empty());

    let preferred = match lang {
        Some(Lang::Ru) => ru,
        Some(Lang::Uk) => uk,
        _ => None,
    };

    preferred
        .or(en)
        .or(ru)
        .or(uk)
        .unwrap_or(UNKNOWN_TITLE)
        .to_string()
}

/// Trimmed copy, or `None` for blank input.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
