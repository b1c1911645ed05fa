//! Domain primitives shared by the catalog and tracking layers.
//!
//! Provider names, locales and list kinds arrive as loose strings from callers
//! and upstream APIs. The types here parse them once so the rest of the crate
//! can match on enums instead of comparing strings.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::sources::{
    ANILIST_PRIORITY, JIKAN_PRIORITY, SHIKIMORI_PRIORITY, UNKNOWN_PRIORITY,
};

/// A metadata provider known to the catalog.
///
/// Priority is fixed: lower values win when merging conflicting fields and
/// when breaking ties between equally scored search results.
///
/// # Examples
///
/// ```rust
/// use shiori::domain::SourceKind;
///
/// assert_eq!(SourceKind::parse("Shikimori"), Some(SourceKind::Shikimori));
/// assert!(SourceKind::Shikimori.priority() < SourceKind::Jikan.priority());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Shikimori,
    Jikan,
    Anilist,
}

impl SourceKind {
    pub const ALL: [Self; 3] = [Self::Shikimori, Self::Jikan, Self::Anilist];

    /// Parses a provider name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "shikimori" => Some(Self::Shikimori),
            "jikan" => Some(Self::Jikan),
            "anilist" => Some(Self::Anilist),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shikimori => "shikimori",
            Self::Jikan => "jikan",
            Self::Anilist => "anilist",
        }
    }

    #[must_use]
    pub const fn priority(&self) -> u32 {
        match self {
            Self::Shikimori => SHIKIMORI_PRIORITY,
            Self::Jikan => JIKAN_PRIORITY,
            Self::Anilist => ANILIST_PRIORITY,
        }
    }

    /// Whether the provider mirrors the MyAnimeList id space.
    #[must_use]
    pub const fn shares_mal_ids(&self) -> bool {
        matches!(self, Self::Shikimori | Self::Jikan)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority for an arbitrary source string; unknown providers sort last.
#[must_use]
pub fn source_priority(source: &str) -> u32 {
    SourceKind::parse(source).map_or(UNKNOWN_PRIORITY, |kind| kind.priority())
}

/// Display and translation locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Ru,
    Uk,
}

impl Lang {
    /// Accepts full locale tags such as `ru-RU` or `uk_UA`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.starts_with("ru") {
            Some(Self::Ru)
        } else if lower.starts_with("uk") {
            Some(Self::Uk)
        } else if lower.starts_with("en") {
            Some(Self::En)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
            Self::Uk => "uk",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-user tracked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Watched,
    Planned,
    Favorite,
}

impl ListType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Watched => "watched",
            Self::Planned => "planned",
            Self::Favorite => "favorite",
        }
    }
}

impl FromStr for ListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watched" => Ok(Self::Watched),
            "planned" => Ok(Self::Planned),
            "favorite" => Ok(Self::Favorite),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a watch session was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartedVia {
    WebappQuality,
    BotSource,
}

impl StartedVia {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WebappQuality => "webapp_quality",
            Self::BotSource => "bot_source",
        }
    }
}

impl FromStr for StartedVia {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webapp_quality" => Ok(Self::WebappQuality),
            "bot_source" => Ok(Self::BotSource),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for StartedVia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side identifier. Upstream APIs send either numbers or strings.
///
/// Whole floats such as `185.0` read as [`ExternalId::Numeric`]; other floats
/// keep their text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ExternalId {
    Numeric(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireExternalId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for ExternalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WireExternalId::deserialize(deserializer)? {
            WireExternalId::Int(n) => Self::Numeric(n),
            WireExternalId::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                #[allow(clippy::cast_possible_truncation)]
                let n = f as i64;
                Self::Numeric(n)
            }
            WireExternalId::Float(f) => Self::Text(f.to_string()),
            WireExternalId::Text(s) => Self::Text(s),
        })
    }
}

impl ExternalId {
    /// Returns the id as a positive integer, if it is one.
    ///
    /// Strings such as `"185"` or `"185.0"` qualify; `"0"`, `"-3"`, `"12a"`
    /// and fractional values do not.
    #[must_use]
    pub fn as_positive_int(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => (*n > 0).then_some(*n),
            Self::Text(s) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<i64>() {
                    return (n > 0).then_some(n);
                }
                let f = s.parse::<f64>().ok()?;
                if !(f.is_finite() && f > 0.0 && f.fract() == 0.0 && f < 9.0e15) {
                    return None;
                }
                #[allow(clippy::cast_possible_truncation)]
                let n = f as i64;
                Some(n)
            }
        }
    }

    /// Numeric form when the id is numeric at all, used for source references.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        match self {
            Self::Numeric(n) => Some(Self::Numeric(*n)),
            Self::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else if let Ok(n) = s.parse::<i64>() {
                    Some(Self::Numeric(n))
                } else {
                    Some(Self::Text(s.to_string()))
                }
            }
        }
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ExternalId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ExternalId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_priority_order() {
        assert_eq!(source_priority("shikimori"), 10);
        assert_eq!(source_priority(" JIKAN "), 20);
        assert_eq!(source_priority("anilist"), 30);
        assert_eq!(source_priority("kitsu"), 999);
    }

    #[test]
    fn test_mal_capable_sources() {
        assert!(SourceKind::Jikan.shares_mal_ids());
        assert!(SourceKind::Shikimori.shares_mal_ids());
        assert!(!SourceKind::Anilist.shares_mal_ids());
    }

    #[test]
    fn test_external_id_positive_int() {
        assert_eq!(ExternalId::Numeric(185).as_positive_int(), Some(185));
        assert_eq!(ExternalId::from("185").as_positive_int(), Some(185));
        assert_eq!(ExternalId::from("185.0").as_positive_int(), Some(185));
        assert_eq!(ExternalId::Numeric(0).as_positive_int(), None);
        assert_eq!(ExternalId::from("-4").as_positive_int(), None);
        assert_eq!(ExternalId::from("12a").as_positive_int(), None);
        assert_eq!(ExternalId::from("1.5").as_positive_int(), None);
    }

    #[test]
    fn test_external_id_deserializes_numbers_and_strings() {
        let n: ExternalId = serde_json::from_str("185").unwrap();
        let s: ExternalId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(n, ExternalId::Numeric(185));
        assert_eq!(s, ExternalId::Text("abc".to_string()));
    }

    #[test]
    fn test_external_id_deserializes_floats() {
        let whole: ExternalId = serde_json::from_str("185.0").unwrap();
        assert_eq!(whole, ExternalId::Numeric(185));
        assert_eq!(whole.as_positive_int(), Some(185));

        let fractional: ExternalId = serde_json::from_str("1.5").unwrap();
        assert_eq!(fractional, ExternalId::Text("1.5".to_string()));
        assert_eq!(fractional.as_positive_int(), None);

        let item: crate::models::anime::RawSourceItem = serde_json::from_str(
            r#"{"uid": "jikan:185", "source": "jikan", "externalId": 185.0, "title": "Initial D"}"#,
        )
        .unwrap();
        assert_eq!(item.external_id, Some(ExternalId::Numeric(185)));
    }

    #[test]
    fn test_lang_parse_accepts_locale_tags() {
        assert_eq!(Lang::parse("ru-RU"), Some(Lang::Ru));
        assert_eq!(Lang::parse("uk_UA"), Some(Lang::Uk));
        assert_eq!(Lang::parse("EN"), Some(Lang::En));
        assert_eq!(Lang::parse("de"), None);
    }

    #[test]
    fn test_list_type_and_started_via_parse() {
        assert_eq!("Watched".parse::<ListType>(), Ok(ListType::Watched));
        assert!("dropped".parse::<ListType>().is_err());
        assert_eq!(" bot_source ".parse::<StartedVia>(), Ok(StartedVia::BotSource));
        assert!("telegram".parse::<StartedVia>().is_err());
    }
}
