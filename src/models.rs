//! Response schemas for the bilibili.tv web API.
//!
//! Every endpoint wraps its payload in a `{code, message, data}` envelope.
//! Only the fields this tool reads are modelled; unknown fields are ignored.

use crate::error::{Error, Result};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T: Default> Envelope<T> {
    /// Unwraps the payload, turning a non-zero `code` into an API error.
    pub fn into_data(self) -> Result<T> {
        if self.code != 0 {
            return Err(Error::Api {
                code: self.code,
                message: self.message,
            });
        }
        Ok(self.data.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeasonInfo {
    #[serde(default)]
    pub season: Season,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Season {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EpisodeList {
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl EpisodeList {
    pub fn episode_count(&self) -> usize {
        self.sections.iter().map(|s| s.episodes.len()).sum()
    }

    pub fn first_episode(&self) -> Option<&Episode> {
        self.sections.iter().flat_map(|s| s.episodes.iter()).next()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ep_list_title: String,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Episode {
    #[serde(deserialize_with = "flexible_id")]
    pub episode_id: String,
    #[serde(default)]
    pub title_display: String,
    #[serde(default)]
    pub short_title_display: String,
    #[serde(default)]
    pub long_title_display: String,
    #[serde(default, deserialize_with = "lenient_time")]
    pub publish_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EpisodeSubtitles {
    #[serde(default)]
    pub subtitles: Vec<SubtitleRef>,
}

impl EpisodeSubtitles {
    /// Exact, case-sensitive match on the language key.
    pub fn find(&self, language: &str) -> Option<&SubtitleRef> {
        self.subtitles.iter().find(|s| s.language_key == language)
    }
}

/// One subtitle track offered for an episode.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubtitleRef {
    pub url: String,
    #[serde(rename = "title", default)]
    pub display_name: String,
    #[serde(rename = "key")]
    pub language_key: String,
    #[serde(rename = "is_machine", default)]
    pub machine_translated: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Timeline {
    #[serde(default)]
    pub items: Vec<TimelineDay>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TimelineDay {
    #[serde(default)]
    pub day_of_week: String,
    #[serde(default)]
    pub is_today: bool,
    #[serde(default)]
    pub full_date_text: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// A show summary as it appears in timelines and search results.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Card {
    #[serde(deserialize_with = "flexible_id")]
    pub season_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index_show: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchModule {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub items: Vec<Card>,
}

impl SearchModule {
    pub fn is_show_listing(&self) -> bool {
        self.module == "ogv" || self.module == "ogv_subject"
    }
}

/// Ids are sent as numbers by some endpoints and as strings by others.
fn flexible_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Unparseable or empty publish times are treated as absent.
fn lenient_time<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTime {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<RawTime>::deserialize(deserializer)? {
        Some(RawTime::Text(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Some(RawTime::Other(_)) | None => None,
    })
}
