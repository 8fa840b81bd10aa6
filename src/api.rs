use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    EpisodeList, EpisodeSubtitles, Envelope, SearchModule, SeasonInfo, SubtitleRef, Timeline,
};
use crate::srt::{SubtitleAsset, SubtitleBody};

use std::path::Path;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

const SEASON_INFO: &str = "/web/v2/ogv/play/season_info";
const EPISODES: &str = "/web/v2/ogv/play/episodes";
const SUBTITLES: &str = "/m/subtitle";
const TIMELINE: &str = "/web/v2/ogv/timeline";
const SEARCH: &str = "/web/v2/search_result";

/// Read-only view of the platform used by downloads and listings.
pub trait Platform {
    fn season_info(&self, season_id: &str) -> Result<SeasonInfo>;

    fn episodes(&self, season_id: &str) -> Result<EpisodeList>;

    fn subtitles(&self, episode_id: &str) -> Result<EpisodeSubtitles>;

    /// Fetches the body behind a subtitle reference and classifies it as a
    /// cue list or a ready-made subtitle file.
    fn subtitle_asset(&self, subtitle: &SubtitleRef) -> Result<SubtitleAsset>;

    fn timeline(&self) -> Result<Timeline>;

    fn search(&self, keyword: &str, limit: usize) -> Result<Vec<SearchModule>>;
}

pub struct BilibiliClient {
    http: Client,
    api_base: String,
    locale: Option<String>,
}

impl BilibiliClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Transport {
                url: config.api_base.clone(),
                source,
            })?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            locale: config.locale.clone(),
        })
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        debug!(url, ?query, "GET");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;
        if response.status() != StatusCode::OK {
            return Err(Error::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    /// GETs an enveloped endpoint and returns its `data`.
    fn fetch<T>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let url = format!("{}{}", self.api_base, endpoint);
        let mut params = vec![("platform", "web")];
        if let Some(locale) = &self.locale {
            params.push(("s_locale", locale.as_str()));
        }
        params.extend_from_slice(query);

        let body = self
            .get(&url, &params)?
            .text()
            .map_err(|source| Error::Transport {
                url: url.clone(),
                source,
            })?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|source| Error::Decode { url, source })?;
        envelope.into_data()
    }
}

impl Platform for BilibiliClient {
    fn season_info(&self, season_id: &str) -> Result<SeasonInfo> {
        self.fetch(SEASON_INFO, &[("season_id", season_id)])
    }

    fn episodes(&self, season_id: &str) -> Result<EpisodeList> {
        self.fetch(EPISODES, &[("season_id", season_id)])
    }

    fn subtitles(&self, episode_id: &str) -> Result<EpisodeSubtitles> {
        self.fetch(SUBTITLES, &[("ep_id", episode_id)])
    }

    fn subtitle_asset(&self, subtitle: &SubtitleRef) -> Result<SubtitleAsset> {
        let response = self.get(&subtitle.url, &[])?;
        // Redirects are followed, so the served path decides the format.
        let path = response.url().path().to_string();
        let bytes = response.bytes().map_err(|source| Error::Transport {
            url: subtitle.url.clone(),
            source,
        })?;
        decode_asset(&subtitle.url, &path, &bytes)
    }

    fn timeline(&self) -> Result<Timeline> {
        self.fetch(TIMELINE, &[])
    }

    fn search(&self, keyword: &str, limit: usize) -> Result<Vec<SearchModule>> {
        let limit = limit.to_string();
        self.fetch(SEARCH, &[("keyword", keyword), ("limit", &limit)])
    }
}

/// `.json` bodies are cue lists; anything else is written as served.
pub(crate) fn decode_asset(url: &str, path: &str, bytes: &[u8]) -> Result<SubtitleAsset> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::UnsupportedAsset(url.to_string()))?;

    if extension.eq_ignore_ascii_case("json") {
        let body: SubtitleBody = serde_json::from_slice(bytes).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })?;
        Ok(SubtitleAsset::Cues(body.body))
    } else {
        Ok(SubtitleAsset::Raw {
            extension: extension.to_string(),
            bytes: bytes.to_vec(),
        })
    }
}
