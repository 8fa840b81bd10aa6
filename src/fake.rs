//! In-memory platform for tests.

use crate::api::{decode_asset, Platform};
use crate::error::{Error, Result};
use crate::models::{
    Card, Episode, EpisodeList, EpisodeSubtitles, SearchModule, Season, SeasonInfo, Section,
    SubtitleRef, Timeline,
};
use crate::srt::SubtitleAsset;

use std::cell::Cell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

#[derive(Default)]
pub struct FakePlatform {
    title: String,
    list: EpisodeList,
    subtitles: HashMap<String, Vec<SubtitleRef>>,
    assets: HashMap<String, (String, Vec<u8>)>,
    pub timeline: Timeline,
    pub search_results: Vec<SearchModule>,
    asset_requests: Cell<usize>,
}

impl FakePlatform {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn add_section(&mut self, title: &str, episodes: Vec<Episode>) {
        self.list.sections.push(Section {
            title: title.to_string(),
            ep_list_title: format!("{} episodes", title),
            episodes,
        });
    }

    pub fn add_subtitles(&mut self, episode_id: &str, subtitles: Vec<SubtitleRef>) {
        self.subtitles.insert(episode_id.to_string(), subtitles);
    }

    /// Registers the body served for `url`; `path` is the path it resolves to.
    pub fn add_asset(&mut self, url: &str, path: &str, body: Vec<u8>) {
        self.assets
            .insert(url.to_string(), (path.to_string(), body));
    }

    pub fn asset_requests(&self) -> usize {
        self.asset_requests.get()
    }
}

fn not_found() -> Error {
    Error::Api {
        code: -404,
        message: "啥都木有".to_string(),
    }
}

impl Platform for FakePlatform {
    /// Any numeric id is a known show.
    fn season_info(&self, season_id: &str) -> Result<SeasonInfo> {
        if !season_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(not_found());
        }
        Ok(SeasonInfo {
            season: Season {
                title: self.title.clone(),
            },
        })
    }

    fn episodes(&self, season_id: &str) -> Result<EpisodeList> {
        self.season_info(season_id)?;
        Ok(self.list.clone())
    }

    fn subtitles(&self, episode_id: &str) -> Result<EpisodeSubtitles> {
        let subtitles = self.subtitles.get(episode_id).ok_or_else(not_found)?;
        Ok(EpisodeSubtitles {
            subtitles: subtitles.clone(),
        })
    }

    fn subtitle_asset(&self, subtitle: &SubtitleRef) -> Result<SubtitleAsset> {
        self.asset_requests.set(self.asset_requests.get() + 1);
        let (path, body) = self.assets.get(&subtitle.url).ok_or(Error::Status {
            url: subtitle.url.clone(),
            status: 404,
        })?;
        decode_asset(&subtitle.url, path, body)
    }

    fn timeline(&self) -> Result<Timeline> {
        Ok(self.timeline.clone())
    }

    fn search(&self, _keyword: &str, limit: usize) -> Result<Vec<SearchModule>> {
        Ok(self
            .search_results
            .iter()
            .cloned()
            .map(|mut module| {
                module.items.truncate(limit);
                module
            })
            .collect())
    }
}

pub fn episode(id: &str, title: &str, publish_time: Option<DateTime<Utc>>) -> Episode {
    Episode {
        episode_id: id.to_string(),
        title_display: title.to_string(),
        short_title_display: format!("E{}", id),
        long_title_display: title.to_string(),
        publish_time,
    }
}

pub fn subtitle(key: &str, url: &str, machine_translated: bool) -> SubtitleRef {
    SubtitleRef {
        url: url.to_string(),
        display_name: key.to_uppercase(),
        language_key: key.to_string(),
        machine_translated,
    }
}

pub fn card(season_id: &str, title: &str, status: &str) -> Card {
    Card {
        season_id: season_id.to_string(),
        title: title.to_string(),
        index_show: status.to_string(),
    }
}

/// Builds a cue body the way the platform serves it.
pub fn cue_json(cues: &[(f64, f64, i64, &str)]) -> Vec<u8> {
    let body: Vec<serde_json::Value> = cues
        .iter()
        .map(|(from, to, location, content)| {
            serde_json::json!({
                "from": from,
                "to": to,
                "location": location,
                "content": content,
            })
        })
        .collect();
    serde_json::json!({ "font_size": 0.4, "body": body })
        .to_string()
        .into_bytes()
}
