use crate::api::Platform;
use crate::config::{DownloadConfig, Selection};
use crate::error::{Error, Result};
use crate::models::{Episode, EpisodeList};
use crate::parser::select_range;
use crate::sanitise::sanitise_title;

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Extensions an existing download may have been written with.
const KNOWN_EXTENSIONS: [&str; 2] = ["srt", "ass"];

#[derive(Debug)]
pub struct SelectedEpisode<'a> {
    /// 1-based section number.
    pub section: usize,
    pub episode: &'a Episode,
}

/// Applies section and episode ranges to an episode list. Episode numbers
/// continue from one section to the next.
pub fn select_episodes<'a>(
    list: &'a EpisodeList,
    selection: &Selection,
) -> Result<Vec<SelectedEpisode<'a>>> {
    let sections = match &selection.sections {
        Some(tokens) => Some(select_range(tokens, list.sections.len())?),
        None => None,
    };

    let mut selected = Vec::new();
    let mut preceding = 0;
    for (index, section) in list.sections.iter().enumerate() {
        let section_number = index + 1;
        let bound = preceding + section.episodes.len();
        if sections.as_ref().map_or(true, |s| s.contains(&section_number)) {
            let episodes = match &selection.episodes {
                Some(tokens) => Some(select_range(tokens, bound)?),
                None => None,
            };
            for (offset, episode) in section.episodes.iter().enumerate() {
                let number = preceding + offset + 1;
                if episodes.as_ref().map_or(true, |e| e.contains(&number)) {
                    selected.push(SelectedEpisode {
                        section: section_number,
                        episode,
                    });
                }
            }
        }
        preceding = bound;
    }
    Ok(selected)
}

#[derive(Debug, Default)]
pub struct DownloadReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Episode id and the error that stopped it.
    pub failed: Vec<(String, Error)>,
}

impl DownloadReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, episode_id: &str, result: Result<Outcome>) {
        match result {
            Ok(Outcome::Written(path)) => self.written.push(path),
            Ok(Outcome::Skipped(path)) => self.skipped.push(path),
            Err(err) => self.failed.push((episode_id.to_string(), err)),
        }
    }
}

#[derive(Debug)]
enum Outcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

pub struct Downloader<'a, P> {
    platform: &'a P,
    config: &'a DownloadConfig,
}

impl<'a, P: Platform> Downloader<'a, P> {
    pub fn new(platform: &'a P, config: &'a DownloadConfig) -> Self {
        Self { platform, config }
    }

    /// Downloads the selected episodes of a show into
    /// `<output>/<show title>/<episode title>.<language>.<ext>`.
    ///
    /// Failing to load the show is an error; a failing episode is recorded in
    /// the report and the remaining episodes are still processed.
    pub fn download_show(&self, season_id: &str) -> Result<DownloadReport> {
        let info = self.platform.season_info(season_id)?;
        let list = self.platform.episodes(season_id)?;
        if list.episode_count() == 0 {
            return Err(Error::NotFound(format!(
                "Season {} has no aired episodes yet",
                season_id
            )));
        }
        let selected = select_episodes(&list, &self.config.selection)?;
        debug!(season_id, selected = selected.len(), "episodes selected");

        let dir = self
            .config
            .output
            .join(path_segment(&info.season.title, season_id));
        fs::create_dir_all(&dir).map_err(|e| Error::filesystem(&dir, e))?;

        let mut report = DownloadReport::default();
        let mut taken = HashSet::new();
        for SelectedEpisode { episode, .. } in selected {
            let mut title = path_segment(&episode.title_display, &episode.episode_id);
            if !taken.insert(title.clone()) {
                title = format!("{} [{}]", title, episode.episode_id);
            }
            let name = format!("{}.{}", title, self.config.language);
            let stem = dir.join(name);
            let result = self.download_subtitle(&episode.episode_id, &stem, episode.publish_time);
            report.record(&episode.episode_id, result);
        }
        Ok(report)
    }

    /// Downloads episodes by raw id into the output directory, naming each
    /// file after its id or the configured filename template.
    pub fn download_episodes(&self, episode_ids: &[String]) -> Result<DownloadReport> {
        let dir = &self.config.output;
        fs::create_dir_all(dir).map_err(|e| Error::filesystem(dir, e))?;

        let mut report = DownloadReport::default();
        for (index, episode_id) in episode_ids.iter().enumerate() {
            let name = match &self.config.filename {
                Some(template) => template.render(index + 1),
                None => episode_id.clone(),
            };
            let result = self.download_subtitle(episode_id, &dir.join(name), None);
            report.record(episode_id, result);
        }
        Ok(report)
    }

    fn download_subtitle(
        &self,
        episode_id: &str,
        stem: &Path,
        published: Option<DateTime<Utc>>,
    ) -> Result<Outcome> {
        if !self.config.overwrite {
            let existing = KNOWN_EXTENSIONS
                .iter()
                .map(|ext| with_extension(stem, ext))
                .find(|path| path.exists());
            if let Some(path) = existing {
                self.notice('#', &path);
                return Ok(Outcome::Skipped(path));
            }
        }

        let language = self.config.language.as_str();
        let subtitles = self.platform.subtitles(episode_id)?;
        let subtitle = subtitles
            .find(language)
            .ok_or_else(|| Error::NotFound(format!("Language \"{}\" not found", language)))?;
        if subtitle.machine_translated {
            warn!(episode_id, language, "subtitle is machine translated");
        }

        let (extension, contents) = self.platform.subtitle_asset(subtitle)?.into_file();
        let path = with_extension(stem, &extension);
        write_file(&path, &contents, published)?;
        self.notice('*', &path);
        Ok(Outcome::Written(path))
    }

    fn notice(&self, marker: char, path: &Path) {
        if !self.config.quiet {
            println!("{} {}", marker, path.display());
        }
    }
}

/// Sanitised `title`, or `fallback` when nothing usable is left of it.
fn path_segment(title: &str, fallback: &str) -> String {
    let segment = sanitise_title(title);
    if segment.is_empty() {
        fallback.to_string()
    } else {
        segment
    }
}

/// Appends `.ext` without touching dots already in the stem.
fn with_extension(stem: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn write_file(path: &Path, contents: &[u8], modified: Option<DateTime<Utc>>) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::filesystem(path, e))?;
    if let Some(modified) = modified {
        let file = fs::File::options()
            .write(true)
            .open(path)
            .map_err(|e| Error::filesystem(path, e))?;
        file.set_modified(SystemTime::from(modified))
            .map_err(|e| Error::filesystem(path, e))?;
    }
    Ok(())
}
