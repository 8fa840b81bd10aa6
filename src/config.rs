use crate::parser::FilenameTemplate;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.bilibili.tv/intl/gateway";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How to reach the platform API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    /// Sent as `s_locale` when set.
    pub locale: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            locale: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Episode filter shared by downloads and episode listings. `None` keeps
/// everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub sections: Option<Vec<String>>,
    pub episodes: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub language: String,
    pub output: PathBuf,
    pub overwrite: bool,
    pub quiet: bool,
    pub selection: Selection,
    /// Names files in the raw episode-id mode.
    pub filename: Option<FilenameTemplate>,
}

impl DownloadConfig {
    pub fn new(language: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into(),
            output: output.into(),
            overwrite: false,
            quiet: false,
            selection: Selection::default(),
            filename: None,
        }
    }
}
