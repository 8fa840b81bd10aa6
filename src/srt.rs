use serde::{Deserialize, Serialize};

use crate::serialiser;

/// Position code for bottom-center, rendered without an override tag.
pub const DEFAULT_POSITION: i64 = 2;

fn default_position() -> i64 {
    DEFAULT_POSITION
}

/// One timed caption from the platform's JSON subtitle body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub from: f64,
    pub to: f64,
    #[serde(rename = "location", default = "default_position")]
    pub position: i64,
    #[serde(rename = "content", default)]
    pub text: String,
}

/// The decoded JSON subtitle body. Cues keep their payload order.
#[derive(Debug, Default, Deserialize)]
pub struct SubtitleBody {
    #[serde(default)]
    pub body: Vec<Cue>,
}

/// A fetched subtitle asset, classified once by the extension of the URL it
/// was served from.
#[derive(Debug)]
pub enum SubtitleAsset {
    Cues(Vec<Cue>),
    Raw { extension: String, bytes: Vec<u8> },
}

impl SubtitleAsset {
    /// File extension (without the dot) and contents to write to disk.
    pub fn into_file(self) -> (String, Vec<u8>) {
        match self {
            SubtitleAsset::Cues(cues) => {
                ("srt".to_string(), serialiser::to_srt(&cues).into_bytes())
            }
            SubtitleAsset::Raw { extension, bytes } => (extension, bytes),
        }
    }
}
