use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error code {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Api response code {code}: {message}")]
    Api { code: i64, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to write '{}'", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid selection '{token}': {reason}")]
    InvalidSelection { token: String, reason: String },

    #[error("Invalid filename template '{0}'")]
    InvalidTemplate(String),

    #[error("Subtitle asset has no usable file extension: {0}")]
    UnsupportedAsset(String),
}

impl Error {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
