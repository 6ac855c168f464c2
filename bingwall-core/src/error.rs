use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Metadata fetch failed: {0}")]
    MetadataFetch(String),

    #[error("Image fetch failed: {0}")]
    ImageFetch(String),

    #[error("Failed to persist {target}: {source}")]
    Persist {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Background service failed to set {key}: {message}")]
    BackgroundService { key: String, message: String },
}

impl UpdateError {
    pub(crate) fn persist(
        target: impl fmt::Display,
        source: std::io::Error,
    ) -> Self {
        UpdateError::Persist {
            target: target.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpdateError>;

/// Stages of a single update run, in execution order.
///
/// Failures are reported together with the stage that was active, so a log
/// line alone is enough to tell whether anything reached the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStage {
    GateCheck,
    FetchingMetadata,
    UrlReady,
    Downloading,
    Publishing,
    Committing,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::GateCheck => "gate-check",
            RunStage::FetchingMetadata => "fetching-metadata",
            RunStage::UrlReady => "url-ready",
            RunStage::Downloading => "downloading",
            RunStage::Publishing => "publishing",
            RunStage::Committing => "committing",
        };
        f.write_str(name)
    }
}
