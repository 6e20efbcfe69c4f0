//! Error types for reposcaffold-github

use camino::Utf8PathBuf;
use reposcaffold_core::ClientError;
use thiserror::Error;

/// Result type alias using reposcaffold-github's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the [`RepositoryClient`](reposcaffold_core::RepositoryClient)
/// calls: building the HTTP client and fetching templates
#[derive(Error, Debug)]
pub enum Error {
    /// The HTTP client could not be built
    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    /// The configured API URL cannot carry path segments
    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(String),

    /// Downloading the template archive failed
    #[error("Failed to download template {template}")]
    Download {
        template: String,
        #[source]
        source: ClientError,
    },

    /// Unpacking the template archive failed
    #[error("Failed to extract template archive into {path}")]
    Extract {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive did not contain exactly one top-level directory
    #[error("Unexpected template archive layout in {path}: {message}")]
    ArchiveLayout { path: Utf8PathBuf, message: String },

    /// Creating, reading or renaming inside the work directory failed
    #[error("Work directory error at {path}")]
    WorkDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking extraction task panicked or was cancelled
    #[error("Extraction task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn work_dir(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::WorkDir {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn layout(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::ArchiveLayout {
            path: path.into(),
            message: message.into(),
        }
    }
}
