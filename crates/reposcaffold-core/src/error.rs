//! Error types for reposcaffold-core

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::provision::ProvisionStage;

/// Result type alias using reposcaffold-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level provisioning error kinds
#[derive(Error, Debug)]
pub enum Error {
    /// The remote repository could not be created. Nothing to roll back.
    #[error("Failed to create repository {repo}")]
    RepositoryCreate {
        repo: String,
        #[source]
        source: ClientError,
    },

    /// Staging the template tree failed
    #[error("Failed to publish template tree")]
    Publication(#[from] PublishError),

    /// Opening or squash-merging the merge request failed
    #[error("Failed to finalize repository ({step})")]
    Finalize {
        step: FinalizeStep,
        #[source]
        source: ClientError,
    },

    /// Invalid provisioning options
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    /// Invalid scaffold configuration
    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON conversion error
    #[error("JSON conversion error")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid options error
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this failure happened after the remote repository existed
    pub fn requires_compensation(&self) -> bool {
        matches!(self, Self::Publication(_) | Self::Finalize { .. })
    }
}

/// Which half of the finalize step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStep {
    OpenMergeRequest,
    SquashMerge,
}

impl std::fmt::Display for FinalizeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenMergeRequest => write!(f, "open merge request"),
            Self::SquashMerge => write!(f, "squash merge"),
        }
    }
}

/// Failures while walking and publishing the template tree
#[derive(Error, Debug)]
pub enum PublishError {
    /// Walking the local tree failed
    #[error("Failed to walk template tree {root}")]
    Walk {
        root: Utf8PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A walked path is not valid UTF-8
    #[error("Template path is not valid UTF-8: {path}")]
    NonUtf8Path { path: String },

    /// The walk produced no bootstrap file, so the transit branch has no parent
    #[error("Template tree {root} has no bootstrap file ({bootstrap})")]
    MissingBootstrap { root: Utf8PathBuf, bootstrap: String },

    /// A local file could not be read
    #[error("Failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template file failed to render
    #[error("Failed to render {path}")]
    Render {
        path: Utf8PathBuf,
        #[source]
        source: RenderError,
    },

    /// Two local files map to the same repository path
    #[error("{second} and {first} both publish to {target}")]
    DuplicateTarget {
        target: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },

    /// A local path could not be mapped into the repository
    #[error(transparent)]
    PathFormat(#[from] PathFormatError),

    /// Committing a file to the remote repository failed
    #[error("Failed to commit {path} to branch {branch}")]
    CommitFile {
        path: String,
        branch: String,
        #[source]
        source: ClientError,
    },

    /// Creating the transit branch failed
    #[error("Failed to create branch {branch} from {from}")]
    CreateBranch {
        from: String,
        branch: String,
        #[source]
        source: ClientError,
    },
}

/// Template rendering failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// An opening delimiter has no matching close
    #[error("unclosed action starting at line {line}")]
    UnclosedAction { line: usize },

    /// The action references a field the context does not have
    #[error("line {line}: unknown field {field}")]
    UnknownField { field: String, line: usize },

    /// The action is not a plain field reference
    #[error("line {line}: unsupported action \"{action}\"")]
    UnsupportedAction { action: String, line: usize },

    /// Template body is not UTF-8 text
    #[error("template is not valid UTF-8")]
    InvalidUtf8,
}

/// A walked path did not sit under the configured template root
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown path format: {path} is not inside {root}")]
pub struct PathFormatError {
    pub path: Utf8PathBuf,
    pub root: Utf8PathBuf,
}

/// Errors reported by a [`RepositoryClient`](crate::client::RepositoryClient)
#[derive(Error, Debug)]
pub enum ClientError {
    /// The API answered with a non-success status
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// No repository has been created on this client yet
    #[error("No repository created on this client")]
    NoRepository,

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Create an API status error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a generic client error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Outcome of the rollback attempted after a failure
#[derive(Debug)]
pub enum Compensation {
    /// The failure happened before the repository existed
    NotNeeded,
    /// The half-initialized repository was deleted
    RepositoryDeleted,
    /// Deleting the repository failed too; it may still exist
    Failed(ClientError),
}

impl Compensation {
    /// Whether someone has to remove the repository by hand
    pub fn needs_manual_cleanup(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A failed provisioning run: the root cause, where it happened, and what
/// the rollback did about it.
#[derive(Debug)]
pub struct ProvisionError {
    pub repo: String,
    pub stage: ProvisionStage,
    pub error: Error,
    pub compensation: Compensation,
}

impl ProvisionError {
    /// The error that caused the run to fail
    pub fn root_cause(&self) -> &Error {
        &self.error
    }

    /// Consume the wrapper, keeping only the root cause
    pub fn into_root_cause(self) -> Error {
        self.error
    }
}

impl std::fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to provision repository {} ({})", self.repo, self.stage)?;
        if let Compensation::Failed(err) = &self.compensation {
            write!(
                f,
                "; rollback also failed: could not delete repository {}: {}; manual cleanup may be required",
                self.repo, err
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ProvisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
