//! Remote repository capability consumed by the provisioner

use async_trait::async_trait;

use crate::error::ClientError;

/// Identifier of an open merge (pull) request
pub type MergeRequestId = u64;

/// How a merge request is merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    Merge,
    Squash,
    Rebase,
}

impl MergeMethod {
    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Squash => "squash",
            Self::Rebase => "rebase",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Client for a single target repository on a hosting service.
///
/// An implementation is bound to one repository name and owner. Every call is
/// a request/response round trip; callers await each one before issuing the
/// next. Implementations must be safe to share between independent runs.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Create the repository, under `org` when given, else under the
    /// authenticated user
    async fn create_repository(&self, org: Option<&str>) -> Result<(), ClientError>;

    /// Delete the repository this client targets
    async fn delete_repository(&self) -> Result<(), ClientError>;

    /// Whether the repository this client targets exists
    async fn repository_exists(&self) -> Result<bool, ClientError>;

    /// Commit one file to `branch`
    async fn create_file(
        &self,
        content: &[u8],
        target_path: &str,
        branch: &str,
        message: &str,
    ) -> Result<(), ClientError>;

    /// Create `new_branch` pointing at the head of `from_branch`
    async fn create_branch(&self, from_branch: &str, new_branch: &str)
        -> Result<(), ClientError>;

    /// Open a merge request from `source_branch` into `target_branch`
    async fn open_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        title: &str,
    ) -> Result<MergeRequestId, ClientError>;

    /// Merge an open merge request
    async fn merge_request(&self, id: MergeRequestId, method: MergeMethod)
        -> Result<(), ClientError>;
}
