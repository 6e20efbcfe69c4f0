//! In-memory repository client for tests.
//!
//! `MockRepositoryClient` records every call and enforces the same branch
//! rules a real hosting service does: the first commit to an empty repository
//! creates its branch, later commits need an existing branch, and a branch can
//! only be forked from a branch that has commits.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::{MergeMethod, MergeRequestId, RepositoryClient};
use crate::error::ClientError;

/// A call made against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    CreateRepository { org: Option<String> },
    DeleteRepository,
    RepositoryExists,
    CreateFile { path: String, branch: String },
    CreateBranch { from: String, branch: String },
    OpenMergeRequest { source: String, target: String },
    MergeRequest { id: MergeRequestId, method: MergeMethod },
}

impl RecordedCall {
    pub fn create_file(path: &str, branch: &str) -> Self {
        Self::CreateFile {
            path: path.to_string(),
            branch: branch.to_string(),
        }
    }

    pub fn create_branch(from: &str, branch: &str) -> Self {
        Self::CreateBranch {
            from: from.to_string(),
            branch: branch.to_string(),
        }
    }

    /// Short name of the operation
    pub fn operation(&self) -> &'static str {
        match self {
            Self::CreateRepository { .. } => "create_repository",
            Self::DeleteRepository => "delete_repository",
            Self::RepositoryExists => "repository_exists",
            Self::CreateFile { .. } => "create_file",
            Self::CreateBranch { .. } => "create_branch",
            Self::OpenMergeRequest { .. } => "open_merge_request",
            Self::MergeRequest { .. } => "merge_request",
        }
    }
}

/// Where the mock should fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePoint {
    CreateRepository,
    DeleteRepository,
    RepositoryExists,
    /// Committing this target path
    CreateFile(String),
    CreateBranch,
    OpenMergeRequest,
    MergeRequest,
}

impl FailurePoint {
    fn matches(&self, call: &RecordedCall) -> bool {
        match (self, call) {
            (Self::CreateRepository, RecordedCall::CreateRepository { .. })
            | (Self::DeleteRepository, RecordedCall::DeleteRepository)
            | (Self::RepositoryExists, RecordedCall::RepositoryExists)
            | (Self::CreateBranch, RecordedCall::CreateBranch { .. })
            | (Self::OpenMergeRequest, RecordedCall::OpenMergeRequest { .. })
            | (Self::MergeRequest, RecordedCall::MergeRequest { .. }) => true,
            (Self::CreateFile(target), RecordedCall::CreateFile { path, .. }) => target == path,
            _ => false,
        }
    }
}

/// One commit: the files it wrote, as (path, content) pairs
#[derive(Debug, Clone)]
struct MockCommit {
    files: Vec<(String, Vec<u8>)>,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    failures: Vec<FailurePoint>,
    exists: bool,
    branches: BTreeMap<String, Vec<MockCommit>>,
    merge_requests: BTreeMap<MergeRequestId, (String, String)>,
    next_merge_request: MergeRequestId,
}

impl MockState {
    fn record(&mut self, call: RecordedCall) -> Result<(), ClientError> {
        let injected = self.failures.iter().any(|f| f.matches(&call));
        let operation = call.operation();
        self.calls.push(call);
        if injected {
            return Err(ClientError::api(500, format!("injected failure in {}", operation)));
        }
        Ok(())
    }

    fn require_repository(&self) -> Result<(), ClientError> {
        if self.exists {
            Ok(())
        } else {
            Err(ClientError::NoRepository)
        }
    }
}

/// Recording, failure-injecting [`RepositoryClient`]
#[derive(Debug, Clone, Default)]
pub struct MockRepositoryClient {
    state: Arc<Mutex<MockState>>,
}

impl MockRepositoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the given call fail with a 500
    pub fn fail_on(&self, point: FailurePoint) -> &Self {
        self.lock().failures.push(point);
        self
    }

    /// Pretend the repository already exists, without recording a call
    pub fn seed_repository(&self) -> &Self {
        self.lock().exists = true;
        self
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// How many times an operation was called
    pub fn count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    pub fn repository_created(&self) -> bool {
        self.lock().exists
    }

    /// Latest content of `path` on `branch`
    pub fn file_content(&self, branch: &str, path: &str) -> Option<Vec<u8>> {
        self.lock()
            .branches
            .get(branch)?
            .iter()
            .rev()
            .flat_map(|commit| commit.files.iter().rev())
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
    }

    /// Number of commits on a branch
    pub fn commit_count(&self, branch: &str) -> usize {
        self.lock().branches.get(branch).map_or(0, Vec::len)
    }
}

#[async_trait]
impl RepositoryClient for MockRepositoryClient {
    async fn create_repository(&self, org: Option<&str>) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.record(RecordedCall::CreateRepository {
            org: org.map(str::to_string),
        })?;
        if state.exists {
            return Err(ClientError::api(422, "name already exists on this account"));
        }
        state.exists = true;
        Ok(())
    }

    async fn delete_repository(&self) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.record(RecordedCall::DeleteRepository)?;
        if !state.exists {
            return Err(ClientError::api(404, "Not Found"));
        }
        state.exists = false;
        state.branches.clear();
        state.merge_requests.clear();
        Ok(())
    }

    async fn repository_exists(&self) -> Result<bool, ClientError> {
        let mut state = self.lock();
        state.record(RecordedCall::RepositoryExists)?;
        Ok(state.exists)
    }

    async fn create_file(
        &self,
        content: &[u8],
        target_path: &str,
        branch: &str,
        _message: &str,
    ) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.record(RecordedCall::create_file(target_path, branch))?;
        state.require_repository()?;

        if !state.branches.is_empty() && !state.branches.contains_key(branch) {
            return Err(ClientError::api(404, format!("Branch {} not found", branch)));
        }
        state
            .branches
            .entry(branch.to_string())
            .or_default()
            .push(MockCommit {
                files: vec![(target_path.to_string(), content.to_vec())],
            });
        Ok(())
    }

    async fn create_branch(&self, from_branch: &str, new_branch: &str) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.record(RecordedCall::create_branch(from_branch, new_branch))?;
        state.require_repository()?;

        let parent = match state.branches.get(from_branch) {
            Some(commits) if !commits.is_empty() => commits.clone(),
            _ => {
                return Err(ClientError::api(
                    422,
                    format!("Branch {} has no commits", from_branch),
                ))
            }
        };
        if state.branches.contains_key(new_branch) {
            return Err(ClientError::api(422, "Reference already exists"));
        }
        state.branches.insert(new_branch.to_string(), parent);
        Ok(())
    }

    async fn open_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        _title: &str,
    ) -> Result<MergeRequestId, ClientError> {
        let mut state = self.lock();
        state.record(RecordedCall::OpenMergeRequest {
            source: source_branch.to_string(),
            target: target_branch.to_string(),
        })?;
        state.require_repository()?;

        for branch in [source_branch, target_branch] {
            if !state.branches.contains_key(branch) {
                return Err(ClientError::api(422, format!("Branch {} not found", branch)));
            }
        }

        state.next_merge_request += 1;
        let id = state.next_merge_request;
        state
            .merge_requests
            .insert(id, (source_branch.to_string(), target_branch.to_string()));
        Ok(id)
    }

    async fn merge_request(&self, id: MergeRequestId, method: MergeMethod) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.record(RecordedCall::MergeRequest { id, method })?;
        state.require_repository()?;

        let (source, target) = state
            .merge_requests
            .remove(&id)
            .ok_or_else(|| ClientError::api(404, format!("Merge request {} not found", id)))?;

        let target_len = state.branches.get(&target).map_or(0, Vec::len);
        let incoming: Vec<MockCommit> = state
            .branches
            .get(&source)
            .map(|commits| commits.iter().skip(target_len).cloned().collect())
            .unwrap_or_default();

        let target_commits = state.branches.entry(target).or_default();
        match method {
            MergeMethod::Squash => target_commits.push(MockCommit {
                files: incoming.into_iter().flat_map(|c| c.files).collect(),
            }),
            MergeMethod::Merge | MergeMethod::Rebase => target_commits.extend(incoming),
        }
        Ok(())
    }
}
