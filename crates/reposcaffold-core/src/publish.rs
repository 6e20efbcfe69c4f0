//! Walking the template tree and publishing it to the remote repository.
//!
//! Publishing follows a fixed protocol:
//!
//! 1. the bootstrap file (`.gitignore` by default) is committed to the main
//!    branch, giving it a first commit;
//! 2. the transit branch is created from the main branch, exactly once;
//! 3. every other file is committed to the transit branch, in walk order.
//!
//! The walk is collected into a [`PublishPlan`] first so that the bootstrap
//! file is always published before anything else, whatever its position in
//! directory order. Templates are read and rendered lazily while publishing,
//! so a render failure stops the run before any later file is committed.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

use crate::client::RepositoryClient;
use crate::config::{TreeConventions, WorkflowConfig};
use crate::error::PublishError;
use crate::path::PathTranslator;
use crate::render::TemplateRenderer;
use crate::types::{BranchPair, RemoteFileCommit, RenderContext};

/// Where a published file lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// Committed to the main branch, before the transit branch exists
    Bootstrap,
    /// Committed to the transit branch
    Staged,
}

/// Why a walked entry was not published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Version-control metadata directory
    VersionControl,
    /// The template's own README
    Readme,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VersionControl => write!(f, "version-control metadata"),
            Self::Readme => write!(f, "template README"),
        }
    }
}

/// A file the walk decided to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Path on the local filesystem
    pub source: Utf8PathBuf,
    /// Path in the repository
    pub target_path: String,
    /// Whether the content goes through the renderer
    pub template: bool,
    pub role: FileRole,
}

/// A walked entry that will not be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub source: Utf8PathBuf,
    pub reason: SkipReason,
}

/// Result of walking the template tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub bootstrap: PlannedFile,
    /// Files for the transit branch, in walk order
    pub staged: Vec<PlannedFile>,
    pub skipped: Vec<SkippedEntry>,
}

/// One file that reached the remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedFile {
    pub target_path: String,
    pub branch: String,
    pub size: usize,
}

/// What a publish run did, for the caller to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub branches: BranchPair,
    /// Commits in the order they were made
    pub commits: Vec<CommittedFile>,
    pub skipped: Vec<SkippedEntry>,
}

/// Classifies template-tree paths by naming convention
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    conventions: &'a TreeConventions,
}

impl<'a> Classifier<'a> {
    pub fn new(conventions: &'a TreeConventions) -> Self {
        Self { conventions }
    }

    /// Any path segment is the version-control directory
    pub fn is_version_control(&self, relative: &str) -> bool {
        relative.split('/').any(|s| s == self.conventions.vcs_dir)
    }

    /// The README sitting at the template root
    pub fn is_root_readme(&self, relative: &str) -> bool {
        relative == self.conventions.readme_file
    }

    /// File name carries the template suffix
    pub fn is_template(&self, relative: &str) -> bool {
        let name = relative.rsplit('/').next().unwrap_or(relative);
        name.len() > self.conventions.template_suffix.len()
            && name.ends_with(&self.conventions.template_suffix)
    }

    /// Drop the template suffix from a target path
    pub fn strip_template_suffix<'p>(&self, target: &'p str) -> &'p str {
        if self.is_template(target) {
            &target[..target.len() - self.conventions.template_suffix.len()]
        } else {
            target
        }
    }

    /// The bootstrap file, at the repository root only
    pub fn is_bootstrap(&self, target: &str) -> bool {
        target == self.conventions.bootstrap_file
    }
}

/// Publishes one template tree to one repository
#[derive(Debug)]
pub struct TreePublisher<'a> {
    classifier: Classifier<'a>,
    workflow: &'a WorkflowConfig,
    translator: PathTranslator,
    renderer: TemplateRenderer,
    branches: BranchPair,
}

impl<'a> TreePublisher<'a> {
    pub fn new(
        root: impl Into<Utf8PathBuf>,
        context: &RenderContext,
        branches: BranchPair,
        conventions: &'a TreeConventions,
        workflow: &'a WorkflowConfig,
    ) -> Self {
        Self {
            classifier: Classifier::new(conventions),
            workflow,
            translator: PathTranslator::new(
                root,
                conventions.placeholder.clone(),
                context.app_name.clone(),
            ),
            renderer: TemplateRenderer::new(context),
            branches,
        }
    }

    pub fn branches(&self) -> &BranchPair {
        &self.branches
    }

    /// Walk the tree and decide what goes where. Nothing is read or sent.
    pub fn plan(&self) -> Result<PublishPlan, PublishError> {
        let root = self.translator.root();
        let mut bootstrap = None;
        let mut staged = Vec::new();
        let mut skipped = Vec::new();
        let mut targets: HashMap<String, Utf8PathBuf> = HashMap::new();

        let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|source| PublishError::Walk {
                root: root.to_path_buf(),
                source,
            })?;

            let source = Utf8PathBuf::from_path_buf(entry.path().to_path_buf()).map_err(|p| {
                PublishError::NonUtf8Path {
                    path: p.display().to_string(),
                }
            })?;

            if entry.depth() == 0 {
                continue;
            }

            let relative = self.translator.relative(&source)?;

            if self.classifier.is_version_control(&relative) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                skipped.push(SkippedEntry {
                    source,
                    reason: SkipReason::VersionControl,
                });
                continue;
            }

            if entry.file_type().is_dir() {
                continue;
            }

            if self.classifier.is_root_readme(&relative) {
                skipped.push(SkippedEntry {
                    source,
                    reason: SkipReason::Readme,
                });
                continue;
            }

            let template = self.classifier.is_template(&relative);
            let translated = self.translator.substitute(&relative);
            let target_path = self.classifier.strip_template_suffix(&translated).to_string();

            if let Some(first) = targets.insert(target_path.clone(), source.clone()) {
                return Err(PublishError::DuplicateTarget {
                    target: target_path,
                    first,
                    second: source,
                });
            }

            if bootstrap.is_none() && self.classifier.is_bootstrap(&target_path) {
                bootstrap = Some(PlannedFile {
                    source,
                    target_path,
                    template,
                    role: FileRole::Bootstrap,
                });
            } else {
                staged.push(PlannedFile {
                    source,
                    target_path,
                    template,
                    role: FileRole::Staged,
                });
            }
        }

        let bootstrap = bootstrap.ok_or_else(|| PublishError::MissingBootstrap {
            root: root.to_path_buf(),
            bootstrap: self.classifier.conventions.bootstrap_file.clone(),
        })?;

        Ok(PublishPlan {
            bootstrap,
            staged,
            skipped,
        })
    }

    /// Read a planned file and render it if needed
    pub async fn load(&self, file: &PlannedFile) -> Result<RemoteFileCommit, PublishError> {
        let raw = tokio::fs::read(&file.source)
            .await
            .map_err(|source| PublishError::Read {
                path: file.source.clone(),
                source,
            })?;

        let content = if file.template {
            self.renderer
                .render(&raw)
                .map_err(|source| PublishError::Render {
                    path: file.source.clone(),
                    source,
                })?
        } else {
            raw
        };

        let branch = match file.role {
            FileRole::Bootstrap => &self.branches.main,
            FileRole::Staged => &self.branches.transit,
        };

        Ok(RemoteFileCommit {
            target_path: file.target_path.clone(),
            content,
            branch: branch.clone(),
        })
    }

    /// Walk the tree and publish it. Stops at the first failure.
    pub async fn publish(
        &self,
        client: &dyn RepositoryClient,
    ) -> Result<PublishReport, PublishError> {
        let plan = self.plan()?;
        let mut report = PublishReport {
            branches: self.branches.clone(),
            commits: Vec::with_capacity(plan.staged.len() + 1),
            skipped: plan.skipped,
        };

        let bootstrap = self.load(&plan.bootstrap).await?;
        self.commit(client, bootstrap, &mut report).await?;

        client
            .create_branch(&self.branches.main, &self.branches.transit)
            .await
            .map_err(|source| PublishError::CreateBranch {
                from: self.branches.main.clone(),
                branch: self.branches.transit.clone(),
                source,
            })?;

        for file in &plan.staged {
            let commit = self.load(file).await?;
            self.commit(client, commit, &mut report).await?;
        }

        Ok(report)
    }

    async fn commit(
        &self,
        client: &dyn RepositoryClient,
        commit: RemoteFileCommit,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let message = self.workflow.commit_message_for(&commit.target_path);
        client
            .create_file(&commit.content, &commit.target_path, &commit.branch, &message)
            .await
            .map_err(|source| PublishError::CommitFile {
                path: commit.target_path.clone(),
                branch: commit.branch.clone(),
                source,
            })?;

        report.commits.push(CommittedFile {
            size: commit.content.len(),
            target_path: commit.target_path,
            branch: commit.branch,
        });
        Ok(())
    }
}

/// Convenience wrapper for a bare root path
pub fn plan_tree(
    root: &Utf8Path,
    context: &RenderContext,
    branches: BranchPair,
    conventions: &TreeConventions,
    workflow: &WorkflowConfig,
) -> Result<PublishPlan, PublishError> {
    TreePublisher::new(root, context, branches, conventions, workflow).plan()
}
