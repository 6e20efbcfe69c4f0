//! Runtime configuration for the scaffolding workflow
//!
//! Every field has a default, so an empty document (or `ScaffoldConfig::default()`)
//! reproduces the stock Go scaffold against github.com.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::BranchPair;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScaffoldConfig {
    /// Hosting service settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Where the template tree comes from
    #[serde(default)]
    pub template: TemplateSourceConfig,

    /// Branch and commit conventions of the publish protocol
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// File naming conventions inside the template tree
    #[serde(default)]
    pub conventions: TreeConventions,

    /// Directory that holds one scratch dir per create; the template archive
    /// is unpacked into that run's scratch dir
    #[serde(default = "default_work_dir")]
    pub work_dir: Utf8PathBuf,
}

impl ScaffoldConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the publish protocol cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.workflow.transit_branch.trim().is_empty() {
            return Err(Error::invalid_config("workflow.transit-branch cannot be empty"));
        }
        if self.workflow.transit_branch == self.workflow.default_branch {
            return Err(Error::invalid_config(
                "workflow.transit-branch must differ from workflow.default-branch",
            ));
        }
        if self.conventions.bootstrap_file.contains('/') {
            return Err(Error::invalid_config(
                "conventions.bootstrap-file must be a bare file name",
            ));
        }
        if self.conventions.placeholder.is_empty() {
            return Err(Error::invalid_config("conventions.placeholder cannot be empty"));
        }
        validate_work_dir(&self.work_dir)
    }
}

/// The work dir must name a dedicated directory: runs create and remove
/// scratch dirs inside it
fn validate_work_dir(work_dir: &Utf8Path) -> Result<()> {
    if work_dir.as_str().trim().is_empty() {
        return Err(Error::invalid_config("work-dir cannot be empty"));
    }
    if work_dir.as_str().starts_with('~') {
        return Err(Error::invalid_config(format!(
            "work-dir {} starts with '~', which is not expanded",
            work_dir
        )));
    }
    if work_dir
        .components()
        .any(|c| matches!(c, Utf8Component::ParentDir))
    {
        return Err(Error::invalid_config(format!(
            "work-dir {} cannot contain '..'",
            work_dir
        )));
    }
    if !matches!(work_dir.components().last(), Some(Utf8Component::Normal(_))) {
        return Err(Error::invalid_config(format!(
            "work-dir {} must name a dedicated directory",
            work_dir
        )));
    }
    Ok(())
}

fn default_work_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(".github-repo-scaffolding-golang")
}

/// Hosting service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Base URL for the REST API
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Host used in clone URLs
    #[serde(default = "default_github_host")]
    pub host: String,

    /// Access token passed through to the API client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            host: default_github_host(),
            token: None,
        }
    }
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_github_host() -> String {
    "github.com".to_string()
}

/// Template repository to scaffold from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateSourceConfig {
    #[serde(default = "default_template_owner")]
    pub owner: String,

    #[serde(default = "default_template_repo")]
    pub repo: String,

    /// Branch, tag or commit to download
    #[serde(default = "default_template_reference")]
    pub reference: String,
}

impl Default for TemplateSourceConfig {
    fn default() -> Self {
        Self {
            owner: default_template_owner(),
            repo: default_template_repo(),
            reference: default_template_reference(),
        }
    }
}

fn default_template_owner() -> String {
    "devstream-io".to_string()
}
fn default_template_repo() -> String {
    "dtm-scaffolding-golang".to_string()
}
fn default_template_reference() -> String {
    "main".to_string()
}

/// Publish protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkflowConfig {
    /// Scratch branch staged files are committed to
    #[serde(default = "default_transit_branch")]
    pub transit_branch: String,

    /// Main branch used when the options leave it unset
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Per-file commit message, `{path}` is replaced by the target path
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Title of the merge request that squashes the scaffold
    #[serde(default = "default_merge_request_title")]
    pub merge_request_title: String,
}

impl WorkflowConfig {
    /// Branches for one run. `target` comes from the options and wins over
    /// the configured default.
    pub fn branches(&self, target: Option<&str>) -> BranchPair {
        let main = target
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_branch);
        BranchPair::new(&self.transit_branch, main)
    }

    /// Commit message for one file
    pub fn commit_message_for(&self, path: &str) -> String {
        self.commit_message.replace("{path}", path)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            transit_branch: default_transit_branch(),
            default_branch: default_branch(),
            commit_message: default_commit_message(),
            merge_request_title: default_merge_request_title(),
        }
    }
}

fn default_transit_branch() -> String {
    "init-with-devstream".to_string()
}
fn default_branch() -> String {
    crate::types::DEFAULT_MAIN_BRANCH.to_string()
}
fn default_commit_message() -> String {
    "Initialize {path}".to_string()
}
fn default_merge_request_title() -> String {
    "Initialize repository scaffolding".to_string()
}

/// Naming conventions of the template tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TreeConventions {
    /// Token in path segments replaced by the project name
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Suffix marking a file as a template
    #[serde(default = "default_template_suffix")]
    pub template_suffix: String,

    /// File committed straight to the main branch before anything else
    #[serde(default = "default_bootstrap_file")]
    pub bootstrap_file: String,

    /// README at the template root, never published
    #[serde(default = "default_readme_file")]
    pub readme_file: String,

    /// Version-control metadata directory, never published
    #[serde(default = "default_vcs_dir")]
    pub vcs_dir: String,
}

impl Default for TreeConventions {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            template_suffix: default_template_suffix(),
            bootstrap_file: default_bootstrap_file(),
            readme_file: default_readme_file(),
            vcs_dir: default_vcs_dir(),
        }
    }
}

fn default_placeholder() -> String {
    "_app_name_".to_string()
}
fn default_template_suffix() -> String {
    ".tpl".to_string()
}
fn default_bootstrap_file() -> String {
    ".gitignore".to_string()
}
fn default_readme_file() -> String {
    "README.md".to_string()
}
fn default_vcs_dir() -> String {
    ".git".to_string()
}
