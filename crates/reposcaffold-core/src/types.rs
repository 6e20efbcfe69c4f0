//! Core types for repository provisioning

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Branch used when the options do not name one
pub const DEFAULT_MAIN_BRANCH: &str = "main";

/// Options for one provisioning run, as handed over by the orchestration layer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvisioningOptions {
    /// Name of the repository to create
    #[serde(rename = "repo")]
    pub repo_name: String,

    /// Personal account login
    #[serde(default, rename = "owner", skip_serializing_if = "Option::is_none")]
    pub owner_login: Option<String>,

    /// Organization login
    #[serde(default, rename = "org", skip_serializing_if = "Option::is_none")]
    pub org_login: Option<String>,

    /// Container image repository substituted into templates
    #[serde(default, alias = "imageRepo", skip_serializing_if = "Option::is_none")]
    pub image_repo: Option<String>,

    /// Branch the scaffold is merged into
    #[serde(default, rename = "branch", skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,
}

impl ProvisioningOptions {
    /// Options for a repository under a personal account
    pub fn for_owner(repo_name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            owner_login: Some(owner.into()),
            ..Default::default()
        }
    }

    /// Options for a repository under an organization
    pub fn for_org(repo_name: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            org_login: Some(org.into()),
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner_login = Some(owner.into());
        self
    }

    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org_login = Some(org.into());
        self
    }

    pub fn with_image_repo(mut self, image_repo: impl Into<String>) -> Self {
        self.image_repo = Some(image_repo.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = Some(branch.into());
        self
    }

    /// Decode options from the loosely-typed map the orchestration layer passes
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let options: Self = serde_json::from_value(value)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the options describe a repository that can be created
    pub fn validate(&self) -> Result<()> {
        if self.repo_name.trim().is_empty() {
            return Err(Error::invalid_options("repo cannot be empty"));
        }

        if self.repo_name.contains('/') {
            return Err(Error::invalid_options(format!(
                "repo must be a bare name, got: {}",
                self.repo_name
            )));
        }

        if self.owner().is_none() && self.org().is_none() {
            return Err(Error::invalid_options("one of owner or org must be set"));
        }

        if let Some(branch) = self.target_branch.as_deref() {
            if branch.contains("..") || branch.starts_with('-') || branch.contains(' ') {
                return Err(Error::invalid_options(format!(
                    "invalid branch name: {}",
                    branch
                )));
            }
        }

        Ok(())
    }

    /// Personal login, ignoring empty strings
    pub fn owner(&self) -> Option<&str> {
        self.owner_login.as_deref().filter(|s| !s.is_empty())
    }

    /// Organization login, ignoring empty strings
    pub fn org(&self) -> Option<&str> {
        self.org_login.as_deref().filter(|s| !s.is_empty())
    }

    /// Account the repository lives under. The organization wins when both
    /// logins are set; this one rule drives templating, the remote
    /// coordinates and the clone URL alike.
    pub fn resolved_owner(&self) -> &str {
        self.org().or_else(|| self.owner()).unwrap_or_default()
    }

    /// Project name substituted into paths and templates
    pub fn app_name(&self) -> &str {
        &self.repo_name
    }
}

/// Repository coordinates exposed to templates as `.Repo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepoRef {
    pub name: String,
    pub owner: String,
}

/// Values a template can reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderContext {
    pub app_name: String,
    pub image_repo: String,
    pub repo: RepoRef,
}

impl RenderContext {
    /// Derive the context once per run
    pub fn from_options(options: &ProvisioningOptions) -> Self {
        Self {
            app_name: options.app_name().to_string(),
            image_repo: options.image_repo.clone().unwrap_or_default(),
            repo: RepoRef {
                name: options.repo_name.clone(),
                owner: options.resolved_owner().to_string(),
            },
        }
    }
}

/// One file to be committed to the remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileCommit {
    /// Repository-relative path, `/`-separated
    pub target_path: String,
    pub content: Vec<u8>,
    pub branch: String,
}

/// The two branches the publish protocol works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPair {
    /// Scratch branch that collects every non-bootstrap file
    pub transit: String,
    /// Branch the scaffold is squash-merged into
    pub main: String,
}

impl BranchPair {
    pub fn new(transit: impl Into<String>, main: impl Into<String>) -> Self {
        Self {
            transit: transit.into(),
            main: main.into(),
        }
    }
}

/// Outputs other plugins can reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outputs {
    pub owner: String,
    pub org: String,
    pub repo: String,
    #[serde(rename = "repoURL")]
    pub repo_url: String,
}

/// State reported back to the caller after a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningResult {
    #[serde(rename = "owner")]
    pub owner_login: String,
    #[serde(rename = "org")]
    pub org_login: String,
    #[serde(rename = "repoName")]
    pub repo_name: String,
    pub outputs: Outputs,
}

impl ProvisioningResult {
    /// The loosely-typed state map the orchestration layer stores
    pub fn to_map(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(Error::invalid_options("state did not serialize to a map")),
        }
    }
}
