//! create / read / update / delete entry points

use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use reposcaffold_core::{
    build_state, provision, ClientError, Compensation, GitHubConfig, ProvisionError, Provisioned,
    ProvisioningOptions, PublishReport, RepositoryClient, ScaffoldConfig,
};
use reposcaffold_github::{GitHubClient, TemplateFetcher};
use serde_json::Value;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

use crate::source::TemplateSource;
use crate::TOKEN_ENV;

/// Options as handed over by the orchestration engine
pub type OptionsMap = serde_json::Map<String, Value>;

/// State handed back to the orchestration engine
pub type StateMap = serde_json::Map<String, Value>;

/// Builds a repository client bound to the repository the options describe
pub trait ClientFactory: Send + Sync {
    fn connect(&self, options: &ProvisioningOptions) -> Result<Box<dyn RepositoryClient>>;
}

/// [`ClientFactory`] for the GitHub REST API
pub struct GitHubClients {
    config: GitHubConfig,
}

impl GitHubClients {
    pub fn new(config: GitHubConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for GitHubClients {
    fn connect(&self, options: &ProvisioningOptions) -> Result<Box<dyn RepositoryClient>> {
        let client = GitHubClient::for_options(&self.config, options)
            .context("Failed to create GitHub client")?;
        Ok(Box::new(client))
    }
}

/// Fill in the token from `lookup` when the config has none
pub fn resolve_token(github: &mut GitHubConfig, lookup: impl FnOnce() -> Option<String>) {
    if github.token.as_deref().is_some_and(|t| !t.is_empty()) {
        return;
    }
    github.token = lookup().filter(|t| !t.is_empty());
}

fn decode_options(options: &OptionsMap) -> Result<ProvisioningOptions> {
    ProvisioningOptions::from_value(Value::Object(options.clone())).context("Invalid plugin options")
}

/// The repository scaffolding plugin
pub struct Plugin {
    config: ScaffoldConfig,
    clients: Box<dyn ClientFactory>,
    templates: Box<dyn TemplateSource>,
}

impl Plugin {
    pub fn new(
        config: ScaffoldConfig,
        clients: impl ClientFactory + 'static,
        templates: impl TemplateSource + 'static,
    ) -> Result<Self> {
        config.validate().context("Invalid scaffold configuration")?;
        Ok(Self {
            config,
            clients: Box::new(clients),
            templates: Box::new(templates),
        })
    }

    /// Plugin backed by GitHub. The token falls back to `GITHUB_TOKEN`.
    pub fn github(mut config: ScaffoldConfig) -> Result<Self> {
        resolve_token(&mut config.github, || std::env::var(TOKEN_ENV).ok());
        if config.github.token.is_none() {
            warn!(
                "No GitHub token configured; set {} or github.token in the config",
                TOKEN_ENV
            );
        }

        let templates =
            TemplateFetcher::new(&config.github).context("Failed to create template fetcher")?;
        let clients = GitHubClients::new(config.github.clone());
        Self::new(config, clients, templates)
    }

    pub fn config(&self) -> &ScaffoldConfig {
        &self.config
    }

    /// Provision the repository and return its state map
    pub async fn create(&self, options: &OptionsMap) -> Result<StateMap> {
        let options = decode_options(options)?;
        let provisioned = self.create_repository(&options).await?;
        Ok(provisioned.state.to_map()?)
    }

    /// Provision the repository. The template is fetched into a scratch dir
    /// of its own under the work dir, removed afterwards whether or not
    /// provisioning succeeded.
    pub async fn create_repository(&self, options: &ProvisioningOptions) -> Result<Provisioned> {
        let client = self.clients.connect(options)?;
        let scratch = self.scratch_dir(&options.repo_name).await?;
        let run_dir = Utf8PathBuf::from_path_buf(scratch.path().to_path_buf())
            .map_err(|p| anyhow!("Scratch directory {} is not valid UTF-8", p.display()))?;

        let outcome = self
            .provision_from_template(options, client.as_ref(), &run_dir)
            .await;

        if let Err(e) = scratch.close() {
            warn!("Failed to remove scratch directory {}: {}", run_dir, e);
        } else {
            debug!("Removed scratch directory {}", run_dir);
        }
        outcome
    }

    async fn scratch_dir(&self, repo: &str) -> Result<TempDir> {
        let work_dir = &self.config.work_dir;
        tokio::fs::create_dir_all(work_dir)
            .await
            .with_context(|| format!("Failed to create work directory {}", work_dir))?;
        tempfile::Builder::new()
            .prefix(&format!("{}-", repo))
            .tempdir_in(work_dir)
            .with_context(|| format!("Failed to create scratch directory in {}", work_dir))
    }

    async fn provision_from_template(
        &self,
        options: &ProvisioningOptions,
        client: &dyn RepositoryClient,
        run_dir: &Utf8Path,
    ) -> Result<Provisioned> {
        let root = self
            .templates
            .fetch(&self.config.template, run_dir)
            .await
            .context("Failed to fetch template")?;

        info!(
            "Provisioning {}/{} from {}",
            options.resolved_owner(),
            options.repo_name,
            root
        );

        match provision(&root, options, client, &self.config).await {
            Ok(provisioned) => {
                log_report(&provisioned.report);
                info!(
                    "Repository ready at {} (merge request #{} squashed)",
                    provisioned.state.outputs.repo_url, provisioned.merge_request
                );
                Ok(provisioned)
            }
            Err(e) => {
                log_failure(&e);
                Err(e.into())
            }
        }
    }

    /// State map if the repository exists, `None` otherwise
    pub async fn read(&self, options: &OptionsMap) -> Result<Option<StateMap>> {
        let options = decode_options(options)?;
        let client = self.clients.connect(&options)?;

        let exists = client
            .repository_exists()
            .await
            .with_context(|| format!("Failed to look up repository {}", options.repo_name))?;
        if !exists {
            debug!("Repository {} not found", options.repo_name);
            return Ok(None);
        }

        let state = build_state(&options, &self.config.github.host);
        Ok(Some(state.to_map()?))
    }

    /// Delete the repository. A repository that is already gone is not an error.
    pub async fn delete(&self, options: &OptionsMap) -> Result<()> {
        let options = decode_options(options)?;
        let client = self.clients.connect(&options)?;

        match client.delete_repository().await {
            Ok(()) => {
                info!("Deleted repository {}", options.repo_name);
                Ok(())
            }
            Err(ClientError::Api { status: 404, .. }) => {
                warn!("Repository {} does not exist, nothing to delete", options.repo_name);
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to delete repository {}", options.repo_name)),
        }
    }

    /// Delete then re-create the repository
    pub async fn update(&self, options: &OptionsMap) -> Result<StateMap> {
        self.delete(options).await?;
        self.create(options).await
    }
}

fn log_report(report: &PublishReport) {
    for skipped in &report.skipped {
        debug!("Skipped {} ({})", skipped.source, skipped.reason);
    }
    for commit in &report.commits {
        debug!(
            "Committed {} to {} ({} bytes)",
            commit.target_path, commit.branch, commit.size
        );
    }
    info!(
        "Published {} files via {} into {}",
        report.commits.len(),
        report.branches.transit,
        report.branches.main
    );
}

fn log_failure(err: &ProvisionError) {
    let cause = anyhow::Chain::new(&err.error)
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ");
    match &err.compensation {
        Compensation::NotNeeded => {
            error!("Provisioning {} failed while {}: {}", err.repo, err.stage, cause);
        }
        Compensation::RepositoryDeleted => {
            warn!(
                "Provisioning {} failed while {}: {}; repository deleted",
                err.repo, err.stage, cause
            );
        }
        Compensation::Failed(delete_err) => {
            error!(
                "Provisioning {} failed while {}: {}; deleting the repository also failed: {}. Manual cleanup may be required",
                err.repo, err.stage, cause, delete_err
            );
        }
    }
}
