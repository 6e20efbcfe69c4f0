//! Create, populate, finalize, or roll back a remote repository

use camino::Utf8Path;

use crate::client::{MergeMethod, MergeRequestId, RepositoryClient};
use crate::config::ScaffoldConfig;
use crate::error::{Compensation, Error, FinalizeStep, ProvisionError};
use crate::publish::{PublishReport, TreePublisher};
use crate::state::build_state;
use crate::types::{BranchPair, ProvisioningOptions, ProvisioningResult, RenderContext};

/// Where a provisioning run is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    NotCreated,
    Created,
    Publishing,
    Finalizing,
    Done,
    RolledBack,
    Failed,
}

impl ProvisionStage {
    /// Whether the remote repository exists at this stage
    pub fn repository_exists(&self) -> bool {
        matches!(self, Self::Created | Self::Publishing | Self::Finalizing | Self::Done)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::RolledBack | Self::Failed)
    }
}

impl std::fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotCreated => "not-created",
            Self::Created => "created",
            Self::Publishing => "publishing",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::RolledBack => "rolled-back",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

impl ProvisionError {
    /// Terminal stage the run ended in
    pub fn terminal_stage(&self) -> ProvisionStage {
        match self.compensation {
            Compensation::RepositoryDeleted => ProvisionStage::RolledBack,
            Compensation::NotNeeded | Compensation::Failed(_) => ProvisionStage::Failed,
        }
    }
}

/// A finished repository
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub state: ProvisioningResult,
    pub report: PublishReport,
    pub merge_request: MergeRequestId,
}

/// Runs the provisioning workflow against one client
pub struct Provisioner<'a> {
    client: &'a dyn RepositoryClient,
    config: &'a ScaffoldConfig,
}

impl<'a> Provisioner<'a> {
    pub fn new(client: &'a dyn RepositoryClient, config: &'a ScaffoldConfig) -> Self {
        Self { client, config }
    }

    /// Create the repository, publish `template_root` into it and squash the
    /// result onto the main branch. If anything fails after the repository was
    /// created, the repository is deleted before the error is returned.
    pub async fn provision(
        &self,
        template_root: &Utf8Path,
        options: &ProvisioningOptions,
    ) -> Result<Provisioned, ProvisionError> {
        let fail = |stage, error| ProvisionError {
            repo: options.repo_name.clone(),
            stage,
            error,
            compensation: Compensation::NotNeeded,
        };

        options
            .validate()
            .map_err(|e| fail(ProvisionStage::NotCreated, e))?;

        self.client
            .create_repository(options.org())
            .await
            .map_err(|source| {
                fail(
                    ProvisionStage::NotCreated,
                    Error::RepositoryCreate {
                        repo: options.repo_name.clone(),
                        source,
                    },
                )
            })?;

        let branches = self
            .config
            .workflow
            .branches(options.target_branch.as_deref());
        let context = RenderContext::from_options(options);
        let publisher = TreePublisher::new(
            template_root,
            &context,
            branches.clone(),
            &self.config.conventions,
            &self.config.workflow,
        );

        let report = match publisher.publish(self.client).await {
            Ok(report) => report,
            Err(e) => {
                return Err(self
                    .compensate(options, ProvisionStage::Publishing, e.into())
                    .await)
            }
        };

        let merge_request = match self.finalize(&branches).await {
            Ok(id) => id,
            Err(e) => {
                return Err(self
                    .compensate(options, ProvisionStage::Finalizing, e)
                    .await)
            }
        };

        Ok(Provisioned {
            state: build_state(options, &self.config.github.host),
            report,
            merge_request,
        })
    }

    /// Open the transit merge request and squash it onto the main branch
    async fn finalize(&self, branches: &BranchPair) -> Result<MergeRequestId, Error> {
        let id = self
            .client
            .open_merge_request(
                &branches.transit,
                &branches.main,
                &self.config.workflow.merge_request_title,
            )
            .await
            .map_err(|source| Error::Finalize {
                step: FinalizeStep::OpenMergeRequest,
                source,
            })?;

        self.client
            .merge_request(id, MergeMethod::Squash)
            .await
            .map_err(|source| Error::Finalize {
                step: FinalizeStep::SquashMerge,
                source,
            })?;

        Ok(id)
    }

    /// Best-effort delete of the repository created by this run. The original
    /// error is always the one reported.
    async fn compensate(
        &self,
        options: &ProvisioningOptions,
        stage: ProvisionStage,
        error: Error,
    ) -> ProvisionError {
        let compensation = match self.client.delete_repository().await {
            Ok(()) => Compensation::RepositoryDeleted,
            Err(e) => Compensation::Failed(e),
        };

        ProvisionError {
            repo: options.repo_name.clone(),
            stage,
            error,
            compensation,
        }
    }
}

/// Provision a repository from a local template tree
pub async fn provision(
    template_root: &Utf8Path,
    options: &ProvisioningOptions,
    client: &dyn RepositoryClient,
    config: &ScaffoldConfig,
) -> Result<Provisioned, ProvisionError> {
    Provisioner::new(client, config)
        .provision(template_root, options)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_properties() {
        assert!(!ProvisionStage::NotCreated.repository_exists());
        assert!(ProvisionStage::Publishing.repository_exists());
        assert!(!ProvisionStage::RolledBack.repository_exists());

        assert!(ProvisionStage::Done.is_terminal());
        assert!(ProvisionStage::RolledBack.is_terminal());
        assert!(!ProvisionStage::Finalizing.is_terminal());
    }

    #[test]
    fn test_terminal_stage_follows_compensation() {
        let err = |compensation| ProvisionError {
            repo: "svc-a".into(),
            stage: ProvisionStage::Publishing,
            error: Error::invalid_options("x"),
            compensation,
        };

        assert_eq!(
            err(Compensation::RepositoryDeleted).terminal_stage(),
            ProvisionStage::RolledBack
        );
        assert_eq!(
            err(Compensation::NotNeeded).terminal_stage(),
            ProvisionStage::Failed
        );
        assert_eq!(
            err(Compensation::Failed(crate::error::ClientError::other("x"))).terminal_stage(),
            ProvisionStage::Failed
        );
    }
}
