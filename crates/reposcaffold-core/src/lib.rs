//! # reposcaffold-core
//!
//! Provisions a new repository on a Git hosting service from a local template
//! tree:
//! - Template rendering with `[[ ]]` delimiters
//! - Mapping template paths to repository paths
//! - Publishing the tree through a bootstrap commit and a transit branch
//! - Squash-merging the result onto the main branch, or deleting the
//!   repository if any step after its creation fails
//!
//! The hosting service is reached through the [`RepositoryClient`] trait.
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use reposcaffold_core::testing::MockRepositoryClient;
//! use reposcaffold_core::{provision, ProvisioningOptions, ScaffoldConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MockRepositoryClient::new();
//! let config = ScaffoldConfig::default();
//! let options = ProvisioningOptions::for_owner("svc-a", "alice");
//!
//! let provisioned = provision(
//!     Utf8Path::new(".github-repo-scaffolding-golang/dtm-scaffolding-golang"),
//!     &options,
//!     &client,
//!     &config,
//! )
//! .await?;
//! println!("{}", provisioned.state.outputs.repo_url);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod path;
pub mod provision;
pub mod publish;
pub mod render;
pub mod state;
pub mod testing;
pub mod types;

pub use client::{MergeMethod, MergeRequestId, RepositoryClient};
pub use config::{GitHubConfig, ScaffoldConfig, TemplateSourceConfig, TreeConventions, WorkflowConfig};
pub use error::{ClientError, Compensation, Error, ProvisionError, PublishError, Result};
pub use provision::{provision, ProvisionStage, Provisioned, Provisioner};
pub use publish::{PublishReport, TreePublisher};
pub use state::build_state;
pub use types::{ProvisioningOptions, ProvisioningResult, RenderContext};
