//! GitHub backend for reposcaffold
//!
//! Provides:
//! - [`GitHubClient`], a [`RepositoryClient`](reposcaffold_core::RepositoryClient)
//!   over the GitHub REST API
//! - [`TemplateFetcher`], which downloads a template repository as a tarball
//!   and unpacks it into a local work directory

pub mod api;
pub mod client;
pub mod error;
pub mod template;

pub use client::GitHubClient;
pub use error::{Error, Result};
pub use template::{unpack_template, TemplateFetcher};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("reposcaffold/", env!("CARGO_PKG_VERSION"));

/// REST API version requested from GitHub
pub const API_VERSION: &str = "2022-11-28";
