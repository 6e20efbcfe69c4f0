//! # reposcaffold
//!
//! Plugin surface for repository scaffolding. The orchestration engine hands
//! over a loosely-typed options map and gets a state map back:
//!
//! - [`Plugin::create`] fetches the template, provisions the repository and
//!   returns its state
//! - [`Plugin::read`] returns the state if the repository exists
//! - [`Plugin::update`] deletes and re-creates the repository
//! - [`Plugin::delete`] removes the repository
//!
//! Outcomes (commits, skipped entries, rollbacks) are logged here with
//! `tracing`; the core only reports them.

pub mod plugin;
pub mod source;

pub use plugin::{ClientFactory, GitHubClients, OptionsMap, Plugin, StateMap};
pub use source::TemplateSource;

/// Environment variable consulted when no token is configured
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
