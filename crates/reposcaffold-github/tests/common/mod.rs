//! Common test infrastructure for reposcaffold-github tests
//!
//! - `mock_server`: wiremock setup for the GitHub endpoints in use
//! - `archive`: builds gzipped tarballs shaped like GitHub's

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod archive;
pub mod mock_server;

pub use archive::*;
pub use mock_server::*;

pub const TEST_TOKEN: &str = "test-token";
pub const OWNER: &str = "alice";
pub const REPO: &str = "svc-a";
pub const TRANSIT: &str = "init-with-devstream";
