//! Request and response bodies for the GitHub REST endpoints in use

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CreateRepositoryRequest<'a> {
    pub name: &'a str,
    pub private: bool,
    /// Left off so the bootstrap commit creates the default branch
    pub auto_init: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateFileRequest<'a> {
    pub message: &'a str,
    /// Base64-encoded file body
    pub content: String,
    pub branch: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GitRef {
    pub object: GitObject,
}

#[derive(Debug, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    pub reference: String,
    pub sha: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreatePullRequest<'a> {
    pub title: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
}

#[derive(Debug, Serialize)]
pub struct MergePullRequest<'a> {
    pub merge_method: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MergeResult {
    pub merged: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body GitHub returns with 4xx/5xx responses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
