//! [`RepositoryClient`] over the GitHub REST API

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reposcaffold_core::{
    ClientError, GitHubConfig, MergeMethod, MergeRequestId, ProvisioningOptions, RepositoryClient,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{
    ApiErrorBody, CreateFileRequest, CreatePullRequest, CreateRefRequest, CreateRepositoryRequest,
    GitRef, MergePullRequest, MergeResult, PullRequest,
};
use crate::error::{Error, Result};
use crate::{API_VERSION, USER_AGENT};

/// Build the shared HTTP client
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(Error::HttpClient)
}

/// Parse the configured API base URL
pub(crate) fn api_base(api_url: &str) -> Result<Url> {
    let url = Url::parse(api_url).map_err(|e| Error::InvalidApiUrl(format!("{}: {}", api_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidApiUrl(api_url.to_string()));
    }
    Ok(url)
}

/// Append path segments to a base URL, percent-encoding each one
pub(crate) fn endpoint<'s>(base: &Url, segments: impl IntoIterator<Item = &'s str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Start a request with the GitHub headers and optional bearer token
pub(crate) fn authorized(
    http: &reqwest::Client,
    method: Method,
    url: Url,
    token: Option<&str>,
) -> RequestBuilder {
    debug!("GitHub API: {} {}", method, url);
    let request = http
        .request(method, url)
        .header("Accept", "application/vnd.github+json")
        .header("X-GitHub-Api-Version", API_VERSION);
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Send a request and turn any non-success status into [`ClientError::Api`]
pub(crate) async fn send(request: RequestBuilder) -> std::result::Result<Response, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    if response.status().is_success() {
        Ok(response)
    } else {
        Err(api_error(response).await)
    }
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    ClientError::api(status.as_u16(), message)
}

async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, ClientError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Client bound to one repository, `{owner}/{repo}`
pub struct GitHubClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client for `owner/repo`
    pub fn new(config: &GitHubConfig, owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            base: api_base(&config.api_url)?,
            token: config.token.clone().filter(|t| !t.is_empty()),
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    /// Create a client for the repository the options describe. The
    /// organization wins over the user when both are set.
    pub fn for_options(config: &GitHubConfig, options: &ProvisioningOptions) -> Result<Self> {
        Self::new(config, options.resolved_owner(), &options.repo_name)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn request<'s>(&self, method: Method, segments: impl IntoIterator<Item = &'s str>) -> RequestBuilder {
        authorized(
            &self.http,
            method,
            endpoint(&self.base, segments),
            self.token.as_deref(),
        )
    }

    /// Request under `/repos/{owner}/{repo}`
    fn repo_request(&self, method: Method, tail: &[&str]) -> RequestBuilder {
        self.request(
            method,
            ["repos", self.owner.as_str(), self.repo.as_str()]
                .into_iter()
                .chain(tail.iter().copied()),
        )
    }

    async fn branch_head(&self, branch: &str) -> std::result::Result<String, ClientError> {
        let response = send(self.repo_request(Method::GET, &["git", "ref", "heads", branch])).await?;
        let reference: GitRef = decode(response).await?;
        Ok(reference.object.sha)
    }
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    async fn create_repository(&self, org: Option<&str>) -> std::result::Result<(), ClientError> {
        let body = CreateRepositoryRequest {
            name: &self.repo,
            private: false,
            auto_init: false,
        };
        let request = match org {
            Some(org) => self.request(Method::POST, ["orgs", org, "repos"]),
            None => self.request(Method::POST, ["user", "repos"]),
        };
        send(request.json(&body)).await?;
        debug!("Created repository {}/{}", self.owner, self.repo);
        Ok(())
    }

    async fn delete_repository(&self) -> std::result::Result<(), ClientError> {
        send(self.repo_request(Method::DELETE, &[])).await?;
        debug!("Deleted repository {}/{}", self.owner, self.repo);
        Ok(())
    }

    async fn repository_exists(&self) -> std::result::Result<bool, ClientError> {
        let response = self
            .repo_request(Method::GET, &[])
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(api_error(response).await),
        }
    }

    async fn create_file(
        &self,
        content: &[u8],
        target_path: &str,
        branch: &str,
        message: &str,
    ) -> std::result::Result<(), ClientError> {
        let body = CreateFileRequest {
            message,
            content: BASE64.encode(content),
            branch,
        };
        let tail: Vec<&str> = std::iter::once("contents")
            .chain(target_path.split('/'))
            .collect();
        send(self.repo_request(Method::PUT, &tail).json(&body)).await?;
        Ok(())
    }

    async fn create_branch(
        &self,
        from_branch: &str,
        new_branch: &str,
    ) -> std::result::Result<(), ClientError> {
        let sha = self.branch_head(from_branch).await?;
        let body = CreateRefRequest {
            reference: format!("refs/heads/{}", new_branch),
            sha: &sha,
        };
        send(self.repo_request(Method::POST, &["git", "refs"]).json(&body)).await?;
        debug!("Created branch {} from {} at {}", new_branch, from_branch, sha);
        Ok(())
    }

    async fn open_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        title: &str,
    ) -> std::result::Result<MergeRequestId, ClientError> {
        let body = CreatePullRequest {
            title,
            head: source_branch,
            base: target_branch,
        };
        let response = send(self.repo_request(Method::POST, &["pulls"]).json(&body)).await?;
        let pull: PullRequest = decode(response).await?;
        debug!("Opened pull request #{}", pull.number);
        Ok(pull.number)
    }

    async fn merge_request(
        &self,
        id: MergeRequestId,
        method: MergeMethod,
    ) -> std::result::Result<(), ClientError> {
        let number = id.to_string();
        let body = MergePullRequest {
            merge_method: method.as_str(),
        };
        let response = send(
            self.repo_request(Method::PUT, &["pulls", number.as_str(), "merge"])
                .json(&body),
        )
        .await?;
        let status = response.status().as_u16();
        let result: MergeResult = decode(response).await?;
        if !result.merged {
            return Err(ClientError::api(
                status,
                result
                    .message
                    .unwrap_or_else(|| format!("pull request #{} was not merged", id)),
            ));
        }
        Ok(())
    }
}
