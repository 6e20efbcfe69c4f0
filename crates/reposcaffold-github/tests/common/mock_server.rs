//! Mock GitHub API helpers
//!
//! Each helper mounts one endpoint for `alice/svc-a` unless told otherwise.

use reposcaffold_core::{GitHubConfig, ScaffoldConfig};
use serde_json::json;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{OWNER, REPO, TEST_TOKEN};

/// GitHub config pointed at the mock server
pub fn github_config(server: &MockServer) -> GitHubConfig {
    GitHubConfig {
        api_url: server.uri(),
        host: "github.com".to_string(),
        token: Some(TEST_TOKEN.to_string()),
    }
}

/// Scaffold config pointed at the mock server
pub fn scaffold_config(server: &MockServer) -> ScaffoldConfig {
    ScaffoldConfig {
        github: github_config(server),
        ..Default::default()
    }
}

pub fn repo_path(tail: &str) -> String {
    if tail.is_empty() {
        format!("/repos/{}/{}", OWNER, REPO)
    } else {
        format!("/repos/{}/{}/{}", OWNER, REPO, tail)
    }
}

/// Authenticated repository creation under the user account
pub async fn mock_create_user_repository(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": REPO,
            "full_name": format!("{}/{}", OWNER, REPO),
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Accept every contents PUT for the repository
pub async fn mock_create_files(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path_regex(format!(r"^/repos/{}/{}/contents/.+$", OWNER, REPO)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "content": {} })))
        .mount(server)
        .await;
}

/// Branch lookup and ref creation
pub async fn mock_create_branch(server: &MockServer, from: &str, sha: &str) {
    Mock::given(method("GET"))
        .and(path(repo_path(&format!("git/ref/heads/{}", from))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": format!("refs/heads/{}", from),
            "object": { "sha": sha, "type": "commit" },
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(repo_path("git/refs")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ref": "created" })))
        .mount(server)
        .await;
}

/// Pull request creation answering with `number`, and its squash merge
pub async fn mock_pull_request(server: &MockServer, number: u64) {
    Mock::given(method("POST"))
        .and(path(repo_path("pulls")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "number": number })))
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(repo_path(&format!("pulls/{}/merge", number))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "9d1e",
            "merged": true,
            "message": "Pull Request successfully merged",
        })))
        .mount(server)
        .await;
}

/// Repository deletion, verified to happen `expected_calls` times
pub async fn mock_delete_repository(server: &MockServer, expected_calls: u64) {
    Mock::given(method("DELETE"))
        .and(path(repo_path("")))
        .respond_with(ResponseTemplate::new(204))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Every endpoint a successful provisioning run touches
pub async fn mock_happy_path(server: &MockServer) {
    mock_create_user_repository(server, 1).await;
    mock_create_files(server).await;
    mock_create_branch(server, "main", "5c0ffee").await;
    mock_pull_request(server, 1).await;
}

/// A GitHub-style error response
pub fn api_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest",
    }))
}
