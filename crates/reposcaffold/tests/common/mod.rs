//! Test doubles for the plugin surface

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use reposcaffold::{ClientFactory, OptionsMap, TemplateSource};
use reposcaffold_core::testing::MockRepositoryClient;
use reposcaffold_core::{ProvisioningOptions, RepositoryClient, ScaffoldConfig, TemplateSourceConfig};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Hands out clones of one shared mock client and remembers who asked
#[derive(Clone, Default)]
pub struct MockClients {
    pub client: MockRepositoryClient,
    pub connected: Arc<Mutex<Vec<(String, String)>>>,
}

impl ClientFactory for MockClients {
    fn connect(&self, options: &ProvisioningOptions) -> Result<Box<dyn RepositoryClient>> {
        self.connected
            .lock()
            .unwrap()
            .push((options.resolved_owner().to_string(), options.repo_name.clone()));
        Ok(Box::new(self.client.clone()))
    }
}

/// Hands out a fresh mock client per repository name
#[derive(Clone, Default)]
pub struct PerRepoClients {
    pub clients: Arc<Mutex<BTreeMap<String, MockRepositoryClient>>>,
}

impl PerRepoClients {
    pub fn client(&self, repo: &str) -> MockRepositoryClient {
        self.clients.lock().unwrap()[repo].clone()
    }
}

impl ClientFactory for PerRepoClients {
    fn connect(&self, options: &ProvisioningOptions) -> Result<Box<dyn RepositoryClient>> {
        let client = MockRepositoryClient::new();
        self.clients
            .lock()
            .unwrap()
            .insert(options.repo_name.clone(), client.clone());
        Ok(Box::new(client))
    }
}

/// Writes a fixed set of files as the template. Like the tarball fetcher it
/// refuses a work dir that already holds something.
#[derive(Clone)]
pub struct LocalTemplate {
    pub files: Vec<(&'static str, &'static str)>,
}

#[async_trait]
impl TemplateSource for LocalTemplate {
    async fn fetch(&self, template: &TemplateSourceConfig, work_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        tokio::fs::create_dir_all(work_dir).await?;
        let mut entries = tokio::fs::read_dir(work_dir).await?;
        if let Some(entry) = entries.next_entry().await? {
            anyhow::bail!("{} is not empty: found {}", work_dir, entry.path().display());
        }

        let root = work_dir.join(&template.repo);
        for (rel, content) in &self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, content).await?;
            tokio::task::yield_now().await;
        }
        Ok(root)
    }
}

/// Template source that always fails
pub struct UnreachableTemplate;

#[async_trait]
impl TemplateSource for UnreachableTemplate {
    async fn fetch(&self, _template: &TemplateSourceConfig, _work_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        anyhow::bail!("connection refused")
    }
}

pub fn golang_template() -> LocalTemplate {
    LocalTemplate {
        files: vec![
            (".gitignore.tpl", "/bin/[[ .AppName ]]\n"),
            ("README.md", "# dtm-scaffolding-golang\n"),
            (
                "app/_app_name_/main.go.tpl",
                "package main\n\n// module github.com/[[ .Repo.Owner ]]/[[ .Repo.Name ]]\n",
            ),
        ],
    }
}

/// A template with enough files that overlapping runs interleave
pub fn go_service_template() -> LocalTemplate {
    LocalTemplate {
        files: vec![
            (".github/workflows/main.yml.tpl", "image: [[ .ImageRepo ]]\n"),
            (".gitignore.tpl", "/bin/[[ .AppName ]]\n"),
            ("Dockerfile.tpl", "FROM golang\nRUN go build -o /[[ .AppName ]]\n"),
            ("Makefile", "build:\n\tgo build ./...\n"),
            ("README.md", "# template\n"),
            ("cmd/_app_name_/main.go.tpl", "package main // [[ .AppName ]]\n"),
            ("go.mod.tpl", "module github.com/[[ .Repo.Owner ]]/[[ .Repo.Name ]]\n"),
            ("internal/pkg/version.go", "package pkg\n"),
        ],
    }
}

/// Entries left directly under `dir`
pub fn entries(dir: &Utf8Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Default config with the work directory inside a temp dir
pub fn test_config() -> (TempDir, ScaffoldConfig) {
    let dir = TempDir::new().unwrap();
    let config = ScaffoldConfig {
        work_dir: Utf8PathBuf::try_from(dir.path().join(".github-repo-scaffolding-golang")).unwrap(),
        ..Default::default()
    };
    (dir, config)
}

pub fn options(pairs: &[(&str, &str)]) -> OptionsMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::from(*v)))
        .collect()
}
