//! Template download and extraction
//!
//! The template repository is fetched as a gzipped tarball from
//! `/repos/{owner}/{repo}/tarball/{ref}`. GitHub wraps the tree in a single
//! `{owner}-{repo}-{sha}/` directory, which is renamed to the bare repository
//! name so the template root is predictable.

use std::io::Cursor;

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::GzDecoder;
use reposcaffold_core::{ClientError, GitHubConfig, TemplateSourceConfig};
use reqwest::{Method, Url};
use tar::Archive;
use tracing::{debug, info};

use crate::client::{api_base, authorized, endpoint, http_client, send};
use crate::error::{Error, Result};

/// Downloads template repositories
pub struct TemplateFetcher {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl TemplateFetcher {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            base: api_base(&config.api_url)?,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Tarball URL for a template source
    pub fn tarball_url(&self, source: &TemplateSourceConfig) -> Url {
        endpoint(
            &self.base,
            [
                "repos",
                source.owner.as_str(),
                source.repo.as_str(),
                "tarball",
                source.reference.as_str(),
            ],
        )
    }

    /// Download the template tarball
    pub async fn download(&self, source: &TemplateSourceConfig) -> Result<Vec<u8>> {
        let template = format!("{}/{}@{}", source.owner, source.repo, source.reference);
        let url = self.tarball_url(source);

        let bytes = self
            .get_bytes(url)
            .await
            .map_err(|source| Error::Download { template, source })?;

        debug!("Downloaded template archive ({} bytes)", bytes.len());
        Ok(bytes)
    }

    async fn get_bytes(&self, url: Url) -> std::result::Result<Vec<u8>, ClientError> {
        let response = send(authorized(&self.http, Method::GET, url, self.token.as_deref())).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Download the template and unpack it into `work_dir`, which must be
    /// empty or missing. Returns the template root, `work_dir/{repo}`.
    pub async fn fetch(&self, source: &TemplateSourceConfig, work_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        info!(
            "Fetching template {}/{}@{} into {}",
            source.owner, source.repo, source.reference, work_dir
        );
        let data = self.download(source).await?;
        unpack_template(data, work_dir, &source.repo).await
    }
}

/// Unpack a gzipped template tarball into `work_dir` and rename its single
/// top-level directory to `name`.
pub async fn unpack_template(data: Vec<u8>, work_dir: &Utf8Path, name: &str) -> Result<Utf8PathBuf> {
    tokio::fs::create_dir_all(work_dir)
        .await
        .map_err(|e| Error::work_dir(work_dir, e))?;

    let dest = work_dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));
        archive
            .unpack(&dest)
            .map_err(|source| Error::Extract { path: dest, source })
    })
    .await??;

    let top = single_top_level_dir(work_dir).await?;
    let root = work_dir.join(name);
    if top != root {
        tokio::fs::rename(&top, &root)
            .await
            .map_err(|e| Error::work_dir(&root, e))?;
    }

    debug!("Template unpacked at {}", root);
    Ok(root)
}

async fn single_top_level_dir(work_dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let mut entries = tokio::fs::read_dir(work_dir)
        .await
        .map_err(|e| Error::work_dir(work_dir, e))?;

    let mut dirs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::work_dir(work_dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| Error::work_dir(work_dir, e))?;
        // GitHub archives carry a pax_global_header entry alongside the tree
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }

    match dirs.len() {
        0 => Err(Error::layout(work_dir, "archive contains no directory")),
        1 => {
            let dir = dirs.remove(0);
            Utf8PathBuf::from_path_buf(dir)
                .map_err(|p| Error::layout(work_dir, format!("non UTF-8 path {}", p.display())))
        }
        n => Err(Error::layout(
            work_dir,
            format!("expected one top-level directory, found {}", n),
        )),
    }
}
