//! Where template trees come from

use anyhow::Result;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use reposcaffold_core::TemplateSourceConfig;
use reposcaffold_github::TemplateFetcher;

/// Materializes a template tree inside a scratch directory
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Place the template under `work_dir` and return its root
    async fn fetch(&self, template: &TemplateSourceConfig, work_dir: &Utf8Path) -> Result<Utf8PathBuf>;
}

#[async_trait]
impl TemplateSource for TemplateFetcher {
    async fn fetch(&self, template: &TemplateSourceConfig, work_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        Ok(TemplateFetcher::fetch(self, template, work_dir).await?)
    }
}
