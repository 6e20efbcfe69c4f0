//! Mapping from template-tree paths to repository paths

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::error::PathFormatError;

/// Translates walked local paths into repository-relative paths.
///
/// The local root (the unpacked template directory) is stripped, and every
/// occurrence of the placeholder token is replaced by the project name.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    root: Utf8PathBuf,
    placeholder: String,
    app_name: String,
}

impl PathTranslator {
    pub fn new(
        root: impl Into<Utf8PathBuf>,
        placeholder: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            placeholder: placeholder.into(),
            app_name: app_name.into(),
        }
    }

    /// Local root every translated path must live under
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Strip the local root, yielding a `/`-separated repository path
    pub fn relative(&self, local: &Utf8Path) -> Result<String, PathFormatError> {
        let format_error = || PathFormatError {
            path: local.to_path_buf(),
            root: self.root.clone(),
        };

        let stripped = local.strip_prefix(&self.root).map_err(|_| format_error())?;

        let mut segments = Vec::new();
        for component in stripped.components() {
            match component {
                Utf8Component::Normal(segment) => segments.push(segment),
                Utf8Component::CurDir => {}
                _ => return Err(format_error()),
            }
        }

        if segments.is_empty() {
            return Err(format_error());
        }

        Ok(segments.join("/"))
    }

    /// Replace the placeholder token in an already-relative path
    pub fn substitute(&self, relative: &str) -> String {
        relative.replace(&self.placeholder, &self.app_name)
    }

    /// Full translation of a walked path
    pub fn translate(&self, local: &Utf8Path) -> Result<String, PathFormatError> {
        self.relative(local).map(|rel| self.substitute(&rel))
    }
}
