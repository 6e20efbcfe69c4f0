//! Shared fixtures for provisioning tests

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Name of the unpacked template directory inside the scratch dir
pub const TEMPLATE_DIR: &str = "dtm-scaffolding-golang";
pub const TRANSIT: &str = "init-with-devstream";

/// A template tree on disk. Dropping it removes the files.
pub struct TemplateTree {
    _dir: TempDir,
    pub root: Utf8PathBuf,
}

impl TemplateTree {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::try_from(dir.path().join(TEMPLATE_DIR)).expect("utf-8 temp path");
        fs::create_dir_all(&root).expect("create template root");

        let tree = Self { _dir: dir, root };
        for (rel, content) in files {
            tree.write(rel, content);
        }
        tree
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, content).expect("write template file");
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// The tree from the reference scenario: a templated ignore file, the
/// template's README and one templated source file under a placeholder dir.
pub fn scenario_a() -> TemplateTree {
    TemplateTree::new(&[
        (".gitignore.tpl", "/bin/[[ .AppName ]]\n"),
        ("README.md", "# dtm-scaffolding-golang\n"),
        (
            "app/_app_name_/main.go.tpl",
            "package main\n\n// module github.com/[[ .Repo.Owner ]]/[[ .Repo.Name ]]\n",
        ),
    ])
}

/// A bigger tree with CI files, nested dirs and VCS metadata
pub fn go_service_tree() -> TemplateTree {
    TemplateTree::new(&[
        (".git/HEAD", "ref: refs/heads/main\n"),
        (".git/config", "[core]\n"),
        (".github/workflows/main.yml.tpl", "image: [[ .ImageRepo ]]\nrun: ${{ github.sha }}\n"),
        (".gitignore.tpl", "/bin/[[ .AppName ]]\n"),
        ("Dockerfile.tpl", "FROM golang\nRUN go build -o /[[ .AppName ]]\n"),
        ("Makefile", "build:\n\tgo build ./...\n"),
        ("README.md", "# template\n"),
        ("cmd/_app_name_/main.go.tpl", "package main // [[ .AppName ]]\n"),
        ("go.mod.tpl", "module github.com/[[ .Repo.Owner ]]/[[ .Repo.Name ]]\n"),
        ("internal/pkg/version.go", "package pkg\n"),
    ])
}
