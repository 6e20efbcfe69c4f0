//! Template tarball builders

use flate2::write::GzEncoder;
use flate2::Compression;

/// Directory GitHub wraps a tarball of the default template in
pub const ARCHIVE_PREFIX: &str = "devstream-io-dtm-scaffolding-golang-3f2a9c1";

/// Build a `.tar.gz` with every file placed under `prefix/`
pub fn tarball(prefix: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let entries: Vec<(String, &str)> = files
        .iter()
        .map(|(path, content)| (format!("{}/{}", prefix, path), *content))
        .collect();
    tarball_entries(&entries)
}

/// Build a `.tar.gz` from full entry paths
pub fn tarball_entries(entries: &[(String, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, path, content.as_bytes())
            .expect("append tar entry");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
}

/// The default Go template as GitHub would serve it
pub fn golang_template() -> Vec<u8> {
    tarball(
        ARCHIVE_PREFIX,
        &[
            (".gitignore.tpl", "/bin/[[ .AppName ]]\n"),
            ("README.md", "# dtm-scaffolding-golang\n"),
            (
                "app/_app_name_/main.go.tpl",
                "package main\n\n// module github.com/[[ .Repo.Owner ]]/[[ .Repo.Name ]]\n",
            ),
        ],
    )
}
