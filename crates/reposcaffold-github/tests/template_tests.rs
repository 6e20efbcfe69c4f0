//! Template download and extraction tests

mod common;

use camino::{Utf8Path, Utf8PathBuf};
use common::*;
use reposcaffold_core::TemplateSourceConfig;
use reposcaffold_github::{unpack_template, Error, TemplateFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARBALL_PATH: &str = "/repos/devstream-io/dtm-scaffolding-golang/tarball/main";

fn work_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(dir.path().join(".github-repo-scaffolding-golang")).unwrap()
}

fn read(root: &Utf8Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}

#[tokio::test]
async fn test_fetch_unpacks_under_repo_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TARBALL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(golang_template()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let work_dir = work_dir(&dir);
    let fetcher = TemplateFetcher::new(&github_config(&server)).unwrap();

    let root = fetcher
        .fetch(&TemplateSourceConfig::default(), &work_dir)
        .await
        .unwrap();

    assert_eq!(root, work_dir.join("dtm-scaffolding-golang"));
    assert_eq!(read(&root, ".gitignore.tpl"), "/bin/[[ .AppName ]]\n");
    assert!(root.join("app/_app_name_/main.go.tpl").is_file());
    assert!(!work_dir.join(ARCHIVE_PREFIX).exists());
}

#[tokio::test]
async fn test_fetch_leaves_existing_content_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TARBALL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(golang_template()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let work_dir = work_dir(&dir);
    std::fs::create_dir_all(work_dir.join("leftover")).unwrap();
    std::fs::write(work_dir.join("leftover/keep.txt"), "keep\n").unwrap();

    let fetcher = TemplateFetcher::new(&github_config(&server)).unwrap();
    let err = fetcher
        .fetch(&TemplateSourceConfig::default(), &work_dir)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ArchiveLayout { .. }));
    assert_eq!(read(&work_dir, "leftover/keep.txt"), "keep\n");
}

#[tokio::test]
async fn test_fetch_missing_template() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TARBALL_PATH))
        .respond_with(api_error(404, "Not Found"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = TemplateFetcher::new(&github_config(&server)).unwrap();
    let err = fetcher
        .fetch(&TemplateSourceConfig::default(), &work_dir(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Download { .. }));
    assert!(err
        .to_string()
        .contains("devstream-io/dtm-scaffolding-golang@main"));
}

#[tokio::test]
async fn test_unpack_rejects_multiple_roots() {
    let dir = tempfile::tempdir().unwrap();
    let work_dir = work_dir(&dir);
    let data = tarball_entries(&[
        ("one/a.txt".to_string(), "a"),
        ("two/b.txt".to_string(), "b"),
    ]);

    let err = unpack_template(data, &work_dir, "dtm-scaffolding-golang")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ArchiveLayout { .. }));
}

#[tokio::test]
async fn test_unpack_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let err = unpack_template(b"not a tarball".to_vec(), &work_dir(&dir), "t")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Extract { .. }));
}

#[tokio::test]
async fn test_unpack_keeps_matching_name() {
    let dir = tempfile::tempdir().unwrap();
    let work_dir = work_dir(&dir);

    let root = unpack_template(
        tarball("dtm-scaffolding-golang", &[("go.mod.tpl", "module x\n")]),
        &work_dir,
        "dtm-scaffolding-golang",
    )
    .await
    .unwrap();

    assert_eq!(read(&root, "go.mod.tpl"), "module x\n");
}
