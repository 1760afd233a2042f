//! Integration tests for media cache synchronization.

mod common;

use common::FakeAuthority;
use signage_agent::authority::AuthorityClient;
use signage_agent::cache::MediaCache;
use signage_common::{Rotation, VideoId, VideoMeta};

fn video(id: i64, filename: &str) -> VideoMeta {
    VideoMeta {
        id: VideoId::new(id),
        filename: filename.to_string(),
        rotation: Rotation::NONE,
    }
}

fn client(authority: &FakeAuthority) -> AuthorityClient {
    AuthorityClient::new(&authority.config(std::path::Path::new("unused")).authority)
}

fn entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn sync_creates_directory_and_downloads() {
    let authority = FakeAuthority::start().await;
    authority.add_file("lobby.mp4", &vec![7u8; 256 * 1024]);

    let dir = tempfile::tempdir().unwrap();
    let cache = MediaCache::new(dir.path().join("nested/videos"));

    let report = cache
        .sync(&client(&authority), &[video(1, "lobby.mp4")])
        .await
        .unwrap();

    assert_eq!(report.downloaded, vec!["lobby.mp4"]);
    assert!(report.changed());
    let body = std::fs::read(cache.path_for("lobby.mp4")).unwrap();
    assert_eq!(body.len(), 256 * 1024);
}

#[tokio::test]
async fn sync_is_idempotent() {
    let authority = FakeAuthority::start().await;
    authority.add_file("a.mp4", b"a");
    authority.add_file("b.mp4", b"b");
    let catalog = [video(1, "a.mp4"), video(2, "b.mp4")];

    let dir = tempfile::tempdir().unwrap();
    let cache = MediaCache::new(dir.path());
    let client = client(&authority);

    let first = cache.sync(&client, &catalog).await.unwrap();
    assert_eq!(first.downloaded.len(), 2);

    let second = cache.sync(&client, &catalog).await.unwrap();
    assert!(!second.changed());
    assert!(second.failed.is_empty());
    assert_eq!(authority.downloads().len(), 2);
}

#[tokio::test]
async fn sync_removes_undeclared_files_only() {
    let authority = FakeAuthority::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("keep.mp4"), b"k").unwrap();
    std::fs::write(dir.path().join("old.mp4"), b"o").unwrap();
    std::fs::write(dir.path().join(".keep.mp4.part"), b"partial").unwrap();
    std::fs::create_dir(dir.path().join("subdir")).unwrap();

    let cache = MediaCache::new(dir.path());
    let report = cache
        .sync(&client(&authority), &[video(1, "keep.mp4")])
        .await
        .unwrap();

    assert!(report.downloaded.is_empty());
    assert_eq!(report.removed, vec![".keep.mp4.part", "old.mp4"]);
    assert_eq!(entries(dir.path()), vec!["keep.mp4", "subdir"]);
    assert!(authority.downloads().is_empty());
}

#[tokio::test]
async fn failed_download_leaves_no_entry() {
    let authority = FakeAuthority::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = MediaCache::new(dir.path());
    let client = client(&authority);

    let report = cache.sync(&client, &[video(1, "missing.mp4")]).await.unwrap();
    assert_eq!(report.failed, vec!["missing.mp4"]);
    assert!(!report.changed());
    assert!(entries(dir.path()).is_empty());

    // Retried on the next pass once the authority has it.
    authority.add_file("missing.mp4", b"here now");
    let report = cache.sync(&client, &[video(1, "missing.mp4")]).await.unwrap();
    assert_eq!(report.downloaded, vec!["missing.mp4"]);
    assert_eq!(authority.downloads(), vec!["missing.mp4", "missing.mp4"]);
}

#[tokio::test]
async fn names_are_sent_as_one_path_segment() {
    let authority = FakeAuthority::start().await;
    authority.add_file("spring promo #2.mp4", b"promo");

    let dir = tempfile::tempdir().unwrap();
    let cache = MediaCache::new(dir.path());
    let report = cache
        .sync(&client(&authority), &[video(1, "spring promo #2.mp4")])
        .await
        .unwrap();

    assert_eq!(report.downloaded, vec!["spring promo #2.mp4"]);
    assert_eq!(
        std::fs::read(dir.path().join("spring promo #2.mp4")).unwrap(),
        b"promo"
    );
}

#[tokio::test]
async fn unsafe_names_are_rejected() {
    let authority = FakeAuthority::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = MediaCache::new(dir.path().join("videos"));

    let report = cache
        .sync(
            &client(&authority),
            &[video(1, "../escape.mp4"), video(2, ".hidden"), video(3, "")],
        )
        .await
        .unwrap();

    assert_eq!(report.rejected, vec!["../escape.mp4", ".hidden", ""]);
    assert!(authority.downloads().is_empty());
    assert!(!dir.path().join("escape.mp4").exists());
}
