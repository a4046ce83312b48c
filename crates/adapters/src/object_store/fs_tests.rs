use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn put_then_get_roundtrips() {
    let dir = tempdir().unwrap();
    let store = FilesystemObjectStore::new(dir.path());
    store.put("s3://bucket/key", b"payload".to_vec()).await.unwrap();
    assert_eq!(store.get("s3://bucket/key").await.unwrap(), b"payload");
}

#[tokio::test]
async fn get_of_unknown_uri_errors_not_found() {
    let dir = tempdir().unwrap();
    let store = FilesystemObjectStore::new(dir.path());
    let err = store.get("s3://bucket/missing").await.unwrap_err();
    assert!(matches!(err, ObjectStoreError::NotFound(_)));
}

#[tokio::test]
async fn delete_of_unknown_uri_is_not_an_error() {
    let dir = tempdir().unwrap();
    let store = FilesystemObjectStore::new(dir.path());
    store.delete("s3://bucket/missing").await.unwrap();
}

#[tokio::test]
async fn distinct_uris_never_collide_on_disk() {
    let dir = tempdir().unwrap();
    let store = FilesystemObjectStore::new(dir.path());
    store.put("s3://bucket/a", b"a".to_vec()).await.unwrap();
    store.put("s3://bucket/b", b"b".to_vec()).await.unwrap();
    assert_eq!(store.get("s3://bucket/a").await.unwrap(), b"a");
    assert_eq!(store.get("s3://bucket/b").await.unwrap(), b"b");
}

#[yare::parameterized(
    plain = { "s3://bucket/key" },
    traversal = { "../../etc/passwd" },
    empty = { "" },
    with_query = { "s3://bucket/key?versionId=abc" },
)]
fn path_for_stays_inside_root(uri: &str) {
    let store = FilesystemObjectStore::new("/tmp/dalston-objects");
    let path = store.path_for(uri);
    assert_eq!(path.parent(), Some(std::path::Path::new("/tmp/dalston-objects")));
    assert!(!path.to_string_lossy().contains(".."));
}
