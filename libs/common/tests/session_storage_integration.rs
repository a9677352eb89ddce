//! Integration tests for the storage components
//!
//! These tests verify that the file-backed store behaves like browser
//! local storage from the point of view of a session writer.

use common::{BearerToken, FileStore, MemoryStore, SessionStore};

fn write_and_clear(store: &dyn SessionStore) -> Result<(), Box<dyn std::error::Error>> {
    let token = BearerToken::new("Bearer header.payload.signature");
    store.set_all(&[
        ("token", token.as_str().to_string()),
        ("user", r#"{"id":"u1","name":"Ada"}"#.to_string()),
    ])?;

    assert_eq!(
        store.get("token")?.map(BearerToken::new),
        Some(BearerToken::new("header.payload.signature"))
    );
    assert!(store.get("user")?.is_some());

    // Clear twice; the second removal must be harmless
    store.remove_all(&["token", "user"])?;
    store.remove_all(&["token", "user"])?;
    assert_eq!(store.get("token")?, None);
    assert_eq!(store.get("user")?, None);
    Ok(())
}

#[test]
fn test_memory_store_session_cycle() -> Result<(), Box<dyn std::error::Error>> {
    write_and_clear(&MemoryStore::new())
}

#[test]
fn test_file_store_session_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = FileStore::open(dir.path().join("session.json"));
    write_and_clear(&store)
}

#[test]
fn test_file_store_keeps_unrelated_keys() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    let store = FileStore::open(&path);

    store.set_all(&[("theme", "dark".to_string())])?;
    store.set_all(&[("token", "t".to_string()), ("user", "{}".to_string())])?;
    store.remove_all(&["token", "user"])?;

    assert_eq!(FileStore::open(&path).get("theme")?, Some("dark".to_string()));
    Ok(())
}
