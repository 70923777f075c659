use std::fs;

use listing_engine::{ensure_dir, write_atomic};
use tempfile::TempDir;

#[test]
fn creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("nested").join("out");
    ensure_dir(&dir).unwrap();
    assert!(dir.is_dir());
}

#[test]
fn write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let first = write_atomic(temp.path(), "listing.csv", b"old").unwrap();
    let second = write_atomic(temp.path(), "listing.csv", b"new").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "new");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn file_in_place_of_directory_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    assert!(write_atomic(&blocker, "listing.csv", b"data").is_err());
    assert!(!temp.path().join("listing.csv").exists());
}
