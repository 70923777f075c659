mod common;

use std::fs;
use std::time::Duration;

use common::{init_logging, pending};
use listing_engine::{FailureKind, ReqwestUploader, UploadSettings, Uploader};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> UploadSettings {
    UploadSettings::with_endpoint(&format!("{}/api/upload-file", server.uri()))
        .expect("valid endpoint")
}

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn upload_posts_multipart_and_parses_receipt() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload-file"))
        .and(body_string_contains("name=\"bucket\""))
        .and(body_string_contains("images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": "images/1700000000000-front.jpg",
            "url": "https://cdn.example.com/images/1700000000000-front.jpg",
            "filename": "front.jpg",
            "size": 5,
            "type": "image/jpeg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let file = pending(1, &write_file(&temp, "front.jpg", b"jpeg!"), "image/jpeg");
    let uploader = ReqwestUploader::new(settings_for(&server));

    let receipt = uploader.upload(&file).await.expect("upload ok");
    assert_eq!(receipt.path, "images/1700000000000-front.jpg");
    assert_eq!(
        receipt.url,
        "https://cdn.example.com/images/1700000000000-front.jpg"
    );
    assert_eq!(receipt.filename, "front.jpg");
    assert_eq!(receipt.size, 5);
    assert_eq!(receipt.mime_type, "image/jpeg");
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload-file"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "No file provided" })),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let file = pending(1, &write_file(&temp, "tour.mp4", b"mp4"), "video/mp4");
    let uploader = ReqwestUploader::new(settings_for(&server));

    let err = uploader.upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.message, "No file provided");
}

#[tokio::test]
async fn error_without_json_body_gets_generic_message() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let file = pending(1, &write_file(&temp, "plan.pdf", b"%PDF"), "application/pdf");
    let uploader = ReqwestUploader::new(settings_for(&server));

    let err = uploader.upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.message, "Upload failed");
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let file = pending(1, &write_file(&temp, "a.png", b"png"), "image/png");
    let uploader = ReqwestUploader::new(settings_for(&server));

    let err = uploader.upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn oversized_and_unsupported_files_never_reach_the_server() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut settings = settings_for(&server);
    settings.max_bytes = 4;
    let uploader = ReqwestUploader::new(settings);

    let big = pending(1, &write_file(&temp, "big.jpg", b"0123456789"), "image/jpeg");
    let err = uploader.upload(&big).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 4,
            actual: 10
        }
    );
    assert_eq!(err.message, "File size exceeds 4 bytes limit");

    let archive = pending(2, &write_file(&temp, "a.zip", b"zip"), "application/zip");
    let err = uploader.upload(&archive).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedType {
            mime_type: "application/zip".to_string()
        }
    );
}

#[tokio::test]
async fn missing_local_file_is_io_error() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "gone.jpg", b"x");
    let file = pending(1, &path, "image/jpeg");
    fs::remove_file(&path).unwrap();

    let uploader = ReqwestUploader::new(UploadSettings::default());
    let err = uploader.upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn slow_server_times_out() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let file = pending(1, &write_file(&temp, "a.jpg", b"jpg"), "image/jpeg");
    let mut settings = settings_for(&server);
    settings.request_timeout = Duration::from_millis(200);
    let uploader = ReqwestUploader::new(settings);

    let err = uploader.upload(&file).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}
