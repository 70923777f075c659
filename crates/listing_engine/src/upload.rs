use std::time::Duration;

use listing_core::PendingFile;
use listing_logging::listing_debug;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

use crate::{FailureKind, UploadError, UploadReceipt};

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:3000/api/upload-file";

/// MIME types the storage endpoint accepts.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub endpoint: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_UPLOAD_ENDPOINT).expect("default endpoint is a valid url"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_bytes: 50 * 1024 * 1024,
            allowed_types: ALLOWED_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl UploadSettings {
    pub fn with_endpoint(endpoint: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            ..Self::default()
        })
    }

    fn is_type_allowed(&self, mime_type: &str) -> bool {
        let mime = mime_type.split(';').next().unwrap_or(mime_type).trim();
        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    }
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &PendingFile) -> Result<UploadReceipt, UploadError>;
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    path: String,
    url: String,
    filename: String,
    size: u64,
    #[serde(rename = "type")]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Posts files as multipart forms to the storage upload endpoint.
#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: UploadSettings,
}

impl ReqwestUploader {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, UploadError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| UploadError::new(FailureKind::Network, err.to_string()))
    }

    fn check_size(&self, actual: u64) -> Result<(), UploadError> {
        if actual > self.settings.max_bytes {
            return Err(UploadError::new(
                FailureKind::TooLarge {
                    max_bytes: self.settings.max_bytes,
                    actual,
                },
                format!("File size exceeds {} limit", format_limit(self.settings.max_bytes)),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(&self, file: &PendingFile) -> Result<UploadReceipt, UploadError> {
        self.check_size(file.size)?;
        if !self.settings.is_type_allowed(&file.mime_type) {
            return Err(UploadError::new(
                FailureKind::UnsupportedType {
                    mime_type: file.mime_type.clone(),
                },
                "",
            ));
        }

        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|err| UploadError::new(FailureKind::Io, format!("{}: {err}", file.path.display())))?;
        self.check_size(bytes.len() as u64)?;

        let bucket = file.kind.bucket();
        listing_debug!(
            "uploading {} ({} bytes) to bucket {}",
            file.filename,
            bytes.len(),
            bucket
        );
        let part = Part::bytes(bytes)
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)
            .map_err(|err| {
                UploadError::new(
                    FailureKind::UnsupportedType {
                        mime_type: file.mime_type.clone(),
                    },
                    err.to_string(),
                )
            })?;
        let form = Form::new().part("file", part).text("bucket", bucket);

        let client = self.build_client()?;
        let response = client
            .post(self.settings.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Upload failed".to_string());
            return Err(UploadError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let parsed: SuccessBody = serde_json::from_slice(&body)
            .map_err(|err| UploadError::new(FailureKind::InvalidResponse, err.to_string()))?;
        Ok(UploadReceipt {
            path: parsed.path,
            url: parsed.url,
            filename: parsed.filename,
            size: parsed.size,
            mime_type: parsed.mime_type,
        })
    }
}

/// `50MB` for whole mebibytes, a byte count otherwise.
fn format_limit(max_bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if max_bytes >= MIB && max_bytes % MIB == 0 {
        format!("{}MB", max_bytes / MIB)
    } else {
        format!("{max_bytes} bytes")
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::new(FailureKind::Timeout, err.to_string());
    }
    UploadError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_message_follows_configured_size() {
        assert_eq!(format_limit(50 * 1024 * 1024), "50MB");
        assert_eq!(format_limit(3 * 1024 * 1024), "3MB");
        assert_eq!(format_limit(4), "4 bytes");
    }
}
