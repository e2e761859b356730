use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{error::BackendError, models::UploadKind};

/// Largest image accepted for upload (5 MiB).
pub const MAX_UPLOAD_BYTES: i64 = 5 * 1024 * 1024;

// Presigned URLs are valid for 10 minutes.
const PRESIGN_TTL: Duration = Duration::from_secs(600);

// 1. StorageService Contract
/// StorageService
///
/// Defines the abstract contract for all interactions with the object storage layer.
/// This trait lets the handlers run against the real S3 client (S3StorageClient) in
/// production and the in-memory Mock (MockStorageService) during testing.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in the `Env::Local` setup
    /// to provision the bucket in MinIO.
    async fn ensure_bucket_exists(&self);

    /// Generates a temporary, signed URL allowing the admin panel to upload
    /// an image directly to the bucket.
    ///
    /// # Arguments
    /// * `key`: The final object key (folder + filename) in the bucket.
    /// * `content_type`: The MIME type the upload must be sent with (e.g., "image/jpeg").
    /// * `content_length`: The exact size in bytes the upload must have.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
        content_length: i64,
    ) -> Result<String, BackendError>;

    /// The URL under which an uploaded object is publicly readable.
    fn public_url(&self, key: &str) -> String;
}

// 2. The Real Implementation (S3/MinIO/Supabase)
/// S3StorageClient
///
/// The concrete implementation using the AWS SDK for S3. Due to S3 compatibility,
/// this client handles connections to:
/// - **Local:** Dockerized MinIO instance.
/// - **Production:** Supabase Storage S3 gateway.
///
/// The `force_path_style(true)` is required for MinIO and Supabase compatibility.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Constructs the S3 client using credentials and configuration from AppConfig.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_base_url: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            // Path-style addressing (http://endpoint/bucket/key) for MinIO and Supabase gateways.
            .force_path_style(true)
            .build();

        let client = s3::Client::from_conf(config);

        Self {
            client,
            bucket_name: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// ensure_bucket_exists
    ///
    /// Calls the S3 CreateBucket API. An existing bucket is reported and ignored.
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = %e, "CreateBucket skipped");
        }
    }

    /// get_presigned_upload_url
    ///
    /// Content type and length are part of the signature, so the client cannot swap
    /// in a different file type or a larger body.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
        content_length: i64,
    ) -> Result<String, BackendError> {
        let presigning = PresigningConfig::expires_in(PRESIGN_TTL)
            .map_err(|e| BackendError::Storage(e.to_string()))?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .content_length(content_length)
            .presigned(presigning)
            .await
            .map_err(|e| BackendError::Storage(e.to_string()))?;

        Ok(presigned_req.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

/// validate_image_upload
///
/// Only images up to `MAX_UPLOAD_BYTES` are accepted.
pub fn validate_image_upload(file_type: &str, size_bytes: i64) -> Result<(), String> {
    if !file_type.starts_with("image/") {
        return Err(format!("Only images can be uploaded, got '{}'", file_type));
    }
    if size_bytes <= 0 {
        return Err("File is empty".to_string());
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err("File exceeds the 5 MB limit".to_string());
    }
    Ok(())
}

/// build_object_key
///
/// `{folder}/{uuid}.{ext}`. The client's file name only contributes its extension,
/// reduced to lowercase ASCII alphanumerics.
pub fn build_object_key(kind: UploadKind, filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            ext.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(8)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string());

    format!("{}/{}.{}", kind.folder(), Uuid::new_v4(), extension)
}

/// sanitize_key
///
/// Removes directory navigation components (`..`, `.`) and empty segments from a key.
fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

// 3. The Mock Implementation (For Tests)
/// MockStorageService
///
/// A mock implementation of `StorageService` used for integration testing of the upload
/// handler without a network connection to S3.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
        _content_length: i64,
    ) -> Result<String, BackendError> {
        if self.should_fail {
            return Err(BackendError::Storage(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }

        // Deterministic, local-style URL for assertions.
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitize_key(key)
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://localhost:9000/mock-bucket/{}", sanitize_key(key))
    }
}

/// StorageState
///
/// The concrete type used to share the storage service access across the application state.
pub type StorageState = Arc<dyn StorageService>;
