//! Object storage asset manager
//!
//! List/delete/presign operations against the company's single fixed
//! bucket. Listing reads only the provider's first page (1000 keys) with no
//! pagination — a documented limitation of the tool, not a defect. Presigned
//! PUT URLs expire after 48 hours and keys are timestamp-prefixed to avoid
//! name collisions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::ObjectStore;
use std::sync::Arc;
use std::time::Duration;
use tubeops_core::{StorageConfig, WorkflowError};

/// Keys read per listing (the provider's default page size)
pub const LIST_PAGE_CAP: usize = 1000;
/// Lifetime of presigned upload URLs
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// One stored object as the browser shows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetObject {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Last modification time
    pub last_modified: DateTime<Utc>,
    /// Public URL
    pub url: String,
}

impl AssetObject {
    /// Whether the key looks like an image (preview-worthy)
    #[must_use]
    pub fn is_image(&self) -> bool {
        let lower = self.key.to_ascii_lowercase();
        ["png", "jpg", "jpeg", "gif", "webp", "svg"]
            .iter()
            .any(|ext| lower.ends_with(&format!(".{ext}")))
    }
}

/// A presigned upload slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    /// Object key the upload will land under
    pub key: String,
    /// URL to PUT the bytes to
    pub upload_url: String,
    /// Public URL after the upload completes
    pub download_url: String,
}

/// Produces presigned PUT URLs for a store
#[async_trait]
pub trait UploadSigner: Send + Sync {
    /// Presigned PUT URL for `key`, valid for `expires_in`
    ///
    /// # Errors
    /// - [`WorkflowError::ExternalService`] on signing failure
    async fn signed_put_url(&self, key: &str, expires_in: Duration) -> Result<String, WorkflowError>;
}

struct S3Signer(Arc<AmazonS3>);

#[async_trait]
impl UploadSigner for S3Signer {
    async fn signed_put_url(&self, key: &str, expires_in: Duration) -> Result<String, WorkflowError> {
        let url = self
            .0
            .signed_url(reqwest::Method::PUT, &Path::from(key), expires_in)
            .await
            .map_err(|e| WorkflowError::external("object storage", e.to_string()))?;
        Ok(url.to_string())
    }
}

/// Asset operations over one fixed bucket
pub struct AssetManager {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn UploadSigner>>,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl AssetManager {
    /// Manager over an S3-compatible bucket, from startup configuration
    ///
    /// # Errors
    /// - [`WorkflowError::Config`] when the client cannot be built
    pub fn from_config(config: &StorageConfig) -> Result<Self, WorkflowError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }
        let s3 = Arc::new(
            builder
                .build()
                .map_err(|e| WorkflowError::Config(format!("object storage: {e}")))?,
        );

        Ok(Self {
            store: Arc::clone(&s3) as Arc<dyn ObjectStore>,
            signer: Some(Arc::new(S3Signer(s3))),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    /// Manager over an arbitrary store (tests use the in-memory backend)
    #[must_use]
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        signer: Option<Arc<dyn UploadSigner>>,
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            store,
            signer,
            bucket: bucket.into(),
            region: region.into(),
            endpoint,
        }
    }

    /// Public URL of an object key
    ///
    /// Virtual-hosted style against AWS; path style against a custom
    /// endpoint (virtual hosting does not apply there).
    #[must_use]
    pub fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{key}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.bucket, self.region
            ),
        }
    }

    /// First page of objects in the bucket, key order as listed
    ///
    /// # Errors
    /// - [`WorkflowError::ExternalService`] on provider failure
    pub async fn list(&self) -> Result<Vec<AssetObject>, WorkflowError> {
        let mut stream = self.store.list(None);
        let mut objects = Vec::new();

        while let Some(entry) = stream.next().await {
            let meta =
                entry.map_err(|e| WorkflowError::external("object storage", e.to_string()))?;
            let key = meta.location.to_string();
            objects.push(AssetObject {
                url: self.object_url(&key),
                key,
                size_bytes: meta.size as u64,
                last_modified: meta.last_modified,
            });
            if objects.len() >= LIST_PAGE_CAP {
                tracing::warn!(cap = LIST_PAGE_CAP, "object listing truncated at first page");
                break;
            }
        }

        Ok(objects)
    }

    /// Delete one object by key
    ///
    /// # Errors
    /// - [`WorkflowError::ExternalService`] on provider failure
    pub async fn delete(&self, key: &str) -> Result<(), WorkflowError> {
        self.store
            .delete(&Path::from(key))
            .await
            .map_err(|e| WorkflowError::external("object storage", e.to_string()))?;
        tracing::info!(key, "object deleted");
        Ok(())
    }

    /// Presign an upload slot for a file name
    ///
    /// The key is prefixed with the current timestamp so repeated uploads
    /// of the same file name never collide.
    ///
    /// # Errors
    /// - [`WorkflowError::Config`] when no signer is available
    /// - [`WorkflowError::ExternalService`] on signing failure
    pub async fn presign_upload(&self, file_name: &str) -> Result<PresignedUpload, WorkflowError> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            WorkflowError::Config("object storage backend cannot presign uploads".to_string())
        })?;

        let key = format!("{}-{file_name}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"));
        let upload_url = signer.signed_put_url(&key, UPLOAD_URL_TTL).await?;

        Ok(PresignedUpload {
            download_url: self.object_url(&key),
            key,
            upload_url,
        })
    }
}

/// Human-readable size: KB below 10 000 bytes, MB above
#[must_use]
pub fn format_size(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let bytes = bytes as f64;
    if bytes < 10_000.0 {
        format!("{:.2}KB", bytes / 1024.0)
    } else {
        format!("{:.2}MB", bytes / (1024.0 * 1024.0))
    }
}
