//! S3-compatible object store backend.
//!
//! Objects are uploaded under an optional key prefix and addressed by a
//! public base URL, so the store works against AWS S3 as well as
//! S3-compatible services (R2, MinIO) configured with a custom endpoint.

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use sketchy_core::generation::ArtifactDescriptor;
use sketchy_core::naming;
use sketchy_core::types::Timestamp;

use crate::artifact::ArtifactStore;
use crate::error::{StorageError, StorageResult};

/// Connection settings for [`S3ArtifactStore`].
#[derive(Debug, Clone)]
pub struct S3StoreConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services. Enables path-style
    /// addressing when set.
    pub endpoint_url: Option<String>,
    /// Base of the URLs handed to clients. Defaults to the bucket's
    /// virtual-hosted AWS URL.
    pub public_base_url: Option<String>,
    /// Prefix prepended to every object key, e.g. `gallery/`.
    pub key_prefix: String,
    /// Upload objects with the `public-read` canned ACL. Disable for buckets
    /// that enforce bucket-owner object ownership and grant read access by
    /// bucket policy instead.
    pub public_read_acl: bool,
}

impl S3StoreConfig {
    /// Resolved public base URL without a trailing slash.
    pub fn public_base(&self) -> String {
        match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    key_prefix: String,
    public_base: String,
    public_read_acl: bool,
}

/// Map any SDK error into [`StorageError::ObjectStore`], keeping the full
/// source chain in the message.
fn sdk_error<E: std::error::Error>(err: E) -> StorageError {
    StorageError::ObjectStore(DisplayErrorContext(err).to_string())
}

/// Convert the SDK's timestamp into ours. Objects without a modification
/// time sort as the oldest possible entries.
fn to_timestamp(value: Option<&aws_sdk_s3::primitives::DateTime>) -> Timestamp {
    value
        .and_then(|t| {
            chrono::DateTime::<chrono::Utc>::from_timestamp(t.secs(), t.subsec_nanos())
        })
        .unwrap_or(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
}

impl S3ArtifactStore {
    /// Build a client from the ambient AWS credential chain plus `config`.
    pub async fn connect(config: &S3StoreConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            key_prefix = %config.key_prefix,
            "S3 artifact store configured"
        );

        Self::with_client(aws_sdk_s3::Client::from_conf(s3_config), config)
    }

    /// Wrap an existing SDK client.
    pub fn with_client(client: aws_sdk_s3::Client, config: &S3StoreConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            key_prefix: config.key_prefix.clone(),
            public_base: config.public_base(),
            public_read_acl: config.public_read_acl,
        }
    }

    fn key_for(&self, name: &str) -> String {
        format!("{}{}", self.key_prefix, name)
    }

    fn url_for_key(&self, key: &str) -> String {
        public_url(&self.public_base, key)
    }

    async fn delete_key(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }
}

/// Public URL of `key` under `base`.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    fn backend_name(&self) -> &'static str {
        "s3"
    }

    async fn save(&self, name: &str, bytes: Vec<u8>) -> StorageResult<ArtifactDescriptor> {
        let key = self.key_for(name);
        let size = bytes.len();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(naming::content_type_for(name))
            .body(ByteStream::from(bytes));
        if self.public_read_acl {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }
        request.send().await.map_err(sdk_error)?;

        tracing::debug!(key = %key, size, "Artifact uploaded");
        Ok(ArtifactDescriptor {
            name: name.to_string(),
            url: self.url_for_key(&key),
            uploaded_at: chrono::Utc::now(),
        })
    }

    async fn list(&self) -> StorageResult<Vec<ArtifactDescriptor>> {
        let mut artifacts = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&self.key_prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(sdk_error)?;

            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                let name = key.strip_prefix(&self.key_prefix).unwrap_or(key);
                // Skip "directory" placeholders and nested keys.
                if name.is_empty() || name.contains('/') {
                    continue;
                }
                artifacts.push(ArtifactDescriptor {
                    name: name.to_string(),
                    url: self.url_for_key(key),
                    uploaded_at: to_timestamp(object.last_modified()),
                });
            }

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(artifacts)
    }

    async fn delete(&self, identifier: &str) -> StorageResult<()> {
        let name = naming::name_from_url(identifier)
            .ok_or_else(|| StorageError::NotFound(identifier.to_string()))?;
        let key = self.key_for(name);
        self.delete_key(&key).await?;
        tracing::debug!(key = %key, "Artifact deleted");
        Ok(())
    }

    async fn clear(&self) -> StorageResult<usize> {
        let artifacts = self.list().await?;
        for artifact in &artifacts {
            self.delete_key(&self.key_for(&artifact.name)).await?;
        }
        Ok(artifacts.len())
    }
}
