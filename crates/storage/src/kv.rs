//! Metadata index backed by a hosted key-value service over REST.
//!
//! Speaks the Upstash-style command protocol: every command is a JSON array
//! of strings POSTed to the base URL with a bearer token, and the reply is
//! `{"result": ...}` on success or `{"error": "..."}` on failure. Keys are
//! the record's `image_url` under a namespace prefix; values are the
//! record serialized as JSON.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sketchy_core::generation::GenerationRecord;

use crate::error::{StorageError, StorageResult};
use crate::metadata::MetadataIndex;

/// Namespace applied when none is configured.
pub const DEFAULT_NAMESPACE: &str = "gallery:";

#[derive(Clone)]
pub struct KvMetadataIndex {
    client: reqwest::Client,
    base_url: String,
    token: String,
    namespace: String,
}

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl KvMetadataIndex {
    pub fn new(base_url: String, token: String, namespace: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token, namespace)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        token: String,
        namespace: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            namespace,
        }
    }

    fn key_for(&self, image_url: &str) -> String {
        format!("{}{}", self.namespace, image_url)
    }

    /// Send one command and return its `result` value.
    async fn command(&self, args: &[&str]) -> StorageResult<Value> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::Kv {
                status: status.as_u16(),
                body,
            });
        }

        let reply: CommandReply = response.json().await?;
        if let Some(error) = reply.error {
            return Err(StorageError::Kv {
                status: status.as_u16(),
                body: error,
            });
        }
        Ok(reply.result)
    }

    /// Decode one stored value. Unreadable values are treated as absent.
    fn decode(&self, key: &str, value: &Value) -> Option<GenerationRecord> {
        let raw = value.as_str()?;
        match serde_json::from_str(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable metadata record");
                None
            }
        }
    }

    /// Every key in this index's namespace.
    async fn namespace_keys(&self) -> StorageResult<Vec<String>> {
        let pattern = format!("{}*", self.namespace);
        let result = self.command(&["KEYS", pattern.as_str()]).await?;
        Ok(result
            .as_array()
            .map(|keys| {
                keys.iter()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl MetadataIndex for KvMetadataIndex {
    fn backend_name(&self) -> &'static str {
        "kv"
    }

    async fn put(&self, record: &GenerationRecord) -> StorageResult<()> {
        let key = self.key_for(&record.image_url);
        let value = serde_json::to_string(record)?;
        self.command(&["SET", key.as_str(), value.as_str()]).await?;
        tracing::debug!(key = %key, "Metadata record stored");
        Ok(())
    }

    async fn get(&self, image_url: &str) -> StorageResult<Option<GenerationRecord>> {
        let key = self.key_for(image_url);
        let result = self.command(&["GET", key.as_str()]).await?;
        Ok(self.decode(&key, &result))
    }

    async fn get_many(&self, image_urls: &[String]) -> StorageResult<Vec<Option<GenerationRecord>>> {
        if image_urls.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = image_urls.iter().map(|u| self.key_for(u)).collect();
        let mut args: Vec<&str> = Vec::with_capacity(keys.len() + 1);
        args.push("MGET");
        args.extend(keys.iter().map(String::as_str));

        let result = self.command(&args).await?;
        let values = result.as_array().cloned().unwrap_or_default();

        Ok(keys
            .iter()
            .enumerate()
            .map(|(i, key)| values.get(i).and_then(|v| self.decode(key, v)))
            .collect())
    }

    async fn delete(&self, image_url: &str) -> StorageResult<bool> {
        let key = self.key_for(image_url);
        let result = self.command(&["DEL", key.as_str()]).await?;
        Ok(result.as_u64().unwrap_or(0) > 0)
    }

    async fn clear(&self) -> StorageResult<usize> {
        let keys = self.namespace_keys().await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut args: Vec<&str> = Vec::with_capacity(keys.len() + 1);
        args.push("DEL");
        args.extend(keys.iter().map(String::as_str));

        let result = self.command(&args).await?;
        let removed = result.as_u64().unwrap_or(0) as usize;
        tracing::info!(removed, namespace = %self.namespace, "Metadata namespace cleared");
        Ok(removed)
    }
}
