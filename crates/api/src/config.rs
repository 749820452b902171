use std::path::PathBuf;
use std::str::FromStr;

use sketchy_core::gallery::DEFAULT_GALLERY_LIMIT;
use sketchy_openai::api::DEFAULT_BASE_URL;
use sketchy_pipeline::expander::DEFAULT_CHAT_MODEL;
use sketchy_pipeline::producer::{DEFAULT_IMAGE_MODEL, DEFAULT_PLACEHOLDER_BASE_URL};
use sketchy_storage::kv::DEFAULT_NAMESPACE;
use sketchy_storage::S3StoreConfig;

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var} must be set: {reason}")]
    Missing {
        var: &'static str,
        reason: &'static str,
    },
}

/// Where artifacts and metadata live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local directory plus in-process metadata list.
    Local,
    /// S3-compatible object store plus REST key-value index.
    Remote,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!("expected `local` or `remote`, got `{other}`")),
        }
    }
}

/// Image source used when the generation API is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockImageSource {
    Canvas,
    Placeholder,
}

impl FromStr for MockImageSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canvas" => Ok(Self::Canvas),
            "placeholder" => Ok(Self::Placeholder),
            other => Err(format!("expected `canvas` or `placeholder`, got `{other}`")),
        }
    }
}

/// Generation API settings.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
}

/// REST key-value settings for the remote metadata index.
#[derive(Debug, Clone)]
pub struct KvSettings {
    pub url: String,
    pub token: String,
    pub namespace: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development in mock mode.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,

    /// Call the generation API instead of producing mock images.
    pub use_openai_api: bool,
    /// Expand prompts through a chat completion before generating.
    pub prompt_expansion: bool,
    pub openai: OpenAiSettings,
    pub mock_image_source: MockImageSource,
    pub placeholder_base_url: String,

    pub storage_backend: StorageBackend,
    /// Local artifact directory.
    pub images_dir: PathBuf,
    /// URL prefix of local artifacts; also where the directory is served.
    pub public_image_prefix: String,
    /// Present when `storage_backend` is `Remote`.
    pub s3: Option<S3StoreConfig>,
    /// Present when `storage_backend` is `Remote`.
    pub kv: Option<KvSettings>,

    pub thumbnails_enabled: bool,
    /// Upper bound on items processed by one gallery read.
    pub gallery_max_items: usize,
    pub max_prompt_chars: Option<usize>,
    /// Shared secret for the admin endpoints. Admin calls fail with 500
    /// while unset.
    pub admin_secret: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Non-empty, trimmed value of `var`.
fn read<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match read(lookup, var) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn parse_optional<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match read(lookup, var) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

fn parse_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = read(lookup, var) else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected a boolean".into(),
        }),
    }
}

fn require<F>(lookup: &F, var: &'static str, reason: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    read(lookup, var).ok_or(ConfigError::Missing { var, reason })
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                      |
    /// |------------------------|------------------------------|
    /// | `HOST`                 | `0.0.0.0`                    |
    /// | `PORT`                 | `3001`                       |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`      |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                        |
    /// | `USE_OPENAI_API`       | `false`                      |
    /// | `PROMPT_EXPANSION`     | value of `USE_OPENAI_API`    |
    /// | `STORAGE_BACKEND`      | `remote` in production, else `local` |
    /// | `THUMBNAILS_ENABLED`   | `true`                       |
    /// | `GALLERY_MAX_ITEMS`    | `20`                         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = read(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", 3001u16)?;
        let cors_origins: Vec<String> = read(&lookup, "CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 120u64)?;

        // --- Generation ---
        let use_openai_api = parse_bool(&lookup, "USE_OPENAI_API", false)?;
        let prompt_expansion = parse_bool(&lookup, "PROMPT_EXPANSION", use_openai_api)?;
        let openai = OpenAiSettings {
            api_key: read(&lookup, "OPENAI_API_KEY"),
            base_url: read(&lookup, "OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            chat_model: read(&lookup, "OPENAI_CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.into()),
            image_model: read(&lookup, "OPENAI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.into()),
        };
        if (use_openai_api || prompt_expansion) && openai.api_key.is_none() {
            return Err(ConfigError::Missing {
                var: "OPENAI_API_KEY",
                reason: "required when USE_OPENAI_API or PROMPT_EXPANSION is enabled",
            });
        }
        let mock_image_source = parse_or(&lookup, "MOCK_IMAGE_SOURCE", MockImageSource::Canvas)?;
        let placeholder_base_url = read(&lookup, "PLACEHOLDER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_BASE_URL.into());

        // --- Storage ---
        let production = read(&lookup, "NODE_ENV").is_some_and(|v| v == "production");
        let default_backend = if production {
            StorageBackend::Remote
        } else {
            StorageBackend::Local
        };
        let storage_backend = parse_or(&lookup, "STORAGE_BACKEND", default_backend)?;
        let images_dir = PathBuf::from(read(&lookup, "IMAGES_DIR").unwrap_or_else(|| "./images".into()));
        let public_image_prefix = read(&lookup, "PUBLIC_IMAGE_PREFIX")
            .unwrap_or_else(|| "/api/images".into())
            .trim_end_matches('/')
            .to_string();
        if !public_image_prefix.starts_with('/') {
            return Err(ConfigError::Invalid {
                var: "PUBLIC_IMAGE_PREFIX",
                value: public_image_prefix,
                reason: "must start with `/`".into(),
            });
        }

        let (s3, kv) = match storage_backend {
            StorageBackend::Local => (None, None),
            StorageBackend::Remote => {
                let reason = "required when STORAGE_BACKEND is remote";
                let s3 = S3StoreConfig {
                    bucket: require(&lookup, "S3_BUCKET", reason)?,
                    region: read(&lookup, "S3_REGION").unwrap_or_else(|| "us-east-1".into()),
                    endpoint_url: read(&lookup, "S3_ENDPOINT_URL"),
                    public_base_url: read(&lookup, "S3_PUBLIC_BASE_URL"),
                    key_prefix: read(&lookup, "S3_KEY_PREFIX").unwrap_or_default(),
                    public_read_acl: parse_bool(&lookup, "S3_PUBLIC_READ_ACL", true)?,
                };
                let kv = KvSettings {
                    url: require(&lookup, "KV_REST_API_URL", reason)?,
                    token: require(&lookup, "KV_REST_API_TOKEN", reason)?,
                    namespace: read(&lookup, "KV_KEY_NAMESPACE")
                        .unwrap_or_else(|| DEFAULT_NAMESPACE.into()),
                };
                (Some(s3), Some(kv))
            }
        };

        // --- Gallery / admin ---
        let thumbnails_enabled = parse_bool(&lookup, "THUMBNAILS_ENABLED", true)?;
        let gallery_max_items = parse_or(&lookup, "GALLERY_MAX_ITEMS", DEFAULT_GALLERY_LIMIT)?;
        let max_prompt_chars = parse_optional(&lookup, "MAX_PROMPT_CHARS")?;
        let admin_secret = read(&lookup, "ADMIN_SECRET");

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            use_openai_api,
            prompt_expansion,
            openai,
            mock_image_source,
            placeholder_base_url,
            storage_backend,
            images_dir,
            public_image_prefix,
            s3,
            kv,
            thumbnails_enabled,
            gallery_max_items,
            max_prompt_chars,
            admin_secret,
        })
    }
}
