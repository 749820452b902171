//! Artifact naming convention.
//!
//! Every generation stores two objects sharing one opaque token:
//!
//! - full image: `{token}.{ext}` where `ext` follows the encoded format
//! - thumbnail:  `{token}_thumb.jpg`
//!
//! Tokens are time-ordered UUIDs in simple (hyphen-free) form, so sorting
//! names lexicographically also sorts them by creation time. Names never
//! contain prompt text.

/// Suffix appended to the token for thumbnail objects.
pub const THUMBNAIL_SUFFIX: &str = "_thumb";

/// File extension of thumbnail objects (always JPEG).
pub const THUMBNAIL_EXTENSION: &str = "jpg";

/// The pair of object names written for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub token: String,
    pub image: String,
    pub thumbnail: String,
}

impl ArtifactNames {
    /// Allocate a fresh token and derive both names from it.
    pub fn generate(image_extension: &str) -> Self {
        let token = uuid::Uuid::now_v7().simple().to_string();
        Self::for_token(&token, image_extension)
    }

    /// Derive both names from an existing token.
    pub fn for_token(token: &str, image_extension: &str) -> Self {
        Self {
            token: token.to_string(),
            image: format!("{token}.{image_extension}"),
            thumbnail: format!("{token}{THUMBNAIL_SUFFIX}.{THUMBNAIL_EXTENSION}"),
        }
    }
}

/// Split `name` into `(stem, extension)`. The extension is empty if absent.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext),
        _ => (name, ""),
    }
}

/// Returns `true` if `name` is a thumbnail object name.
pub fn is_thumbnail(name: &str) -> bool {
    split_extension(name).0.ends_with(THUMBNAIL_SUFFIX)
}

/// Name of the thumbnail belonging to the full image `image_name`.
pub fn thumbnail_name_for(image_name: &str) -> String {
    let (stem, _) = split_extension(image_name);
    format!("{stem}{THUMBNAIL_SUFFIX}.{THUMBNAIL_EXTENSION}")
}

/// Last path segment of a URL or path, without query string or fragment.
///
/// ```
/// use sketchy_core::naming::name_from_url;
///
/// assert_eq!(name_from_url("/api/images/abc.png"), Some("abc.png"));
/// assert_eq!(name_from_url("https://cdn.example/x/abc.png?v=1"), Some("abc.png"));
/// assert_eq!(name_from_url("https://cdn.example/"), None);
/// ```
pub fn name_from_url(url: &str) -> Option<&str> {
    let end = url.find(|c| c == '?' || c == '#').unwrap_or(url.len());
    let path = &url[..end];
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => Some(segment),
        _ => None,
    }
}

/// File extension matching the detected encoding of `bytes`.
///
/// Falls back to `png`, the format both the generation API and the mock
/// canvas produce.
pub fn image_extension(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => "jpg",
        Ok(image::ImageFormat::WebP) => "webp",
        _ => "png",
    }
}

/// MIME type for an object name, derived from its extension.
pub fn content_type_for(name: &str) -> &'static str {
    match split_extension(name).1.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}
