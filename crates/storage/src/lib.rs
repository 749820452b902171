//! Artifact and metadata persistence backends.
//!
//! Two capabilities, each with a local and a remote implementation:
//!
//! | Capability        | Local                   | Remote                 |
//! |-------------------|-------------------------|------------------------|
//! | [`ArtifactStore`] | [`LocalArtifactStore`]  | [`S3ArtifactStore`]    |
//! | [`MetadataIndex`] | [`InMemoryMetadataIndex`] | [`KvMetadataIndex`]  |
//!
//! Callers hold `Arc<dyn ArtifactStore>` / `Arc<dyn MetadataIndex>` and pick
//! the implementation once at startup.

pub mod artifact;
pub mod error;
pub mod kv;
pub mod local;
pub mod metadata;
pub mod s3;

pub use artifact::ArtifactStore;
pub use error::{StorageError, StorageResult};
pub use kv::KvMetadataIndex;
pub use local::LocalArtifactStore;
pub use metadata::{InMemoryMetadataIndex, MetadataIndex};
pub use s3::{S3ArtifactStore, S3StoreConfig};
