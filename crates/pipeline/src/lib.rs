//! Orchestration of the generation write path, the gallery read path and
//! admin maintenance.
//!
//! Everything here is written against the storage traits and the two
//! pipeline seams ([`PromptExpander`], [`ImageProducer`]); backends are
//! chosen once by the binary and handed in as trait objects.

pub mod error;
pub mod expander;
pub mod gallery;
pub mod generate;
pub mod maintenance;
pub mod producer;

pub use error::PipelineError;
pub use expander::{IdentityExpander, OpenAiExpander, PromptExpander};
pub use gallery::{GalleryPage, GalleryService};
pub use generate::{GenerationPipeline, GenerationSettings};
pub use maintenance::{ClearOutcome, MaintenanceService, RetentionOutcome};
pub use producer::{CanvasImageProducer, ImageProducer, OpenAiImageProducer, PlaceholderImageProducer};

#[cfg(test)]
pub(crate) mod test_support;
