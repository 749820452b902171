//! REST client for the text-completion and image-generation API.
//!
//! Wraps the chat completion and image generation endpoints plus a plain
//! byte download used to retrieve generated images before their short-lived
//! URLs expire.

pub mod api;
pub mod messages;

pub use api::{OpenAiApi, OpenAiError};
