//! Domain types and pure logic for the sketchy image gallery.
//!
//! Nothing in this crate performs I/O. Storage backends, the generation API
//! client and the HTTP layer live in sibling crates and depend on the types
//! defined here.

pub mod admin;
pub mod canvas;
pub mod error;
pub mod gallery;
pub mod generation;
pub mod hashing;
pub mod naming;
pub mod prompt;
pub mod thumbnail;
pub mod types;
