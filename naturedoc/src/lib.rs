//! naturedoc - rich-text content pipeline for the Nature Magazine site
//!
//! Article bodies are stored as text that may hold a structured document
//! tree, markup from the old editor, plain text, or nothing. This crate
//! reads any of those into a validated [`Document`], writes trees back in a
//! single canonical encoding, and renders them to sanitized HTML.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod deserializer;
pub mod document_model;
pub mod pipeline;
pub mod renderer;
pub mod serializer;
pub mod store;

pub use deserializer::{deserialize, normalize, InputShape, Normalized, RecoverableNodeError};
pub use document_model::{Alignment, Document, Image, Mark, MarkSet, Node, NodeKind, Text};
pub use renderer::{render, RenderOptions};
pub use serializer::serialize;
