//! Reading stored content back into document trees
//!
//! Stored article bodies come in several shapes:
//!
//! 1. a structured tree (our encoding, or the editor's own state object)
//! 2. a legacy markup string from the old freeform editor
//! 3. a plain string
//! 4. nothing at all
//!
//! The shapes are tried in that order and the first match wins. Reading never
//! fails: invalid nodes are skipped or repaired and reported as
//! [`RecoverableNodeError`]s, and input with no recognizable tree falls back
//! to the string cases or to an empty document.

mod diagnostics;
mod reader;

pub use diagnostics::{NodePath, RecoverableNodeError};

use crate::document_model::Document;
use crate::serializer::{FORMAT_NAME, FORMAT_VERSION};
use reader::TreeReader;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;

/// Content handed to the deserializer
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    /// No content stored
    Null,
    /// Content stored as text
    Text(&'a str),
    /// Content already parsed into a JSON value
    Value(&'a Value),
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self {
        Input::Text(text)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(text: &'a String) -> Self {
        Input::Text(text)
    }
}

impl<'a> From<Option<&'a str>> for Input<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(Input::Null, Input::Text)
    }
}

impl<'a> From<&'a Value> for Input<'a> {
    fn from(value: &'a Value) -> Self {
        Input::Value(value)
    }
}

/// Which input shape the content was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputShape {
    /// A structured tree
    Structured,
    /// A string containing markup, kept as opaque text
    LegacyMarkup,
    /// A string without markup
    PlainText,
    /// Nothing usable
    Empty,
}

impl InputShape {
    pub fn as_str(self) -> &'static str {
        match self {
            InputShape::Structured => "structured",
            InputShape::LegacyMarkup => "legacy markup",
            InputShape::PlainText => "plain text",
            InputShape::Empty => "empty",
        }
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reading stored content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The recovered document
    pub document: Document,
    /// The input shape that matched
    pub shape: InputShape,
    /// Everything that was repaired or skipped, in document order
    pub diagnostics: Vec<RecoverableNodeError>,
}

impl Normalized {
    fn empty() -> Self {
        Self {
            document: Document::empty(),
            shape: InputShape::Empty,
            diagnostics: Vec::new(),
        }
    }

    fn wrapped(text: &str, shape: InputShape) -> Self {
        Self {
            document: Document::single_paragraph(text),
            shape,
            diagnostics: Vec::new(),
        }
    }

    /// Number of nodes that were removed while reading
    pub fn dropped_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_drop()).count()
    }
}

/// Read stored content into a document
///
/// Never fails; see [`normalize`] for the details of what was recovered.
pub fn deserialize<'a>(input: impl Into<Input<'a>>) -> Document {
    normalize(input).document
}

/// Read stored content, reporting the matched shape and every recovery
pub fn normalize<'a>(input: impl Into<Input<'a>>) -> Normalized {
    let normalized = match input.into() {
        Input::Null => Normalized::empty(),
        Input::Text(text) => normalize_text(text, true),
        Input::Value(value) => normalize_value(value),
    };

    log::debug!(
        "Read {} content ({} blocks, {} recoveries)",
        normalized.shape,
        normalized.document.blocks().len(),
        normalized.diagnostics.len()
    );
    normalized
}

/// Classify and read text content
///
/// A JSON string literal is double-encoded content; when `unwrap_string` is
/// set its inner text is classified once more.
fn normalize_text(text: &str, unwrap_string: bool) -> Normalized {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Normalized::empty();
    }

    if trimmed.starts_with('{') || trimmed.starts_with('"') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(object)) => {
                if let Some(normalized) = normalize_structured(&object) {
                    return normalized;
                }
                log::debug!("JSON content has no root; treating it as text");
            }
            Ok(Value::String(inner)) if unwrap_string => return normalize_text(&inner, false),
            Ok(_) => {}
            Err(error) => log::debug!("Content is not JSON: {}", error),
        }
    }

    // Classification looks at the trimmed text; the node keeps the raw string
    if looks_like_markup(trimmed) {
        log::info!("Reading legacy markup content as plain text");
        return Normalized::wrapped(text, InputShape::LegacyMarkup);
    }
    Normalized::wrapped(text, InputShape::PlainText)
}

/// Classify and read an already-parsed value
fn normalize_value(value: &Value) -> Normalized {
    match value {
        Value::Null => Normalized::empty(),
        Value::String(text) => normalize_text(text, true),
        Value::Bool(_) | Value::Number(_) => {
            Normalized::wrapped(&value.to_string(), InputShape::PlainText)
        }
        Value::Object(object) => normalize_structured(object).unwrap_or_else(|| {
            log::warn!("Structured content has no root; using an empty document");
            Normalized::empty()
        }),
        Value::Array(_) => {
            log::warn!("Structured content is an array, not a tree; using an empty document");
            Normalized::empty()
        }
    }
}

/// Read a structured object, or `None` when it holds no root-equivalent
fn normalize_structured(object: &Map<String, Value>) -> Option<Normalized> {
    let root = find_root(object)?;
    let mut reader = TreeReader::new();

    if let Some(found) = newer_version(object) {
        reader.report(RecoverableNodeError::NewerVersion {
            found,
            supported: FORMAT_VERSION,
        });
    }

    let document = reader.read_root(root);
    Some(Normalized {
        document,
        shape: InputShape::Structured,
        diagnostics: reader.into_diagnostics(),
    })
}

/// Locate the root-equivalent object
///
/// Accepts an envelope or editor state (`{"root": {...}}`), a root node
/// (`{"type": "root", ...}`) and an untyped object with a `children` array.
fn find_root(object: &Map<String, Value>) -> Option<&Map<String, Value>> {
    if let Some(root) = object.get("root") {
        return root.as_object();
    }

    match object.get("type").and_then(Value::as_str) {
        Some(tag) if tag.eq_ignore_ascii_case("root") => Some(object),
        None if object.get("children").is_some_and(Value::is_array) => Some(object),
        _ => None,
    }
}

/// Version of an envelope written by a newer release, if any
fn newer_version(object: &Map<String, Value>) -> Option<u64> {
    if object.get("format").and_then(Value::as_str) != Some(FORMAT_NAME) {
        return None;
    }
    object
        .get("version")
        .and_then(Value::as_u64)
        .filter(|version| *version > FORMAT_VERSION)
}

/// Whether text contains markup tags or character entities
fn looks_like_markup(text: &str) -> bool {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    MARKUP
        .get_or_init(|| {
            Regex::new(r"(?i)</?[a-z][a-z0-9-]*(\s[^<>]*)?/?>|&([a-z]+|#[0-9]+|#x[0-9a-f]+);")
                .expect("markup pattern is valid")
        })
        .is_match(text)
}
