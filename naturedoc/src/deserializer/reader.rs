//! Lenient reader for stored node trees
//!
//! Reads both the stored encoding written by [`crate::serializer`] and the
//! state objects the browser editor saves directly (`text` instead of
//! `value`, a numeric `format` bitmask for marks, `tag: "h2"` for heading
//! levels and so on). Problems are reported per node; a bad node never stops
//! its siblings from being read.

use super::diagnostics::{NodePath, RecoverableNodeError};
use crate::document_model::{
    Alignment, Document, Image, Mark, MarkSet, Node, NodeKind, Text, MAX_HEADING_LEVEL,
    MIN_HEADING_LEVEL,
};
use serde_json::{Map, Value};

type Object = Map<String, Value>;

/// Walks a JSON tree and collects recoverable errors along the way
#[derive(Debug, Default)]
pub(super) struct TreeReader {
    diagnostics: Vec<RecoverableNodeError>,
}

impl TreeReader {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Recoverable errors reported so far, in the order they were found
    pub(super) fn into_diagnostics(self) -> Vec<RecoverableNodeError> {
        self.diagnostics
    }

    pub(super) fn report(&mut self, error: RecoverableNodeError) {
        log::warn!("{}", error);
        self.diagnostics.push(error);
    }

    /// Read a root-equivalent object into a document
    pub(super) fn read_root(&mut self, root: &Object) -> Document {
        let path = NodePath::root();
        let blocks = self.read_children(NodeKind::Root, root, &path);

        // Every node was placed through `NodeKind::accepts`, so this only
        // fails if the reader and the model disagree.
        Document::new(blocks).unwrap_or_else(|error| {
            log::error!("Normalized tree failed validation: {}", error);
            Document::empty()
        })
    }

    /// Read the `children` array of `object` as children of a `parent` node
    fn read_children(&mut self, parent: NodeKind, object: &Object, path: &NodePath) -> Vec<Node> {
        let Some(values) = object.get("children").and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut read = Vec::new();
        for (index, value) in values.iter().enumerate() {
            self.read_node(value, path.child(index), &mut read);
        }
        self.place(parent, read)
    }

    /// Keep the children `parent` accepts, in order
    ///
    /// Runs of inline nodes directly under a root or quote are wrapped into a
    /// paragraph, since the editor stores quote text without one.
    fn place(&mut self, parent: NodeKind, read: Vec<(NodePath, Node)>) -> Vec<Node> {
        let wraps_inline = matches!(parent, NodeKind::Root | NodeKind::Quote);
        let mut placed = Vec::new();
        let mut pending_inline = Vec::new();

        for (path, node) in read {
            let kind = node.kind();
            if wraps_inline && kind.is_inline() && !kind.is_block() {
                pending_inline.push(node);
                continue;
            }
            flush_inline(&mut pending_inline, &mut placed);

            if parent.accepts(kind) {
                placed.push(node);
            } else {
                self.report(RecoverableNodeError::Misplaced {
                    path,
                    parent,
                    child: kind,
                });
            }
        }
        flush_inline(&mut pending_inline, &mut placed);

        placed
    }

    /// Read one entry, pushing zero or more nodes onto `out`
    ///
    /// Most entries produce one node. Skipped entries produce none, and a
    /// link without a url produces its text children.
    fn read_node(&mut self, value: &Value, path: NodePath, out: &mut Vec<(NodePath, Node)>) {
        let Some(object) = value.as_object() else {
            self.report(RecoverableNodeError::NotAnObject {
                path,
                found: json_type(value),
            });
            return;
        };

        let Some(tag) = object.get("type").and_then(Value::as_str) else {
            // Leaves written by older editors carry only `text` and mark flags
            if object.get("text").is_some_and(Value::is_string) {
                if let Some(text) = self.read_text(object, &path) {
                    out.push((path, Node::Text(text)));
                }
            } else {
                self.report(RecoverableNodeError::MissingKind { path });
            }
            return;
        };

        let node = match tag.to_ascii_lowercase().as_str() {
            "root" => Node::Root {
                children: Vec::new(),
            },
            "paragraph" => Node::Paragraph {
                children: self.read_children(NodeKind::Paragraph, object, &path),
            },
            "heading" => Node::Heading {
                level: self.heading_level(object, &path),
                children: self.read_children(NodeKind::Heading, object, &path),
            },
            "list" => Node::List {
                ordered: list_ordered(object),
                children: self.read_children(NodeKind::List, object, &path),
            },
            "list-item" | "listitem" | "list_item" => Node::ListItem {
                children: self.read_children(NodeKind::ListItem, object, &path),
            },
            "quote" | "blockquote" => Node::Quote {
                children: self.read_children(NodeKind::Quote, object, &path),
            },
            "image" => match self.read_image(object, &path) {
                Some(image) => Node::Image(image),
                None => return,
            },
            "link" | "autolink" => {
                let children = self.read_children(NodeKind::Link, object, &path);
                match string_field(object, &["url", "href"]).filter(|url| !url.trim().is_empty())
                {
                    Some(url) => Node::Link {
                        url: url.to_string(),
                        children,
                    },
                    None => {
                        self.report(RecoverableNodeError::LinkWithoutUrl { path: path.clone() });
                        out.extend(children.into_iter().map(|child| (path.clone(), child)));
                        return;
                    }
                }
            }
            "text" => match self.read_text(object, &path) {
                Some(text) => Node::Text(text),
                None => return,
            },
            "linebreak" => Node::text("\n"),
            "tab" => Node::text("\t"),
            _ => {
                self.report(RecoverableNodeError::UnknownKind {
                    path,
                    kind: tag.to_string(),
                });
                return;
            }
        };

        out.push((path, node));
    }

    /// Heading level from `level` or from an `h1`..`h6` style `tag`
    fn heading_level(&mut self, object: &Object, path: &NodePath) -> u8 {
        let stored = object
            .get("level")
            .and_then(|level| match level {
                Value::Number(number) => number_level(number),
                Value::String(text) => {
                    let text = text.trim();
                    text.parse::<i64>()
                        .ok()
                        .or_else(|| {
                            let level = text.parse::<f64>().ok()?;
                            level.is_finite().then(|| float_level(level))
                        })
                }
                _ => None,
            })
            .or_else(|| {
                let tag = object.get("tag").and_then(Value::as_str)?;
                let digits = tag.trim().strip_prefix(|c: char| c.eq_ignore_ascii_case(&'h'))?;
                digits.parse().ok()
            });

        let Some(found) = stored else {
            self.report(RecoverableNodeError::HeadingLevelDefaulted { path: path.clone() });
            return MIN_HEADING_LEVEL;
        };

        let clamped = found.clamp(i64::from(MIN_HEADING_LEVEL), i64::from(MAX_HEADING_LEVEL));
        if clamped != found {
            self.report(RecoverableNodeError::HeadingLevelClamped {
                path: path.clone(),
                found,
                clamped: clamped as u8,
            });
        }
        clamped as u8
    }

    fn read_image(&mut self, object: &Object, path: &NodePath) -> Option<Image> {
        let src = string_field(object, &["src", "url"]).unwrap_or_default();
        let alt_text = string_field(object, &["altText", "alt_text", "alt"]).unwrap_or_default();

        let alignment = match string_field(object, &["alignment", "align", "position", "format"]) {
            None => Alignment::default(),
            Some(value) if value.trim().is_empty() => Alignment::default(),
            Some(value) => Alignment::parse(value).unwrap_or_else(|| {
                self.report(RecoverableNodeError::UnknownAlignment {
                    path: path.clone(),
                    value: value.to_string(),
                });
                Alignment::default()
            }),
        };

        match Image::new(src, alt_text, alignment) {
            Ok(image) => Some(image),
            Err(_) => {
                self.report(RecoverableNodeError::EmptyImageSource { path: path.clone() });
                None
            }
        }
    }

    fn read_text(&mut self, object: &Object, path: &NodePath) -> Option<Text> {
        let Some(value) = string_field(object, &["value", "text"]) else {
            self.report(RecoverableNodeError::MissingField {
                path: path.clone(),
                kind: NodeKind::Text,
                field: "value",
            });
            return None;
        };

        let mut marks = MarkSet::empty();
        match object.get("marks") {
            Some(Value::Array(names)) => {
                for name in names.iter().filter_map(Value::as_str) {
                    match Mark::parse(name) {
                        Some(mark) => {
                            marks.insert(mark);
                        }
                        None => self.report(RecoverableNodeError::UnknownMark {
                            path: path.clone(),
                            mark: name.to_string(),
                        }),
                    }
                }
            }
            _ => {
                if let Some(format) = object.get("format").and_then(Value::as_u64) {
                    marks = MarkSet::from_editor_format(format);
                }
            }
        }

        // Boolean flags (`"bold": true`) from the older editor
        for mark in Mark::ALL {
            if object.get(mark.as_str()).and_then(Value::as_bool) == Some(true) {
                marks.insert(mark);
            }
        }

        Some(Text {
            value: value.to_string(),
            marks,
        })
    }
}

/// Move pending inline nodes into a new paragraph
fn flush_inline(pending: &mut Vec<Node>, placed: &mut Vec<Node>) {
    if pending.is_empty() {
        return;
    }
    log::debug!("Wrapping {} inline nodes in a paragraph", pending.len());
    placed.push(Node::Paragraph {
        children: std::mem::take(pending),
    });
}

/// Integer level of a JSON number; huge values saturate and fractions round
fn number_level(number: &serde_json::Number) -> Option<i64> {
    number
        .as_i64()
        .or_else(|| number.as_u64().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
        .or_else(|| number.as_f64().map(float_level))
}

fn float_level(level: f64) -> i64 {
    // Float to int casts saturate at the i64 bounds
    level.round() as i64
}

/// Whether a list object describes a numbered list
fn list_ordered(object: &Object) -> bool {
    if let Some(ordered) = object.get("ordered").and_then(Value::as_bool) {
        return ordered;
    }
    if let Some(list_type) = object.get("listType").and_then(Value::as_str) {
        return list_type.eq_ignore_ascii_case("number");
    }
    object
        .get("tag")
        .and_then(Value::as_str)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("ol"))
}

/// First of `keys` present as a string
fn string_field<'a>(object: &'a Object, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
}

/// JSON type name for diagnostics
pub(super) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(root: Value) -> (Document, Vec<RecoverableNodeError>) {
        let mut reader = TreeReader::new();
        let doc = reader.read_root(root.as_object().unwrap());
        (doc, reader.into_diagnostics())
    }

    #[test]
    fn test_reads_editor_dialect() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "heading", "tag": "h2", "children": [{"type": "text", "text": "Title", "format": 1}]},
                {"type": "list", "listType": "number", "tag": "ol", "children": [
                    {"type": "listitem", "children": [{"type": "text", "text": "one"}]}
                ]},
                {"type": "paragraph", "children": [
                    {"type": "link", "url": "https://example.org", "children": [{"type": "text", "text": "site"}]},
                    {"type": "linebreak"}
                ]}
            ],
            "type": "root"
        }));

        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(
            doc.blocks(),
            &[
                Node::heading(2, vec![Node::marked_text("Title", [Mark::Bold])]).unwrap(),
                Node::list(true, vec![Node::list_item(vec![Node::text("one")]).unwrap()]).unwrap(),
                Node::paragraph(vec![
                    Node::link("https://example.org", vec![Node::text("site")]).unwrap(),
                    Node::text("\n"),
                ])
                .unwrap(),
            ]
        );
    }

    #[test]
    fn test_bad_nodes_are_skipped_and_siblings_kept() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "paragraph", "children": [{"type": "text", "text": "kept"}]},
                {"type": "video", "src": "clip.mp4"},
                "stray string",
                {"children": []},
                {"type": "image", "src": ""},
                {"type": "paragraph", "children": [{"type": "text", "text": "also kept"}]}
            ]
        }));

        assert_eq!(doc.blocks().len(), 2);
        assert_eq!(doc.plain_text(), "kept\nalso kept");
        assert_eq!(
            diagnostics,
            vec![
                RecoverableNodeError::UnknownKind {
                    path: NodePath::root().child(1),
                    kind: "video".to_string(),
                },
                RecoverableNodeError::NotAnObject {
                    path: NodePath::root().child(2),
                    found: "a string",
                },
                RecoverableNodeError::MissingKind {
                    path: NodePath::root().child(3),
                },
                RecoverableNodeError::EmptyImageSource {
                    path: NodePath::root().child(4),
                },
            ]
        );
    }

    #[test]
    fn test_block_inside_inline_is_dropped() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "heading", "level": 1, "children": [
                    {"type": "text", "value": "Head"},
                    {"type": "paragraph", "children": []}
                ]}
            ]
        }));

        assert_eq!(
            doc.blocks(),
            &[Node::heading(1, vec![Node::text("Head")]).unwrap()]
        );
        assert_eq!(
            diagnostics,
            vec![RecoverableNodeError::Misplaced {
                path: NodePath::root().child(0).child(1),
                parent: NodeKind::Heading,
                child: NodeKind::Paragraph,
            }]
        );
    }

    #[test]
    fn test_nested_root_is_dropped() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "root", "children": [{"type": "paragraph", "children": []}]},
                {"type": "paragraph", "children": [{"type": "text", "value": "x"}]}
            ]
        }));

        assert_eq!(doc.blocks().len(), 1);
        assert!(matches!(
            diagnostics.as_slice(),
            [RecoverableNodeError::Misplaced {
                child: NodeKind::Root,
                ..
            }]
        ));
    }

    #[test]
    fn test_heading_levels() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "heading", "level": 9, "children": []},
                {"type": "heading", "level": 0, "children": []},
                {"type": "heading", "tag": "h4", "children": []},
                {"type": "heading", "children": []}
            ]
        }));

        let levels: Vec<u8> = doc
            .blocks()
            .iter()
            .map(|block| match block {
                Node::Heading { level, .. } => *level,
                other => panic!("expected heading, found {other:?}"),
            })
            .collect();
        assert_eq!(levels, vec![6, 1, 4, 1]);
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_huge_and_fractional_levels_are_clamped() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "heading", "level": u64::MAX, "children": []},
                {"type": "heading", "level": 9.0, "children": []},
                {"type": "heading", "level": -3.5, "children": []},
                {"type": "heading", "level": 2.0, "children": []},
                {"type": "heading", "level": "7.0", "children": []}
            ]
        }));

        let levels: Vec<u8> = doc
            .blocks()
            .iter()
            .map(|block| match block {
                Node::Heading { level, .. } => *level,
                other => panic!("expected heading, found {other:?}"),
            })
            .collect();
        assert_eq!(levels, vec![6, 6, 1, 2, 6]);
        assert_eq!(
            diagnostics[0],
            RecoverableNodeError::HeadingLevelClamped {
                path: NodePath::root().child(0),
                found: i64::MAX,
                clamped: 6,
            }
        );
        assert_eq!(diagnostics.len(), 4);
        assert!(diagnostics
            .iter()
            .all(|d| matches!(d, RecoverableNodeError::HeadingLevelClamped { .. })));
    }

    #[test]
    fn test_quote_text_is_wrapped_in_paragraph() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "quote", "children": [
                    {"type": "text", "text": "To be "},
                    {"type": "text", "text": "wild", "format": 2}
                ]}
            ]
        }));

        assert!(diagnostics.is_empty());
        assert_eq!(
            doc.blocks(),
            &[Node::quote(vec![Node::paragraph(vec![
                Node::text("To be "),
                Node::marked_text("wild", [Mark::Italic]),
            ])
            .unwrap()])
            .unwrap()]
        );
    }

    #[test]
    fn test_link_without_url_keeps_text() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "paragraph", "children": [
                    {"type": "link", "children": [{"type": "text", "text": "orphan"}]}
                ]}
            ]
        }));

        assert_eq!(doc.plain_text(), "orphan");
        assert_eq!(
            diagnostics,
            vec![RecoverableNodeError::LinkWithoutUrl {
                path: NodePath::root().child(0).child(0),
            }]
        );
    }

    #[test]
    fn test_marks_from_names_and_flags() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "paragraph", "children": [
                    {"type": "text", "value": "a", "marks": ["italic", "bold", "sparkle"]},
                    {"text": "b", "underline": true}
                ]}
            ]
        }));

        assert_eq!(
            doc.blocks()[0].children(),
            &[
                Node::marked_text("a", [Mark::Bold, Mark::Italic]),
                Node::marked_text("b", [Mark::Underline]),
            ]
        );
        assert!(matches!(
            diagnostics.as_slice(),
            [RecoverableNodeError::UnknownMark { mark, .. }] if mark == "sparkle"
        ));
    }

    #[test]
    fn test_image_attributes() {
        let (doc, diagnostics) = read(json!({
            "children": [
                {"type": "image", "src": "/a.png", "altText": "A", "alignment": "left"},
                {"type": "image", "src": "/b.png", "alt": "B"},
                {"type": "image", "src": "/c.png", "format": "justify"}
            ]
        }));

        let images: Vec<&Image> = doc
            .blocks()
            .iter()
            .filter_map(|block| match block {
                Node::Image(image) => Some(image),
                _ => None,
            })
            .collect();
        assert_eq!(images.len(), 3);
        assert_eq!(images[0].alignment, Alignment::Left);
        assert_eq!(images[0].alt_text, "A");
        assert_eq!(images[1].alt_text, "B");
        assert_eq!(images[1].alignment, Alignment::Center);
        assert_eq!(images[2].alignment, Alignment::Center);
        assert!(matches!(
            diagnostics.as_slice(),
            [RecoverableNodeError::UnknownAlignment { .. }]
        ));
    }
}
