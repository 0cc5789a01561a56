//! Stored encoding of document trees
//!
//! Documents are persisted as compact JSON inside a small envelope:
//!
//! ```json
//! {"format":"naturedoc","root":{"children":[...],"type":"root"},"version":1}
//! ```
//!
//! Every node is an object with a `type` tag and its attributes. Keys are
//! always written in sorted order and marks in canonical order, so the same
//! tree always produces the same bytes.

use crate::document_model::{Document, Node};
use serde_json::{Map, Value};

/// Value of the envelope's `format` field
pub const FORMAT_NAME: &str = "naturedoc";

/// Current encoding version
pub const FORMAT_VERSION: u64 = 1;

/// Serialize a document to its stored text form
pub fn serialize(doc: &Document) -> String {
    encode(doc).to_string()
}

/// Serialize a document with indentation, for people to read
pub fn serialize_pretty(doc: &Document) -> String {
    format!("{:#}", encode(doc))
}

/// Encode a document as a JSON value (envelope included)
pub fn encode(doc: &Document) -> Value {
    sorted_object(vec![
        ("format", Value::from(FORMAT_NAME)),
        ("root", encode_node(doc.root())),
        ("version", Value::from(FORMAT_VERSION)),
    ])
}

/// Encode a single node and its subtree
fn encode_node(node: &Node) -> Value {
    let mut fields = vec![("type", Value::from(node.kind().as_str()))];

    match node {
        Node::Heading { level, .. } => fields.push(("level", Value::from(*level))),
        Node::List { ordered, .. } => fields.push(("ordered", Value::from(*ordered))),
        Node::Image(image) => {
            fields.push(("src", Value::from(image.src.as_str())));
            fields.push(("altText", Value::from(image.alt_text.as_str())));
            fields.push(("alignment", Value::from(image.alignment.as_str())));
        }
        Node::Link { url, .. } => fields.push(("url", Value::from(url.as_str()))),
        Node::Text(text) => {
            fields.push(("value", Value::from(text.value.as_str())));
            if !text.marks.is_empty() {
                let marks = text.marks.iter().map(|mark| Value::from(mark.as_str()));
                fields.push(("marks", Value::Array(marks.collect())));
            }
        }
        Node::Root { .. } | Node::Paragraph { .. } | Node::ListItem { .. } | Node::Quote { .. } => {}
    }

    if !matches!(node, Node::Image(_) | Node::Text(_)) {
        let children = node.children().iter().map(encode_node).collect();
        fields.push(("children", Value::Array(children)));
    }

    sorted_object(fields)
}

/// Build an object whose keys are inserted in sorted order
///
/// Sorting here keeps the output stable whether or not serde_json's
/// `preserve_order` feature is enabled somewhere in the build.
fn sorted_object(mut fields: Vec<(&str, Value)>) -> Value {
    fields.sort_by(|a, b| a.0.cmp(b.0));
    let object: Map<String, Value> = fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::{Alignment, Mark};

    #[test]
    fn test_serialize_single_paragraph() {
        let doc = Document::single_paragraph("Hi");

        assert_eq!(
            serialize(&doc),
            r#"{"format":"naturedoc","root":{"children":[{"children":[{"type":"text","value":"Hi"}],"type":"paragraph"}],"type":"root"},"version":1}"#
        );
    }

    #[test]
    fn test_serialize_attributes() {
        let doc = Document::new(vec![
            Node::heading(3, vec![Node::marked_text("Owls", [Mark::Code, Mark::Bold])]).unwrap(),
            Node::image("/media/owl.png", "Barn owl", Alignment::Right).unwrap(),
            Node::paragraph(vec![Node::link(
                "https://example.org",
                vec![Node::text("more")],
            )
            .unwrap()])
            .unwrap(),
        ])
        .unwrap();

        let encoded = serialize(&doc);

        assert!(encoded.contains(
            r#"{"children":[{"marks":["bold","code"],"type":"text","value":"Owls"}],"level":3,"type":"heading"}"#
        ));
        assert!(encoded.contains(
            r#"{"alignment":"right","altText":"Barn owl","src":"/media/owl.png","type":"image"}"#
        ));
        assert!(encoded.contains(
            r#"{"children":[{"type":"text","value":"more"}],"type":"link","url":"https://example.org"}"#
        ));
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let build = |marks: [Mark; 2]| {
            Document::new(vec![Node::paragraph(vec![Node::marked_text("x", marks)]).unwrap()])
                .unwrap()
        };

        let a = serialize(&build([Mark::Italic, Mark::Bold]));
        let b = serialize(&build([Mark::Bold, Mark::Italic]));

        assert_eq!(a, b);
    }

    #[test]
    fn test_serialize_escapes_text() {
        let doc = Document::single_paragraph("quote \" and \n newline");

        let encoded = serialize(&doc);

        assert!(encoded.contains(r#""value":"quote \" and \n newline""#));
    }

    #[test]
    fn test_pretty_output_is_same_value() {
        let doc = Document::single_paragraph("Hi");

        let compact: Value = serde_json::from_str(&serialize(&doc)).unwrap();
        let pretty: Value = serde_json::from_str(&serialize_pretty(&doc)).unwrap();

        assert_eq!(compact, pretty);
        assert!(serialize_pretty(&doc).contains('\n'));
    }
}
