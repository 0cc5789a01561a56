//! Shared type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest heading level (`<h1>`)
pub const MIN_HEADING_LEVEL: u8 = 1;

/// Highest heading level (`<h6>`)
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Image alignment within the article column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    /// Name used in the stored encoding and in CSS class names
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    /// Parse an alignment name, case-insensitively
    ///
    /// The editor also writes `"start"`/`"end"` for text-direction relative
    /// alignment; they map onto left and right.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" | "centre" | "middle" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a [`Node`](super::Node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading,
    List,
    ListItem,
    Quote,
    Image,
    Link,
    Text,
}

impl NodeKind {
    /// Tag written to the `type` field of the stored encoding
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::List => "list",
            NodeKind::ListItem => "list-item",
            NodeKind::Quote => "quote",
            NodeKind::Image => "image",
            NodeKind::Link => "link",
            NodeKind::Text => "text",
        }
    }

    /// Whether the kind may appear where block content is expected
    ///
    /// Images are leaves and count as both block and inline content.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading
                | NodeKind::List
                | NodeKind::Quote
                | NodeKind::Image
        )
    }

    /// Whether the kind may appear where inline content is expected
    pub fn is_inline(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::Link | NodeKind::Image)
    }

    /// Whether a node of this kind may hold a child of kind `child`
    pub fn accepts(self, child: NodeKind) -> bool {
        match self {
            NodeKind::Root | NodeKind::Quote => child.is_block(),
            NodeKind::Paragraph | NodeKind::Heading => child.is_inline(),
            NodeKind::List => child == NodeKind::ListItem,
            NodeKind::ListItem => child.is_block() || child.is_inline(),
            NodeKind::Link => child == NodeKind::Text,
            NodeKind::Image | NodeKind::Text => false,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_parse() {
        assert_eq!(Alignment::parse("Left"), Some(Alignment::Left));
        assert_eq!(Alignment::parse(" center "), Some(Alignment::Center));
        assert_eq!(Alignment::parse("end"), Some(Alignment::Right));
        assert_eq!(Alignment::parse("justify"), None);
    }

    #[test]
    fn test_inline_nodes_reject_blocks() {
        for block in [NodeKind::Paragraph, NodeKind::Heading, NodeKind::List, NodeKind::Quote] {
            assert!(!NodeKind::Link.accepts(block));
            assert!(!NodeKind::Text.accepts(block));
            assert!(!NodeKind::Paragraph.accepts(block));
        }
    }

    #[test]
    fn test_root_is_never_a_child() {
        let all = [
            NodeKind::Root,
            NodeKind::Paragraph,
            NodeKind::Heading,
            NodeKind::List,
            NodeKind::ListItem,
            NodeKind::Quote,
            NodeKind::Image,
            NodeKind::Link,
            NodeKind::Text,
        ];
        for parent in all {
            assert!(!parent.accepts(NodeKind::Root), "{parent} accepted root");
        }
    }

    #[test]
    fn test_list_items_only_inside_lists() {
        assert!(NodeKind::List.accepts(NodeKind::ListItem));
        assert!(!NodeKind::List.accepts(NodeKind::Paragraph));
        assert!(!NodeKind::Root.accepts(NodeKind::ListItem));
        assert!(NodeKind::ListItem.accepts(NodeKind::List));
    }
}
