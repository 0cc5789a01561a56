//! Document tree nodes
//!
//! This module defines the closed set of node kinds an article body is made
//! of and the rules for which kinds may contain which.

use super::error::StructureError;
use super::text::{Mark, Text};
use super::types::{Alignment, NodeKind, MAX_HEADING_LEVEL, MIN_HEADING_LEVEL};

/// A node of the document tree
///
/// Variants can be built directly for pattern matching and tests, but only
/// the constructors below (and [`Document::new`](super::Document::new))
/// check the structural rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The single top-level container of a document
    Root {
        /// Block children
        children: Vec<Node>,
    },

    /// A paragraph of inline content
    Paragraph {
        /// Inline children
        children: Vec<Node>,
    },

    /// A heading with a level between 1 and 6
    Heading {
        /// Heading level (1 = h1, 2 = h2, etc.)
        level: u8,
        /// Inline children
        children: Vec<Node>,
    },

    /// An ordered or unordered list
    List {
        /// Numbered (`true`) or bulleted (`false`)
        ordered: bool,
        /// List items
        children: Vec<Node>,
    },

    /// A list item, holding block or inline content (including nested lists)
    ListItem {
        /// Block or inline children
        children: Vec<Node>,
    },

    /// A block quote containing other blocks
    Quote {
        /// Block children
        children: Vec<Node>,
    },

    /// An image leaf
    Image(Image),

    /// A hyperlink around text runs
    Link {
        /// Link target, unescaped (never blank)
        url: String,
        /// Text children
        children: Vec<Node>,
    },

    /// A text leaf
    Text(Text),
}

/// An image reference with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image URL (never empty)
    pub src: String,
    /// Alternative text for the image (for accessibility)
    pub alt_text: String,
    /// Placement within the article column
    pub alignment: Alignment,
}

impl Image {
    /// Create an image, rejecting an empty source
    pub fn new(
        src: impl Into<String>,
        alt_text: impl Into<String>,
        alignment: Alignment,
    ) -> Result<Self, StructureError> {
        let src = src.into();
        if src.trim().is_empty() {
            return Err(StructureError::EmptyImageSource);
        }
        Ok(Self {
            src,
            alt_text: alt_text.into(),
            alignment,
        })
    }
}

impl Node {
    /// Discriminant of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root { .. } => NodeKind::Root,
            Node::Paragraph { .. } => NodeKind::Paragraph,
            Node::Heading { .. } => NodeKind::Heading,
            Node::List { .. } => NodeKind::List,
            Node::ListItem { .. } => NodeKind::ListItem,
            Node::Quote { .. } => NodeKind::Quote,
            Node::Image(_) => NodeKind::Image,
            Node::Link { .. } => NodeKind::Link,
            Node::Text(_) => NodeKind::Text,
        }
    }

    /// Children of this node; empty for leaves
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root { children }
            | Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::List { children, .. }
            | Node::ListItem { children }
            | Node::Quote { children }
            | Node::Link { children, .. } => children,
            Node::Image(_) | Node::Text(_) => &[],
        }
    }

    /// Create a paragraph of inline nodes
    pub fn paragraph(children: Vec<Node>) -> Result<Self, StructureError> {
        check_children(NodeKind::Paragraph, &children)?;
        Ok(Node::Paragraph { children })
    }

    /// Create a heading; `level` must be within 1..=6
    pub fn heading(level: u8, children: Vec<Node>) -> Result<Self, StructureError> {
        if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(&level) {
            return Err(StructureError::HeadingLevelOutOfRange { level });
        }
        check_children(NodeKind::Heading, &children)?;
        Ok(Node::Heading { level, children })
    }

    /// Create a list of list items
    pub fn list(ordered: bool, items: Vec<Node>) -> Result<Self, StructureError> {
        check_children(NodeKind::List, &items)?;
        Ok(Node::List {
            ordered,
            children: items,
        })
    }

    /// Create a list item
    pub fn list_item(children: Vec<Node>) -> Result<Self, StructureError> {
        check_children(NodeKind::ListItem, &children)?;
        Ok(Node::ListItem { children })
    }

    /// Create a block quote
    pub fn quote(children: Vec<Node>) -> Result<Self, StructureError> {
        check_children(NodeKind::Quote, &children)?;
        Ok(Node::Quote { children })
    }

    /// Create an image leaf
    pub fn image(
        src: impl Into<String>,
        alt_text: impl Into<String>,
        alignment: Alignment,
    ) -> Result<Self, StructureError> {
        Image::new(src, alt_text, alignment).map(Node::Image)
    }

    /// Create a link around text nodes; `url` must not be blank
    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Result<Self, StructureError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(StructureError::EmptyLinkUrl);
        }
        check_children(NodeKind::Link, &children)?;
        Ok(Node::Link { url, children })
    }

    /// Create a plain text leaf
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text::new(value))
    }

    /// Create a text leaf with marks
    pub fn marked_text(value: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Node::Text(Text::with_marks(value, marks))
    }

    /// Check the structural rules for this node and its whole subtree
    pub fn validate(&self) -> Result<(), StructureError> {
        match self {
            Node::Heading { level, .. }
                if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(level) =>
            {
                return Err(StructureError::HeadingLevelOutOfRange { level: *level });
            }
            Node::Image(image) if image.src.trim().is_empty() => {
                return Err(StructureError::EmptyImageSource);
            }
            Node::Link { url, .. } if url.trim().is_empty() => {
                return Err(StructureError::EmptyLinkUrl);
            }
            _ => {}
        }

        check_children(self.kind(), self.children())?;
        self.children().iter().try_for_each(Node::validate)
    }
}

/// Check that every direct child is allowed under `parent`
fn check_children(parent: NodeKind, children: &[Node]) -> Result<(), StructureError> {
    match children.iter().find(|child| !parent.accepts(child.kind())) {
        Some(child) => Err(StructureError::InvalidChild {
            parent,
            child: child.kind(),
        }),
        None => Ok(()),
    }
}
