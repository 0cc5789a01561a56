//! Document model for article bodies
//!
//! An article body is a tree rooted in a single [`Node::Root`]. This module
//! defines the node grammar, the [`Document`] wrapper that guarantees the
//! grammar holds, pure editing operations and a few statistics used by
//! listing pages.

use itertools::Itertools;

// Submodules
mod edit;
mod error;
mod node;
mod text;
mod types;

// Re-export public types
pub use error::StructureError;
pub use node::{Image, Node};
pub use text::{Mark, MarkSet, Text};
pub use types::{Alignment, NodeKind, MAX_HEADING_LEVEL, MIN_HEADING_LEVEL};

/// A validated document tree
///
/// The root is always a [`Node::Root`] holding at least one block, and every
/// node below it satisfies the structural rules of [`NodeKind::accepts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Build a document from its top-level blocks
    ///
    /// # Parameters
    /// * `blocks` - Block nodes in display order
    ///
    /// # Returns
    /// * `Ok(Document)` - The whole tree satisfies the structural rules
    /// * `Err(StructureError)` - The first violation found, depth-first
    ///
    /// An empty block list yields [`Document::empty`].
    pub fn new(blocks: Vec<Node>) -> Result<Self, StructureError> {
        if blocks.is_empty() {
            return Ok(Self::empty());
        }
        let root = Node::Root { children: blocks };
        root.validate()?;
        Ok(Self { root })
    }

    /// A document holding a single empty paragraph
    pub fn empty() -> Self {
        Self {
            root: Node::Root {
                children: vec![Node::Paragraph { children: vec![] }],
            },
        }
    }

    /// A document holding one paragraph with one unmarked text run
    pub fn single_paragraph(value: impl Into<String>) -> Self {
        Self {
            root: Node::Root {
                children: vec![Node::Paragraph {
                    children: vec![Node::text(value)],
                }],
            },
        }
    }

    /// The root node
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Top-level blocks
    pub fn blocks(&self) -> &[Node] {
        self.root.children()
    }

    /// Consume the document, returning its top-level blocks
    pub fn into_blocks(self) -> Vec<Node> {
        match self.root {
            Node::Root { children } => children,
            _ => Vec::new(),
        }
    }

    /// Text content with one line per paragraph, heading or list item
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        collect_text(&self.root, &mut text);
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .join("\n")
    }

    /// Get the total number of words
    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }

    /// Get the total number of images
    pub fn image_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            let own = usize::from(matches!(node, Node::Image(_)));
            own + node.children().iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    /// Whether the document has neither visible text nor images
    pub fn is_blank(&self) -> bool {
        self.image_count() == 0 && self.plain_text().is_empty()
    }

    /// Short preview of the text for article cards
    ///
    /// Whitespace is collapsed. Text longer than `max_chars` is cut at the
    /// last word boundary that fits and ends with an ellipsis.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let text = self.plain_text().split_whitespace().join(" ");
        if text.chars().count() <= max_chars {
            return text;
        }

        let cut: String = text.chars().take(max_chars).collect();
        let cut = match cut.rfind(' ') {
            Some(space) if space > 0 => &cut[..space],
            _ => cut.as_str(),
        };
        format!("{}…", cut.trim_end())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// Append text content, ending every line-level node with a newline
fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&text.value),
        Node::Image(_) => {}
        Node::Paragraph { children }
        | Node::Heading { children, .. }
        | Node::ListItem { children } => {
            children.iter().for_each(|child| collect_text(child, out));
            out.push('\n');
        }
        Node::Root { children }
        | Node::List { children, .. }
        | Node::Quote { children }
        | Node::Link { children, .. } => {
            children.iter().for_each(|child| collect_text(child, out));
        }
    }
}
