//! Recoverable problems found while reading stored content

use crate::document_model::NodeKind;
use std::fmt;
use thiserror::Error;

/// Position of a node in the stored tree, as child indices from the root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the root node
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Child indices from the root
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// A problem in stored content that was repaired or skipped
///
/// None of these abort reading. Variants documented as "skipped" remove the
/// node (and its subtree) while keeping its siblings; the others keep the
/// node with a repaired value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoverableNodeError {
    /// A child entry is not a JSON object (skipped)
    #[error("{path}: expected a node object but found {found}; skipped")]
    NotAnObject {
        /// Location of the entry
        path: NodePath,
        /// JSON type actually found
        found: &'static str,
    },

    /// A node object without a `type` tag (skipped)
    #[error("{path}: node has no type tag; skipped")]
    MissingKind {
        /// Location of the node
        path: NodePath,
    },

    /// A node kind this version does not know (skipped)
    #[error("{path}: unknown node kind '{kind}'; skipped")]
    UnknownKind {
        /// Location of the node
        path: NodePath,
        /// The unrecognized tag
        kind: String,
    },

    /// A required attribute is absent or has the wrong type (skipped)
    #[error("{path}: {kind} is missing '{field}'; skipped")]
    MissingField {
        /// Location of the node
        path: NodePath,
        /// Kind of the node
        kind: NodeKind,
        /// Name of the missing attribute
        field: &'static str,
    },

    /// An image with an empty or missing source (skipped)
    #[error("{path}: image has an empty source; skipped")]
    EmptyImageSource {
        /// Location of the image
        path: NodePath,
    },

    /// A node placed under a parent that may not hold it (skipped)
    #[error("{path}: {child} is not allowed inside {parent}; skipped")]
    Misplaced {
        /// Location of the node
        path: NodePath,
        /// Kind of the containing node
        parent: NodeKind,
        /// Kind of the rejected node
        child: NodeKind,
    },

    /// A heading level outside 1..=6 (clamped)
    #[error("{path}: heading level {found} clamped to {clamped}")]
    HeadingLevelClamped {
        /// Location of the heading
        path: NodePath,
        /// Stored level
        found: i64,
        /// Level used instead
        clamped: u8,
    },

    /// A heading without a readable level (level 1 used)
    #[error("{path}: heading has no level; using 1")]
    HeadingLevelDefaulted {
        /// Location of the heading
        path: NodePath,
    },

    /// A mark name this version does not know (ignored)
    #[error("{path}: unknown mark '{mark}' ignored")]
    UnknownMark {
        /// Location of the text node
        path: NodePath,
        /// The unrecognized mark
        mark: String,
    },

    /// An image alignment this version does not know (center used)
    #[error("{path}: unknown image alignment '{value}'; using center")]
    UnknownAlignment {
        /// Location of the image
        path: NodePath,
        /// The unrecognized alignment
        value: String,
    },

    /// A link without a target (its text is kept in place of the link)
    #[error("{path}: link has no url; its text was kept without the link")]
    LinkWithoutUrl {
        /// Location of the link
        path: NodePath,
    },

    /// Content written by a newer encoding version (read best-effort)
    #[error("encoding version {found} is newer than supported version {supported}; reading best-effort")]
    NewerVersion {
        /// Version found in the envelope
        found: u64,
        /// Highest version this build reads
        supported: u64,
    },
}

impl RecoverableNodeError {
    /// Whether the problem removed content from the document
    pub fn is_drop(&self) -> bool {
        matches!(
            self,
            RecoverableNodeError::NotAnObject { .. }
                | RecoverableNodeError::MissingKind { .. }
                | RecoverableNodeError::UnknownKind { .. }
                | RecoverableNodeError::MissingField { .. }
                | RecoverableNodeError::EmptyImageSource { .. }
                | RecoverableNodeError::Misplaced { .. }
        )
    }

    /// Location of the affected node, when the problem concerns one node
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            RecoverableNodeError::NotAnObject { path, .. }
            | RecoverableNodeError::MissingKind { path }
            | RecoverableNodeError::UnknownKind { path, .. }
            | RecoverableNodeError::MissingField { path, .. }
            | RecoverableNodeError::EmptyImageSource { path }
            | RecoverableNodeError::Misplaced { path, .. }
            | RecoverableNodeError::HeadingLevelClamped { path, .. }
            | RecoverableNodeError::HeadingLevelDefaulted { path }
            | RecoverableNodeError::UnknownMark { path, .. }
            | RecoverableNodeError::UnknownAlignment { path, .. }
            | RecoverableNodeError::LinkWithoutUrl { path } => Some(path),
            RecoverableNodeError::NewerVersion { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_path_display() {
        assert_eq!(NodePath::root().to_string(), "root");
        assert_eq!(NodePath::root().child(2).child(0).to_string(), "root/2/0");
    }

    #[test]
    fn test_path_of_diagnostics() {
        let error = RecoverableNodeError::Misplaced {
            path: NodePath::root().child(3).child(1),
            parent: NodeKind::Heading,
            child: NodeKind::Paragraph,
        };
        assert_eq!(error.path().map(NodePath::indices), Some(&[3, 1][..]));
        assert!(NodePath::root().indices().is_empty());

        let error = RecoverableNodeError::NewerVersion {
            found: 2,
            supported: 1,
        };
        assert_eq!(error.path(), None);
    }

    #[test]
    fn test_error_messages_carry_path() {
        let error = RecoverableNodeError::EmptyImageSource {
            path: NodePath::root().child(1),
        };
        assert_eq!(
            error.to_string(),
            "root/1: image has an empty source; skipped"
        );
        assert!(error.is_drop());

        let error = RecoverableNodeError::HeadingLevelClamped {
            path: NodePath::root().child(0),
            found: 9,
            clamped: 6,
        };
        assert_eq!(error.to_string(), "root/0: heading level 9 clamped to 6");
        assert!(!error.is_drop());
    }
}
