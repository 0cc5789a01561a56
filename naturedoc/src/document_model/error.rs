//! Error types for document tree construction

use super::types::NodeKind;
use thiserror::Error;

/// A tree was built in a shape the document grammar does not allow
///
/// Raised only by explicit construction. The deserializer never returns it:
/// it downgrades the same problems to per-node recoverable errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// A child node is not allowed under its parent
    #[error("'{child}' is not allowed inside '{parent}'")]
    InvalidChild {
        /// Kind of the containing node
        parent: NodeKind,
        /// Kind of the rejected child
        child: NodeKind,
    },

    /// Heading level outside 1..=6
    #[error("Heading level must be between 1 and 6, but found {level}")]
    HeadingLevelOutOfRange {
        /// The rejected level
        level: u8,
    },

    /// Image without a source
    #[error("Image source must not be empty")]
    EmptyImageSource,

    /// Link without a target
    #[error("Link url must not be empty")]
    EmptyLinkUrl,

    /// Edit addressed a block the document does not have
    #[error("Block index {index} is out of range for a document with {len} blocks")]
    BlockIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of top-level blocks
        len: usize,
    },
}
