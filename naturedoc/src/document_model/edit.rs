//! Editing operations
//!
//! Every edit builds a new [`Document`] and leaves the original untouched, so
//! a renderer can keep reading a tree while the editor produces the next one.

use super::error::StructureError;
use super::node::Node;
use super::Document;

impl Document {
    /// New document with `block` added after the last block
    pub fn with_block_appended(&self, block: Node) -> Result<Document, StructureError> {
        self.with_block_inserted(self.blocks().len(), block)
    }

    /// New document with `block` inserted before position `index`
    ///
    /// `index` may equal the block count, which appends.
    pub fn with_block_inserted(
        &self,
        index: usize,
        block: Node,
    ) -> Result<Document, StructureError> {
        let mut blocks = self.blocks().to_vec();
        if index > blocks.len() {
            return Err(StructureError::BlockIndexOutOfRange {
                index,
                len: blocks.len(),
            });
        }
        blocks.insert(index, block);
        Document::new(blocks)
    }

    /// New document with the block at `index` replaced by `block`
    pub fn with_block_replaced(
        &self,
        index: usize,
        block: Node,
    ) -> Result<Document, StructureError> {
        let mut blocks = self.blocks().to_vec();
        let len = blocks.len();
        let slot = blocks
            .get_mut(index)
            .ok_or(StructureError::BlockIndexOutOfRange { index, len })?;
        *slot = block;
        Document::new(blocks)
    }

    /// New document without the block at `index`
    ///
    /// Removing the last remaining block leaves a single empty paragraph.
    pub fn with_block_removed(&self, index: usize) -> Result<Document, StructureError> {
        let mut blocks = self.blocks().to_vec();
        if index >= blocks.len() {
            return Err(StructureError::BlockIndexOutOfRange {
                index,
                len: blocks.len(),
            });
        }
        blocks.remove(index);
        Document::new(blocks)
    }
}
