use crate::document::{BlockKey, ContentState};
use crate::error::EditorError;

/// Anchor/focus selection over block keys and char offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub anchor_key: BlockKey,
    pub anchor_offset: usize,
    pub focus_key: BlockKey,
    pub focus_offset: usize,
}

/// A selection resolved against a document: block indexes in document
/// order, offsets clamped to their blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start_block: usize,
    pub start_offset: usize,
    pub end_block: usize,
    pub end_offset: usize,
}

impl SelectionRange {
    pub fn is_collapsed(&self) -> bool {
        self.start_block == self.end_block && self.start_offset == self.end_offset
    }

    /// Char range this selection covers inside the block at `index`
    pub fn range_in_block(&self, index: usize, block_len: usize) -> Option<std::ops::Range<usize>> {
        if index < self.start_block || index > self.end_block {
            return None;
        }
        let start = if index == self.start_block {
            self.start_offset
        } else {
            0
        };
        let end = if index == self.end_block {
            self.end_offset
        } else {
            block_len
        };
        Some(start..end)
    }
}

impl SelectionState {
    pub fn new(
        anchor_key: BlockKey,
        anchor_offset: usize,
        focus_key: BlockKey,
        focus_offset: usize,
    ) -> Self {
        Self {
            anchor_key,
            anchor_offset,
            focus_key,
            focus_offset,
        }
    }

    pub fn collapsed(key: BlockKey, offset: usize) -> Self {
        Self::new(key.clone(), offset, key, offset)
    }

    /// Selection covering `start..end` inside a single block
    pub fn within(key: BlockKey, start: usize, end: usize) -> Self {
        Self::new(key.clone(), start, key, end)
    }

    /// Caret at the start of the first block
    pub fn at_start(content: &ContentState) -> Self {
        let key = content
            .first_block()
            .map(|block| block.key.clone())
            .unwrap_or_else(|| BlockKey::new(""));
        Self::collapsed(key, 0)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    /// Resolve the selection against `content`
    pub fn resolve(&self, content: &ContentState) -> Result<SelectionRange, EditorError> {
        let anchor_index = content
            .block_index(&self.anchor_key)
            .ok_or_else(|| EditorError::UnknownBlock(self.anchor_key.clone()))?;
        let focus_index = content
            .block_index(&self.focus_key)
            .ok_or_else(|| EditorError::UnknownBlock(self.focus_key.clone()))?;

        let anchor_offset = self.anchor_offset.min(content.blocks[anchor_index].len());
        let focus_offset = self.focus_offset.min(content.blocks[focus_index].len());

        let anchor = (anchor_index, anchor_offset);
        let focus = (focus_index, focus_offset);
        let (start, end) = if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        };

        Ok(SelectionRange {
            start_block: start.0,
            start_offset: start.1,
            end_block: end.0,
            end_offset: end.1,
        })
    }
}
