use std::collections::{BTreeMap, BTreeSet};

use crate::comments::{CommentId, parse_comment_id};
use crate::document::{BlockKey, ContentBlock, EntityKey};

/// A non-text inline object such as a link
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub entity_type: String,
    pub mutability: String,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, mutability: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability: mutability.into(),
            data: serde_json::Map::new(),
        }
    }
}

/// Immutable document snapshot.
///
/// Edits never touch a `ContentState` in place: the functions in
/// [`crate::document::modifiers`] return a new value and leave the old one
/// intact, which is what the undo history relies on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentState {
    pub blocks: Vec<ContentBlock>,
    pub entity_map: BTreeMap<EntityKey, Entity>,
}

impl ContentState {
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            blocks,
            entity_map: BTreeMap::new(),
        }
    }

    /// Document with a single empty block
    pub fn empty() -> Self {
        Self::from_blocks(vec![ContentBlock::new(BlockKey::generate(), "")])
    }

    pub fn with_entity(mut self, key: EntityKey, entity: Entity) -> Self {
        self.entity_map.insert(key, entity);
        self
    }

    pub fn block(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.blocks.iter().find(|block| &block.key == key)
    }

    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|block| &block.key == key)
    }

    pub fn first_block(&self) -> Option<&ContentBlock> {
        self.blocks.first()
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A block key not yet used in this document
    pub fn fresh_block_key(&self) -> BlockKey {
        loop {
            let key = BlockKey::generate();
            if self.block(&key).is_none() {
                return key;
            }
        }
    }

    /// New document with every character's style set rewritten by `f`.
    /// Entities, text and block structure are carried over untouched.
    pub fn map_styles<F>(&self, mut f: F) -> ContentState
    where
        F: FnMut(&BTreeSet<String>) -> BTreeSet<String>,
    {
        let blocks = self
            .blocks
            .iter()
            .map(|block| {
                let mut block = block.clone();
                for character in &mut block.characters {
                    character.styles = f(&character.styles);
                }
                block
            })
            .collect();
        ContentState {
            blocks,
            entity_map: self.entity_map.clone(),
        }
    }

    /// Every comment id tagged anywhere in the document. Malformed tags are skipped.
    pub fn comment_ids(&self) -> BTreeSet<CommentId> {
        self.blocks
            .iter()
            .flat_map(|block| block.characters.iter())
            .flat_map(|character| character.comment_styles())
            .filter_map(|style| parse_comment_id(style).ok())
            .collect()
    }
}
