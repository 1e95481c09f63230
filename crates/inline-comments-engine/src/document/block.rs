use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::comments::is_comment_style;

/// Stable identifier of a block; survives edits to the block's text
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(pub String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Random five character key, the same shape hosts use for their own blocks
    pub fn generate() -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self(id[..5].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Key into the document's entity map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(pub u64);

/// Per-character formatting: the style tags and at most one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterMetadata {
    pub styles: BTreeSet<String>,
    pub entity: Option<EntityKey>,
}

impl CharacterMetadata {
    pub fn with_styles<I, S>(styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            styles: styles.into_iter().map(Into::into).collect(),
            entity: None,
        }
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.styles.contains(style)
    }

    pub fn has_comment_style(&self) -> bool {
        self.styles.iter().any(|style| is_comment_style(style))
    }

    /// Comment style tags carried by this character, in tag order
    pub fn comment_styles(&self) -> impl Iterator<Item = &str> {
        self.styles
            .iter()
            .map(String::as_str)
            .filter(|style| is_comment_style(style))
    }
}

/// A paragraph-like unit of the document.
///
/// `characters` always holds exactly one entry per `char` of `text`; every
/// offset in this crate counts chars, not bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub key: BlockKey,
    pub block_type: String,
    pub text: String,
    pub depth: u32,
    pub characters: Vec<CharacterMetadata>,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ContentBlock {
    /// Unstyled block with plain text
    pub fn new(key: impl Into<BlockKey>, text: impl Into<String>) -> Self {
        let text = text.into();
        let characters = vec![CharacterMetadata::default(); text.chars().count()];
        Self {
            key: key.into(),
            block_type: "unstyled".to_string(),
            text,
            depth: 0,
            characters,
            data: serde_json::Map::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn character(&self, offset: usize) -> Option<&CharacterMetadata> {
        self.characters.get(offset)
    }

    /// Text covered by a char range, clamped to the block
    pub fn text_in(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.len());
        let end = range.end.clamp(start, self.len());
        self.text.chars().skip(start).take(end - start).collect()
    }

    /// Byte index of a char offset, clamped to the end of the text
    pub(crate) fn byte_index(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }

    /// Add `style` to every character in `range`
    pub fn with_style(mut self, range: Range<usize>, style: &str) -> Self {
        let end = range.end.min(self.len());
        for character in &mut self.characters[range.start.min(end)..end] {
            character.styles.insert(style.to_string());
        }
        self
    }

    /// Attach `entity` to every character in `range`
    pub fn with_entity(mut self, range: Range<usize>, entity: EntityKey) -> Self {
        let end = range.end.min(self.len());
        for character in &mut self.characters[range.start.min(end)..end] {
            character.entity = Some(entity);
        }
        self
    }
}

impl From<String> for BlockKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}
