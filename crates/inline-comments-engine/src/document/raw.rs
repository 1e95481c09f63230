//! Raw JSON form of a document, as exchanged with the host page.
//!
//! ```json
//! {
//!   "blocks": [{
//!     "key": "a1b2c", "text": "Hello", "type": "unstyled", "depth": 0,
//!     "inlineStyleRanges": [{ "offset": 0, "length": 5, "style": "BOLD" }],
//!     "entityRanges": [{ "offset": 0, "length": 5, "key": 0 }],
//!     "data": {}
//!   }],
//!   "entityMap": { "0": { "type": "LINK", "mutability": "MUTABLE", "data": {} } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{BlockKey, CharacterMetadata, ContentBlock, ContentState, Entity, EntityKey};
use crate::error::EditorError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: BTreeMap<u64, RawEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(default)]
    pub key: String,
    pub text: String,
    #[serde(rename = "type", default = "default_block_type")]
    pub block_type: String,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<RawEntityRange>,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mutability: String,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

fn default_block_type() -> String {
    "unstyled".to_string()
}

impl RawContent {
    /// Whether this document has nothing worth saving: every block is blank
    /// text with no entities
    pub fn is_empty(&self) -> bool {
        self.blocks
            .iter()
            .all(|block| block.text.trim().is_empty() && block.entity_ranges.is_empty())
    }
}

impl ContentState {
    pub fn from_raw(raw: RawContent) -> Self {
        let mut content = ContentState::default();
        for raw_block in raw.blocks {
            let key = if raw_block.key.is_empty() {
                content.fresh_block_key()
            } else {
                BlockKey(raw_block.key)
            };
            let mut block = ContentBlock::new(key, raw_block.text);
            block.block_type = raw_block.block_type;
            block.depth = raw_block.depth;
            block.data = raw_block.data;

            let len = block.len();
            for range in &raw_block.inline_style_ranges {
                let end = range.offset.saturating_add(range.length).min(len);
                for character in block.characters.iter_mut().take(end).skip(range.offset) {
                    character.styles.insert(range.style.clone());
                }
            }
            for range in &raw_block.entity_ranges {
                let end = range.offset.saturating_add(range.length).min(len);
                for character in block.characters.iter_mut().take(end).skip(range.offset) {
                    character.entity = Some(EntityKey(range.key));
                }
            }
            content.blocks.push(block);
        }

        content.entity_map = raw
            .entity_map
            .into_iter()
            .map(|(key, entity)| {
                (
                    EntityKey(key),
                    Entity {
                        entity_type: entity.entity_type,
                        mutability: entity.mutability,
                        data: entity.data,
                    },
                )
            })
            .collect();
        content
    }

    pub fn to_raw(&self) -> RawContent {
        let blocks = self
            .blocks
            .iter()
            .map(|block| RawBlock {
                key: block.key.0.clone(),
                text: block.text.clone(),
                block_type: block.block_type.clone(),
                depth: block.depth,
                inline_style_ranges: encode_style_ranges(&block.characters),
                entity_ranges: encode_entity_ranges(&block.characters),
                data: block.data.clone(),
            })
            .collect();

        let entity_map = self
            .entity_map
            .iter()
            .map(|(key, entity)| {
                (
                    key.0,
                    RawEntity {
                        entity_type: entity.entity_type.clone(),
                        mutability: entity.mutability.clone(),
                        data: entity.data.clone(),
                    },
                )
            })
            .collect();

        RawContent { blocks, entity_map }
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let raw: RawContent = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(&self.to_raw())?)
    }
}

/// Style ranges grouped by style, styles in order of first appearance
fn encode_style_ranges(characters: &[CharacterMetadata]) -> Vec<RawStyleRange> {
    let mut styles: Vec<&String> = Vec::new();
    for character in characters {
        for style in &character.styles {
            if !styles.contains(&style) {
                styles.push(style);
            }
        }
    }

    let mut ranges = Vec::new();
    for style in styles {
        let mut start = None;
        for (offset, character) in characters.iter().enumerate() {
            match (character.has_style(style), start) {
                (true, None) => start = Some(offset),
                (false, Some(from)) => {
                    ranges.push(RawStyleRange {
                        offset: from,
                        length: offset - from,
                        style: style.clone(),
                    });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(from) = start {
            ranges.push(RawStyleRange {
                offset: from,
                length: characters.len() - from,
                style: style.clone(),
            });
        }
    }
    ranges
}

fn encode_entity_ranges(characters: &[CharacterMetadata]) -> Vec<RawEntityRange> {
    let mut ranges: Vec<RawEntityRange> = Vec::new();
    let mut previous: Option<EntityKey> = None;
    for (offset, character) in characters.iter().enumerate() {
        match character.entity {
            Some(entity) if previous == Some(entity) => {
                if let Some(last) = ranges.last_mut() {
                    last.length += 1;
                }
            }
            Some(entity) => ranges.push(RawEntityRange {
                offset,
                length: 1,
                key: entity.0,
            }),
            None => {}
        }
        previous = character.entity;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINKED: &str = r#"{
        "blocks": [
            {
                "key": "k1",
                "text": "Hello linked world",
                "type": "unstyled",
                "depth": 0,
                "inlineStyleRanges": [
                    { "offset": 0, "length": 5, "style": "BOLD" },
                    { "offset": 12, "length": 6, "style": "BOLD" },
                    { "offset": 6, "length": 6, "style": "ITALIC" }
                ],
                "entityRanges": [{ "offset": 6, "length": 6, "key": 0 }],
                "data": {}
            },
            { "key": "k2", "text": "", "type": "header-two", "depth": 0,
              "inlineStyleRanges": [], "entityRanges": [], "data": {} }
        ],
        "entityMap": {
            "0": { "type": "LINK", "mutability": "MUTABLE", "data": { "url": "https://example.com" } }
        }
    }"#;

    #[test]
    fn test_canonical_raw_survives_conversion() {
        let raw: RawContent = serde_json::from_str(LINKED).unwrap();
        let content = ContentState::from_raw(raw.clone());
        assert_eq!(content.to_raw(), raw);
    }

    #[test]
    fn test_from_json_applies_ranges() {
        let content = ContentState::from_json(LINKED).unwrap();
        let block = &content.blocks[0];
        assert!(block.characters[4].has_style("BOLD"));
        assert!(!block.characters[5].has_style("BOLD"));
        assert_eq!(block.characters[6].entity, Some(EntityKey(0)));
        assert_eq!(block.characters[12].entity, None);
        assert_eq!(content.blocks[1].block_type, "header-two");
        assert_eq!(content.entity_map[&EntityKey(0)].entity_type, "LINK");
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let content = ContentState::from_json(r#"{"blocks":[{"text":"plain"}]}"#).unwrap();
        let block = &content.blocks[0];
        assert_eq!(block.block_type, "unstyled");
        assert_eq!(block.key.as_str().len(), 5);
        assert!(content.entity_map.is_empty());
    }

    #[test]
    fn test_out_of_range_style_is_clamped() {
        let content = ContentState::from_json(
            r#"{"blocks":[{"key":"a","text":"abc","inlineStyleRanges":[{"offset":1,"length":10,"style":"BOLD"}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            content.to_raw().blocks[0].inline_style_ranges,
            vec![RawStyleRange {
                offset: 1,
                length: 2,
                style: "BOLD".to_string()
            }]
        );
    }

    #[test]
    fn test_overflowing_ranges_are_ignored() {
        let json = format!(
            r#"{{"blocks":[{{"key":"a","text":"abc",
                "inlineStyleRanges":[{{"offset":{max},"length":2,"style":"COMMENT-1"}}],
                "entityRanges":[{{"offset":{max},"length":2,"key":0}}]}}]}}"#,
            max = usize::MAX
        );
        let content = ContentState::from_json(&json).unwrap();
        let block = &content.blocks[0];

        assert!(block.characters.iter().all(|c| c.styles.is_empty()));
        assert!(block.characters.iter().all(|c| c.entity.is_none()));
    }

    #[test]
    fn test_adjacent_entities_stay_separate() {
        let block = ContentBlock::new("a", "abcd")
            .with_entity(0..2, EntityKey(0))
            .with_entity(2..4, EntityKey(1));
        let ranges = encode_entity_ranges(&block.characters);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].offset, 2);
        assert_eq!(ranges[1].key, 1);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            ContentState::from_json("{ nope"),
            Err(EditorError::Raw(_))
        ));
    }

    #[test]
    fn test_blank_document_is_empty() {
        let content = ContentState::from_json(r#"{"blocks":[{"key":"a","text":"  "}]}"#).unwrap();
        assert!(content.to_raw().is_empty());
        assert!(!ContentState::from_json(LINKED).unwrap().to_raw().is_empty());
    }
}
