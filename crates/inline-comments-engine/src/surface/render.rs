use std::collections::BTreeSet;
use std::fmt::Write;
use std::ops::Range;

use crate::comments::CommentId;
use crate::decoration::{CommentDecoration, HighlightStyle, find_ranges};
use crate::document::{BlockKey, ContentBlock, EntityKey};

/// A run of text with uniform styles, entity, highlight and decoration
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub range: Range<usize>,
    pub text: String,
    pub styles: BTreeSet<String>,
    pub entity: Option<EntityKey>,
    pub highlight: Option<HighlightStyle>,
    /// Set when the segment is part of a clickable comment decoration
    pub comment: Option<CommentId>,
}

/// What the host needs to draw one block
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub key: BlockKey,
    pub block_type: String,
    pub depth: u32,
    pub segments: Vec<Segment>,
}

impl RenderedBlock {
    pub(crate) fn build(
        block: &ContentBlock,
        decorations: &[CommentDecoration],
        highlight: impl Fn(&BTreeSet<String>) -> Option<HighlightStyle>,
    ) -> Self {
        let mut cuts: BTreeSet<usize> = BTreeSet::new();
        cuts.insert(block.len());
        for run in find_ranges(
            &block.characters,
            |a, b| a.styles == b.styles && a.entity == b.entity,
            |_| true,
        ) {
            cuts.insert(run.start);
        }
        for decoration in decorations {
            cuts.insert(decoration.range().start);
            cuts.insert(decoration.range().end);
        }

        let cuts: Vec<usize> = cuts.into_iter().collect();
        let segments = cuts
            .windows(2)
            .map(|pair| {
                let range = pair[0]..pair[1];
                let character = &block.characters[range.start];
                let comment = decorations
                    .iter()
                    .find(|decoration| decoration.range().contains(&range.start))
                    .and_then(CommentDecoration::comment_id);
                Segment {
                    text: block.text_in(range.clone()),
                    styles: character.styles.clone(),
                    entity: character.entity,
                    highlight: highlight(&character.styles),
                    comment,
                    range,
                }
            })
            .collect();

        Self {
            key: block.key.clone(),
            block_type: block.block_type.clone(),
            depth: block.depth,
            segments,
        }
    }
}

/// Readable dump of rendered blocks, for snapshot tests and debugging
pub fn format_rendered(blocks: &[RenderedBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        writeln!(out, "{} {}", block.block_type, block.key).ok();
        for segment in &block.segments {
            write!(
                out,
                "  {}..{} {:?}",
                segment.range.start, segment.range.end, segment.text
            )
            .ok();
            if !segment.styles.is_empty() {
                let styles: Vec<&str> = segment.styles.iter().map(String::as_str).collect();
                write!(out, " [{}]", styles.join(",")).ok();
            }
            if let Some(entity) = segment.entity {
                write!(out, " entity={}", entity.0).ok();
            }
            if let Some(highlight) = &segment.highlight {
                write!(out, " bg={}", highlight.background_color).ok();
            }
            if let Some(comment) = segment.comment {
                write!(out, " click={comment}").ok();
            }
            writeln!(out).ok();
        }
    }
    out
}
