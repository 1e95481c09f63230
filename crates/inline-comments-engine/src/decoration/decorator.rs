use std::ops::Range;
use std::rc::Rc;

use uuid::Uuid;

use crate::annotation::{Annotation, DecoratorRef, Measure};
use crate::comments::{CommentActions, CommentId, FocusOptions, parse_comment_id};
use crate::decoration::style_ranges::{comment_ranges, find_comment_style_ranges};
use crate::document::{BlockKey, ContentBlock};

/// Identity of a decoration across renders: the same block, range and
/// resolved comment is the same decoration and stays mounted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecorationKey {
    pub block_key: BlockKey,
    pub range: Range<usize>,
    pub comment_id: Option<CommentId>,
}

/// Resolve which comment a decorated range stands for.
///
/// With overlapping comments, pick the comment whose style occurs in the
/// fewest separate ranges of the block (ties go to the lowest id). That
/// comment is the most likely to have no other range where it is clickable
/// on its own. This is a heuristic and can still leave a comment with no
/// clickable range when overlaps are complex.
pub fn resolve_comment_id(block: &ContentBlock, range: &Range<usize>) -> Option<CommentId> {
    let Some(character) = block.character(range.start) else {
        log::debug!("Range {range:?} is outside block {}", block.key);
        return None;
    };
    let styles: Vec<&str> = character.comment_styles().collect();

    let candidates: Vec<(usize, CommentId)> = styles
        .iter()
        .filter_map(|style| match parse_comment_id(style) {
            Ok(id) => Some((style, id)),
            Err(err) => {
                log::warn!("Ignoring comment style in block {}: {err}", block.key);
                None
            }
        })
        .map(|(style, id)| {
            let count = if styles.len() > 1 {
                find_comment_style_ranges(block, |c| c.has_style(style)).len()
            } else {
                0
            };
            (count, id)
        })
        .collect();

    candidates.into_iter().min().map(|(_, id)| id)
}

struct Mounted {
    annotation: Rc<dyn Annotation>,
    anchor: Uuid,
}

/// One rendered, clickable comment range.
///
/// Mounting registers the rendered element as an anchor of the comment's
/// inline annotation; unmounting removes it again.
pub struct CommentDecoration {
    key: DecorationKey,
    mounted: Option<Mounted>,
}

impl CommentDecoration {
    pub fn new(block: &ContentBlock, range: Range<usize>) -> Self {
        let comment_id = resolve_comment_id(block, &range);
        Self {
            key: DecorationKey {
                block_key: block.key.clone(),
                range,
                comment_id,
            },
            mounted: None,
        }
    }

    /// Decorations for every comment range of a block, in block order
    pub fn for_block(block: &ContentBlock) -> Vec<Self> {
        comment_ranges(block)
            .into_iter()
            .map(|range| Self::new(block, range))
            .collect()
    }

    pub fn key(&self) -> &DecorationKey {
        &self.key
    }

    pub fn comment_id(&self) -> Option<CommentId> {
        self.key.comment_id
    }

    pub fn block_key(&self) -> &BlockKey {
        &self.key.block_key
    }

    pub fn range(&self) -> &Range<usize> {
        &self.key.range
    }

    pub fn contains(&self, block_key: &BlockKey, offset: usize) -> bool {
        &self.key.block_key == block_key && self.key.range.contains(&offset)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Register `element` with the comment's inline annotation.
    /// Returns false when there is no comment or no inline annotation for it.
    pub fn mount<A>(&mut self, app: &A, element: Rc<dyn Measure>) -> bool
    where
        A: CommentActions + ?Sized,
    {
        self.unmount();
        let Some(id) = self.key.comment_id else {
            return false;
        };
        let Some(annotation) = app.annotation(id) else {
            log::debug!("No annotation registered for comment {id}");
            return false;
        };
        let Some(inline) = annotation.as_inline() else {
            return false;
        };

        let anchor = DecoratorRef::new(element);
        let anchor_id = anchor.id();
        inline.add_decorator_ref(anchor, self.key.block_key.clone());
        self.mounted = Some(Mounted {
            annotation,
            anchor: anchor_id,
        });
        true
    }

    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take()
            && let Some(inline) = mounted.annotation.as_inline()
        {
            inline.remove_decorator_ref(mounted.anchor);
        }
    }

    /// Focus and pin this decoration's comment, remembering the clicked block
    /// so the comment floats next to it
    pub fn click<A>(&self, app: &A) -> Option<CommentId>
    where
        A: CommentActions + ?Sized,
    {
        let id = self.key.comment_id?;
        if let Some(annotation) = app.annotation(id)
            && let Some(inline) = annotation.as_inline()
        {
            inline.set_focused_block_key(Some(self.key.block_key.clone()));
        }
        app.set_focused_comment(
            Some(id),
            FocusOptions {
                update_pinned_comment: true,
            },
        );
        Some(id)
    }
}

impl Drop for CommentDecoration {
    fn drop(&mut self) {
        self.unmount();
    }
}
