//! Decoration of comment ranges: finding them, resolving which comment they
//! stand for, tracking their rendered anchors, and colouring them.

pub mod decorator;
pub mod style_ranges;
pub mod styling;

pub use decorator::{CommentDecoration, DecorationKey, resolve_comment_id};
pub use style_ranges::{
    comment_ranges, find_comment_style_ranges, find_entity_ranges, find_ranges, find_style_ranges,
};
pub use styling::{HighlightPalette, HighlightStyle, comment_highlight};
