//! Comment identity and the boundary to the external comment application.

pub mod app;
pub mod memory;
pub mod tags;

pub use app::{CommentActions, CommentApp, CommentSlice, CommentStore, FocusOptions};
pub use memory::MemoryCommentApp;
pub use tags::{
    COMMENT_STYLE_PREFIX, CommentId, TagError, comment_style, is_comment_style, parse_comment_id,
};
