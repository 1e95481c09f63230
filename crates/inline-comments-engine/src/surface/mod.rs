//! The editable surface: construction, change handling, debounced saving,
//! toolbar, and rendering with comment decorations.

pub mod controller;
pub mod debounce;
pub mod options;
pub mod persistence;
pub mod render;

pub use controller::CommentableEditor;
pub use debounce::Debouncer;
pub use options::{
    DEFAULT_PERSIST_DEBOUNCE, EditorOptions, EditorProps, InlineStyleDef, SaveCallback,
    ToolbarControl,
};
pub use persistence::{filter_comment_styles, serialise_for_save, strip_comment_styles};
pub use render::{RenderedBlock, Segment, format_rendered};
