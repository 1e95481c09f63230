pub mod annotation;
pub mod comments;
pub mod decoration;
pub mod document;
pub mod error;
pub mod surface;

// Re-export key types for easier usage
pub use annotation::{Annotation, DecoratorRef, FieldAnnotation, InlineAnnotation, Measure, Viewport};
pub use comments::{
    COMMENT_STYLE_PREFIX, CommentActions, CommentApp, CommentId, CommentStore, FocusOptions,
    MemoryCommentApp,
};
pub use decoration::{CommentDecoration, HighlightPalette, HighlightStyle};
pub use document::{
    BlockKey, CharacterMetadata, ContentBlock, ContentState, EditorState, Entity, EntityKey,
    RawContent, SelectionState,
};
pub use error::EditorError;
pub use surface::{
    CommentableEditor, EditorOptions, EditorProps, InlineStyleDef, RenderedBlock, SaveCallback,
    Segment, ToolbarControl, format_rendered,
};
