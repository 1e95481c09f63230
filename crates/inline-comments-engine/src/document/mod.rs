//! Block-structured rich-text document model.
//!
//! - **`block`**: `ContentBlock`, per-character style and entity metadata
//! - **`content`**: `ContentState`, the immutable document snapshot
//! - **`selection`**: anchor/focus selections and their resolved ranges
//! - **`editor_state`**: content + selection + undo/redo history
//! - **`modifiers`**: pure edit operations returning new snapshots
//! - **`raw`**: the JSON form exchanged with the host page

pub mod block;
pub mod content;
pub mod editor_state;
pub mod modifiers;
pub mod raw;
pub mod selection;

pub use block::{BlockKey, CharacterMetadata, ContentBlock, EntityKey};
pub use content::{ContentState, Entity};
pub use editor_state::EditorState;
pub use raw::RawContent;
pub use selection::{SelectionRange, SelectionState};
