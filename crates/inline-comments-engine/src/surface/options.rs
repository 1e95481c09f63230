use std::rc::Rc;
use std::time::Duration;

use crate::annotation::{Measure, Viewport};
use crate::comments::CommentApp;
use crate::decoration::HighlightPalette;

/// How long after the last edit the document is saved
pub const DEFAULT_PERSIST_DEBOUNCE: Duration = Duration::from_millis(250);

/// Called with the serialised document (or `null` for an empty one)
pub type SaveCallback = Box<dyn FnMut(String) -> anyhow::Result<()>>;

/// An inline style the toolbar offers, e.g. bold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineStyleDef {
    pub style: String,
    pub label: String,
    pub description: Option<String>,
}

impl InlineStyleDef {
    pub fn new(style: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            label: label.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarControl {
    InlineStyle(InlineStyleDef),
    AddComment,
}

/// Editor configuration. `placeholder` and `spell_check` are passed through
/// to the host untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    pub persist_debounce: Duration,
    pub palette: HighlightPalette,
    pub placeholder: Option<String>,
    pub spell_check: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            persist_debounce: DEFAULT_PERSIST_DEBOUNCE,
            palette: HighlightPalette::default(),
            placeholder: None,
            spell_check: true,
        }
    }
}

/// Everything a [`crate::CommentableEditor`] is constructed with besides
/// its initial content and save callback
pub struct EditorProps {
    pub app: Rc<dyn CommentApp>,
    /// Identity of the field, scoping which comments belong to it
    pub content_path: String,
    pub inline_styles: Vec<InlineStyleDef>,
    pub options: EditorOptions,
    /// The field's container element, fallback anchor for new comments
    pub field: Option<Rc<dyn Measure>>,
    pub viewport: Rc<dyn Viewport>,
}
