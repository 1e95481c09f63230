use crate::document::{ContentState, SelectionState};

/// Undo entries kept before the oldest is dropped
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
struct HistoryEntry {
    content: ContentState,
    selection: SelectionState,
}

/// Live editor state: the current document snapshot, the selection and the
/// undo/redo history
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    content: ContentState,
    selection: SelectionState,
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
}

impl EditorState {
    pub fn new(content: ContentState) -> Self {
        let selection = SelectionState::at_start(&content);
        Self {
            content,
            selection,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Record an edit: the current content becomes an undo step and the redo
    /// history is discarded
    pub fn push(&self, content: ContentState, selection: SelectionState) -> Self {
        let mut undo_stack = self.undo_stack.clone();
        undo_stack.push(HistoryEntry {
            content: self.content.clone(),
            selection: self.selection.clone(),
        });
        if undo_stack.len() > HISTORY_LIMIT {
            undo_stack.remove(0);
        }
        Self {
            content,
            selection,
            undo_stack,
            redo_stack: Vec::new(),
        }
    }

    /// Move the selection without touching the history
    pub fn with_selection(&self, selection: SelectionState) -> Self {
        Self {
            selection,
            ..self.clone()
        }
    }

    /// Swap the content while keeping selection and undo/redo history
    pub fn replace_content(&self, content: ContentState) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    pub fn undo(&self) -> Option<Self> {
        let mut undo_stack = self.undo_stack.clone();
        let entry = undo_stack.pop()?;
        let mut redo_stack = self.redo_stack.clone();
        redo_stack.push(HistoryEntry {
            content: self.content.clone(),
            selection: self.selection.clone(),
        });
        Some(Self {
            content: entry.content,
            selection: entry.selection,
            undo_stack,
            redo_stack,
        })
    }

    pub fn redo(&self) -> Option<Self> {
        let mut redo_stack = self.redo_stack.clone();
        let entry = redo_stack.pop()?;
        let mut undo_stack = self.undo_stack.clone();
        undo_stack.push(HistoryEntry {
            content: self.content.clone(),
            selection: self.selection.clone(),
        });
        Some(Self {
            content: entry.content,
            selection: entry.selection,
            undo_stack,
            redo_stack,
        })
    }
}
