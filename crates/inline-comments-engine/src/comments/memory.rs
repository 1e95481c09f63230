use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::annotation::Annotation;
use crate::comments::{CommentActions, CommentId, CommentStore, FocusOptions};

#[derive(Default)]
struct MemoryState {
    last_id: u64,
    comments: BTreeMap<CommentId, String>,
    annotations: HashMap<CommentId, Rc<dyn Annotation>>,
    focused: Option<CommentId>,
    pinned: Option<CommentId>,
    enabled: bool,
}

/// In-process comment application: keeps comments per content path, the
/// annotation registry and the focus/pin state. Used by the terminal host
/// and by tests in place of a page-level comment app.
pub struct MemoryCommentApp {
    state: RefCell<MemoryState>,
}

impl Default for MemoryCommentApp {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCommentApp {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MemoryState {
                enabled: true,
                ..MemoryState::default()
            }),
        }
    }

    /// Record a comment that already exists, e.g. one loaded with the document
    pub fn add_existing(&self, id: CommentId, content_path: &str) {
        let mut state = self.state.borrow_mut();
        state.last_id = state.last_id.max(id.0);
        state.comments.insert(id, content_path.to_string());
    }

    /// Delete a comment. Clears focus and pin if they pointed at it.
    pub fn remove_comment(&self, id: CommentId) -> bool {
        let mut state = self.state.borrow_mut();
        state.annotations.remove(&id);
        if state.focused == Some(id) {
            state.focused = None;
        }
        if state.pinned == Some(id) {
            state.pinned = None;
        }
        state.comments.remove(&id).is_some()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.borrow_mut().enabled = enabled;
    }

    pub fn pinned_comment(&self) -> Option<CommentId> {
        self.state.borrow().pinned
    }

    /// Every live comment with its content path
    pub fn comments(&self) -> Vec<(CommentId, String)> {
        self.state
            .borrow()
            .comments
            .iter()
            .map(|(id, path)| (*id, path.clone()))
            .collect()
    }
}

impl CommentStore for MemoryCommentApp {
    fn comments_for_content_path(&self, content_path: &str) -> Vec<CommentId> {
        self.state
            .borrow()
            .comments
            .iter()
            .filter(|(_, path)| path.as_str() == content_path)
            .map(|(id, _)| *id)
            .collect()
    }

    fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    fn focused_comment(&self) -> Option<CommentId> {
        self.state.borrow().focused
    }
}

impl CommentActions for MemoryCommentApp {
    fn make_comment(&self, annotation: Rc<dyn Annotation>, content_path: &str) -> CommentId {
        let mut state = self.state.borrow_mut();
        state.last_id += 1;
        let id = CommentId(state.last_id);
        state.comments.insert(id, content_path.to_string());
        state.annotations.insert(id, annotation);
        log::debug!("Created comment {id} for '{content_path}'");
        id
    }

    fn update_annotation(&self, annotation: Rc<dyn Annotation>, id: CommentId) {
        self.state.borrow_mut().annotations.insert(id, annotation);
    }

    fn annotation(&self, id: CommentId) -> Option<Rc<dyn Annotation>> {
        self.state.borrow().annotations.get(&id).cloned()
    }

    fn set_focused_comment(&self, id: Option<CommentId>, options: FocusOptions) {
        let mut state = self.state.borrow_mut();
        state.focused = id;
        if options.update_pinned_comment {
            state.pinned = id;
        }
    }
}
