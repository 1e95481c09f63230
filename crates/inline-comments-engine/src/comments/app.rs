use std::collections::BTreeSet;
use std::rc::Rc;

use crate::annotation::Annotation;
use crate::comments::CommentId;

/// Options for [`CommentActions::set_focused_comment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    /// Also pin the comment so its floating UI stays in place
    pub update_pinned_comment: bool,
}

/// Read-only selectors over the external comment store
pub trait CommentStore {
    /// Ids of the live comments that belong to the field at `content_path`
    fn comments_for_content_path(&self, content_path: &str) -> Vec<CommentId>;
    /// Whether commenting is switched on for the page
    fn is_enabled(&self) -> bool;
    fn focused_comment(&self) -> Option<CommentId>;
}

/// Actions the editor dispatches to the external comment application
pub trait CommentActions {
    /// Register a new comment anchored by `annotation` and return its id.
    /// The annotation is kept in the application's registry under that id.
    fn make_comment(&self, annotation: Rc<dyn Annotation>, content_path: &str) -> CommentId;
    /// Attach (or replace) the annotation of a comment that already exists,
    /// such as one loaded with the document
    fn update_annotation(&self, annotation: Rc<dyn Annotation>, id: CommentId);
    /// Annotation registered for a comment
    fn annotation(&self, id: CommentId) -> Option<Rc<dyn Annotation>>;
    fn set_focused_comment(&self, id: Option<CommentId>, options: FocusOptions);
}

/// The full comment application handle an editor is given
pub trait CommentApp: CommentStore + CommentActions {}

impl<T: CommentStore + CommentActions + ?Sized> CommentApp for T {}

/// The part of the comment store one field cares about
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentSlice {
    pub ids: BTreeSet<CommentId>,
    pub enabled: bool,
    pub focused: Option<CommentId>,
}

impl CommentSlice {
    pub fn read<S: CommentStore + ?Sized>(store: &S, content_path: &str) -> Self {
        Self {
            ids: store
                .comments_for_content_path(content_path)
                .into_iter()
                .collect(),
            enabled: store.is_enabled(),
            focused: store.focused_comment(),
        }
    }

    /// Whether moving from `self` to `next` changes how the field must be
    /// decorated. A focus change only matters when the old or the new
    /// focused comment belongs to this field.
    pub fn requires_redecoration(&self, next: &CommentSlice) -> bool {
        if self.ids != next.ids || self.enabled != next.enabled {
            return true;
        }
        if self.focused == next.focused {
            return false;
        }
        let belongs = |id: Option<CommentId>| {
            id.is_some_and(|id| self.ids.contains(&id) || next.ids.contains(&id))
        };
        belongs(self.focused) || belongs(next.focused)
    }
}
