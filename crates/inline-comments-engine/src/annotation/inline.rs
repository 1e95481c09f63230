use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use uuid::Uuid;

use crate::annotation::{Annotation, DecoratorRef, Measure, Viewport};
use crate::document::BlockKey;

struct TrackedAnchor {
    anchor: DecoratorRef,
    block_key: BlockKey,
}

#[derive(Default)]
struct TrackerState {
    anchors: HashMap<Uuid, TrackedAnchor>,
    focused_block_key: Option<BlockKey>,
    cached_median: Option<Uuid>,
}

/// Annotation for a comment on a range of rich text.
///
/// A comment's highlight can be rendered as several disjoint pieces, possibly
/// in different blocks. Each rendered piece registers a [`DecoratorRef`]
/// here; the comment floats beside the median piece by height so it sits next
/// to an actual highlight rather than between two of them.
///
/// The median over all anchors is cached until the anchor set changes. The
/// cache only saves work: a cached anchor that can no longer be measured is
/// recomputed.
pub struct InlineAnnotation {
    field: Option<Rc<dyn Measure>>,
    viewport: Rc<dyn Viewport>,
    state: RefCell<TrackerState>,
}

impl InlineAnnotation {
    /// `field` is the editor's container, used when no anchor is mounted
    pub fn new(field: Option<Rc<dyn Measure>>, viewport: Rc<dyn Viewport>) -> Self {
        Self {
            field,
            viewport,
            state: RefCell::new(TrackerState::default()),
        }
    }

    pub fn add_decorator_ref(&self, anchor: DecoratorRef, block_key: BlockKey) {
        let mut state = self.state.borrow_mut();
        state
            .anchors
            .insert(anchor.id(), TrackedAnchor { anchor, block_key });
        state.cached_median = None;
    }

    pub fn remove_decorator_ref(&self, id: Uuid) -> bool {
        let mut state = self.state.borrow_mut();
        state.cached_median = None;
        state.anchors.remove(&id).is_some()
    }

    pub fn set_focused_block_key(&self, block_key: Option<BlockKey>) {
        self.state.borrow_mut().focused_block_key = block_key;
    }

    pub fn focused_block_key(&self) -> Option<BlockKey> {
        self.state.borrow().focused_block_key.clone()
    }

    pub fn anchor_count(&self) -> usize {
        self.state.borrow().anchors.len()
    }

    /// Median anchor by height: index `ceil(n/2 - 1)` of the measurable
    /// anchors sorted by top. With `only_focused_block` set (and a focused
    /// block recorded) only anchors in that block are considered.
    fn median_anchor(&self, only_focused_block: bool) -> Option<DecoratorRef> {
        let state = self.state.borrow();
        let focused = state
            .focused_block_key
            .as_ref()
            .filter(|_| only_focused_block);

        let mut measured: Vec<(f64, &DecoratorRef)> = state
            .anchors
            .values()
            .filter(|tracked| focused.is_none_or(|key| &tracked.block_key == key))
            .filter_map(|tracked| tracked.anchor.top().map(|top| (top, &tracked.anchor)))
            .collect();
        if measured.is_empty() {
            return None;
        }
        measured.sort_by(|a, b| a.0.total_cmp(&b.0));
        Some(measured[(measured.len() - 1) / 2].1.clone())
    }

    fn cached_median(&self) -> Option<DecoratorRef> {
        let state = self.state.borrow();
        let id = state.cached_median?;
        state
            .anchors
            .get(&id)
            .map(|tracked| tracked.anchor.clone())
            .filter(|anchor| anchor.top().is_some())
    }
}

impl Annotation for InlineAnnotation {
    fn desired_position(&self, focused: bool) -> f64 {
        let median = if focused {
            // the focused block's anchors can change quickly, never cache them
            self.median_anchor(true)
        } else if let Some(cached) = self.cached_median() {
            Some(cached)
        } else {
            let median = self.median_anchor(false);
            self.state.borrow_mut().cached_median = median.as_ref().map(DecoratorRef::id);
            median
        };

        let scroll = self.viewport.scroll_top();
        if let Some(top) = median.and_then(|anchor| anchor.top()) {
            return top + scroll;
        }
        match self.field.as_ref().and_then(|field| field.top()) {
            Some(top) => top + scroll,
            None => 0.0,
        }
    }

    fn as_inline(&self) -> Option<&InlineAnnotation> {
        Some(self)
    }
}
