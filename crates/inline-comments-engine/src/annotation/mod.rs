//! Position tracking for floating comment UI.
//!
//! The host supplies [`Measure`] handles for rendered elements and a
//! [`Viewport`] for the page scroll offset. Annotations turn those into one
//! absolute vertical position per comment.

pub mod field;
pub mod inline;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

pub use field::FieldAnnotation;
pub use inline::InlineAnnotation;

/// A rendered element whose position can be read
pub trait Measure {
    /// Viewport-relative top edge, or `None` once the element is gone
    fn top(&self) -> Option<f64>;
}

/// The scrolling page the elements live in
pub trait Viewport {
    fn scroll_top(&self) -> f64;
}

impl Measure for Cell<Option<f64>> {
    fn top(&self) -> Option<f64> {
        self.get()
    }
}

impl Viewport for Cell<f64> {
    fn scroll_top(&self) -> f64 {
        self.get()
    }
}

/// Anything the comment layout can float a comment next to
pub trait Annotation {
    /// Absolute (document-relative) vertical position for the comment's UI
    fn desired_position(&self, focused: bool) -> f64;

    fn as_inline(&self) -> Option<&InlineAnnotation> {
        None
    }
}

/// Handle to one rendered piece of a comment's highlight. Identity is the
/// generated id, not the element.
#[derive(Clone)]
pub struct DecoratorRef {
    id: Uuid,
    element: Rc<dyn Measure>,
}

impl DecoratorRef {
    pub fn new(element: Rc<dyn Measure>) -> Self {
        Self {
            id: Uuid::new_v4(),
            element,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn top(&self) -> Option<f64> {
        self.element.top()
    }
}

impl fmt::Debug for DecoratorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorRef")
            .field("id", &self.id)
            .field("top", &self.top())
            .finish()
    }
}
