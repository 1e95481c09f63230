use std::rc::Rc;

use crate::annotation::{Annotation, Measure, Viewport};

/// Annotation pinned to a whole field rather than a text range
pub struct FieldAnnotation {
    field: Option<Rc<dyn Measure>>,
    viewport: Option<Rc<dyn Viewport>>,
}

impl FieldAnnotation {
    pub fn new(field: Rc<dyn Measure>, viewport: Rc<dyn Viewport>) -> Self {
        Self {
            field: Some(field),
            viewport: Some(viewport),
        }
    }

    /// Annotation with nothing to measure; always positioned at 0
    pub fn detached() -> Self {
        Self {
            field: None,
            viewport: None,
        }
    }
}

impl Annotation for FieldAnnotation {
    fn desired_position(&self, _focused: bool) -> f64 {
        let scroll = self.viewport.as_ref().map_or(0.0, |viewport| viewport.scroll_top());
        self.field
            .as_ref()
            .and_then(|field| field.top())
            .map_or(0.0, |top| top + scroll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_field_position() {
        let field = Rc::new(Cell::new(Some(40.0)));
        let annotation = FieldAnnotation::new(field.clone(), Rc::new(Cell::new(10.0)));
        assert_eq!(annotation.desired_position(false), 50.0);
        assert!(annotation.as_inline().is_none());

        field.set(None);
        assert_eq!(annotation.desired_position(true), 0.0);
        assert_eq!(FieldAnnotation::detached().desired_position(false), 0.0);
    }
}
