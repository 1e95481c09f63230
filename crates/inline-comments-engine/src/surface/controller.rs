use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::rc::Rc;
use std::time::Instant;

use crate::annotation::{InlineAnnotation, Measure, Viewport};
use crate::comments::{CommentApp, CommentId, CommentSlice, comment_style};
use crate::decoration::{CommentDecoration, DecorationKey, HighlightStyle, comment_highlight};
use crate::document::modifiers::{apply_inline_style, toggle_inline_style};
use crate::document::{BlockKey, ContentState, EditorState};
use crate::error::EditorError;
use crate::surface::debounce::Debouncer;
use crate::surface::options::{EditorOptions, EditorProps, InlineStyleDef, SaveCallback, ToolbarControl};
use crate::surface::persistence::{filter_comment_styles, serialise_for_save};
use crate::surface::render::RenderedBlock;

/// Editable rich-text surface with comment highlighting.
///
/// Owns the editor state and keeps its comment styles in line with the
/// external comment application:
///
/// - **Edits** arrive through [`CommentableEditor::on_change`] and are saved
///   through the save callback once no edit has happened for the debounce
///   delay ([`CommentableEditor::tick`] drives the clock).
/// - **Comment state** is re-read by [`CommentableEditor::sync_comment_state`]
///   whenever the comment store changes. If anything relevant to this field
///   moved, stale comment styles are filtered out and the decoration epoch
///   is bumped so the host knows to render again.
/// - **Rendering** through [`CommentableEditor::render`] reconciles comment
///   decorations: anchors stay registered for decorations that survive,
///   and are deregistered for ones that disappear.
pub struct CommentableEditor {
    app: Rc<dyn CommentApp>,
    content_path: String,
    inline_styles: Vec<InlineStyleDef>,
    options: EditorOptions,
    field: Option<Rc<dyn Measure>>,
    viewport: Rc<dyn Viewport>,
    editor_state: EditorState,
    on_save: SaveCallback,
    save_debounce: Debouncer,
    slice: CommentSlice,
    decorations: Vec<CommentDecoration>,
    decoration_epoch: u64,
}

impl CommentableEditor {
    /// `initial` is the raw JSON document; empty input or `null` starts a blank document
    pub fn new(props: EditorProps, initial: &str, on_save: SaveCallback) -> Result<Self, EditorError> {
        let content = match initial.trim() {
            "" | "null" => ContentState::empty(),
            json => ContentState::from_json(json)?,
        };

        let EditorProps {
            app,
            content_path,
            inline_styles,
            options,
            field,
            viewport,
        } = props;

        let slice = CommentSlice::read(&*app, &content_path);
        let content = filter_comment_styles(&content, &slice.ids);

        // comments that arrived with the document need an annotation to float beside
        for id in content.comment_ids() {
            if app.annotation(id).is_none() {
                let annotation = InlineAnnotation::new(field.clone(), viewport.clone());
                app.update_annotation(Rc::new(annotation), id);
            }
        }

        let save_debounce = Debouncer::new(options.persist_debounce);
        Ok(Self {
            app,
            content_path,
            inline_styles,
            options,
            field,
            viewport,
            editor_state: EditorState::new(content),
            on_save,
            save_debounce,
            slice,
            decorations: Vec::new(),
            decoration_epoch: 0,
        })
    }

    pub fn editor_state(&self) -> &EditorState {
        &self.editor_state
    }

    pub fn content_path(&self) -> &str {
        &self.content_path
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn is_enabled(&self) -> bool {
        self.slice.enabled
    }

    pub fn focused_comment(&self) -> Option<CommentId> {
        self.slice.focused
    }

    /// Bumped every time comment state forces a redecoration
    pub fn decoration_epoch(&self) -> u64 {
        self.decoration_epoch
    }

    pub fn has_pending_save(&self) -> bool {
        self.save_debounce.is_pending()
    }

    /// Accept a new editor state from the host. Content changes (re)start the
    /// save debounce; selection-only changes do not.
    pub fn on_change(&mut self, editor_state: EditorState, now: Instant) {
        let content_changed = editor_state.content() != self.editor_state.content();
        self.editor_state = editor_state;
        if content_changed {
            self.save_debounce.schedule(now);
        }
    }

    /// Run a pending save whose debounce has elapsed. Returns whether a save ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.save_debounce.take_due(now) {
            return false;
        }
        self.persist();
        true
    }

    /// Save right away if a save is pending
    pub fn flush(&mut self) -> bool {
        if !self.save_debounce.is_pending() {
            return false;
        }
        self.save_debounce.cancel();
        self.persist();
        true
    }

    fn persist(&mut self) {
        let payload = match serialise_for_save(self.editor_state.content()) {
            Ok(payload) => payload,
            Err(err) => {
                log::error!("Failed to serialise '{}': {err}", self.content_path);
                return;
            }
        };
        if let Err(err) = (self.on_save)(payload) {
            log::error!("Saving '{}' failed: {err:#}", self.content_path);
        }
    }

    /// Controls for the toolbar; the comment control only while commenting is on
    pub fn toolbar_controls(&self) -> Vec<ToolbarControl> {
        let mut controls: Vec<ToolbarControl> = self
            .inline_styles
            .iter()
            .cloned()
            .map(ToolbarControl::InlineStyle)
            .collect();
        if self.slice.enabled {
            controls.push(ToolbarControl::AddComment);
        }
        controls
    }

    /// Start a comment on the current selection: registers a new inline
    /// annotation with the comment app and tags the selection with the new
    /// comment's style as an undoable edit.
    pub fn add_comment(&mut self, now: Instant) -> Result<CommentId, EditorError> {
        if !self.slice.enabled {
            return Err(EditorError::CommentingDisabled);
        }
        let selection = self.editor_state.selection().clone();
        if selection.resolve(self.editor_state.content())?.is_collapsed() {
            return Err(EditorError::EmptySelection);
        }

        let annotation = Rc::new(InlineAnnotation::new(
            self.field.clone(),
            self.viewport.clone(),
        ));
        let id = self.app.make_comment(annotation, &self.content_path);

        let content = apply_inline_style(self.editor_state.content(), &selection, &comment_style(id))?;
        let next = self.editor_state.push(content, selection);
        self.on_change(next, now);
        self.sync_comment_state();
        log::debug!("Added comment {id} to '{}'", self.content_path);
        Ok(id)
    }

    pub fn toggle_inline_style(&mut self, style: &str, now: Instant) -> Result<(), EditorError> {
        let next = toggle_inline_style(&self.editor_state, style)?;
        self.on_change(next, now);
        Ok(())
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        match self.editor_state.undo() {
            Some(previous) => {
                self.on_change(previous, now);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        match self.editor_state.redo() {
            Some(next) => {
                self.on_change(next, now);
                true
            }
            None => false,
        }
    }

    /// Re-read this field's slice of the comment store. When it changed in a
    /// way that affects decoration, filter out styles of comments that no
    /// longer exist (keeping selection and history) and bump the decoration
    /// epoch. Returns whether a redecoration was triggered.
    pub fn sync_comment_state(&mut self) -> bool {
        let next = CommentSlice::read(&*self.app, &self.content_path);
        let redecorate = self.slice.requires_redecoration(&next);
        self.slice = next;
        if !redecorate {
            return false;
        }

        let content = filter_comment_styles(self.editor_state.content(), &self.slice.ids);
        if &content != self.editor_state.content() {
            self.editor_state = self.editor_state.replace_content(content);
        }
        if !self.slice.enabled {
            self.decorations.clear();
        }
        self.decoration_epoch += 1;
        log::debug!(
            "Redecorating '{}' (epoch {})",
            self.content_path,
            self.decoration_epoch
        );
        true
    }

    /// Custom style for a set of styles. Nothing while commenting is off.
    pub fn style_for(&self, styles: &BTreeSet<String>) -> Option<HighlightStyle> {
        if !self.slice.enabled {
            return None;
        }
        comment_highlight(styles, self.slice.focused, &self.options.palette)
    }

    /// Build the view of every block and reconcile decorations.
    ///
    /// `anchor_for` is asked for an element handle for each decoration that
    /// is new in this render; surviving decorations keep their handle.
    pub fn render(
        &mut self,
        mut anchor_for: impl FnMut(&BlockKey, &Range<usize>) -> Rc<dyn Measure>,
    ) -> Vec<RenderedBlock> {
        let enabled = self.slice.enabled;
        let mut previous: HashMap<DecorationKey, CommentDecoration> = self
            .decorations
            .drain(..)
            .map(|decoration| (decoration.key().clone(), decoration))
            .collect();

        let mut rendered = Vec::with_capacity(self.editor_state.content().blocks.len());
        let mut decorations = Vec::new();
        for block in &self.editor_state.content().blocks {
            let block_decorations: Vec<CommentDecoration> = if enabled {
                CommentDecoration::for_block(block)
                    .into_iter()
                    .map(|fresh| match previous.remove(fresh.key()) {
                        Some(kept) => kept,
                        None => {
                            let mut fresh = fresh;
                            fresh.mount(&*self.app, anchor_for(fresh.block_key(), fresh.range()));
                            fresh
                        }
                    })
                    .collect()
            } else {
                Vec::new()
            };

            rendered.push(RenderedBlock::build(block, &block_decorations, |styles| {
                self.style_for(styles)
            }));
            decorations.extend(block_decorations);
        }

        // dropping what is left unmounts decorations that vanished
        drop(previous);
        self.decorations = decorations;
        rendered
    }

    /// Comment of the decoration covering `offset` in a block
    pub fn comment_at(&self, block_key: &BlockKey, offset: usize) -> Option<CommentId> {
        self.decorations
            .iter()
            .find(|decoration| decoration.contains(block_key, offset))
            .and_then(CommentDecoration::comment_id)
    }

    /// Click on the decoration covering `offset`: focuses and pins its comment
    pub fn click(&mut self, block_key: &BlockKey, offset: usize) -> Option<CommentId> {
        let id = self
            .decorations
            .iter()
            .find(|decoration| decoration.contains(block_key, offset))
            .and_then(|decoration| decoration.click(&*self.app))?;
        self.sync_comment_state();
        Some(id)
    }

    /// Number of decorations currently registered with annotations
    pub fn mounted_decorations(&self) -> usize {
        self.decorations
            .iter()
            .filter(|decoration| decoration.is_mounted())
            .count()
    }

    /// Tear down: cancels a pending save and deregisters every anchor
    pub fn unmount(&mut self) {
        self.save_debounce.cancel();
        self.decorations.clear();
    }
}

impl Drop for CommentableEditor {
    fn drop(&mut self) {
        self.unmount();
    }
}
