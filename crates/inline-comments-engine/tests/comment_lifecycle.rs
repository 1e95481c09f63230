use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::ops::Range;
use std::rc::Rc;
use std::time::{Duration, Instant};

use inline_comments_engine::document::modifiers::{insert_text, remove_backward};
use inline_comments_engine::{
    Annotation, BlockKey, CommentActions, CommentId, CommentStore, CommentableEditor, EditorOptions,
    EditorProps, FocusOptions, Measure, MemoryCommentApp, RawContent, SelectionState,
};
use pretty_assertions::assert_eq;

const TWO_PARAGRAPHS: &str = r#"{"blocks":[
    {"key":"a","text":"First paragraph","type":"unstyled"},
    {"key":"b","text":"Second paragraph","type":"unstyled"}
]}"#;

struct Harness {
    app: Rc<MemoryCommentApp>,
    viewport: Rc<Cell<f64>>,
    saves: Rc<RefCell<Vec<String>>>,
    editor: CommentableEditor,
}

fn harness(initial: &str, app: Rc<MemoryCommentApp>) -> Harness {
    let viewport = Rc::new(Cell::new(0.0));
    let saves: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = saves.clone();
    let props = EditorProps {
        app: app.clone(),
        content_path: "body".to_string(),
        inline_styles: Vec::new(),
        options: EditorOptions::default(),
        field: Some(Rc::new(Cell::new(Some(50.0)))),
        viewport: viewport.clone(),
    };
    let editor = CommentableEditor::new(
        props,
        initial,
        Box::new(move |payload| {
            sink.borrow_mut().push(payload);
            Ok(())
        }),
    )
    .unwrap();
    Harness {
        app,
        viewport,
        saves,
        editor,
    }
}

/// Block "a" renders at 100, block "b" at 140
fn anchor_by_block(block: &BlockKey, _: &Range<usize>) -> Rc<dyn Measure> {
    let top = if block.as_str() == "a" { 100.0 } else { 140.0 };
    Rc::new(Cell::new(Some(top)))
}

fn select(h: &mut Harness, selection: SelectionState, now: Instant) {
    let state = h.editor.editor_state().with_selection(selection);
    h.editor.on_change(state, now);
}

#[test]
fn comment_spanning_blocks_floats_beside_its_highlight() {
    let mut h = harness(TWO_PARAGRAPHS, Rc::new(MemoryCommentApp::new()));
    let now = Instant::now();
    select(
        &mut h,
        SelectionState::new(BlockKey::from("a"), 6, BlockKey::from("b"), 6),
        now,
    );

    let id = h.editor.add_comment(now).unwrap();
    let annotation = h.app.annotation(id).unwrap();
    // nothing rendered yet, so the comment sits by the field
    assert_eq!(annotation.desired_position(false), 50.0);

    h.editor.render(anchor_by_block);
    assert_eq!(h.editor.mounted_decorations(), 2);
    assert_eq!(annotation.desired_position(false), 100.0);

    h.viewport.set(20.0);
    assert_eq!(annotation.desired_position(false), 120.0);

    assert_eq!(h.editor.click(&BlockKey::from("b"), 2), Some(id));
    assert_eq!(annotation.desired_position(true), 160.0);
    assert_eq!(annotation.desired_position(false), 120.0);
}

#[test]
fn deleted_comment_is_filtered_and_unmounted() {
    let mut h = harness(TWO_PARAGRAPHS, Rc::new(MemoryCommentApp::new()));
    let now = Instant::now();
    select(&mut h, SelectionState::within(BlockKey::from("a"), 0, 5), now);
    let id = h.editor.add_comment(now).unwrap();
    let annotation = h.app.annotation(id).unwrap();
    h.editor.render(anchor_by_block);
    assert_eq!(annotation.as_inline().unwrap().anchor_count(), 1);

    assert!(h.app.remove_comment(id));
    assert!(h.editor.sync_comment_state());

    assert!(h.editor.editor_state().content().comment_ids().is_empty());
    // selection survives the redecoration
    assert_eq!(
        h.editor.editor_state().selection(),
        &SelectionState::within(BlockKey::from("a"), 0, 5)
    );
    let rendered = h.editor.render(anchor_by_block);
    assert_eq!(h.editor.mounted_decorations(), 0);
    assert_eq!(annotation.as_inline().unwrap().anchor_count(), 0);
    assert!(rendered[0].segments.iter().all(|s| s.highlight.is_none()));
}

#[test]
fn focus_changes_only_redecorate_when_this_field_is_involved() {
    let app = Rc::new(MemoryCommentApp::new());
    app.add_existing(CommentId(1), "body");
    app.add_existing(CommentId(2), "title");
    app.add_existing(CommentId(3), "title");
    let mut h = harness(TWO_PARAGRAPHS, app);
    fn focus(app: &MemoryCommentApp, id: Option<u64>) {
        app.set_focused_comment(
            id.map(CommentId),
            FocusOptions {
                update_pinned_comment: false,
            },
        );
    }

    focus(&h.app, Some(2));
    assert!(!h.editor.sync_comment_state());
    focus(&h.app, Some(3));
    assert!(!h.editor.sync_comment_state());

    focus(&h.app, Some(1));
    assert!(h.editor.sync_comment_state());
    // focus leaving this field's comment for another field's comment
    focus(&h.app, Some(2));
    assert!(h.editor.sync_comment_state());

    focus(&h.app, None);
    assert!(!h.editor.sync_comment_state());

    h.app.set_enabled(false);
    assert!(h.editor.sync_comment_state());
    assert_eq!(h.editor.decoration_epoch(), 3);
}

#[test]
fn render_keeps_surviving_decorations_mounted() {
    let app = Rc::new(MemoryCommentApp::new());
    app.add_existing(CommentId(1), "body");
    let doc = r#"{"blocks":[{"key":"a","text":"Hello world","inlineStyleRanges":[{"offset":0,"length":11,"style":"COMMENT-1"}]}]}"#;
    let mut h = harness(doc, app);
    let mounts = Cell::new(0);
    let mut counting = |block: &BlockKey, range: &Range<usize>| {
        mounts.set(mounts.get() + 1);
        anchor_by_block(block, range)
    };

    h.editor.render(&mut counting);
    h.editor.render(&mut counting);
    assert_eq!(mounts.get(), 1);

    // bold in the middle splits the comment range in three
    let now = Instant::now();
    select(&mut h, SelectionState::within(BlockKey::from("a"), 4, 7), now);
    h.editor.toggle_inline_style("BOLD", now).unwrap();
    h.editor.render(&mut counting);
    assert_eq!(mounts.get(), 4);
    assert_eq!(h.editor.mounted_decorations(), 3);

    let annotation = h.app.annotation(CommentId(1)).unwrap();
    assert_eq!(annotation.as_inline().unwrap().anchor_count(), 3);
}

#[test]
fn undo_removes_the_highlight_but_not_the_comment() {
    let mut h = harness(TWO_PARAGRAPHS, Rc::new(MemoryCommentApp::new()));
    let now = Instant::now();
    select(&mut h, SelectionState::within(BlockKey::from("b"), 0, 6), now);
    let id = h.editor.add_comment(now).unwrap();

    assert!(h.editor.undo(now));
    assert!(h.editor.editor_state().content().comment_ids().is_empty());
    assert_eq!(h.app.comments_for_content_path("body"), vec![id]);

    assert!(h.editor.redo(now));
    assert_eq!(
        h.editor.editor_state().content().comment_ids(),
        [id].into_iter().collect::<BTreeSet<_>>()
    );
}

#[test]
fn saved_payload_reloads_without_comments() {
    let app = Rc::new(MemoryCommentApp::new());
    app.add_existing(CommentId(4), "body");
    let doc = r#"{"blocks":[{"key":"a","text":"Hello world","inlineStyleRanges":[
        {"offset":0,"length":5,"style":"BOLD"},
        {"offset":3,"length":5,"style":"COMMENT-4"}
    ]}]}"#;
    let mut h = harness(doc, app.clone());
    let start = Instant::now();
    select(&mut h, SelectionState::within(BlockKey::from("a"), 6, 11), start);
    h.editor.toggle_inline_style("ITALIC", start).unwrap();
    assert!(h.editor.flush());
    assert!(!h.editor.flush());

    let payload = h.saves.borrow()[0].clone();
    let raw: RawContent = serde_json::from_str(&payload).unwrap();
    let styles: Vec<&str> = raw.blocks[0]
        .inline_style_ranges
        .iter()
        .map(|range| range.style.as_str())
        .collect();
    assert_eq!(styles, vec!["BOLD", "ITALIC"]);

    let reloaded = harness(&payload, app);
    assert!(reloaded.editor.editor_state().content().comment_ids().is_empty());
}

#[test]
fn emptied_document_saves_null() {
    let mut h = harness("null", Rc::new(MemoryCommentApp::new()));
    let start = Instant::now();

    let state = h.editor.editor_state().clone();
    let (content, caret) = insert_text(state.content(), state.selection(), "hi").unwrap();
    h.editor.on_change(state.push(content, caret), start);
    assert!(h.editor.tick(start + Duration::from_millis(250)));

    let state = h.editor.editor_state().clone();
    let (content, caret) = remove_backward(state.content(), state.selection()).unwrap();
    let state = state.push(content, caret);
    let (content, caret) = remove_backward(state.content(), state.selection()).unwrap();
    h.editor.on_change(state.push(content, caret), start + Duration::from_secs(1));
    assert!(h.editor.tick(start + Duration::from_secs(2)));

    let saves = h.saves.borrow();
    assert_eq!(saves.len(), 2);
    assert!(saves[0].contains("\"text\":\"hi\""));
    assert_eq!(saves[1], "null");
}
