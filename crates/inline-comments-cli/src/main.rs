use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use inline_comments_config::Config;
use inline_comments_engine::document::modifiers::{insert_text, remove_backward, split_block};
use inline_comments_engine::{
    BlockKey, CommentActions, CommentStore, CommentableEditor, ContentState, EditorProps,
    EditorState, InlineStyleDef, Measure, MemoryCommentApp, RenderedBlock, SelectionState,
    ToolbarControl,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::io::Stdout;
use std::ops::Range;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};
use std::{env, fs, io::stdout, path::PathBuf, process};

const TICK: Duration = Duration::from_millis(50);

/// Rendered comment anchor. The top is the block's row in the document panel.
type Anchor = Cell<Option<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Left,
    Right,
    Up,
    Down,
}

struct App {
    comments: Rc<MemoryCommentApp>,
    editor: CommentableEditor,
    anchors: Vec<(BlockKey, Weak<Anchor>)>,
    rendered: Vec<RenderedBlock>,
    status: String,
}

impl App {
    fn new(document_path: PathBuf, config: &Config) -> Result<Self> {
        let initial = if document_path.exists() {
            fs::read_to_string(&document_path)
                .with_context(|| format!("Failed to read {}", document_path.display()))?
        } else {
            "null".to_string()
        };

        // comments tagged in the file are treated as already existing
        let comments = Rc::new(MemoryCommentApp::new());
        if !matches!(initial.trim(), "" | "null") {
            for id in ContentState::from_json(&initial)?.comment_ids() {
                comments.add_existing(id, &config.content_path);
            }
        }

        let field = Rc::new(Cell::new(Some(0.0)));
        let props = EditorProps {
            app: comments.clone(),
            content_path: config.content_path.clone(),
            inline_styles: vec![
                InlineStyleDef::new("BOLD", "Bold"),
                InlineStyleDef::new("ITALIC", "Italic"),
            ],
            options: config.editor_options(),
            field: Some(field),
            viewport: Rc::new(Cell::new(0.0)),
        };
        let save_path = document_path.clone();
        let editor = CommentableEditor::new(
            props,
            &initial,
            Box::new(move |payload| {
                fs::write(&save_path, payload)
                    .with_context(|| format!("Failed to write {}", save_path.display()))
            }),
        )?;

        let mut app = Self {
            comments,
            editor,
            anchors: Vec::new(),
            rendered: Vec::new(),
            status: format!("Editing {}", document_path.display()),
        };
        app.render();
        Ok(app)
    }

    fn render(&mut self) {
        let anchors = &mut self.anchors;
        self.rendered = self.editor.render(|block_key, _range: &Range<usize>| {
            let anchor = Rc::new(Cell::new(None));
            anchors.push((block_key.clone(), Rc::downgrade(&anchor)));
            anchor as Rc<dyn Measure>
        });

        // blocks move as lines are added, so every live anchor is re-measured
        let rendered = &self.rendered;
        self.anchors.retain(|(block_key, anchor)| {
            let Some(anchor) = anchor.upgrade() else {
                return false;
            };
            let row = rendered.iter().position(|block| &block.key == block_key);
            anchor.set(row.map(|row| row as f64));
            true
        });
    }

    fn apply(&mut self, state: EditorState) {
        self.editor.on_change(state, Instant::now());
    }

    fn edit<F>(&mut self, modify: F)
    where
        F: FnOnce(
            &ContentState,
            &SelectionState,
        ) -> Result<(ContentState, SelectionState), inline_comments_engine::EditorError>,
    {
        let state = self.editor.editor_state();
        match modify(state.content(), state.selection()) {
            Ok((content, selection)) => {
                let next = state.push(content, selection);
                self.apply(next);
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn move_caret(&mut self, motion: Motion, extend: bool) {
        let state = self.editor.editor_state();
        let selection = move_selection(state.content(), state.selection(), motion, extend);
        let next = state.with_selection(selection);
        self.apply(next);
    }

    fn add_comment(&mut self) {
        self.status = match self.editor.add_comment(Instant::now()) {
            Ok(id) => format!("Added comment {id}"),
            Err(err) => format!("Cannot comment: {err}"),
        };
    }

    fn focus_comment_under_caret(&mut self) {
        let selection = self.editor.editor_state().selection().clone();
        self.status = match self
            .editor
            .click(&selection.focus_key, selection.focus_offset)
        {
            Some(id) => format!("Focused comment {id}"),
            None => "No comment under the caret".to_string(),
        };
    }

    fn delete_focused_comment(&mut self) {
        let Some(id) = self.comments.focused_comment() else {
            self.status = "No comment is focused".to_string();
            return;
        };
        self.comments.remove_comment(id);
        self.status = format!("Deleted comment {id}");
    }

    fn toggle_commenting(&mut self) {
        let enabled = !self.comments.is_enabled();
        self.comments.set_enabled(enabled);
        self.status = format!(
            "Commenting {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    fn toggle_style(&mut self, style: &str) {
        if let Err(err) = self.editor.toggle_inline_style(style, Instant::now()) {
            self.status = err.to_string();
        }
    }

    /// Returns false when the app should quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('k') if ctrl => self.add_comment(),
            KeyCode::Char('o') if ctrl => self.focus_comment_under_caret(),
            KeyCode::Char('d') if ctrl => self.delete_focused_comment(),
            KeyCode::Char('e') if ctrl => self.toggle_commenting(),
            KeyCode::Char('b') if ctrl => self.toggle_style("BOLD"),
            KeyCode::Char('i') if ctrl => self.toggle_style("ITALIC"),
            KeyCode::Char('z') if ctrl => {
                self.editor.undo(now);
            }
            KeyCode::Char('y') if ctrl => {
                self.editor.redo(now);
            }
            KeyCode::Char(c) if !ctrl => {
                let text = c.to_string();
                self.edit(|content, selection| insert_text(content, selection, &text));
            }
            KeyCode::Backspace => self.edit(remove_backward),
            KeyCode::Enter => self.edit(split_block),
            KeyCode::Left => self.move_caret(Motion::Left, shift),
            KeyCode::Right => self.move_caret(Motion::Right, shift),
            KeyCode::Up => self.move_caret(Motion::Up, shift),
            KeyCode::Down => self.move_caret(Motion::Down, shift),
            _ => {}
        }

        // stands in for a subscription to the comment store
        self.editor.sync_comment_state();
        self.render();
        true
    }
}

/// Move the selection focus; without `extend` the selection collapses onto it
fn move_selection(
    content: &ContentState,
    selection: &SelectionState,
    motion: Motion,
    extend: bool,
) -> SelectionState {
    let Some(index) = content.block_index(&selection.focus_key) else {
        return SelectionState::at_start(content);
    };
    let block = &content.blocks[index];
    let offset = selection.focus_offset.min(block.len());

    let (key, offset) = match motion {
        Motion::Left if offset > 0 => (block.key.clone(), offset - 1),
        Motion::Left => match index.checked_sub(1).map(|i| &content.blocks[i]) {
            Some(previous) => (previous.key.clone(), previous.len()),
            None => (block.key.clone(), 0),
        },
        Motion::Right if offset < block.len() => (block.key.clone(), offset + 1),
        Motion::Right => match content.blocks.get(index + 1) {
            Some(next) => (next.key.clone(), 0),
            None => (block.key.clone(), offset),
        },
        Motion::Up => match index.checked_sub(1).map(|i| &content.blocks[i]) {
            Some(previous) => (previous.key.clone(), offset.min(previous.len())),
            None => (block.key.clone(), 0),
        },
        Motion::Down => match content.blocks.get(index + 1) {
            Some(next) => (next.key.clone(), offset.min(next.len())),
            None => (block.key.clone(), block.len()),
        },
    };

    if extend {
        SelectionState::new(
            selection.anchor_key.clone(),
            selection.anchor_offset,
            key,
            offset,
        )
    } else {
        SelectionState::collapsed(key, offset)
    }
}

fn main() -> Result<()> {
    let log_path = env::temp_dir().join("inline-comments-cli.log");
    if let Ok(log_file) = fs::File::create(&log_path) {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .init();
    }

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let document_path = match (args.len(), &config.default_document) {
        (2, _) => PathBuf::from(&args[1]),
        (1, Some(path)) => path.clone(),
        (1, None) => {
            eprintln!("Error: No document provided and no default_document configured");
            eprintln!("Usage: {} <document.json>", args[0]);
            eprintln!("Or set default_document in {}", config_path.display());
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [document.json]", args[0]);
            process::exit(1);
        }
    };
    log::info!("Opening {}", document_path.display());

    let mut app = match App::new(document_path, &config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);
    app.editor.flush();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key)
        {
            return Ok(());
        }
        app.editor.tick(Instant::now());
    }
}

fn segment_style(styles: &BTreeSet<String>, background: Option<&str>) -> Style {
    let mut style = Style::default();
    if styles.contains("BOLD") {
        style = style.add_modifier(Modifier::BOLD);
    }
    if styles.contains("ITALIC") {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if let Some(color) = background.and_then(|hex| hex.parse::<Color>().ok()) {
        style = style.bg(color).fg(Color::White);
    }
    style
}

fn document_lines(rendered: &[RenderedBlock]) -> Vec<Line<'static>> {
    rendered
        .iter()
        .map(|block| {
            let spans: Vec<Span> = block
                .segments
                .iter()
                .map(|segment| {
                    let background = segment
                        .highlight
                        .as_ref()
                        .map(|highlight| highlight.background_color.as_str());
                    Span::styled(
                        segment.text.clone(),
                        segment_style(&segment.styles, background),
                    )
                })
                .collect();
            let line = Line::from(spans);
            if block.block_type.starts_with("header") {
                line.style(Style::default().add_modifier(Modifier::UNDERLINED))
            } else {
                line
            }
        })
        .collect()
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)].as_ref())
        .split(rows[0]);

    let document = Paragraph::new(document_lines(&app.rendered))
        .block(Block::default().borders(Borders::ALL).title("Document"));
    f.render_widget(document, chunks[0]);
    place_cursor(f, app, chunks[0]);

    // Comments panel, ordered by where each comment wants to sit
    let focused = app.comments.focused_comment();
    let pinned = app.comments.pinned_comment();
    let mut comment_items: Vec<(f64, String)> = app
        .comments
        .comments_for_content_path(app.editor.content_path())
        .into_iter()
        .map(|id| {
            let position = app
                .comments
                .annotation(id)
                .map(|annotation| annotation.desired_position(focused == Some(id)))
                .unwrap_or_default();
            let marker = match (focused == Some(id), pinned == Some(id)) {
                (true, true) => "*+",
                (true, false) => "* ",
                _ => "  ",
            };
            (position, format!("{marker}#{id} @ row {position:.0}"))
        })
        .collect();
    comment_items.sort_by(|a, b| a.0.total_cmp(&b.0));
    let items: Vec<ListItem> = comment_items
        .into_iter()
        .map(|(_, text)| ListItem::new(Line::from(text)))
        .collect();
    let title = if app.editor.is_enabled() {
        "Comments"
    } else {
        "Comments (off)"
    };
    let comments = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(comments, chunks[1]);

    let controls: Vec<String> = app
        .editor
        .toolbar_controls()
        .into_iter()
        .map(|control| match control {
            ToolbarControl::InlineStyle(def) => def.label,
            ToolbarControl::AddComment => "Comment (^K)".to_string(),
        })
        .collect();
    let help = vec![
        Line::from(vec![
            Span::styled(controls.join(" | "), Style::default().fg(Color::Cyan)),
            Span::raw(" | ^O focus | ^D delete | ^E toggle | ^Z/^Y undo/redo | Esc quit"),
        ]),
        Line::from(app.status.clone()),
    ];
    f.render_widget(Paragraph::new(help), rows[1]);
}

fn place_cursor(f: &mut Frame, app: &App, area: Rect) {
    let selection = app.editor.editor_state().selection();
    let Some(row) = app
        .rendered
        .iter()
        .position(|block| block.key == selection.focus_key)
    else {
        return;
    };
    if let Some(position) = cursor_position(area, row, selection.focus_offset) {
        f.set_cursor_position(position);
    }
}

/// Terminal cell for the caret inside the bordered editor pane, if visible
fn cursor_position(area: Rect, row: usize, offset: usize) -> Option<Position> {
    let x = u16::try_from(offset)
        .ok()
        .and_then(|offset| (area.x + 1).checked_add(offset))?;
    let y = u16::try_from(row)
        .ok()
        .and_then(|row| (area.y + 1).checked_add(row))?;
    (x < area.right() && y < area.bottom()).then(|| Position::new(x, y))
}
