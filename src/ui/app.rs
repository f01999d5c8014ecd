//! Main TUI application state and logic

use crate::layout::TreeLayout;
use crate::playback::Playback;
use crate::session::Visualization;
use crate::ui::panes::{SourceScrollState, TreeViewport};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Delay between events while auto-playing
const PLAY_INTERVAL: Duration = Duration::from_millis(600);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Tree,
    Source,
    Console,
}

impl FocusedPane {
    /// Move focus to the next pane (tree -> source -> console)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Tree => FocusedPane::Source,
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Tree,
        }
    }
}

/// The main application state
pub struct App {
    pub playback: Playback,
    pub layout: TreeLayout,

    /// Routine text as given, and the rewritten text when there is one
    pub source_code: String,
    pub instrumented_source: Option<String>,
    pub show_instrumented: bool,
    /// 1-based line of the entry routine's declaration, 0 if unknown
    pub declaration_line: usize,

    pub output: Vec<String>,

    pub focused_pane: FocusedPane,
    pub viewport: TreeViewport,
    pub source_scroll: SourceScrollState,
    pub console_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    pub is_playing: bool,
    pub last_play_time: Instant,
}

impl App {
    pub fn new(visualization: Visualization, source_code: String, entry_name: &str) -> Self {
        let Visualization { run, layout } = visualization;
        let declaration_line = crate::instrument::locate_declaration(&source_code, entry_name)
            .map(|decl| source_code[..decl.start].matches('\n').count() + 1)
            .unwrap_or(0);

        App {
            playback: Playback::new(run.trace, entry_name),
            layout,
            source_code,
            instrumented_source: run.instrumented_source,
            show_instrumented: false,
            declaration_line,
            output: run.output,
            focused_pane: FocusedPane::Tree,
            viewport: TreeViewport::new(),
            source_scroll: SourceScrollState::default(),
            console_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                self.tick();
            }

            // Poll with a timeout so auto-play keeps advancing
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// One auto-play step
    pub fn tick(&mut self) {
        if self.playback.step_forward() {
            self.status_message = "Playing...".to_string();
        } else {
            self.is_playing = false;
            self.status_message = "Playback complete".to_string();
        }
        self.last_play_time = Instant::now();
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(main_chunks[0]);

        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        super::panes::render_tree_pane(
            frame,
            columns[0],
            &self.layout,
            &self.playback,
            &self.viewport,
            self.focused_pane == FocusedPane::Tree,
        );

        let (title, text, marked) = match (&self.instrumented_source, self.show_instrumented) {
            (Some(text), true) => ("Instrumented Source", text.as_str(), 0),
            _ => ("Source Code", self.source_code.as_str(), self.declaration_line),
        };
        super::panes::render_source_pane(
            frame,
            right_rows[0],
            title,
            text,
            marked,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_console_pane(
            frame,
            right_rows[1],
            self.playback.narration().as_deref(),
            &self.output,
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.playback.position(),
            self.playback.len(),
            self.is_playing,
        );
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.playback.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Already at the end".to_string()
                };
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.playback.step_back() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the start".to_string()
                };
            }
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                if self.is_playing {
                    if self.playback.at_end() {
                        self.playback.rewind();
                    }
                    self.last_play_time = Instant::now()
                        .checked_sub(PLAY_INTERVAL)
                        .unwrap_or_else(Instant::now);
                    self.status_message = "Playing...".to_string();
                } else {
                    self.status_message = "Paused".to_string();
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.playback.jump_to_end();
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.playback.rewind();
                self.status_message = "Jumped to start".to_string();
            }
            KeyCode::Char('i') => {
                if self.instrumented_source.is_some() {
                    self.show_instrumented = !self.show_instrumented;
                    self.source_scroll = SourceScrollState::default();
                } else {
                    self.status_message = "No instrumented text (run with --strategy rewrite)".to_string();
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.viewport.zoom = (self.viewport.zoom * 1.25).min(16.0);
            }
            KeyCode::Char('-') => {
                self.viewport.zoom = (self.viewport.zoom / 1.25).max(0.25);
            }
            KeyCode::Char('0') => {
                self.viewport = TreeViewport::new();
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.scroll(key.code);
            }
            _ => {}
        }
    }

    fn scroll(&mut self, code: KeyCode) {
        let step = self.layout.config().column_width() / self.viewport.zoom.max(0.1);
        match (self.focused_pane, code) {
            (FocusedPane::Tree, KeyCode::Up) => self.viewport.pan_y -= step,
            (FocusedPane::Tree, KeyCode::Down) => self.viewport.pan_y += step,
            (FocusedPane::Tree, KeyCode::Char('h')) => self.viewport.pan_x -= step,
            (FocusedPane::Tree, KeyCode::Char('l')) => self.viewport.pan_x += step,
            (FocusedPane::Source, KeyCode::Up) => {
                self.source_scroll.offset = self.source_scroll.offset.saturating_sub(1)
            }
            (FocusedPane::Source, KeyCode::Down) => {
                self.source_scroll.offset = self.source_scroll.offset.saturating_add(1)
            }
            (FocusedPane::Console, KeyCode::Up) => {
                self.console_scroll = self.console_scroll.saturating_sub(1)
            }
            (FocusedPane::Console, KeyCode::Down) => {
                self.console_scroll = self.console_scroll.saturating_add(1)
            }
            _ => {}
        }
    }
}
