//! Main TUI application state and logic

use crate::shell::{Session, ShellError};
use crate::ui::panes::{
    render_heap_pane, render_queue_pane, render_script_pane, render_status_bar,
    render_terminal_pane, HeapScrollState, ScriptScrollState, StatusRenderData,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Script,
    Queue,
    Heap,
    Output,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: script -> output -> queue -> heap)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Script => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Queue,
            FocusedPane::Queue => FocusedPane::Heap,
            FocusedPane::Heap => FocusedPane::Script,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Script => FocusedPane::Heap,
            FocusedPane::Output => FocusedPane::Script,
            FocusedPane::Queue => FocusedPane::Output,
            FocusedPane::Heap => FocusedPane::Queue,
        }
    }
}

/// The main application state
pub struct App {
    /// The finished session being replayed
    pub session: Session,

    /// The script the session ran
    pub script: String,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub script_scroll: ScriptScrollState,
    pub queue_scroll: usize,
    pub heap_scroll: HeapScrollState,
    pub output_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create a new app replaying `session` over `script`
    pub fn new(session: Session, script: String) -> Self {
        let long_ago = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);
        App {
            session,
            script,
            focused_pane: FocusedPane::Script,
            script_scroll: ScriptScrollState {
                offset: 0,
                target_line_row: None, // Centered on first render
            },
            queue_scroll: 0,
            heap_scroll: HeapScrollState {
                offset: 0,
                prev_item_count: 0,
            },
            output_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: long_ago,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_secs(1) {
                if self.session.step_forward().is_ok() {
                    self.status_message = "Playing...".to_string();
                    self.output_scroll = usize::MAX;
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps ticking
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

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main_chunks[0]);

        // Left column: Script (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);

        // Right column: Queue (top) | Heap (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        let position = self.session.history_position();
        // A step is an error step if it raised the error count
        let previous_errors = position
            .checked_sub(1)
            .and_then(|p| self.session.snapshot(p))
            .map_or(0, |s| s.error_count);

        if let Some(snapshot) = self.session.current() {
            let is_error = snapshot.error_count > previous_errors;

            render_script_pane(
                frame,
                left_rows[0],
                &self.script,
                snapshot.script_line,
                is_error,
                self.focused_pane == FocusedPane::Script,
                &mut self.script_scroll,
            );

            let output = &self.session.terminal().lines;
            render_terminal_pane(
                frame,
                left_rows[1],
                &output[..snapshot.output_lines.min(output.len())],
                snapshot.script_line,
                self.focused_pane == FocusedPane::Output,
                &mut self.output_scroll,
            );

            render_queue_pane(
                frame,
                right_rows[0],
                snapshot.queue.as_ref(),
                self.focused_pane == FocusedPane::Queue,
                &mut self.queue_scroll,
            );

            render_heap_pane(
                frame,
                right_rows[1],
                &snapshot.heap,
                self.focused_pane == FocusedPane::Heap,
                &mut self.heap_scroll,
            );

            render_status_bar(
                frame,
                main_chunks[1],
                StatusRenderData {
                    message: &self.status_message,
                    current_step: position,
                    total_steps: self.session.total_snapshots(),
                    error_count: snapshot.error_count,
                    is_playing: self.is_playing,
                },
            );
        }
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let stepped = (0..n)
                    .take_while(|_| self.session.step_forward().is_ok())
                    .count();
                self.status_message = format!("Stepped forward {} step(s)", stepped);
                self.output_scroll = usize::MAX;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                let result = self.session.step_backward();
                self.report_step("Stepped backward", result);
            }
            KeyCode::Right => {
                self.is_playing = false;
                let result = self.session.step_forward();
                self.report_step("Stepped forward", result);
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Script => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.script_scroll.target_line_row {
                        self.script_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Queue => {
                    self.queue_scroll = self.queue_scroll.saturating_sub(1);
                }
                FocusedPane::Heap => {
                    self.heap_scroll.offset = self.heap_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Script => {
                    if let Some(row) = self.script_scroll.target_line_row {
                        self.script_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Queue => {
                    self.queue_scroll = self.queue_scroll.saturating_add(1);
                }
                FocusedPane::Heap => {
                    self.heap_scroll.offset = self.heap_scroll.offset.saturating_add(1);
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play (200ms debounce against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(Duration::from_secs(1))
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.session.jump_to_end();
                self.status_message = "Jumped to end".to_string();
                self.output_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.session.rewind_to_start();
                self.status_message = "Jumped to start".to_string();
                self.output_scroll = usize::MAX;
            }
            _ => {}
        }
    }

    fn report_step(&mut self, done: &str, result: Result<(), ShellError>) {
        match result {
            Ok(()) => {
                self.status_message = done.to_string();
                self.output_scroll = usize::MAX;
            }
            Err(ShellError::History { message }) => {
                self.status_message = format!("Cannot step: {}", message);
            }
            Err(e) => {
                self.status_message = format!("Error: {}", e);
            }
        }
    }
}
