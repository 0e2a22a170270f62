//! Command shell that drives a queue and records its history
//!
//! A [`Session`] owns an allocation ledger and a queue slot. The slot starts
//! empty, so commands can exercise the absent-queue contract before `new`.
//! Every executed command appends a [`Snapshot`] so the session can be
//! replayed step by step afterwards.
//!
//! Queue failures (allocation refused, removal from an empty queue, a wrong
//! expected value) are printed to the session terminal and counted in
//! [`Session::error_count`]; they never abort a script.

pub mod command;
pub mod errors;

pub use command::{parse_line, Command, COMMANDS};
pub use errors::ShellError;

use crate::constants::{MAX_STRING, SNAPSHOT_BLOCK_WINDOW, SNAPSHOT_NODE_WINDOW};
use crate::memory::heap::Heap;
use crate::queue::{compare_ignore_case, Queue, QueueSlot};
use crate::snapshot::{HeapView, MockTerminal, QueueView, Snapshot, SnapshotManager};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Number of elements `show` prints before eliding the rest
const SHOW_LIMIT: usize = 50;

/// Whether the script should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    heap: Heap,
    queue: Option<Queue>,
    terminal: MockTerminal,
    error_count: usize,
    history: SnapshotManager,
    history_position: usize,
    /// A snapshot was refused and the error was already reported
    history_full: bool,
    current_line: usize,
}

impl Session {
    /// Create a session over `heap`, recording the initial empty state
    pub fn new(heap: Heap, snapshot_limit: usize) -> Result<Self, ShellError> {
        let mut session = Session {
            heap,
            queue: None,
            terminal: MockTerminal::new(),
            error_count: 0,
            history: SnapshotManager::new(snapshot_limit),
            history_position: 0,
            history_full: false,
            current_line: 0,
        };
        let initial = session.capture();
        session
            .history
            .push(initial)
            .map_err(|message| ShellError::History { message })?;
        Ok(session)
    }

    /// Run every line of a script, then tear down whatever queue is left
    pub fn run_script(&mut self, source: &str) {
        info!(lines = source.lines().count(), "running script");

        let mut last_line = 0;
        for (idx, text) in source.lines().enumerate() {
            let line = idx + 1;
            last_line = line;
            let command = match parse_line(text, line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    self.current_line = line;
                    self.report_error(format!("ERROR: {}", e));
                    self.take_snapshot();
                    continue;
                }
            };

            if self.execute(&command, line) == Flow::Quit {
                break;
            }
        }

        self.finish(last_line);
    }

    /// Execute one command and record a snapshot
    pub fn execute(&mut self, command: &Command, line: usize) -> Flow {
        debug!(line, ?command, "execute");
        self.current_line = line;

        let flow = match command {
            Command::New => {
                self.do_new();
                Flow::Continue
            }
            Command::Free => {
                self.do_free();
                Flow::Continue
            }
            Command::InsertHead { value, count } => {
                self.do_insert(value, *count, true);
                Flow::Continue
            }
            Command::InsertTail { value, count } => {
                self.do_insert(value, *count, false);
                Flow::Continue
            }
            Command::RemoveHead { expected } => {
                self.do_remove(expected.as_deref(), true);
                Flow::Continue
            }
            Command::RemoveHeadQuiet => {
                self.do_remove(None, false);
                Flow::Continue
            }
            Command::Size { expected } => {
                self.do_size(*expected);
                Flow::Continue
            }
            Command::Reverse => {
                if self.queue.is_none() {
                    self.report_error("Warning: Calling reverse on null queue");
                }
                self.queue.reverse();
                self.check_queue();
                self.show();
                Flow::Continue
            }
            Command::Sort => {
                self.do_sort();
                Flow::Continue
            }
            Command::Show => {
                self.show();
                Flow::Continue
            }
            Command::Fail { after } => {
                self.heap.fail_after(*after);
                self.print(format!(
                    "Next {} allocation(s) succeed, then one fails",
                    after
                ));
                Flow::Continue
            }
            Command::Help => {
                for (name, args, doc) in COMMANDS {
                    self.print(format!("  {:<8}{:<10}| {}", name, args, doc));
                }
                Flow::Continue
            }
            Command::Quit => Flow::Quit,
        };

        self.take_snapshot();
        flow
    }

    /// Free any remaining queue and check the ledger for leaks
    pub fn finish(&mut self, line: usize) {
        self.current_line = line;
        if self.queue.is_some() {
            self.print("Freeing queue");
            self.queue.free(&mut self.heap);
        }
        self.heap.clear_fault();
        self.check_leaks();
        self.take_snapshot();
        info!(
            errors = self.error_count,
            evicted = self.history.evicted(),
            "script finished"
        );
    }

    fn do_new(&mut self) {
        if self.queue.is_some() {
            self.queue.free(&mut self.heap);
        }
        match Queue::new(&mut self.heap) {
            Ok(q) => self.queue = Some(q),
            Err(e) => self.report_error(format!("ERROR: Could not allocate queue: {}", e)),
        }
        self.show();
    }

    fn do_free(&mut self) {
        self.queue.free(&mut self.heap);
        self.show();
        self.check_leaks();
    }

    fn do_insert(&mut self, value: &str, count: usize, at_head: bool) {
        let label = if at_head { "insert head" } else { "insert tail" };
        if self.queue.is_none() {
            self.report_error(format!("Warning: Calling {} on null queue", label));
        }

        for _ in 0..count {
            let result = if at_head {
                self.queue.insert_head(&mut self.heap, value)
            } else {
                self.queue.insert_tail(&mut self.heap, value)
            };
            if let Err(e) = result {
                if self.queue.is_some() {
                    self.report_error(format!("ERROR: {} of '{}' failed: {}", label, value, e));
                }
                break;
            }
        }

        self.check_queue();
        self.show();
    }

    fn do_remove(&mut self, expected: Option<&str>, report: bool) {
        if self.queue.is_none() {
            self.report_error("Warning: Calling remove head on null queue");
            self.show();
            return;
        }

        let mut buf = [0u8; MAX_STRING];
        let out = if report { Some(&mut buf[..]) } else { None };
        match self.queue.remove_head(&mut self.heap, out) {
            Some(removed) => {
                if report {
                    let copied = &buf[..removed.copied];
                    let value = String::from_utf8_lossy(copied).into_owned();
                    self.print(format!("Removed {} from queue", value));
                    if let Some(expected) = expected {
                        // Compare what the buffer could hold, byte for byte
                        let expected_bytes = expected.as_bytes();
                        let wanted = &expected_bytes[..expected_bytes.len().min(MAX_STRING - 1)];
                        if copied != wanted {
                            self.report_error(format!(
                                "ERROR: Removed value {} != expected value {}",
                                value, expected
                            ));
                        }
                    }
                } else {
                    self.print("Removed element from queue");
                }
            }
            None => self.report_error("ERROR: Failed to remove from empty queue"),
        }

        self.check_queue();
        self.show();
    }

    fn do_size(&mut self, expected: Option<usize>) {
        if self.queue.is_none() {
            self.report_error("Warning: Calling size on null queue");
        }
        let size = self.queue.size();
        self.print(format!("Queue size = {}", size));
        if let Some(expected) = expected {
            if size != expected {
                self.report_error(format!(
                    "ERROR: Computed queue size as {}, but correct value is {}",
                    size, expected
                ));
            }
        }
    }

    fn do_sort(&mut self) {
        if self.queue.is_none() {
            self.report_error("Warning: Calling sort on null queue");
        }
        self.queue.sort();
        self.check_queue();

        let unsorted = self.queue.as_ref().is_some_and(|q| {
            let values: Vec<String> = q.chain().map(|n| n.value).collect();
            values
                .windows(2)
                .any(|w| compare_ignore_case(&w[0], &w[1]) == Ordering::Greater)
        });
        if unsorted {
            self.report_error("ERROR: Not sorted in ascending order");
        }
        self.show();
    }

    /// Print `q = [...]` or `q = NULL`
    fn show(&mut self) {
        let text = match &self.queue {
            None => "q = NULL".to_string(),
            Some(q) => {
                let shown: Vec<String> = q.chain().take(SHOW_LIMIT).map(|n| n.value).collect();
                let more = if q.size() > SHOW_LIMIT { " ..." } else { "" };
                format!("q = [{}{}]", shown.join(" "), more)
            }
        };
        self.print(text);
    }

    fn check_queue(&mut self) {
        let problem = self.queue.as_ref().and_then(|q| q.check_invariants().err());
        if let Some(problem) = problem {
            self.report_error(format!("ERROR: Queue invariant violated: {}", problem));
        }
    }

    fn check_leaks(&mut self) {
        if self.queue.is_some() {
            return;
        }
        let live = self.heap.live_blocks();
        if live > 0 {
            self.report_error(format!(
                "ERROR: Freed queue, but {} blocks are still allocated",
                live
            ));
        }
    }

    fn print(&mut self, text: impl Into<String>) {
        self.terminal.println(text, self.current_line);
    }

    /// Print a warning or error and count it
    fn report_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        warn!(line = self.current_line, "{}", text);
        self.error_count += 1;
        self.print(text);
    }

    fn capture(&self) -> Snapshot {
        Snapshot {
            queue: self
                .queue
                .as_ref()
                .map(|q| QueueView::capture_window(q, SNAPSHOT_NODE_WINDOW)),
            heap: HeapView::capture(&self.heap, SNAPSHOT_BLOCK_WINDOW),
            output_lines: self.terminal.lines.len(),
            script_line: self.current_line,
            error_count: self.error_count,
        }
    }

    /// Record the state after a command; a refused snapshot is reported once
    fn take_snapshot(&mut self) {
        let snapshot = self.capture();
        match self.history.push(snapshot) {
            Ok(()) => self.history_position = self.history.len() - 1,
            Err(message) if self.history_full => {
                debug!(line = self.current_line, "snapshot skipped: {}", message);
            }
            Err(message) => {
                self.history_full = true;
                self.report_error(format!("ERROR: history: {}", message));
            }
        }
    }

    // ========== Replay ==========

    /// Snapshot at the current replay position
    pub fn current(&self) -> Option<&Snapshot> {
        self.history.get(self.history_position)
    }

    /// Snapshot at an arbitrary history index
    pub fn snapshot(&self, index: usize) -> Option<&Snapshot> {
        self.history.get(index)
    }

    pub fn step_forward(&mut self) -> Result<(), ShellError> {
        if self.history_position + 1 >= self.history.len() {
            return Err(ShellError::History {
                message: "already at the end of the session".to_string(),
            });
        }
        self.history_position += 1;
        Ok(())
    }

    pub fn step_backward(&mut self) -> Result<(), ShellError> {
        if self.history_position == 0 {
            return Err(ShellError::History {
                message: "already at the beginning of the session".to_string(),
            });
        }
        self.history_position -= 1;
        Ok(())
    }

    pub fn rewind_to_start(&mut self) {
        self.history_position = 0;
    }

    pub fn jump_to_end(&mut self) {
        self.history_position = self.history.len().saturating_sub(1);
    }

    pub fn history_position(&self) -> usize {
        self.history_position
    }

    pub fn total_snapshots(&self) -> usize {
        self.history.len()
    }

    /// Snapshots dropped from the front of the history to respect its limit
    pub fn evicted_snapshots(&self) -> usize {
        self.history.evicted()
    }

    // ========== Live state ==========

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn terminal(&self) -> &MockTerminal {
        &self.terminal
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn queue(&self) -> Option<&Queue> {
        self.queue.as_ref()
    }
}
