//! Script pane rendering with command highlighting
//!
//! Displays the command script being replayed, one numbered line per script
//! line, with the line that produced the current snapshot highlighted. Lines
//! whose command reported an error are drawn on a red background.

use crate::shell::COMMANDS;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Highlight one script line: command name, quoted strings, counts, comments
fn highlight_command(line: &str) -> Line<'_> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return Line::from(Span::styled(line, Style::default().fg(DEFAULT_THEME.comment)));
    }

    let mut spans = Vec::new();
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;
    let mut seen_command = false;

    while i < chars.len() {
        let (start, c) = chars[i];

        if c.is_whitespace() {
            spans.push(Span::raw(c.to_string()));
            i += 1;
            continue;
        }

        // Find the end of the token, treating a quoted run as one token
        let mut end_idx = i;
        if c == '"' {
            end_idx += 1;
            while end_idx < chars.len() && chars[end_idx].1 != '"' {
                if chars[end_idx].1 == '\\' {
                    end_idx += 1;
                }
                end_idx += 1;
            }
            end_idx = (end_idx + 1).min(chars.len());
        } else {
            while end_idx < chars.len() && !chars[end_idx].1.is_whitespace() {
                end_idx += 1;
            }
        }
        let end = chars.get(end_idx).map_or(line.len(), |(pos, _)| *pos);
        let token = &line[start..end];

        let style = if !seen_command {
            seen_command = true;
            if COMMANDS.iter().any(|(name, _, _)| *name == token) {
                Style::default()
                    .fg(DEFAULT_THEME.keyword)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.error)
            }
        } else if token.starts_with('"') {
            Style::default().fg(DEFAULT_THEME.string)
        } else if token.chars().all(|c| c.is_ascii_digit()) {
            Style::default().fg(DEFAULT_THEME.number)
        } else {
            Style::default().fg(DEFAULT_THEME.fg)
        };

        spans.push(Span::styled(token, style));
        i = end_idx;
    }

    Line::from(spans)
}

/// Scroll state for the script pane
pub struct ScriptScrollState {
    pub offset: usize,
    pub target_line_row: Option<usize>,
}

/// Render the script pane
pub fn render_script_pane(
    frame: &mut Frame,
    area: Rect,
    script: &str,
    current_line: usize,
    is_error: bool,
    is_focused: bool,
    scroll_state: &mut ScriptScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Script ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = script.lines().collect();
    let total_lines = lines.len();

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1

    // Keep the current line at a fixed visual row; start centered
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if current_line > 0 && current_line <= total_lines {
        scroll_state.offset = (current_line - 1).saturating_sub(target_row);
    }
    if total_lines > visible_height {
        scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
    } else {
        scroll_state.offset = 0;
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;

            let (num_style, content_base_style) = if is_current && is_error {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Style::default()
                        .bg(DEFAULT_THEME.error)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            } else if is_current {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Style::default().bg(DEFAULT_THEME.current_line_bg),
                )
            } else {
                (Style::default().fg(DEFAULT_THEME.comment), Style::default())
            };

            let mut content_line = highlight_command(line);
            if is_current && is_error {
                for span in &mut content_line.spans {
                    span.style = content_base_style;
                }
            } else if is_current {
                for span in &mut content_line.spans {
                    span.style = span.style.patch(content_base_style);
                }
            }

            let marker = if is_current { "▶" } else { " " };
            let mut spans = vec![Span::styled(format!("{:4}{} ", line_num, marker), num_style)];
            spans.extend(content_line.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}
