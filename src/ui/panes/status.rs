//! Status bar rendering with keybindings and replay state

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Data shown in the status bar
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub current_step: usize,
    pub total_steps: usize,
    pub error_count: usize,
    pub is_playing: bool,
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Left side: step info, error count, message
    let has_errors = data.error_count > 0;
    let left_spans = vec![
        Span::styled(
            format!(" Step {}/{} ", data.current_step + 1, data.total_steps),
            Style::default()
                .bg(if has_errors {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.primary
                })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} error(s) ", data.error_count),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(if has_errors {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.success
                }),
        ),
        Span::styled(
            "|",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!(" {} ", data.message),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.fg),
        ),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    // Right side: keybinds
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let mut right_spans = vec![
        Span::styled(" ←/→ ", key_style),
        Span::styled(" step ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵ / ⌫ ", key_style),
        Span::styled(" end/start ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" q ", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let is_at_start = data.current_step == 0;
    let is_at_end = data.current_step + 1 >= data.total_steps;
    let badge = if data.is_playing {
        Some((" ▶ PLAYING ", DEFAULT_THEME.secondary))
    } else if is_at_end {
        Some((" END ", DEFAULT_THEME.error))
    } else if is_at_start {
        Some((" START ", DEFAULT_THEME.success))
    } else {
        None
    };

    if let Some((text, color)) = badge {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            text,
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
