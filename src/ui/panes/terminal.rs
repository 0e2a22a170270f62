//! Output pane rendering

use crate::snapshot::TerminalLine;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the shell output pane
///
/// `lines` is the output printed up to the current step. Lines produced by
/// the command on `current_line` are bold; warnings and errors are red.
pub fn render_terminal_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[TerminalLine],
    current_line: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Output ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = lines
        .iter()
        .map(|line| {
            let mut style = if line.text.starts_with("ERROR") || line.text.starts_with("Warning") {
                Style::default().fg(DEFAULT_THEME.error)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            if line.script_line == current_line {
                style = style.add_modifier(Modifier::BOLD);
            }
            ListItem::new(line.text.as_str()).style(style)
        })
        .collect();

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1

    // Clamp scroll offset only if content exceeds visible area
    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
