//! Queue pane rendering: the node chain from head to tail
//!
//! Each node is drawn as its address, its string value, and the address of
//! the string block it owns. `head` and `tail` markers show where the queue's
//! two references point; an arrow between rows stands for the `next` link.

use crate::snapshot::QueueView;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Build the rows for one queue view
fn queue_lines(view: &QueueView) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("0x{:08x}", view.addr),
            Style::default().fg(DEFAULT_THEME.address),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("size {}", view.size),
            Style::default().fg(DEFAULT_THEME.primary),
        ),
    ])];

    if view.nodes.is_empty() {
        lines.push(Line::from(Span::styled(
            "  head = tail = NULL",
            Style::default().fg(DEFAULT_THEME.comment),
        )));
        return lines;
    }

    let last = view.nodes.len() - 1;
    for (i, node) in view.nodes.iter().enumerate() {
        let is_tail = view.tail == Some(node.addr);
        let marker = match (i == 0, is_tail) {
            (true, true) => "head,tail",
            (true, false) => "head",
            (false, true) => "tail",
            (false, false) => "",
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>9} ", marker),
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("0x{:08x}", node.addr),
                Style::default().fg(DEFAULT_THEME.address),
            ),
            Span::raw(" "),
            Span::styled(
                format!("{:?}", node.value),
                Style::default().fg(DEFAULT_THEME.string),
            ),
            Span::styled(
                format!("  str@0x{:08x}", node.value_addr),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
        ]));

        let link = if i == last && view.is_complete() {
            "NULL"
        } else {
            "↓"
        };
        lines.push(Line::from(Span::styled(
            format!("{:>14}", link),
            Style::default().fg(DEFAULT_THEME.comment),
        )));
    }

    if !view.is_complete() {
        let tail = view
            .tail
            .map_or_else(|| "NULL".to_string(), |addr| format!("0x{:08x}", addr));
        lines.push(Line::from(Span::styled(
            format!(
                "  ... {} more nodes, tail = {}",
                view.size.saturating_sub(view.nodes.len()),
                tail
            ),
            Style::default().fg(DEFAULT_THEME.comment),
        )));
        return lines;
    }

    // A tail that points outside the chain is worth shouting about
    if view.tail != view.nodes.last().map(|n| n.addr) {
        lines.push(Line::from(Span::styled(
            "  tail does not reference the last node",
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD),
        )));
    }

    lines
}

/// Render the queue pane
pub fn render_queue_pane(
    frame: &mut Frame,
    area: Rect,
    view: Option<&QueueView>,
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
        .title(" Queue ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines = match view {
        Some(view) => queue_lines(view),
        None => vec![Line::from(Span::styled(
            "q = NULL",
            Style::default().fg(DEFAULT_THEME.comment),
        ))],
    };

    let total_items = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let items: Vec<ListItem> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(ListItem::new)
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
