//! Heap pane rendering with the allocation ledger
//!
//! Shows the most recent blocks the queue has obtained, ordered by address.
//! Live blocks are drawn normally; freed blocks stay listed as tombstones so a
//! release can be seen happening when stepping through the session.

use crate::memory::heap::BlockState;
use crate::snapshot::HeapView;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Scroll state for the heap pane
pub struct HeapScrollState {
    pub offset: usize,
    pub prev_item_count: usize,
}

/// Render the heap pane
pub fn render_heap_pane(
    frame: &mut Frame,
    area: Rect,
    heap: &HeapView,
    is_focused: bool,
    scroll_state: &mut HeapScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let title = format!(
        " Heap | {} live, {} bytes | {} alloc / {} free ",
        heap.live_blocks, heap.live_bytes, heap.total_allocations, heap.total_frees
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut all_items = Vec::new();
    if heap.omitted > 0 {
        all_items.push(
            ListItem::new(format!("... {} older blocks", heap.omitted))
                .style(Style::default().fg(DEFAULT_THEME.comment)),
        );
    }
    if heap.blocks.is_empty() && heap.omitted == 0 {
        all_items.push(
            ListItem::new("(no allocations)").style(Style::default().fg(DEFAULT_THEME.comment)),
        );
    }

    for (addr, block) in &heap.blocks {
        let freed = block.state == BlockState::Tombstone;
        let (addr_style, size_style, kind_style) = if freed {
            let grey = Style::default()
                .fg(DEFAULT_THEME.comment)
                .add_modifier(Modifier::CROSSED_OUT);
            (grey, grey, grey)
        } else {
            (
                Style::default().fg(DEFAULT_THEME.address),
                Style::default().fg(DEFAULT_THEME.primary),
                Style::default().fg(DEFAULT_THEME.type_name),
            )
        };

        let mut spans = vec![
            Span::styled(format!("0x{:08x}", addr), addr_style),
            Span::raw(" | "),
            Span::styled(format!("{:>4} bytes", block.size), size_style),
            Span::raw("  "),
            Span::styled(block.kind.to_string(), kind_style),
        ];
        if freed {
            spans.push(Span::styled(
                "  (freed)",
                Style::default().fg(DEFAULT_THEME.error),
            ));
        }
        all_items.push(ListItem::new(Line::from(spans)));
    }

    if heap.fault_armed {
        all_items.push(
            ListItem::new("fault injection armed")
                .style(Style::default().fg(DEFAULT_THEME.secondary)),
        );
    }

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // Follow new allocations as they appear
    if total_items > scroll_state.prev_item_count && total_items > visible_height {
        scroll_state.offset = total_items - visible_height;
    }
    scroll_state.prev_item_count = total_items;

    if total_items > visible_height {
        scroll_state.offset = scroll_state.offset.min(total_items - visible_height);
    } else {
        scroll_state.offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
