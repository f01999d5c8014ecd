//! Narration and console output pane

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding},
    Frame,
};

/// Render the narration line for the current event followed by the routine's
/// captured `console.log` output.
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    narration: Option<&str>,
    output: &[String],
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
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style)
        .padding(Padding::new(1, 0, 0, 0));

    let mut items = vec![ListItem::new(Line::from(match narration {
        Some(text) => Span::styled(
            text.to_string(),
            Style::default()
                .fg(DEFAULT_THEME.node_active)
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled(
            "Press → to start".to_string(),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
    }))];

    if output.is_empty() {
        items.push(
            ListItem::new("(no output)").style(Style::default().fg(DEFAULT_THEME.comment)),
        );
    } else {
        items.extend(
            output
                .iter()
                .map(|line| ListItem::new(line.as_str()).style(Style::default().fg(DEFAULT_THEME.fg))),
        );
    }

    // Narration stays pinned; only the output scrolls
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let scrollable = items.len().saturating_sub(1);
    let room = visible_height.saturating_sub(1);
    *scroll_offset = (*scroll_offset).min(scrollable.saturating_sub(room));

    let mut items = items.into_iter();
    let visible: Vec<ListItem> = items
        .next()
        .into_iter()
        .chain(items.skip(*scroll_offset).take(room))
        .collect();

    frame.render_widget(List::new(visible).block(block), area);
}
