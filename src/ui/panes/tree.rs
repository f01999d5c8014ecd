//! Call-tree pane
//!
//! Draws the positioned tree on a braille canvas. Layout pixels map straight
//! to canvas units, with the y axis flipped so the root sits at the top. Only
//! nodes the playback has reached are drawn; connectors appear once both ends
//! are visible.

use crate::layout::TreeLayout;
use crate::playback::{NodeState, Playback};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as Connector},
        Block, Borders,
    },
    Frame,
};

/// Pan (in layout pixels) and zoom, adjusted from the keyboard
#[derive(Debug, Clone, Copy)]
pub struct TreeViewport {
    pub pan_x: f64,
    pub pan_y: f64,
    /// 1.0 fits the whole tree
    pub zoom: f64,
}

impl TreeViewport {
    pub fn new() -> Self {
        TreeViewport {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Default for TreeViewport {
    fn default() -> Self {
        TreeViewport::new()
    }
}

pub fn render_tree_pane(
    frame: &mut Frame,
    area: Rect,
    layout: &TreeLayout,
    playback: &Playback,
    viewport: &TreeViewport,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let (drawn, total) = playback.progress();
    let block = Block::default()
        .title(format!(" Call Tree ({}/{}) ", drawn, total))
        .borders(Borders::ALL)
        .border_style(border_style);

    let config = *layout.config();
    let half = config.node_size / 2.0;
    let radius = half * 0.6;

    // Room for a label row above the root and below the deepest row
    let full_width = layout.width.max(config.node_size);
    let full_height = layout.height + config.node_size;
    let zoom = viewport.zoom.max(0.1);
    let span_x = full_width / zoom;
    let span_y = full_height / zoom;
    let center_x = full_width / 2.0 + viewport.pan_x;
    let center_y = -(full_height / 2.0) + config.node_size / 2.0 - viewport.pan_y;
    let x_bounds = [center_x - span_x / 2.0, center_x + span_x / 2.0];
    let y_bounds = [center_y - span_y / 2.0, center_y + span_y / 2.0];

    // Canvas units covered by one terminal cell, for centering text
    let inner_width = area.width.saturating_sub(2).max(1) as f64;
    let cell_width = span_x / inner_width;

    let trace = playback.trace();
    let center = |id: usize| -> Option<(f64, f64)> {
        layout
            .node(id)
            .map(|n| (n.x_position + half, -(n.y_position + half)))
    };
    let centered_x = |x: f64, text: &str| x - (text.chars().count() as f64 * cell_width) / 2.0;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            for node in &trace.nodes {
                if playback.node_state(node.id) == NodeState::Hidden {
                    continue;
                }
                let Some((x1, y1)) = center(node.id) else {
                    continue;
                };
                for &child in &node.children {
                    if playback.node_state(child) == NodeState::Hidden {
                        continue;
                    }
                    if let Some((x2, y2)) = center(child) {
                        ctx.draw(&Connector {
                            x1,
                            y1: y1 - radius,
                            x2,
                            y2: y2 + radius,
                            color: DEFAULT_THEME.connector,
                        });
                    }
                }
            }

            ctx.layer();

            for node in &trace.nodes {
                let state = playback.node_state(node.id);
                let color = match state {
                    NodeState::Hidden => continue,
                    NodeState::Active => DEFAULT_THEME.node_active,
                    NodeState::Returned => DEFAULT_THEME.node_returned,
                };
                let Some((x, y)) = center(node.id) else {
                    continue;
                };
                ctx.draw(&Circle {
                    x,
                    y,
                    radius,
                    color,
                });

                let params = node.format_params();
                ctx.print(
                    centered_x(x, &params),
                    y - half,
                    Line::from(Span::styled(params, Style::default().fg(DEFAULT_THEME.fg))),
                );

                if state == NodeState::Returned && node.return_value.is_some() {
                    let value = node.format_return();
                    ctx.print(
                        centered_x(x, &value),
                        y + half,
                        Line::from(Span::styled(
                            value,
                            Style::default()
                                .fg(DEFAULT_THEME.return_value)
                                .add_modifier(Modifier::BOLD),
                        )),
                    );
                }
            }
        });

    frame.render_widget(canvas, area);
}
