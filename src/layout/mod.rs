//! Tree layout for rendering a call tree
//!
//! Two passes over a [`Trace`]:
//!
//! 1. [`TreeLayout::assign_positions`] gives every node a logical column
//!    (`x`) and row (`y` = depth). Leaves take consecutive columns from a
//!    counter shared across the whole traversal, visiting children in call
//!    order. An internal node sits at the mean of its first and last child.
//! 2. [`TreeLayout::update_positions`] scales logical positions to pixels
//!    and shifts them horizontally by an offset.
//!
//! The layout is deterministic: the same tree shape always yields the same
//! coordinates.

use crate::trace::node::Trace;
use serde::Serialize;

/// Pixel sizes used to scale logical positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_size: f64,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            node_size: 40.0,
            horizontal_spacing: 40.0,
            vertical_spacing: 80.0,
        }
    }
}

impl LayoutConfig {
    /// Distance between adjacent columns
    pub fn column_width(&self) -> f64 {
        self.node_size + self.horizontal_spacing
    }

    /// Distance between adjacent rows
    pub fn row_height(&self) -> f64 {
        self.node_size + self.vertical_spacing
    }
}

/// Layout of one trace node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: usize,
    /// Logical column; half-columns occur above even child spans
    pub x: f64,
    /// Logical row, equal to the node's depth
    pub y: usize,
    pub x_position: f64,
    pub y_position: f64,
    /// The node's parent has exactly one child
    pub is_only_child: bool,
}

/// A positioned call tree, indexed by node id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout {
    pub nodes: Vec<PositionedNode>,
    pub root: usize,
    /// Number of leaf columns used
    pub columns: usize,
    pub max_depth: usize,
    /// Pixel extent of the whole tree
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    config: LayoutConfig,
}

impl TreeLayout {
    /// Lay out `trace`, centering the tree on its root. `None` for an empty trace.
    pub fn compute(trace: &Trace, config: LayoutConfig) -> Option<Self> {
        let root = trace.root()?.id;
        let mut layout = Self::assign_positions(trace, config);
        let offset = layout.centering_offset();
        layout.update_positions(offset);

        tracing::debug!(
            nodes = layout.nodes.len(),
            columns = layout.columns,
            max_depth = layout.max_depth,
            root,
            "layout computed"
        );
        Some(layout)
    }

    /// First pass: logical columns and rows. Pixel positions are left at zero.
    pub fn assign_positions(trace: &Trace, config: LayoutConfig) -> Self {
        let mut nodes: Vec<PositionedNode> = trace
            .nodes
            .iter()
            .map(|node| PositionedNode {
                id: node.id,
                x: 0.0,
                y: 0,
                x_position: 0.0,
                y_position: 0.0,
                is_only_child: false,
            })
            .collect();

        let mut next_x = 0usize;
        if let Some(root) = trace.root() {
            assign(trace, &mut nodes, root.id, 0, &mut next_x);
        }

        let max_depth = nodes.iter().map(|n| n.y).max().unwrap_or(0);
        TreeLayout {
            nodes,
            root: 0,
            columns: next_x,
            max_depth,
            width: next_x as f64 * config.column_width(),
            height: (max_depth + 1) as f64 * config.row_height(),
            config,
        }
    }

    /// Offset that puts the root at the horizontal center of the tree's extent
    pub fn centering_offset(&self) -> f64 {
        let root_x = self.nodes.get(self.root).map_or(0.0, |n| n.x);
        self.width / 2.0 - self.config.node_size / 2.0 - root_x * self.config.column_width()
    }

    /// Second pass: pixel coordinates from logical ones
    pub fn update_positions(&mut self, offset_x: f64) {
        let column = self.config.column_width();
        let row = self.config.row_height();
        for node in &mut self.nodes {
            node.x_position = node.x * column + offset_x;
            node.y_position = node.y as f64 * row;
        }
    }

    pub fn node(&self, id: usize) -> Option<&PositionedNode> {
        self.nodes.get(id)
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

fn assign(
    trace: &Trace,
    nodes: &mut [PositionedNode],
    id: usize,
    depth: usize,
    next_x: &mut usize,
) {
    let Some(node) = trace.node(id) else {
        return;
    };
    nodes[id].y = depth;

    if node.children.is_empty() {
        nodes[id].x = *next_x as f64;
        *next_x += 1;
        return;
    }

    let only_child = node.children.len() == 1;
    for &child in &node.children {
        nodes[child].is_only_child = only_child;
        assign(trace, nodes, child, depth + 1, next_x);
    }

    let first = node.children[0];
    let last = node.children[node.children.len() - 1];
    nodes[id].x = (nodes[first].x + nodes[last].x) / 2.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::node::{TraceNode, TraceValue};

    /// Build a trace from `(depth, children)` pairs
    fn trace(shape: &[(usize, &[usize])]) -> Trace {
        Trace::new(
            shape
                .iter()
                .enumerate()
                .map(|(id, (depth, children))| {
                    let mut node =
                        TraceNode::new(id, vec![("n".into(), TraceValue::Number(id as f64))], *depth);
                    node.children = children.to_vec();
                    node
                })
                .collect(),
        )
    }

    #[test]
    fn test_two_leaves() {
        let t = trace(&[(0, &[1, 2]), (1, &[]), (1, &[])]);
        let layout = TreeLayout::compute(&t, LayoutConfig::default()).unwrap();

        assert_eq!(layout.nodes[1].x, 0.0);
        assert_eq!(layout.nodes[2].x, 1.0);
        assert_eq!(layout.nodes[0].x, 0.5);
        assert_eq!(layout.nodes[0].y, 0);
        assert_eq!(layout.nodes[1].y, 1);
        assert!(!layout.nodes[1].is_only_child);
        assert_eq!(layout.columns, 2);
    }

    #[test]
    fn test_pixel_positions() {
        let t = trace(&[(0, &[1, 2]), (1, &[]), (1, &[])]);
        let layout = TreeLayout::compute(&t, LayoutConfig::default()).unwrap();

        // width 160, offset 160/2 - 20 - 0.5 * 80 = 20
        assert_eq!(layout.width, 160.0);
        assert_eq!(layout.nodes[0].x_position, 60.0);
        assert_eq!(layout.nodes[1].x_position, 20.0);
        assert_eq!(layout.nodes[2].x_position, 100.0);
        assert_eq!(layout.nodes[1].y_position, 120.0);
    }

    #[test]
    fn test_chain_is_one_column() {
        let t = trace(&[(0, &[1]), (1, &[2]), (2, &[])]);
        let layout = TreeLayout::compute(&t, LayoutConfig::default()).unwrap();
        assert!(layout.nodes.iter().all(|n| n.x == 0.0));
        assert!(layout.nodes[1].is_only_child && layout.nodes[2].is_only_child);
        assert!(!layout.nodes[0].is_only_child);
        assert_eq!(layout.max_depth, 2);
    }

    #[test]
    fn test_mean_of_first_and_last_child() {
        // Root with three children, the middle one has two leaves
        let t = trace(&[
            (0, &[1, 2, 5]),
            (1, &[]),
            (1, &[3, 4]),
            (2, &[]),
            (2, &[]),
            (1, &[]),
        ]);
        let layout = TreeLayout::assign_positions(&t, LayoutConfig::default());
        assert_eq!(layout.nodes[1].x, 0.0);
        assert_eq!(layout.nodes[2].x, 1.5);
        assert_eq!(layout.nodes[5].x, 3.0);
        assert_eq!(layout.nodes[0].x, 1.5);
    }

    #[test]
    fn test_single_node() {
        let t = trace(&[(0, &[])]);
        let layout = TreeLayout::compute(&t, LayoutConfig::default()).unwrap();
        assert_eq!(layout.nodes[0].x, 0.0);
        assert_eq!(layout.columns, 1);
    }

    #[test]
    fn test_empty_trace() {
        assert!(TreeLayout::compute(&Trace::default(), LayoutConfig::default()).is_none());
    }
}
