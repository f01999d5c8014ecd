//! Trace data model
//!
//! A [`Trace`] is the ordered set of [`TraceNode`]s recorded during one run of
//! the entry routine. Nodes are stored in creation order, so a node's `id` is
//! also its index, and children are referenced by id rather than by pointer.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// Largest integer an IEEE double represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A value detached from the interpreter, snapshotted at record time
#[derive(Debug, Clone, PartialEq)]
pub enum TraceValue {
    Number(f64),
    Bool(bool),
    Str(String),
    Null,
    Undefined,
    Array(Vec<TraceValue>),
    Object(Vec<(String, TraceValue)>), // Keys in insertion order
    Function(String),
}

impl TraceValue {
    /// `null` and `undefined` count as "no value" for return capture
    pub fn is_nullish(&self) -> bool {
        matches!(self, TraceValue::Null | TraceValue::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            TraceValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Format a number the way the routine language prints it
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceValue::Number(n) => write!(f, "{}", format_number(*n)),
            TraceValue::Bool(b) => write!(f, "{}", b),
            TraceValue::Str(s) => write!(f, "{}", s),
            TraceValue::Null => write!(f, "null"),
            TraceValue::Undefined => write!(f, "undefined"),
            TraceValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            TraceValue::Object(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            TraceValue::Function(name) => write!(f, "[Function {}]", name),
        }
    }
}

impl Serialize for TraceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TraceValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            TraceValue::Bool(b) => serializer.serialize_bool(*b),
            TraceValue::Str(s) => serializer.serialize_str(s),
            TraceValue::Null | TraceValue::Undefined => serializer.serialize_none(),
            TraceValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TraceValue::Object(fields) => serialize_pairs(fields, serializer),
            TraceValue::Function(name) => serializer.serialize_str(&format!("[Function {}]", name)),
        }
    }
}

/// Serialize ordered `(key, value)` pairs as a JSON object, keeping order
fn serialize_pairs<S: Serializer>(
    pairs: &[(String, TraceValue)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// One recorded invocation of the entry routine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceNode {
    pub id: usize,
    /// Argument values by parameter name, in declared order
    #[serde(serialize_with = "serialize_pairs")]
    pub params: Vec<(String, TraceValue)>,
    pub depth: usize,
    /// Child ids in call order
    pub children: Vec<usize>,
    /// `None` until a `return <expr>` with a non-nullish value executes
    pub return_value: Option<TraceValue>,
}

impl TraceNode {
    pub fn new(id: usize, params: Vec<(String, TraceValue)>, depth: usize) -> Self {
        TraceNode {
            id,
            params,
            depth,
            children: Vec::new(),
            return_value: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Argument values joined for display, e.g. `3, [1,2]`
    pub fn format_params(&self) -> String {
        self.params
            .iter()
            .map(|(_, value)| value.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Return value for display; empty when unset
    pub fn format_return(&self) -> String {
        self.return_value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default()
    }
}

/// A structural defect found by [`Trace::validate`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceDefect {
    #[error("node at index {index} has id {id}")]
    IdMismatch { index: usize, id: usize },
    #[error("root node has depth {depth}")]
    RootDepth { depth: usize },
    #[error("root node is listed as a child of node {parent}")]
    RootHasParent { parent: usize },
    #[error("node {id} has no parent")]
    Detached { id: usize },
    #[error("node {id} has more than one parent")]
    SharedChild { id: usize },
    #[error("node {id} has depth {depth}, expected {expected}")]
    DepthMismatch {
        id: usize,
        depth: usize,
        expected: usize,
    },
    #[error("node {parent} lists unknown child {child}")]
    UnknownChild { parent: usize, child: usize },
}

/// All nodes recorded during one run, in creation order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    pub nodes: Vec<TraceNode>,
}

impl Trace {
    pub fn new(nodes: Vec<TraceNode>) -> Self {
        Trace { nodes }
    }

    /// The root invocation, if the routine was called at all
    pub fn root(&self) -> Option<&TraceNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: usize) -> Option<&TraceNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child nodes of `id`, in call order
    pub fn children(&self, id: usize) -> impl Iterator<Item = &TraceNode> + '_ {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|child| self.nodes.get(*child))
    }

    /// Parent id of every node (`None` for the root)
    pub fn parents(&self) -> Vec<Option<usize>> {
        let mut parents = vec![None; self.nodes.len()];
        for node in &self.nodes {
            for &child in &node.children {
                if let Some(slot) = parents.get_mut(child) {
                    *slot = Some(node.id);
                }
            }
        }
        parents
    }

    pub fn parent_of(&self, id: usize) -> Option<usize> {
        self.nodes
            .iter()
            .find(|node| node.children.contains(&id))
            .map(|node| node.id)
    }

    /// Deepest recorded depth
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Nodes in pre-order (children in call order)
    pub fn pre_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending: Vec<usize> = self.root().map(|r| r.id).into_iter().collect();
        while let Some(id) = pending.pop() {
            order.push(id);
            if let Some(node) = self.nodes.get(id) {
                pending.extend(node.children.iter().rev());
            }
        }
        order
    }

    /// Check the tree invariants: ids match positions, a single depth-0 root
    /// first, every other node owned by exactly one parent at depth + 1.
    pub fn validate(&self) -> Result<(), TraceDefect> {
        let mut owner: Vec<Option<usize>> = vec![None; self.nodes.len()];

        for (index, node) in self.nodes.iter().enumerate() {
            if node.id != index {
                return Err(TraceDefect::IdMismatch { index, id: node.id });
            }
            for &child in &node.children {
                let slot = owner.get_mut(child).ok_or(TraceDefect::UnknownChild {
                    parent: node.id,
                    child,
                })?;
                if slot.replace(node.id).is_some() {
                    return Err(TraceDefect::SharedChild { id: child });
                }
            }
        }

        if let Some(root) = self.root() {
            if root.depth != 0 {
                return Err(TraceDefect::RootDepth { depth: root.depth });
            }
            if let Some(parent) = owner[0] {
                return Err(TraceDefect::RootHasParent { parent });
            }
        }

        for node in self.nodes.iter().skip(1) {
            let parent = owner[node.id].ok_or(TraceDefect::Detached { id: node.id })?;
            let expected = self.nodes[parent].depth + 1;
            if node.depth != expected {
                return Err(TraceDefect::DepthMismatch {
                    id: node.id,
                    depth: node.depth,
                    expected,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> Trace {
        let nodes = (0..len)
            .map(|i| {
                let mut node = TraceNode::new(i, vec![("n".into(), TraceValue::Number(i as f64))], i);
                if i + 1 < len {
                    node.children.push(i + 1);
                }
                node
            })
            .collect();
        Trace::new(nodes)
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_display_arrays_and_objects() {
        let arr = TraceValue::Array(vec![TraceValue::Number(1.0), TraceValue::Number(2.0)]);
        assert_eq!(arr.to_string(), "[1,2]");

        let obj = TraceValue::Object(vec![("a".into(), TraceValue::Str("x".into()))]);
        assert_eq!(obj.to_string(), "{a: x}");
    }

    #[test]
    fn test_serialize_node() {
        let mut node = TraceNode::new(0, vec![("n".into(), TraceValue::Number(3.0))], 0);
        node.return_value = Some(TraceValue::Number(6.0));
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["params"]["n"], 3);
        assert_eq!(json["returnValue"], 6);
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn test_validate_chain() {
        let trace = chain(4);
        assert!(trace.validate().is_ok());
        assert_eq!(trace.parent_of(3), Some(2));
        assert_eq!(trace.max_depth(), 3);
    }

    #[test]
    fn test_validate_detached_node() {
        let mut trace = chain(3);
        trace.nodes[1].children.clear();
        assert_eq!(trace.validate(), Err(TraceDefect::Detached { id: 2 }));
    }

    #[test]
    fn test_pre_order() {
        let mut nodes: Vec<TraceNode> = (0..4).map(|i| TraceNode::new(i, vec![], 0)).collect();
        nodes[0].children = vec![1, 3];
        nodes[1].children = vec![2];
        nodes[1].depth = 1;
        nodes[2].depth = 2;
        nodes[3].depth = 1;
        let trace = Trace::new(nodes);

        assert_eq!(trace.pre_order(), vec![0, 1, 2, 3]);
        assert!(trace.validate().is_ok());
    }
}
