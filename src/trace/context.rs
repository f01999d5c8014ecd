//! Per-run trace building context
//!
//! A [`TraceContext`] is owned by exactly one interpreter for the duration of
//! one run. Node ids are assigned from the node count, so a fresh context
//! always starts at id 0 and nothing carries over between runs.
//!
//! Nodes can be linked two ways:
//! - directly, by passing the parent id to [`TraceContext::create_node`]
//!   (evaluator hooks)
//! - through the node objects handed to instrumented routine text, whose
//!   `children` and `returnValue` fields are read back in
//!   [`TraceContext::finish`] (source rewrite)

use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{ObjectRef, Value};
use crate::trace::node::{Trace, TraceNode, TraceValue};

/// Property of a node object holding its id
pub const NODE_ID_FIELD: &str = "id";
/// Property of a node object holding child node objects
pub const NODE_CHILDREN_FIELD: &str = "children";
/// Property of a node object holding the captured return value
pub const NODE_RETURN_FIELD: &str = "returnValue";

#[derive(Debug, Default)]
pub struct TraceContext {
    nodes: Vec<TraceNode>,
    handles: Vec<Option<ObjectRef>>,
}

impl TraceContext {
    pub fn new() -> Self {
        TraceContext::default()
    }

    /// Record a new invocation and link it under `parent`; returns its id
    pub fn create_node(
        &mut self,
        params: Vec<(String, TraceValue)>,
        depth: usize,
        parent: Option<usize>,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TraceNode::new(id, params, depth));
        self.handles.push(None);

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.push(id);
        }

        tracing::trace!(id, depth, ?parent, "trace node created");
        id
    }

    /// Associate the node object given to instrumented code with node `id`
    pub fn attach_handle(&mut self, id: usize, handle: ObjectRef) {
        if let Some(slot) = self.handles.get_mut(id) {
            *slot = Some(handle);
        }
    }

    pub fn depth_of(&self, id: usize) -> Option<usize> {
        self.nodes.get(id).map(|node| node.depth)
    }

    /// Capture the return value of node `id`. Only the first non-nullish
    /// value is kept.
    pub fn record_return(&mut self, id: usize, value: TraceValue) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.return_value.is_none() && !value.is_nullish() {
                node.return_value = Some(value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Close the run and materialize the trace
    pub fn finish(mut self) -> Result<Trace, RuntimeError> {
        for id in 0..self.nodes.len() {
            let Some(handle) = self.handles[id].take() else {
                continue;
            };
            let node_obj = handle.borrow();

            if let Some(Value::Array(children)) = node_obj.get(NODE_CHILDREN_FIELD) {
                for child in children.borrow().iter() {
                    let child_id = node_object_id(child).ok_or_else(|| {
                        RuntimeError::InconsistentTrace {
                            reason: format!("node {} has a child that is not a trace node", id),
                        }
                    })?;
                    self.nodes[id].children.push(child_id);
                }
            }

            if let Some(value) = node_obj.get(NODE_RETURN_FIELD) {
                let value = value.to_trace_value();
                self.record_return(id, value);
            }
        }

        let trace = Trace::new(self.nodes);
        trace
            .validate()
            .map_err(|defect| RuntimeError::InconsistentTrace {
                reason: defect.to_string(),
            })?;
        Ok(trace)
    }
}

/// The id stored in a node object, if the value is one
fn node_object_id(value: &Value) -> Option<usize> {
    let Value::Object(obj) = value else {
        return None;
    };
    match obj.borrow().get(NODE_ID_FIELD) {
        Some(Value::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::JsObject;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn param(n: f64) -> Vec<(String, TraceValue)> {
        vec![("n".to_string(), TraceValue::Number(n))]
    }

    #[test]
    fn test_direct_linking() {
        let mut ctx = TraceContext::new();
        let root = ctx.create_node(param(2.0), 0, None);
        let child = ctx.create_node(param(1.0), 1, Some(root));
        ctx.record_return(child, TraceValue::Number(1.0));
        ctx.record_return(root, TraceValue::Number(2.0));
        ctx.record_return(root, TraceValue::Number(99.0));

        let trace = ctx.finish().unwrap();
        assert_eq!(trace.nodes[0].children, vec![1]);
        assert_eq!(trace.nodes[0].return_value, Some(TraceValue::Number(2.0)));
    }

    #[test]
    fn test_nullish_return_stays_unset() {
        let mut ctx = TraceContext::new();
        let root = ctx.create_node(vec![], 0, None);
        ctx.record_return(root, TraceValue::Undefined);

        let trace = ctx.finish().unwrap();
        assert!(trace.nodes[0].return_value.is_none());
    }

    fn node_object(id: usize) -> ObjectRef {
        let mut obj = JsObject::new();
        obj.set(NODE_ID_FIELD, Value::Number(id as f64));
        obj.set(NODE_CHILDREN_FIELD, Value::array(vec![]));
        obj.set(NODE_RETURN_FIELD, Value::Null);
        Rc::new(RefCell::new(obj))
    }

    #[test]
    fn test_linking_through_handles() {
        let mut ctx = TraceContext::new();
        let root = ctx.create_node(param(1.0), 0, None);
        let child = ctx.create_node(param(0.0), 1, None);
        let root_obj = node_object(root);
        let child_obj = node_object(child);
        ctx.attach_handle(root, root_obj.clone());
        ctx.attach_handle(child, child_obj.clone());

        if let Some(Value::Array(children)) = root_obj.borrow().get(NODE_CHILDREN_FIELD) {
            children.borrow_mut().push(Value::Object(child_obj.clone()));
        }
        root_obj
            .borrow_mut()
            .set(NODE_RETURN_FIELD, Value::Number(1.0));

        let trace = ctx.finish().unwrap();
        assert_eq!(trace.nodes[0].children, vec![1]);
        assert_eq!(trace.nodes[0].return_value, Some(TraceValue::Number(1.0)));
        assert!(trace.nodes[1].return_value.is_none());
    }

    #[test]
    fn test_detached_node_is_rejected() {
        let mut ctx = TraceContext::new();
        ctx.create_node(param(1.0), 0, None);
        ctx.create_node(param(0.0), 0, None);

        let err = ctx.finish().unwrap_err();
        assert!(matches!(err, RuntimeError::InconsistentTrace { .. }));
    }
}
