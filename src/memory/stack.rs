//! Call stack implementation
//!
//! This module provides the call stack for routine execution:
//! - [`Stack`]: The call stack; frame 0 is the global frame
//! - [`Frame`]: A single activation record with nested block scopes
//! - [`Binding`]: A variable slot, remembering whether it was declared `const`
//!
//! # Scoping
//!
//! Each frame keeps a stack of block scopes. `let`/`const` bind in the
//! innermost scope, `var` and parameters bind in the frame's outermost scope.
//! Name lookup searches the current frame from the innermost scope outwards
//! and then falls back to the global frame; there is no closure capture.

use super::value::Value;
use rustc_hash::FxHashMap;

/// Name of the frame that holds top-level bindings
pub const GLOBAL_FRAME: &str = "<global>";

/// A variable binding
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub is_const: bool,
}

/// Stack frame for a routine activation
#[derive(Debug, Clone)]
pub struct Frame {
    pub function_name: String,
    /// Trace node recorded for this activation, if it is a traced entry call
    pub trace_node: Option<usize>,
    scopes: Vec<FxHashMap<String, Binding>>,
}

impl Frame {
    pub fn new(function_name: String, trace_node: Option<usize>) -> Self {
        Frame {
            function_name,
            trace_node,
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Enter a new block scope
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Exit the current block scope; the function scope itself is never popped
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind a name in the innermost scope, shadowing any outer binding
    pub fn declare(&mut self, name: &str, value: Value, is_const: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), Binding { value, is_const });
        }
    }

    /// Bind a name in the function scope (`var` and parameters)
    pub fn declare_function_scoped(&mut self, name: &str, value: Value) {
        self.scopes[0].insert(
            name.to_string(),
            Binding {
                value,
                is_const: false,
            },
        );
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }
}

/// The call stack
#[derive(Debug, Clone)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            frames: vec![Frame::new(GLOBAL_FRAME.to_string(), None)],
        }
    }

    /// Push a new stack frame
    pub fn push_frame(&mut self, function_name: String, trace_node: Option<usize>) {
        self.frames.push(Frame::new(function_name, trace_node));
    }

    /// Pop the top stack frame; the global frame stays
    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Get the current (top) frame
    pub fn current_frame(&self) -> &Frame {
        // Frame 0 is never popped
        &self.frames[self.frames.len() - 1]
    }

    /// Get a mutable reference to the current frame
    pub fn current_frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// The frame holding top-level bindings
    pub fn global_frame_mut(&mut self) -> &mut Frame {
        &mut self.frames[0]
    }

    /// Get all frames, outermost first
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of routine activations (the global frame is not counted)
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Resolve a name in the current frame, then in the global frame
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.current_frame()
            .lookup(name)
            .or_else(|| self.frames[0].lookup(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Binding> {
        let last = self.frames.len() - 1;
        if self.frames[last].lookup(name).is_some() {
            return self.frames[last].lookup_mut(name);
        }
        self.frames[0].lookup_mut(name)
    }

    /// Trace node of the nearest activation that recorded one
    pub fn nearest_trace_node(&self) -> Option<usize> {
        self.frames.iter().rev().find_map(|frame| frame.trace_node)
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_scope_shadowing() {
        let mut stack = Stack::new();
        stack.push_frame("fn".to_string(), None);
        let frame = stack.current_frame_mut();
        frame.declare("x", Value::Number(1.0), false);
        frame.push_scope();
        frame.declare("x", Value::Number(2.0), false);
        assert_eq!(stack.lookup("x").map(|b| b.value.to_number()), Some(2.0));

        stack.current_frame_mut().pop_scope();
        assert_eq!(stack.lookup("x").map(|b| b.value.to_number()), Some(1.0));
    }

    #[test]
    fn test_global_fallback() {
        let mut stack = Stack::new();
        stack
            .global_frame_mut()
            .declare("memo", Value::Null, true);
        stack.push_frame("fn".to_string(), None);
        stack.push_frame("helper".to_string(), None);

        assert!(stack.lookup("memo").is_some_and(|b| b.is_const));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_callee_cannot_see_caller_locals() {
        let mut stack = Stack::new();
        stack.push_frame("fn".to_string(), None);
        stack
            .current_frame_mut()
            .declare("n", Value::Number(3.0), false);
        stack.push_frame("helper".to_string(), None);

        assert!(stack.lookup("n").is_none());
    }

    #[test]
    fn test_nearest_trace_node() {
        let mut stack = Stack::new();
        stack.push_frame("fn".to_string(), Some(0));
        stack.push_frame("helper".to_string(), None);
        assert_eq!(stack.nearest_trace_node(), Some(0));

        stack.pop_frame();
        stack.pop_frame();
        assert!(stack.pop_frame().is_none());
        assert_eq!(stack.nearest_trace_node(), None);
    }
}
