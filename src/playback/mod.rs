//! Replaying a call tree in call order
//!
//! A [`Playback`] turns a [`Trace`] into a sequence of call and return
//! events and a cursor over them: a `Call` for each node in pre-order, and a
//! `Return` once all of its children have returned. Stepping the cursor
//! forward and back drives the viewer, which asks for each node's
//! [`NodeState`] and for a one-line narration of the current event.

use crate::trace::node::{Trace, TraceNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Call { id: usize },
    Return { id: usize },
}

impl PlaybackEvent {
    pub fn node_id(&self) -> usize {
        match self {
            PlaybackEvent::Call { id } | PlaybackEvent::Return { id } => *id,
        }
    }
}

/// How a node is drawn at the current playback position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Not called yet
    Hidden,
    /// Called, still running
    Active,
    /// Returned
    Returned,
}

#[derive(Debug, Clone)]
pub struct Playback {
    trace: Trace,
    entry_name: String,
    events: Vec<PlaybackEvent>,
    /// Number of events applied; 0 is before the first call
    position: usize,
    /// Event index at which each node is called and returns
    called_at: Vec<usize>,
    returned_at: Vec<usize>,
}

impl Playback {
    pub fn new(trace: Trace, entry_name: impl Into<String>) -> Self {
        let events = call_order(&trace);

        let mut called_at = vec![usize::MAX; trace.len()];
        let mut returned_at = vec![usize::MAX; trace.len()];
        for (index, event) in events.iter().enumerate() {
            match *event {
                PlaybackEvent::Call { id } => called_at[id] = index,
                PlaybackEvent::Return { id } => returned_at[id] = index,
            }
        }

        Playback {
            trace,
            entry_name: entry_name.into(),
            events,
            position: 0,
            called_at,
            returned_at,
        }
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn events(&self) -> &[PlaybackEvent] {
        &self.events
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn at_start(&self) -> bool {
        self.position == 0
    }

    pub fn at_end(&self) -> bool {
        self.position == self.events.len()
    }

    /// The most recently applied event
    pub fn current_event(&self) -> Option<PlaybackEvent> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.events.get(i).copied())
    }

    /// Apply the next event; false at the end
    pub fn step_forward(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.position += 1;
        true
    }

    /// Undo the last event; false at the start
    pub fn step_back(&mut self) -> bool {
        if self.at_start() {
            return false;
        }
        self.position -= 1;
        true
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.events.len();
    }

    pub fn node_state(&self, id: usize) -> NodeState {
        match (self.called_at.get(id), self.returned_at.get(id)) {
            (Some(&called), Some(&returned)) => {
                if returned < self.position {
                    NodeState::Returned
                } else if called < self.position {
                    NodeState::Active
                } else {
                    NodeState::Hidden
                }
            }
            _ => NodeState::Hidden,
        }
    }

    /// `(nodes drawn, total nodes)`
    pub fn progress(&self) -> (usize, usize) {
        let drawn = (0..self.trace.len())
            .filter(|&id| self.node_state(id) != NodeState::Hidden)
            .count();
        (drawn, self.trace.len())
    }

    /// Description of the current event, e.g. `fn(3) returns 6`
    pub fn narration(&self) -> Option<String> {
        let event = self.current_event()?;
        let node = self.trace.node(event.node_id())?;
        Some(match event {
            PlaybackEvent::Call { .. } => format!("Calling {}", self.call_label(node)),
            PlaybackEvent::Return { .. } if node.return_value.is_some() => format!(
                "{} returns {}",
                self.call_label(node),
                node.format_return()
            ),
            PlaybackEvent::Return { .. } => format!("{} returns", self.call_label(node)),
        })
    }

    /// `fn(3, [1,2])`
    pub fn call_label(&self, node: &TraceNode) -> String {
        format!("{}({})", self.entry_name, node.format_params())
    }
}

/// Call/return events in execution order
fn call_order(trace: &Trace) -> Vec<PlaybackEvent> {
    let mut events = Vec::with_capacity(trace.len() * 2);
    let Some(root) = trace.root() else {
        return events;
    };

    // (node, next child index) frames instead of recursion
    let mut stack: Vec<(usize, usize)> = vec![(root.id, 0)];
    events.push(PlaybackEvent::Call { id: root.id });

    while let Some((id, next_child)) = stack.pop() {
        let children = trace.node(id).map_or(&[][..], |n| n.children.as_slice());
        match children.get(next_child) {
            Some(&child) => {
                stack.push((id, next_child + 1));
                stack.push((child, 0));
                events.push(PlaybackEvent::Call { id: child });
            }
            None => events.push(PlaybackEvent::Return { id }),
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::node::TraceValue;

    fn fib2() -> Trace {
        // fn(2) -> fn(1), fn(0)
        let mut root = TraceNode::new(0, vec![("n".into(), TraceValue::Number(2.0))], 0);
        root.children = vec![1, 2];
        root.return_value = Some(TraceValue::Number(1.0));
        let mut one = TraceNode::new(1, vec![("n".into(), TraceValue::Number(1.0))], 1);
        one.return_value = Some(TraceValue::Number(1.0));
        let zero = TraceNode::new(2, vec![("n".into(), TraceValue::Number(0.0))], 1);
        Trace::new(vec![root, one, zero])
    }

    #[test]
    fn test_event_order() {
        let playback = Playback::new(fib2(), "fn");
        assert_eq!(
            playback.events(),
            &[
                PlaybackEvent::Call { id: 0 },
                PlaybackEvent::Call { id: 1 },
                PlaybackEvent::Return { id: 1 },
                PlaybackEvent::Call { id: 2 },
                PlaybackEvent::Return { id: 2 },
                PlaybackEvent::Return { id: 0 },
            ]
        );
    }

    #[test]
    fn test_stepping_and_states() {
        let mut playback = Playback::new(fib2(), "fn");
        assert_eq!(playback.node_state(0), NodeState::Hidden);
        assert!(!playback.step_back());

        playback.step_forward();
        playback.step_forward();
        assert_eq!(playback.node_state(0), NodeState::Active);
        assert_eq!(playback.node_state(1), NodeState::Active);
        assert_eq!(playback.progress(), (2, 3));

        playback.step_forward();
        assert_eq!(playback.node_state(1), NodeState::Returned);

        playback.step_back();
        assert_eq!(playback.node_state(1), NodeState::Active);

        playback.jump_to_end();
        assert!(playback.at_end());
        assert!(!playback.step_forward());
        assert_eq!(playback.node_state(0), NodeState::Returned);

        playback.rewind();
        assert_eq!(playback.progress(), (0, 3));
    }

    #[test]
    fn test_narration() {
        let mut playback = Playback::new(fib2(), "fn");
        assert_eq!(playback.narration(), None);

        playback.step_forward();
        assert_eq!(playback.narration().unwrap(), "Calling fn(2)");

        playback.jump_to_end();
        assert_eq!(playback.narration().unwrap(), "fn(2) returns 1");

        playback.step_back();
        assert_eq!(playback.narration().unwrap(), "fn(0) returns");
    }

    #[test]
    fn test_array_params_in_label() {
        let node = TraceNode::new(
            0,
            vec![
                (
                    "xs".into(),
                    TraceValue::Array(vec![TraceValue::Number(1.0), TraceValue::Number(2.0)]),
                ),
                ("i".into(), TraceValue::Number(0.0)),
            ],
            0,
        );
        let playback = Playback::new(Trace::new(vec![node.clone()]), "fn");
        assert_eq!(playback.call_label(&node), "fn([1,2], 0)");
    }
}
