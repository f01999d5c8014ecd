//! # Introduction
//!
//! rectrace runs a JavaScript-style routine, records every invocation of its
//! entry routine as a node in a call tree, lays the tree out in two
//! dimensions and replays it call by call in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! Source → (Instrumenter) → Parser → AST → Interpreter → Trace → Layout → Playback → TUI
//! ```
//!
//! 1. [`instrument`]: textual rewriting that makes the entry routine record
//!    itself (tracking parameters, call-site arguments, node creation, return
//!    capture).
//! 2. [`parser`]: tokenises the source and builds an AST.
//! 3. [`interpreter`]: walks the AST. Entry-routine calls are recorded either
//!    by evaluator hooks or by the instrumented text calling `createNode`.
//! 4. [`memory`]: runtime values and the call stack.
//! 5. [`trace`]: the call-tree model, the per-run trace context and the
//!    executor that ties the steps above together.
//! 6. [`layout`]: logical columns/rows and pixel positions for each node.
//! 7. [`playback`]: call/return events, node states and narration.
//! 8. [`session`]: node ceiling and layout on top of the executor.
//! 9. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use rectrace::session::TraceSession;
//!
//! let source = "function fn(n) { return n <= 1 ? 1 : n * fn(n - 1); }";
//! let vis = TraceSession::default().visualize(source, Some("3")).unwrap();
//! assert_eq!(vis.run.trace.len(), 4);
//! assert_eq!(vis.run.trace.nodes[0].format_return(), "6");
//! ```

pub mod instrument;
pub mod interpreter;
pub mod layout;
pub mod memory;
pub mod parser;
pub mod playback;
pub mod session;
pub mod trace;
pub mod ui;
