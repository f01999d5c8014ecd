//! One traced-and-laid-out run, with the caller-side guards applied
//!
//! [`TraceSession`] is the boundary the CLI and the viewer talk to. It runs
//! the executor with the node ceiling as its node limit, so oversized runs
//! stop as soon as they cross it, and lays the tree out. Runs take `&mut self`, so a session never has two runs in flight.

use crate::interpreter::constants::DEFAULT_MAX_NODES;
use crate::layout::{LayoutConfig, TreeLayout};
use crate::trace::executor::{TraceError, TraceExecutor, TraceOptions, TraceRun};
use serde::Serialize;

/// A trace ready to render
#[derive(Debug, Clone)]
pub struct Visualization {
    pub run: TraceRun,
    pub layout: TreeLayout,
}

/// JSON shape handed to external renderers
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationExport<'a> {
    pub entry: &'a str,
    pub node_count: usize,
    pub result: &'a crate::trace::node::TraceValue,
    pub trace: &'a crate::trace::node::Trace,
    pub layout: &'a TreeLayout,
    pub output: &'a [String],
}

#[derive(Debug, Clone)]
pub struct TraceSession {
    executor: TraceExecutor,
    max_nodes: usize,
    layout_config: LayoutConfig,
    runs: usize,
}

impl TraceSession {
    /// A session whose ceiling is `options.limits.max_nodes`, or
    /// [`DEFAULT_MAX_NODES`] when that is unset
    pub fn new(mut options: TraceOptions) -> Self {
        let max_nodes = options.limits.max_nodes.unwrap_or(DEFAULT_MAX_NODES);
        options.limits.max_nodes = Some(max_nodes);
        TraceSession {
            executor: TraceExecutor::new(options),
            max_nodes,
            layout_config: LayoutConfig::default(),
            runs: 0,
        }
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        let mut options = self.executor.options().clone();
        options.limits.max_nodes = Some(max_nodes);
        self.executor = TraceExecutor::new(options);
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout_config = config;
        self
    }

    pub fn options(&self) -> &TraceOptions {
        self.executor.options()
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Completed runs so far
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Trace `source` with `args` under the node ceiling, then lay out
    pub fn visualize(
        &mut self,
        source: &str,
        args: Option<&str>,
    ) -> Result<Visualization, TraceError> {
        let run = self.executor.run(source, args)?;
        tracing::debug!(nodes = run.trace.len(), limit = self.max_nodes, "laying out trace");

        let layout = TreeLayout::compute(&run.trace, self.layout_config).ok_or(
            TraceError::Execution(crate::interpreter::errors::RuntimeError::InconsistentTrace {
                reason: "the entry routine was never invoked".to_string(),
            }),
        )?;

        self.runs += 1;
        Ok(Visualization { run, layout })
    }
}

impl Default for TraceSession {
    fn default() -> Self {
        TraceSession::new(TraceOptions::default())
    }
}

impl Visualization {
    pub fn export<'a>(&'a self, entry: &'a str) -> VisualizationExport<'a> {
        VisualizationExport {
            entry,
            node_count: self.run.trace.len(),
            result: &self.run.result,
            trace: &self.run.trace,
            layout: &self.layout,
            output: &self.run.output,
        }
    }
}
