// Constants shared by the interpreter and the source instrumenter

/// Name of the traced entry routine unless configured otherwise
pub const DEFAULT_ENTRY_NAME: &str = "fn";

/// Tracking parameter carrying the nesting depth (defaults to 0)
pub const DEPTH_PARAM: &str = "depthRecursionGraph";

/// Tracking parameter carrying the caller's node object (defaults to null)
pub const PARENT_PARAM: &str = "parentNodeRecursionGraph";

/// Local holding the node object of the current activation
pub const NODE_VAR: &str = "currentNode";

/// Temporary holding a captured return value
pub const RETURN_TEMP: &str = "returnValueResult";

/// Built-in that registers a node in the run's trace context
pub const CREATE_NODE: &str = "createNode";

/// Maximum nested routine activations before a run is aborted
pub const DEFAULT_MAX_CALL_DEPTH: usize = 500;

/// Maximum executed statements and loop iterations per run
pub const DEFAULT_MAX_STEPS: u64 = 5_000_000;

/// Trace size above which a run is rejected before layout
pub const DEFAULT_MAX_NODES: usize = 200;

/// True for the two synthetic tracking parameter names
pub fn is_tracking_param(name: &str) -> bool {
    name == DEPTH_PARAM || name == PARENT_PARAM
}
