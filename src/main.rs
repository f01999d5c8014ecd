// rectrace: recursion tree tracer with a terminal call-tree viewer

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use rectrace::instrument::Instrumenter;
use rectrace::interpreter::constants::{
    DEFAULT_ENTRY_NAME, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_NODES, DEFAULT_MAX_STEPS,
};
use rectrace::interpreter::ExecutionLimits;
use rectrace::session::TraceSession;
use rectrace::trace::{TraceOptions, TraceStrategy};
use rectrace::ui::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Record calls from inside the interpreter
    Hooks,
    /// Instrument the routine text and run the result
    Rewrite,
}

impl From<StrategyArg> for TraceStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Hooks => TraceStrategy::EvaluatorHooks,
            StrategyArg::Rewrite => TraceStrategy::SourceRewrite,
        }
    }
}

/// Trace a recursive routine and replay its call tree
#[derive(Debug, Parser)]
#[command(name = "rectrace", version, about)]
struct Cli {
    /// File containing the routine
    file: PathBuf,

    /// Argument list for the top-level call, e.g. "5" or "[1, 2, 3], 0"
    #[arg(short, long, allow_hyphen_values = true)]
    args: Option<String>,

    /// Name of the routine to trace
    #[arg(short, long, default_value = DEFAULT_ENTRY_NAME)]
    entry: String,

    /// How calls are recorded
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Hooks)]
    strategy: StrategyArg,

    /// Reject traces with more calls than this
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    max_nodes: usize,

    /// Maximum nested routine activations
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Maximum executed statements and loop iterations
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: u64,

    /// Print the trace, layout and console output as JSON instead of opening the viewer
    #[arg(long, conflicts_with = "emit_instrumented")]
    json: bool,

    /// Print the instrumented routine text and exit
    #[arg(long)]
    emit_instrumented: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&cli.file)
        .map_err(|e| format!("cannot read '{}': {}", cli.file.display(), e))?;

    if cli.emit_instrumented {
        let routine = Instrumenter::new(cli.entry.as_str()).instrument(&source)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", routine.source)?;
        return Ok(());
    }

    let options = TraceOptions {
        entry_name: cli.entry.clone(),
        strategy: cli.strategy.into(),
        limits: ExecutionLimits {
            max_call_depth: cli.max_depth,
            max_steps: cli.max_steps,
            max_nodes: Some(cli.max_nodes),
        },
    };
    let mut session = TraceSession::new(options);

    tracing::info!(file = %cli.file.display(), "tracing");
    let visualization = session.visualize(&source, cli.args.as_deref())?;

    if cli.json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &visualization.export(&cli.entry))?;
        writeln!(stdout)?;
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(visualization, source, &cli.entry);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}
