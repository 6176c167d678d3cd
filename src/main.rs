// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Binary entry point for the tugx CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Extract lines 12-18 of Order.cs into a new method (writes the file)
//! tugx extract-method --file src/Order.cs --start 12 --end 18 --name ComputeTotal
//!
//! # Preview the same extraction as a unified diff
//! tugx analyze extract-method --file src/Order.cs --start 12 --end 18 --name ComputeTotal
//!
//! # Restore the file from the last extraction's backup
//! tugx undo
//! ```
//!
//! JSON responses and errors go to stdout; logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tugextract::cli::{run_extract_method, run_undo, ExtractArgs};
use tugextract::config::{CliOverrides, ResolvedConfig};
use tugextract::engine::ExtractMethodOutput;
use tugextract::error::{OutputErrorCode, TugError};
use tugextract::output::{emit_response, ErrorResponse};
use tugextract::session::{Session, SessionOptions};

// ============================================================================
// CLI Structure
// ============================================================================

/// Extract-method refactoring for AI agents.
///
/// Moves a range of lines in a C# or TypeScript method into a new method and
/// replaces them with a call. All output is JSON or a unified diff.
#[derive(Parser, Debug)]
#[command(name = "tugx", version, about = "Extract-method refactoring for AI agents")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Session directory path (default: .tugx/ in workspace).
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    /// Project config file (default: .tugx.toml in workspace).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the extract-method command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ExtractFormat {
    /// Human-readable summary (default).
    #[default]
    Text,
    /// Full JSON response.
    Json,
    /// Unified diff.
    Diff,
}

/// Output format for the analyze command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum AnalyzeFormat {
    /// Unified diff (default, compatible with `git apply`).
    #[default]
    Diff,
    /// Full JSON response.
    Json,
    /// Brief text summary.
    Summary,
}

/// The extraction target, shared by `extract-method` and `analyze`.
#[derive(Args, Clone, Debug)]
struct TargetArgs {
    /// Source file, relative to the workspace.
    #[arg(long)]
    file: String,
    /// First line to extract (1-based).
    #[arg(long)]
    start: usize,
    /// Last line to extract (1-based, inclusive).
    #[arg(long)]
    end: usize,
    /// Name of the new method.
    #[arg(long)]
    name: String,
    /// Access modifier (default: from config, else the language default).
    #[arg(long)]
    access: Option<String>,
    /// Declare the new method static.
    #[arg(long = "static")]
    is_static: bool,
    /// Source language (default: from the file extension).
    #[arg(long)]
    language: Option<String>,
    /// Fail instead of degrading when the selection both declares and
    /// reassigns variables used afterwards.
    #[arg(long)]
    strict_mixed_returns: bool,
    /// Keep the new method non-static inside static members.
    #[arg(long)]
    no_promote_static: bool,
}

impl TargetArgs {
    fn extract_args(&self) -> ExtractArgs {
        ExtractArgs {
            file: self.file.clone(),
            start_line: self.start,
            end_line: self.end,
            name: self.name.clone(),
            access: self.access.clone(),
            is_static: self.is_static,
            language: self.language.clone(),
        }
    }

    fn overrides(&self, config_path: Option<PathBuf>) -> CliOverrides {
        CliOverrides {
            config_path,
            default_access: None,
            strict_mixed_returns: self.strict_mixed_returns.then_some(true),
            promote_static: self.no_promote_static.then_some(false),
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a line range into a new method (apply-by-default).
    ///
    /// Use --dry-run to preview without modifying the file.
    ExtractMethod {
        #[command(flatten)]
        target: TargetArgs,
        /// Preview changes without applying.
        #[arg(long)]
        dry_run: bool,
        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: ExtractFormat,
    },
    /// Analyze a refactoring without applying it.
    Analyze {
        #[command(subcommand)]
        op: AnalyzeOp,
    },
    /// Restore a file from the backup of a journaled extraction.
    Undo {
        /// Backup or journal entry to revert (default: the most recent).
        #[arg(long)]
        backup_id: Option<String>,
    },
    /// Print the resolved configuration with the source of each value.
    Config,
    /// Run the MCP server on stdio.
    #[cfg(feature = "mcp")]
    Mcp,
}

/// Analyze operations.
#[derive(Subcommand, Clone, Debug)]
enum AnalyzeOp {
    /// Preview an extract-method refactoring.
    ExtractMethod {
        #[command(flatten)]
        target: TargetArgs,
        /// Output format.
        #[arg(long, value_enum, default_value = "diff")]
        format: AnalyzeFormat,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON per the agent contract
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber. `RUST_LOG` overrides `--log-level`.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), TugError> {
    match cli.command {
        Command::ExtractMethod {
            target,
            dry_run,
            format,
        } => execute_extract(&cli.global, &target, dry_run, format),
        Command::Analyze { op } => execute_analyze(&cli.global, op),
        Command::Undo { backup_id } => execute_undo(&cli.global, backup_id.as_deref()),
        Command::Config => execute_config(&cli.global),
        #[cfg(feature = "mcp")]
        Command::Mcp => execute_mcp(),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_extract(
    global: &GlobalArgs,
    target: &TargetArgs,
    dry_run: bool,
    format: ExtractFormat,
) -> Result<(), TugError> {
    let (session, config) = open_session(global, &target.overrides(global.config.clone()))?;
    let output = run_extract_method(&session, &config, &target.extract_args(), !dry_run)?;

    match format {
        ExtractFormat::Json => emit_json(&output),
        ExtractFormat::Diff => {
            print_diff(&output);
            Ok(())
        }
        ExtractFormat::Text => {
            print_summary(&output);
            Ok(())
        }
    }
}

fn execute_analyze(global: &GlobalArgs, op: AnalyzeOp) -> Result<(), TugError> {
    match op {
        AnalyzeOp::ExtractMethod { target, format } => {
            let (session, config) =
                open_session(global, &target.overrides(global.config.clone()))?;
            // Never apply changes
            let output = run_extract_method(&session, &config, &target.extract_args(), false)?;
            match format {
                AnalyzeFormat::Json => emit_json(&output),
                AnalyzeFormat::Diff => {
                    print_diff(&output);
                    Ok(())
                }
                AnalyzeFormat::Summary => {
                    print_summary(&output);
                    Ok(())
                }
            }
        }
    }
}

fn execute_undo(global: &GlobalArgs, backup_id: Option<&str>) -> Result<(), TugError> {
    let overrides = CliOverrides {
        config_path: global.config.clone(),
        ..Default::default()
    };
    let (session, _) = open_session(global, &overrides)?;
    let response = run_undo(&session, backup_id)?;
    emit_json(&response)
}

fn execute_config(global: &GlobalArgs) -> Result<(), TugError> {
    let overrides = CliOverrides {
        config_path: global.config.clone(),
        ..Default::default()
    };
    let config = ResolvedConfig::resolve(&workspace_root(global), &overrides)?;
    emit_json(&config)
}

#[cfg(feature = "mcp")]
fn execute_mcp() -> Result<(), TugError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| TugError::internal(format!("failed to start async runtime: {}", e)))?;
    runtime.block_on(tugextract::mcp::run_mcp_server())
}

// ============================================================================
// Output
// ============================================================================

fn emit_json<T: serde::Serialize>(response: &T) -> Result<(), TugError> {
    emit_response(response, &mut io::stdout()).map_err(|e| TugError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

fn print_diff(output: &ExtractMethodOutput) {
    if output.patch.unified_diff.is_empty() {
        println!("No changes.");
    } else {
        print!("{}", output.patch.unified_diff);
    }
}

fn print_summary(output: &ExtractMethodOutput) {
    let result = &output.result;
    let metadata = &result.metadata;
    let name = metadata
        .get("methodName")
        .and_then(|v| v.as_str())
        .unwrap_or("method");
    let lines = metadata
        .get("linesExtracted")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);

    if output.preview {
        println!("Dry run: would extract {} line(s) of {} into '{}'", lines, output.file, name);
    } else {
        println!("Extracted {} line(s) of {} into '{}'", lines, output.file, name);
    }
    if let Some(plan) = &result.plan {
        println!("  Signature: {}", plan.signature_text);
        println!("  Call:      {}", plan.call_site_text.trim());
    }
    if let Some(strategy) = metadata.get("insertionStrategy").and_then(|v| v.as_str()) {
        println!("  Placement: {}", strategy);
    }
    if !result.diagnostics.is_empty() {
        println!("  Diagnostics:");
        for diagnostic in &result.diagnostics {
            println!("    - {}", diagnostic);
        }
    }
    if let Some(token) = &output.undo_token {
        println!("  Undo token: {}", token);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn workspace_root(global: &GlobalArgs) -> PathBuf {
    global
        .workspace
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Resolve configuration and open the session it (or `--session-dir`) names.
fn open_session(
    global: &GlobalArgs,
    overrides: &CliOverrides,
) -> Result<(Session, ResolvedConfig), TugError> {
    let workspace = workspace_root(global);
    let config = ResolvedConfig::resolve(&workspace, overrides)?;

    let mut options = SessionOptions::default();
    if let Some(dir) = &global.session_dir {
        options.session_dir = Some(dir.clone());
    } else if let Some(dir) = &config.session_dir {
        options.session_dir = Some(workspace.join(&dir.value));
    }

    let session = Session::open(&workspace, options)?;
    Ok((session, config))
}
