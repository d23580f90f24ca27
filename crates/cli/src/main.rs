use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use playground_engine::host::CheckHost;
use playground_engine::{CopyOutcome, ReportSink, Session, SessionError, TestResult};
use playground_value::format_value;

mod config;
#[cfg(feature = "serve")]
mod serve;

use config::{resolve_inputs, CustomOverrides, FileConfig};

#[derive(Parser)]
#[command(
    name = "playground",
    about = "Check playground: run built-in checks plus one custom expression"
)]
struct Cli {
    /// Log at debug level, ignoring RUST_LOG and the config file.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// JSON config file with custom inputs and a log level.
    #[arg(long, global = true, env = "PLAYGROUND_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every active case and print the report.
    Run {
        #[command(flatten)]
        custom: CustomArgs,
        /// Print results and summary as JSON.
        #[arg(long)]
        json: bool,
        /// Also write the report text to this file.
        #[arg(long)]
        copy_to: Option<PathBuf>,
    },
    /// List the active cases with their expected output.
    List {
        #[command(flatten)]
        custom: CustomArgs,
        #[arg(long)]
        json: bool,
    },
    /// Evaluate an expression and print the formatted value.
    Eval {
        /// Expression source, e.g. "Math.pow(2, 8)"
        expr: String,
    },
    /// Dump the parsed tree of an expression as JSON.
    Ast {
        expr: String,
    },
    /// Serve the session as a local JSON API (requires --features serve).
    #[cfg(feature = "serve")]
    Serve {
        #[command(flatten)]
        custom: CustomArgs,
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

/// Custom case fields; each one overrides the config file.
#[derive(Args, Default)]
struct CustomArgs {
    /// Label of the custom case.
    #[arg(long, env = "PLAYGROUND_LABEL")]
    label: Option<String>,
    /// Expression the custom case evaluates.
    #[arg(long, env = "PLAYGROUND_EXPRESSION")]
    expression: Option<String>,
    /// Expected output, compared as text.
    #[arg(long, env = "PLAYGROUND_EXPECTED")]
    expected: Option<String>,
    /// Run only the built-in cases.
    #[arg(long)]
    no_custom: bool,
}

impl CustomArgs {
    fn overrides(&self) -> CustomOverrides {
        CustomOverrides {
            label: self.label.clone(),
            expression: self.expression.clone(),
            expected: self.expected.clone(),
        }
    }

    fn session(&self, file: &FileConfig) -> Session {
        Session::new(resolve_inputs(file, &self.overrides(), self.no_custom))
    }
}

/// Writes the report to a file in place of a clipboard.
struct FileSink(PathBuf);

impl ReportSink for FileSink {
    fn write_report(&mut self, report: &str) -> io::Result<()> {
        fs::write(&self.0, report)
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    init_tracing(cli.verbose, file_config.log_level());
    if let Some(path) = &cli.config {
        debug!(path = %path.display(), "config loaded");
    }

    match cli.command {
        Command::Run { custom, json, copy_to } => {
            let session = custom.session(&file_config);
            let results = run_session(&session)?;
            let summary = playground_engine::summarize(&results);

            if json {
                let out = serde_json::json!({ "results": &*results, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", session.report());
                println!();
                println!("{summary}");
            }

            if let Some(path) = copy_to {
                match session.copy_report(&mut FileSink(path.clone())) {
                    CopyOutcome::Copied => eprintln!("report copied to {}", path.display()),
                    CopyOutcome::Empty => eprintln!("nothing to copy"),
                    CopyOutcome::Failed(msg) => eprintln!("warning: could not copy report: {msg}"),
                }
            }

            if !summary.all_passed() {
                process::exit(1);
            }
        }
        Command::List { custom, json } => {
            let preview = custom.session(&file_config).pending_preview();
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                for case in &preview {
                    println!("{}  {}", case.id, case.label);
                    println!("  Ready to run. Expected output: {}", case.expected);
                }
            }
        }
        Command::Eval { expr } => {
            let value = playground_expr::evaluate_with(&expr, &CheckHost)?;
            println!("{}", format_value(&value));
        }
        Command::Ast { expr } => {
            let tree = playground_expr::parse_expression(&expr)?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        #[cfg(feature = "serve")]
        Command::Serve { custom, port } => {
            serve::run_serve(custom.session(&file_config), port)?;
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn run_session(session: &Session) -> Result<Arc<[TestResult]>, SessionError> {
    session.run().await
}

/// `--verbose` wins, then `RUST_LOG`, then the config file level.
/// Events go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool, fallback: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
