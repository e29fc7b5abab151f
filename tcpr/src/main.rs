//! tcpr - command-line entry point
//!
//! Loads configuration, installs logging, builds the prediction context from
//! the artifact directory and runs one subcommand. A context that fails to
//! load ends the process before any input is read.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tcpr::export::{format_duration, format_pass_rate};
use tcpr::parser::display_step;
use tcpr::ranking::RankingSession;
use tcpr::{CaseReport, ExportFormat, Exporter, PredictionContext, SortMode};
use tcpr_common::config::{
    resolve_log_level, ArtifactsDirResolver, TomlConfig, ARTIFACTS_DIR_ENV, LOG_LEVEL_ENV,
};

/// Command-line arguments for tcpr
#[derive(Parser, Debug)]
#[command(name = "tcpr")]
#[command(about = "Test case duration / pass-rate prediction and priority ranking")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the pre-trained artifacts
    #[arg(long, global = true, env = ARTIFACTS_DIR_ENV)]
    artifacts_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a single test case line without predicting
    Validate {
        /// Test case line: `TCID, step_count, 1-step; 2-step; ...`
        line: String,
    },

    /// Predict duration, pass rate and similar cases for one test case
    Predict {
        /// Test case line: `TCID, step_count, 1-step; 2-step; ...`
        line: String,
    },

    /// Predict and rank a batch of test cases, one per line
    Rank {
        /// Batch file, `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Sort mode: priority, duration, pass-rate or tcid
        #[arg(short, long)]
        sort: Option<SortMode>,

        /// Write an export of the ranked batch: text, csv or paginated
        #[arg(short, long)]
        export: Option<ExportFormat>,

        /// Export destination (stdout when omitted)
        #[arg(short, long, requires = "export")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let Args {
        config: config_path,
        artifacts_dir,
        log_level,
        command,
    } = Args::parse();

    // Config first: it feeds the log filter
    let config = TomlConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    let level = resolve_log_level(log_level.as_deref(), &config);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting tcpr v{}", env!("CARGO_PKG_VERSION"));

    match command {
        // Validation needs no models
        Command::Validate { line } => Ok(run_validate(&line)),
        Command::Predict { line } => {
            let context = load_context(artifacts_dir, &config)?;
            Ok(run_predict(&context, &line))
        }
        Command::Rank {
            input,
            sort,
            export,
            output,
        } => {
            let mode = match sort {
                Some(mode) => mode,
                None => config
                    .ranking
                    .default_sort
                    .parse::<SortMode>()
                    .context("Invalid ranking.default_sort in configuration")?,
            };
            let context = load_context(artifacts_dir, &config)?;
            let batch = read_input(&input)?;
            let session = match context.rank_batch(&batch, mode) {
                Ok(session) => session,
                Err(e) => return Ok(report_failure(&e)),
            };
            print_ranking(&session);

            if let Some(format) = export {
                let exporter = Exporter::new(format)
                    .with_cases_per_page(config.export.cases_per_page)
                    .with_timestamp(chrono::Local::now());
                write_export(&exporter, &session, output.as_deref())?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolve the artifact directory and load every artifact; any failure is fatal
fn load_context(cli_dir: Option<PathBuf>, config: &TomlConfig) -> Result<PredictionContext> {
    let artifacts_dir = ArtifactsDirResolver::new(cli_dir, config).resolve();
    let paths = config.artifact_paths(&artifacts_dir);
    PredictionContext::load(&paths).with_context(|| {
        format!(
            "Failed to load prediction artifacts from {}",
            artifacts_dir.display()
        )
    })
}

fn run_validate(line: &str) -> ExitCode {
    match tcpr::parse_line(line) {
        Ok(case) => {
            println!(
                "Valid: {} ({} steps)",
                case.id, case.declared_step_count
            );
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&tcpr::Error::from(e)),
    }
}

fn run_predict(context: &PredictionContext, line: &str) -> ExitCode {
    match context.predict_line(line) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}

/// Show the user-facing message and map to a failing exit code
fn report_failure(error: &tcpr::Error) -> ExitCode {
    debug!("Request failed: {:?}", error);
    eprintln!("{}", error.user_message());
    ExitCode::FAILURE
}

fn print_report(report: &CaseReport<'_>) {
    let result = &report.result;
    println!("TCID:      {}", result.case_id);
    println!("Duration:  {}s", format_duration(result.predicted_duration));
    println!("Pass Rate: {}%", format_pass_rate(result.predicted_pass_rate));

    if report.neighbors.is_empty() {
        println!("Similar cases: none");
        return;
    }
    println!("Similar cases:");
    for neighbor in &report.neighbors {
        println!("  {} (similarity {:.3})", neighbor.id, neighbor.similarity);
        match neighbor.details {
            Some(details) => {
                if !details.steps.is_empty() {
                    println!("    Steps:    {}", details.steps);
                }
                if let Some(duration) = details.duration {
                    println!("    Duration: {}s", format_duration(duration));
                }
                if let Some(verdict) = details.result {
                    println!("    Result:   {}", verdict);
                }
            }
            None => println!("    (no stored details)"),
        }
    }
}

fn print_ranking(session: &RankingSession) {
    println!("Sorted by: {}", session.mode());
    println!(
        "{:>4}  {:<12} {:>10} {:>10} {:>10}  Steps",
        "#", "TCID", "Duration", "Pass Rate", "Priority"
    );
    for (rank, case) in session.ranked().enumerate() {
        let result = &case.result;
        let priority = case
            .priority_value()
            .map(|p| format!("{:.4}", p))
            .unwrap_or_else(|| "n/a".to_string());
        let steps: Vec<String> = result
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, display_step(step)))
            .collect();
        println!(
            "{:>4}  {:<12} {:>9}s {:>9}% {:>10}  {}",
            rank + 1,
            result.case_id,
            format_duration(result.predicted_duration),
            format_pass_rate(result.predicted_pass_rate),
            priority,
            steps.join("  ")
        );
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read batch from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file {}", path.display()))
    }
}

fn write_export(exporter: &Exporter, session: &RankingSession, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create export file {}", path.display()))?;
            exporter
                .write_to(session, &mut file)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            info!("Exported {} cases to {}", session.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            exporter
                .write_to(session, &mut stdout.lock())
                .context("Failed to write export to stdout")?;
        }
    }
    Ok(())
}
