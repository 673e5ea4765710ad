use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use water_data_filter::app::{App, ProgressEvent, ProgressSink, RunSummary};
use water_data_filter::config::ConfigLoader;
use water_data_filter::error::FilterError;
use water_data_filter::output::{ConsoleOutput, JsonOutput, OutputMode};
use water_data_filter::portal::PortalHttpClient;

#[derive(Parser)]
#[command(name = "water-filter")]
#[command(about = "Rank open-data water datasets and write a config for the best one")]
#[command(version, author)]
struct Cli {
    /// JSON settings file (defaults to ./water-filter.json when present)
    #[arg(long)]
    config: Option<String>,

    /// Print a JSON run summary instead of progress lines
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<FilterError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &FilterError) -> u8 {
    if error.is_config() { 2 } else { 1 }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let client = PortalHttpClient::new(config.search.timeout)?;
    let app = App::new(config, client);

    let now = chrono::Utc::now();
    match output_mode {
        OutputMode::Text => {
            let summary = app.run(now, &ConsoleOutput)?;
            print_failures(&summary, &ConsoleOutput);
        }
        OutputMode::Json => {
            let summary = app.run(now, &JsonOutput)?;
            JsonOutput::print_summary(&summary).into_diagnostic()?;
        }
    }
    Ok(())
}

fn print_failures(summary: &RunSummary, sink: &dyn ProgressSink) {
    if summary.failures.is_empty() {
        return;
    }
    let names = summary
        .failures
        .iter()
        .map(|f| f.source_id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    sink.event(ProgressEvent {
        message: format!("Skipped portal(s): {names}"),
        elapsed: None,
    });
}
