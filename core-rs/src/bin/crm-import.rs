//! crm-import - CIDOC-CRM RDF/XML to Omeka S importer
//!
//! Exit status:
//! - 0: import finished cleanly, or a settings template was just written
//! - 1: settings missing, unreadable or invalid (no network traffic)
//! - 2: import aborted
//! - 3: import finished but some items failed to create or patch

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crm_import::config::{legacy_config_beside, ConfigState, ImportConfig, DEFAULT_CONFIG_FILE};
use crm_import::{run_import, Diagnostics, HttpCatalog, ImportError, ImportReport, Phase, Result};

#[derive(Parser)]
#[command(name = "crm-import")]
#[command(version)]
#[command(about = "Import a CIDOC-CRM RDF/XML file into an Omeka S catalog", long_about = None)]
struct Cli {
    /// YAML settings file; written as an empty template when missing.
    /// INI config.ini files of earlier releases are not read
    #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Dump grouped subjects and item payloads (overrides debug.verbose)
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "crm_import=debug" } else { "crm_import=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &ImportReport) {
    info!(
        subjects = report.subjects,
        excluded = report.excluded,
        created = report.created,
        patched = report.patched,
        degraded_links = report.degraded_links,
        failures = report.failures.len(),
        "import finished"
    );

    if report.is_clean() {
        return;
    }

    for phase in [Phase::Create, Phase::Patch] {
        for failure in report.failures_in(phase) {
            eprintln!("  {} failed: {} ({})", phase.as_str(), failure.subject, failure.reason);
        }
    }
    if report.degraded_links > 0 {
        warn!(
            count = report.degraded_links,
            "references to uncreated subjects were sent as plain URIs"
        );
    }
}

/// Build the catalog client and run the import
async fn execute(config: &ImportConfig, verbose: bool) -> Result<ImportReport> {
    let catalog = HttpCatalog::from_settings(&config.api, config.authentication.clone())?;
    run_import(config, &catalog, Diagnostics::stdout(verbose)).await
}

/// Exit status of a run that got past settings validation
fn exit_status(outcome: &Result<ImportReport>) -> i32 {
    match outcome {
        Ok(report) if report.failures.is_empty() => 0,
        Ok(_) => 3,
        Err(_) => 2,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match ImportConfig::load_or_bootstrap(&cli.config) {
        Ok(ConfigState::Bootstrapped(path)) => {
            println!("Created {} file. Fill it to start the import.", path.display());
            if let Some(legacy) = legacy_config_beside(&path) {
                println!(
                    "Found {}: INI settings are no longer read. Copy its [Authentication], [RDF] and [Debug] values into {}.",
                    legacy.display(),
                    path.display()
                );
            }
            return Ok(());
        }
        Ok(ConfigState::Loaded(config)) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let verbose = cli.verbose || config.debug.verbose;
    init_tracing(verbose);

    if let Err(e) = config.validate() {
        match e {
            ImportError::ConfigInvalid(message) => eprintln!("{}", message),
            other => eprintln!("Error: {}", other),
        }
        process::exit(1);
    }

    let outcome = execute(&config, verbose).await;
    match &outcome {
        Ok(report) => print_report(report),
        Err(e) => eprintln!("Import aborted: {}", e),
    }

    match exit_status(&outcome) {
        0 => Ok(()),
        code => process::exit(code),
    }
}
