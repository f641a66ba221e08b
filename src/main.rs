use anyhow::Context;
use clap::Parser;
use portsweep::cli::Cli;
use portsweep::output;
use portsweep::scanner::{effective_workers, run_scan};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.load_settings().context("failed to load settings")?;
    init_tracing(cli.verbose || settings.verbose);

    let quiet = cli.quiet;
    let config = cli
        .into_config(&settings)
        .await
        .context("invalid scan configuration")?;

    if let Some(requested) = config.threads {
        let used = effective_workers(config.range, requested);
        if used < requested.get() {
            output::print_warning(&format!(
                "{} threads requested but the range only has {} ports; using {}",
                requested,
                config.range.len(),
                used
            ));
        }
    }

    let summary = run_scan(&config, std::io::stdout())
        .await
        .context("scan failed")?;

    if !quiet {
        output::print_summary(&summary);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
