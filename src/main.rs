use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetwatch::client::ApiClient;
use fleetwatch::config::Config;
use fleetwatch::monitor::Monitor;

/// Exit code for hard operational failures before any verdict
const EXIT_OPERATIONAL_FAILURE: i32 = 2;

#[derive(Parser)]
#[command(
    name = "fleetwatch",
    version,
    about = "Fleet-readiness validator for digital-signage deployments",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full validation pass and exit with the readiness verdict
    Run,

    /// Probe the API health endpoints only, without authenticating
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_format, cli.verbose) {
        eprintln!("failed to initialize logging: {e}");
        std::process::exit(EXIT_OPERATIONAL_FAILURE);
    }

    let code = match execute(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "run aborted before a verdict");
            EXIT_OPERATIONAL_FAILURE
        }
    };

    std::process::exit(code);
}

async fn execute(command: Commands) -> anyhow::Result<i32> {
    match command {
        Commands::Run => {
            let config = Config::from_env()?;
            tracing::info!(api_url = %config.api_url, "fleetwatch validation starting");
            let monitor = Monitor::new(config)?;
            let readiness = monitor.run().await?;
            Ok(readiness.exit_code())
        }

        Commands::Health => {
            // Unauthenticated: no credentials required in the environment
            let (api_url, timeout) = Config::probe_from_env()?;
            let client = ApiClient::with_base_url(&api_url, timeout)?;
            let health = client.probe_health().await;

            let mut names: Vec<_> = health.services.keys().collect();
            names.sort();
            for name in names {
                println!("{name}: {}", health.services[name]);
            }
            println!("healthy: {}", health.healthy);

            Ok(if health.healthy { 0 } else { 1 })
        }
    }
}

fn setup_tracing(format: &str, verbose: bool) -> anyhow::Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("fleetwatch=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("fleetwatch=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
