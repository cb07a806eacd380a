//! template-pr - render pipeline templates into repositories and open PRs
//!
//! Serves the onboarding API by default; `run` processes a file locally.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use template_pr::config::AppConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

#[derive(Parser)]
#[command(name = "template-pr")]
#[command(about = "Render HDPV2/IKP pipeline templates into repositories and open PRs")]
#[command(version)]
struct Cli {
    /// Automation script (overrides AUTOMATION_SCRIPT)
    #[arg(long, global = true)]
    script: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Bind address (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Process a CSV or Excel file without the HTTP service
    Run {
        /// Input file (csv, xlsx or xls)
        #[arg(long)]
        csv: PathBuf,

        /// Render templates without opening PRs
        #[arg(long)]
        dry_run: bool,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test the configured token
    Test {
        /// Host to test against (enterprise hostname or github.com)
        #[arg(long, default_value = "github.com")]
        host: String,
    },
    /// Show authentication setup instructions
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "template_pr=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(script) = cli.script {
        config.script = script;
    }

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cli::run_serve(config).await?;
        }
        Commands::Run { csv, dry_run } => {
            let all_succeeded = cli::run_batch(&config, &csv, dry_run).await?;
            if !all_succeeded {
                std::process::exit(1);
            }
        }
        Commands::Auth { action } => match action {
            AuthAction::Test { host } => cli::run_auth_test(&config, &host).await?,
            AuthAction::Setup => cli::run_auth_setup(),
        },
    }

    Ok(())
}
