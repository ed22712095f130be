//! devwire - Chrome DevTools Protocol client
//!
//! Main entry point for the devwire CLI.

mod cli;
mod cmd_call;
mod cmd_discover;
mod cmd_watch;

use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use devwire_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use devwire_protocol::{CdpClient, CdpError};

use crate::cli::{Cli, Commands};

/// Initialize tracing with console and optional file output.
///
/// Console output goes to stderr so stdout stays clean for JSON results.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file = if logging.file {
        let log_dir = logging.log_dir();
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("devwire")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The guard flushes on drop; keep it for the life of the process.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = ConfigLoader::load_or_default(&cli.config)?;
    if let Some(ref endpoint) = cli.endpoint {
        config.connection.endpoint = endpoint.clone();
    }
    if let Some(ref ws_url) = cli.ws_url {
        config.connection.ws_url = Some(ws_url.clone());
    }
    Ok(config)
}

/// Connect using the configured WebSocket URL, or discover it.
pub(crate) async fn connect(config: &Config) -> Result<CdpClient, CdpError> {
    match config.connection.ws_url {
        Some(ref ws_url) => CdpClient::connect(ws_url).await,
        None => CdpClient::connect_endpoint(&config.connection.endpoint).await,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging)?;
    debug!("Loaded configuration from {}", cli.config.display());

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        let messages: Vec<String> = validation
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        return Err(format!("invalid configuration: {}", messages.join("; ")).into());
    }

    match cli.command {
        Commands::Version => cmd_discover::version(&config).await,
        Commands::Targets => cmd_discover::targets(&config).await,
        Commands::Call {
            method,
            params,
            session,
            timeout,
        } => cmd_call::call(&config, &method, params.as_deref(), session, timeout).await,
        Commands::Watch {
            method,
            session,
            root,
        } => cmd_watch::watch(&config, &method, session, root).await,
    }
}
