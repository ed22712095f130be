//! CLI definitions for devwire.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// devwire CLI.
#[derive(Parser)]
#[command(name = "devwire")]
#[command(about = "Chrome DevTools Protocol client")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "devwire.toml", global = true)]
    pub config: PathBuf,

    /// HTTP discovery endpoint (overrides connection.endpoint)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Browser WebSocket URL; skips discovery (overrides connection.ws_url)
    #[arg(long, global = true)]
    pub ws_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the peer's /json/version
    Version,

    /// List debuggable targets from /json/list
    Targets,

    /// Send one command and print its result
    Call {
        /// Method name, e.g. Target.getTargets
        method: String,

        /// Params as a JSON object
        #[arg(long)]
        params: Option<String>,

        /// Target session to send the command on
        #[arg(long)]
        session: Option<String>,

        /// Timeout in seconds (overrides client.command_timeout_secs, 0 waits forever)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Stream events as JSON lines until interrupted
    Watch {
        /// Method filter: "*", a domain ("Network") or a method ("Page.loadEventFired")
        #[arg(long, default_value = "*")]
        method: String,

        /// Only events from this session
        #[arg(long, conflicts_with = "root")]
        session: Option<String>,

        /// Only browser-level events (no session)
        #[arg(long)]
        root: bool,
    },
}
