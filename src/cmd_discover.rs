//! Discovery subcommand handlers.

use devwire_config::Config;
use devwire_protocol::{discover_browser, list_targets};

/// Print the peer's version info.
pub(crate) async fn version(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let version = discover_browser(&config.connection.endpoint).await?;
    println!("Browser:          {}", version.browser);
    println!("Protocol-Version: {}", version.protocol_version);
    println!("User-Agent:       {}", version.user_agent);
    if let Some(ref v8) = version.v8_version {
        println!("V8-Version:       {}", v8);
    }
    println!("WebSocket:        {}", version.web_socket_debugger_url);
    Ok(())
}

/// Print one line per debuggable target.
pub(crate) async fn targets(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let targets = list_targets(&config.connection.endpoint).await?;
    if targets.is_empty() {
        println!("No targets.");
        return Ok(());
    }

    println!("{:<34} {:<16} {}", "ID", "TYPE", "URL");
    println!("{}", "-".repeat(80));
    for target in targets {
        println!("{:<34} {:<16} {}", target.id, target.target_type, target.url);
    }
    Ok(())
}
