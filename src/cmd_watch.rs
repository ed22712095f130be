//! `watch` subcommand: stream events as JSON lines.

use tracing::info;

use devwire_config::Config;
use devwire_protocol::{MethodFilter, SessionFilter, SessionId};

fn session_filter(session: Option<String>, root: bool) -> SessionFilter {
    match session {
        Some(id) => SessionFilter::Only(SessionId::from(id)),
        None if root => SessionFilter::Root,
        None => SessionFilter::Any,
    }
}

pub(crate) async fn watch(
    config: &Config,
    method: &str,
    session: Option<String>,
    root: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = crate::connect(config).await?;
    let filter = MethodFilter::parse(method);
    let sessions = session_filter(session, root);
    info!(?filter, ?sessions, "watching events, Ctrl-C to stop");

    let mut events = client.events(filter, sessions);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            event = events.recv() => match event {
                Some(event) => println!("{}", serde_json::to_string(&event)?),
                None => {
                    info!("Connection closed by peer");
                    break;
                }
            },
        }
    }

    client.close().await;
    Ok(())
}
