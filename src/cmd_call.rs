//! `call` subcommand: send one command and print the result.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use devwire_config::Config;
use devwire_protocol::SessionId;

/// Parse `--params` into a JSON object.
fn parse_params(raw: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(format!("--params must be a JSON object, got: {}", raw).into());
    }
    Ok(Some(value))
}

/// Resolve the effective timeout: the flag wins, `0` disables.
fn effective_timeout(config: &Config, flag: Option<u64>) -> Option<Duration> {
    match flag {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.client.command_timeout(),
    }
}

pub(crate) async fn call(
    config: &Config,
    method: &str,
    params: Option<&str>,
    session: Option<String>,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = parse_params(params)?;
    let session = session.map(SessionId::from);
    let client = crate::connect(config).await?;

    debug!(method, session = ?session, "sending command");
    let result = match effective_timeout(config, timeout) {
        Some(timeout) => {
            client
                .send_with_timeout(method, params, session.as_ref(), timeout)
                .await
        }
        None => client.send(method, params, session.as_ref()).await,
    };
    client.close().await;

    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}
