//! HTTP endpoint discovery (`/json/version`, `/json/list`).

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::CdpError;

/// Browser version info.
///
/// Note: Chrome returns PascalCase field names for this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,
    #[serde(rename = "V8-Version")]
    pub v8_version: Option<String>,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// Target info from the `/json/list` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
    pub dev_tools_frontend_url: Option<String>,
}

/// Validate an HTTP discovery endpoint and strip any trailing slash.
pub fn normalize_endpoint(endpoint: &str) -> Result<String, CdpError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(CdpError::InvalidUrl(format!(
            "expected http:// or https:// endpoint, got {}://",
            other
        ))),
    }
}

/// Fetch browser version info, including the browser-level WebSocket URL.
pub async fn discover_browser(endpoint: &str) -> Result<BrowserVersion, CdpError> {
    let endpoint = normalize_endpoint(endpoint)?;
    let version_url = format!("{}/json/version", endpoint);
    debug!("Fetching browser version from {}", version_url);

    let version: BrowserVersion = reqwest::get(&version_url)
        .await
        .map_err(|e| CdpError::PeerUnavailable(format!("{}: {}", endpoint, e)))?
        .error_for_status()
        .map_err(|e| CdpError::PeerUnavailable(format!("{}: {}", endpoint, e)))?
        .json()
        .await?;

    debug!(
        "Discovered browser {} (protocol {})",
        version.browser, version.protocol_version
    );
    Ok(version)
}

/// List debuggable targets.
pub async fn list_targets(endpoint: &str) -> Result<Vec<TargetDescriptor>, CdpError> {
    let endpoint = normalize_endpoint(endpoint)?;
    let url = format!("{}/json/list", endpoint);
    let targets: Vec<TargetDescriptor> = reqwest::get(&url)
        .await
        .map_err(|e| CdpError::PeerUnavailable(format!("{}: {}", endpoint, e)))?
        .error_for_status()?
        .json()
        .await?;
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_slash() {
        assert_eq!(
            normalize_endpoint("http://localhost:9222/").unwrap(),
            "http://localhost:9222"
        );
    }

    #[test]
    fn test_normalize_rejects_ws_scheme() {
        assert!(matches!(
            normalize_endpoint("ws://localhost:9222"),
            Err(CdpError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_endpoint("localhost").is_err());
    }

    #[test]
    fn test_browser_version_deserialize() {
        let json = r#"{
            "Browser": "Chrome/120.0.6099.109",
            "Protocol-Version": "1.3",
            "User-Agent": "Mozilla/5.0",
            "V8-Version": "12.0.267.8",
            "WebKit-Version": "537.36",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
        }"#;
        let version: BrowserVersion = serde_json::from_str(json).unwrap();
        assert_eq!(version.protocol_version, "1.3");
        assert!(version.web_socket_debugger_url.ends_with("/browser/abc"));
    }

    #[test]
    fn test_target_descriptor_deserialize() {
        let json = r#"{
            "id": "page123",
            "type": "page",
            "title": "Test",
            "url": "https://example.com",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
        }"#;
        let info: TargetDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(info.id, "page123");
        assert_eq!(info.target_type, "page");
        assert!(info.dev_tools_frontend_url.is_none());
    }

    #[tokio::test]
    async fn test_discover_unreachable_peer() {
        let err = discover_browser("http://127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, CdpError::PeerUnavailable(_)));
    }
}
