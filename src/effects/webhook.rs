// MIT License - Copyright (c) 2026 Peter Wright
// Home-automation webhook

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Duration;
use tracing::debug;

use crate::effects::WebhookCaller;
use crate::error::{BridgeError, Result};

/// The service answers with a JSON object carrying a boolean `success`.
#[derive(Debug, Deserialize)]
pub struct WebhookResponse {
    #[serde(default)]
    pub success: bool,
}

/// Calls webhook URLs with a plain GET.
///
/// URLs may carry credentials in the query string, so they are never logged.
pub struct HttpWebhook {
    http: reqwest::Client,
}

impl HttpWebhook {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WebhookCaller for HttpWebhook {
    async fn invoke(&self, url: &str) -> Result<()> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let reply: WebhookResponse = response.json().await?;
        check_reply(status.is_success(), &reply, url)?;
        debug!("Webhook call succeeded");
        Ok(())
    }
}

fn check_reply(http_ok: bool, reply: &WebhookResponse, url: &str) -> Result<()> {
    if http_ok && reply.success {
        Ok(())
    } else {
        Err(BridgeError::WebhookRejected {
            url: redact(url),
        })
    }
}

/// Drop the query string, which is where the credentials live.
fn redact(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?...", base),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> WebhookResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_success_reply() {
        assert!(check_reply(true, &reply(r#"{"success": true}"#), "http://nvr/x").is_ok());
    }

    #[test]
    fn test_failure_reply() {
        let err = check_reply(true, &reply(r#"{"success": false, "error": {"code": 105}}"#), "http://nvr/x")
            .unwrap_err();
        assert!(matches!(err, BridgeError::WebhookRejected { .. }));
    }

    #[test]
    fn test_missing_success_field_is_failure() {
        assert!(check_reply(true, &reply("{}"), "http://nvr/x").is_err());
    }

    #[test]
    fn test_http_error_is_failure() {
        assert!(check_reply(false, &reply(r#"{"success": true}"#), "http://nvr/x").is_err());
    }

    #[test]
    fn test_rejected_url_is_redacted() {
        let err = check_reply(
            true,
            &reply("{}"),
            "http://nvr:5000/webapi/entry.cgi?account=homemode&password=secret",
        )
        .unwrap_err();
        let text = err.to_string();
        assert!(!text.contains("secret"));
        assert!(text.contains("http://nvr:5000/webapi/entry.cgi?..."));
    }
}
