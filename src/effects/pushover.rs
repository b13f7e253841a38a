// MIT License - Copyright (c) 2026 Peter Wright
// Pushover notifier

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dispatch::Priority;
use crate::effects::Notifier;
use crate::error::{BridgeError, Result};

/// Pushover message API endpoint.
pub const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Pushover priority levels used by the bridge.
const PRIORITY_NORMAL: i8 = 0;
const PRIORITY_EMERGENCY: i8 = 2;

/// Credentials and emergency-delivery settings.
#[derive(Debug, Clone)]
pub struct PushoverConfig {
    pub api_url: String,
    pub user: String,
    pub token: String,
    /// Seconds between repeats of an emergency message until acknowledged.
    pub retry_secs: u32,
    /// Seconds after which an unacknowledged emergency message stops repeating.
    pub expire_secs: u32,
}

/// Form body of a message request.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PushoverMessage<'a> {
    pub token: &'a str,
    pub user: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub priority: i8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct PushoverResponse {
    status: i64,
    #[serde(default)]
    errors: Vec<String>,
}

/// Sends notifications through the Pushover API.
pub struct PushoverNotifier {
    config: PushoverConfig,
    http: reqwest::Client,
}

impl PushoverNotifier {
    pub fn new(config: PushoverConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Build the request body. High priority becomes an emergency message
    /// that repeats until acknowledged or expired.
    pub fn message<'a>(
        &'a self,
        priority: Priority,
        title: &'a str,
        body: &'a str,
    ) -> PushoverMessage<'a> {
        let (priority, retry, expire) = match priority {
            Priority::Normal => (PRIORITY_NORMAL, None, None),
            Priority::High => (
                PRIORITY_EMERGENCY,
                Some(self.config.retry_secs),
                Some(self.config.expire_secs),
            ),
        };
        PushoverMessage {
            token: &self.config.token,
            user: &self.config.user,
            title,
            message: body,
            priority,
            retry,
            expire,
        }
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn send(&self, priority: Priority, title: &str, body: &str) -> Result<()> {
        let msg = self.message(priority, title, body);
        let response = self
            .http
            .post(&self.config.api_url)
            .form(&msg)
            .send()
            .await?;

        let status = response.status();
        let reply: PushoverResponse = response.json().await?;
        if !status.is_success() || reply.status != 1 {
            return Err(BridgeError::Notify {
                details: format!("HTTP {}: {}", status, reply.errors.join(", ")),
            });
        }
        debug!("Pushover accepted {:?} message", priority);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> PushoverNotifier {
        PushoverNotifier::new(PushoverConfig {
            api_url: PUSHOVER_API_URL.to_string(),
            user: "u123".to_string(),
            token: "a456".to_string(),
            retry_secs: 30,
            expire_secs: 36000,
        })
    }

    #[test]
    fn test_normal_message() {
        let n = notifier();
        let msg = n.message(Priority::Normal, "Lupus XT1", "armed");
        assert_eq!(
            msg,
            PushoverMessage {
                token: "a456",
                user: "u123",
                title: "Lupus XT1",
                message: "armed",
                priority: 0,
                retry: None,
                expire: None,
            }
        );
    }

    #[test]
    fn test_high_priority_is_emergency() {
        let n = notifier();
        let msg = n.message(Priority::High, "Lupus XT1", "ALARM");
        assert_eq!(msg.priority, 2);
        assert_eq!(msg.retry, Some(30));
        assert_eq!(msg.expire, Some(36000));
    }

    #[test]
    fn test_normal_message_omits_retry_fields() {
        let n = notifier();
        let json = serde_json::to_value(n.message(Priority::Normal, "t", "m")).unwrap();
        assert!(json.get("retry").is_none());
        assert!(json.get("expire").is_none());
    }
}
