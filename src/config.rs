// MIT License - Copyright (c) 2026 Peter Wright
// Configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::DEFAULT_MAX_DATAGRAM_LEN;
use crate::dispatch::DispatchTargets;
use crate::effects::pushover::{PUSHOVER_API_URL, PushoverConfig};
use crate::error::{BridgeError, Result};

/// Root of the TOML configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listener: ListenerToml,
    pub webhook: WebhookToml,
    pub pushover: PushoverToml,
    pub mqtt: MqttToml,
    #[serde(default)]
    pub codes: CodesToml,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenerToml {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_datagram_len")]
    pub max_datagram_len: usize,
}

impl Default for ListenerToml {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_datagram_len: default_max_datagram_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookToml {
    /// Called on disarm.
    pub activate_home_url: String,
    /// Called on arm.
    pub deactivate_home_url: String,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushoverToml {
    pub user: String,
    pub token: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_pushover_api_url")]
    pub api_url: String,
    #[serde(default = "default_retry")]
    pub retry_secs: u32,
    #[serde(default = "default_expire")]
    pub expire_secs: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttToml {
    pub url: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_status_topic")]
    pub status_topic: String,
    #[serde(default = "default_ping_topic")]
    pub ping_topic: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodesToml {
    /// JSON code table; the built-in table is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    1234
}
fn default_max_datagram_len() -> usize {
    DEFAULT_MAX_DATAGRAM_LEN
}
fn default_webhook_timeout() -> u64 {
    5000
}
fn default_title() -> String {
    "Lupus XT1".to_string()
}
fn default_pushover_api_url() -> String {
    PUSHOVER_API_URL.to_string()
}
fn default_retry() -> u32 {
    30
}
fn default_expire() -> u32 {
    36000
}
fn default_client_id() -> String {
    "cid2mqtt".to_string()
}
fn default_status_topic() -> String {
    "alarm/status".to_string()
}
fn default_ping_topic() -> String {
    "alarm/ping".to_string()
}

impl Config {
    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| BridgeError::Config {
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Reject empty required values. Anything caught here is fatal at startup.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("webhook.activate_home_url", &self.webhook.activate_home_url),
            ("webhook.deactivate_home_url", &self.webhook.deactivate_home_url),
            ("pushover.user", &self.pushover.user),
            ("pushover.token", &self.pushover.token),
            ("mqtt.url", &self.mqtt.url),
            ("mqtt.status_topic", &self.mqtt.status_topic),
            ("mqtt.ping_topic", &self.mqtt.ping_topic),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(BridgeError::Config {
                details: format!("{} must not be empty", name),
            });
        }
        if self.listener.max_datagram_len == 0 {
            return Err(BridgeError::Config {
                details: "listener.max_datagram_len must be positive".to_string(),
            });
        }
        parse_mqtt_url(&self.mqtt.url)?;
        Ok(())
    }

    pub fn receiver_config(&self) -> ReceiverConfig {
        ReceiverConfig::builder()
            .bind_address(&self.listener.bind_address)
            .port(self.listener.port)
            .max_datagram_len(self.listener.max_datagram_len)
            .build()
    }

    pub fn dispatch_targets(&self) -> DispatchTargets {
        DispatchTargets {
            activate_home_url: self.webhook.activate_home_url.clone(),
            deactivate_home_url: self.webhook.deactivate_home_url.clone(),
            status_topic: self.mqtt.status_topic.clone(),
            ping_topic: self.mqtt.ping_topic.clone(),
            notify_title: self.pushover.title.clone(),
        }
    }

    pub fn pushover_config(&self) -> PushoverConfig {
        PushoverConfig {
            api_url: self.pushover.api_url.clone(),
            user: self.pushover.user.clone(),
            token: self.pushover.token.clone(),
            retry_secs: self.pushover.retry_secs,
            expire_secs: self.pushover.expire_secs,
        }
    }
}

/// Parse an MQTT URL like "mqtt://host:port" into (host, port).
pub fn parse_mqtt_url(url: &str) -> Result<(String, u16)> {
    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port_str) = stripped.rsplit_once(':').ok_or_else(|| BridgeError::Config {
        details: format!("MQTT URL must be in format mqtt://host:port, got {}", url),
    })?;
    if host.is_empty() {
        return Err(BridgeError::Config {
            details: format!("MQTT URL has no host: {}", url),
        });
    }

    let port: u16 = port_str.parse().map_err(|_| BridgeError::Config {
        details: format!("Invalid MQTT port number: {}", port_str),
    })?;

    Ok((host.to_string(), port))
}

/// Listener settings for [`CidReceiver`](crate::receiver::CidReceiver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Address to bind (default: 0.0.0.0)
    pub bind_address: String,
    /// TCP port the panel connects to (default: 1234)
    pub port: u16,
    /// Longest accepted datagram in bytes (default: 1024)
    pub max_datagram_len: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_datagram_len: DEFAULT_MAX_DATAGRAM_LEN,
        }
    }
}

impl ReceiverConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> ReceiverConfigBuilder {
        ReceiverConfigBuilder::default()
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Builder for ReceiverConfig.
#[derive(Debug, Clone, Default)]
pub struct ReceiverConfigBuilder {
    config: ReceiverConfig,
}

impl ReceiverConfigBuilder {
    pub fn bind_address(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_address = addr.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn max_datagram_len(mut self, len: usize) -> Self {
        self.config.max_datagram_len = len;
        self
    }

    pub fn build(self) -> ReceiverConfig {
        self.config
    }
}
