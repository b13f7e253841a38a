// MIT License - Copyright (c) 2026 Peter Wright
// Contact ID receiver library
//
//! # contact-id-bridge
//!
//! Receiver for Ademco Contact ID messages sent by alarm panels (e.g. the
//! Lupus XT1) over a raw TCP connection.
//!
//! Each datagram looks like `[<account> 18<q><eee><gg><zzz>CCCC]`, where
//! `CCCC` is a 16-bit Fletcher checksum of everything between the brackets.
//! The receiver verifies and decodes it, classifies the event code and
//! turns it into outbound effects: a push notification, a home-automation
//! webhook call and an MQTT status message. The panel gets an ACK (`0x06`)
//! for every datagram regardless of outcome.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use contact_id_bridge::{CidReceiver, CodeTable, Config, EffectRunner};
//! use contact_id_bridge::effects::{mqtt::MqttPublisher, pushover::PushoverNotifier, webhook::HttpWebhook};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml")?;
//!     let (host, port) = contact_id_bridge::config::parse_mqtt_url(&config.mqtt.url)?;
//!     let (mqtt, _mqtt_loop) = MqttPublisher::start(&host, port, &config.mqtt.client_id);
//!
//!     let runner = EffectRunner::new(
//!         Arc::new(PushoverNotifier::new(config.pushover_config())),
//!         Arc::new(HttpWebhook::new(std::time::Duration::from_secs(5))?),
//!         Arc::new(mqtt),
//!     );
//!     let receiver = Arc::new(CidReceiver::new(
//!         config.receiver_config(),
//!         Arc::new(CodeTable::builtin()?),
//!         config.dispatch_targets(),
//!         runner,
//!     ));
//!
//!     let listener = receiver.bind().await?;
//!     receiver.serve(listener).await;
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod codes;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod effects;
pub mod error;
pub mod event;
pub mod receiver;
pub mod telegram;
pub mod transport;

// Re-exports for convenience
pub use checksum::fletcher16;
pub use codes::{CodeTable, CodeTableEntry};
pub use config::{Config, ReceiverConfig, ReceiverConfigBuilder};
pub use dispatch::{DispatchTargets, OutboundEffect, Priority, Telemetry, dispatch};
pub use effects::{EffectRunner, Notifier, TelemetryPublisher, WebhookCaller};
pub use error::{BridgeError, ParseError, Result};
pub use event::{Classification, classify};
pub use receiver::{CidReceiver, Decision, stop_serving};
pub use telegram::{Telegram, parse};
