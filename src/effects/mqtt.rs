// MIT License - Copyright (c) 2026 Peter Wright
// MQTT telemetry publisher

use async_trait::async_trait;
use chrono::Utc;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info};

use crate::dispatch::Telemetry;
use crate::effects::TelemetryPublisher;
use crate::error::{BridgeError, Result};

// Published messages share a flat {now, ...} structure

#[derive(Serialize)]
struct MqttStatus {
    now: u64,
    status: u8,
}

#[derive(Serialize)]
struct MqttPing {
    now: u64,
    ping: u8,
}

pub fn now_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// JSON payload for a telemetry value.
pub fn telemetry_json(value: Telemetry, now: u64) -> Result<String> {
    let json = match value {
        Telemetry::Status(status) => serde_json::to_string(&MqttStatus { now, status }),
        Telemetry::Ping(ping) => serde_json::to_string(&MqttPing { now, ping }),
    };
    json.map_err(|e| BridgeError::Mqtt {
        details: e.to_string(),
    })
}

/// Publishes telemetry through a `rumqttc` client.
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Create the client and spawn the task that drives its event loop.
    ///
    /// rumqttc only makes progress while the event loop is polled, so the
    /// returned handle must stay alive as long as the publisher is used.
    pub fn start(host: &str, port: u16, client_id: &str) -> (Self, JoinHandle<()>) {
        let mut opts = MqttOptions::new(client_id, host, port);
        opts.set_keep_alive(Duration::from_secs(30));
        let (client, eventloop) = AsyncClient::new(opts, 64);
        info!("MQTT: connecting to {}:{} as {}", host, port, client_id);
        let handle = tokio::spawn(poll_event_loop(eventloop));
        (Self { client }, handle)
    }
}

async fn poll_event_loop(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("MQTT: connected");
            }
            Ok(_) => {}
            Err(e) => {
                error!("MQTT event loop error: {}", e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

#[async_trait]
impl TelemetryPublisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        debug!("MQTT: publishing to {}: {}", topic, payload);
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_payload() {
        let json = telemetry_json(Telemetry::Status(50), 1738900000000).unwrap();
        assert_eq!(json, r#"{"now":1738900000000,"status":50}"#);
    }

    #[test]
    fn test_ping_payload() {
        let json = telemetry_json(Telemetry::Ping(1), 0).unwrap();
        assert_eq!(json, r#"{"now":0,"ping":1}"#);
    }

    #[test]
    fn test_now_is_recent() {
        // 2024-01-01T00:00:00Z
        assert!(now_epoch_ms() > 1_704_067_200_000);
    }
}
