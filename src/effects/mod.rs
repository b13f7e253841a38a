// MIT License - Copyright (c) 2026 Peter Wright
// External collaborators and effect execution

pub mod mqtt;
pub mod pushover;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::dispatch::{OutboundEffect, Priority};
use crate::error::Result;

/// Push notification delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// `High` priority implies extended retry/expiry on the service side.
    async fn send(&self, priority: Priority, title: &str, body: &str) -> Result<()>;
}

/// Home-automation webhook.
#[async_trait]
pub trait WebhookCaller: Send + Sync {
    /// Call the URL. Fails when the call fails or the service reports no success.
    async fn invoke(&self, url: &str) -> Result<()>;
}

/// Telemetry broker.
#[async_trait]
pub trait TelemetryPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: String) -> Result<()>;
}

/// Executes [`OutboundEffect`]s on the configured collaborators.
///
/// Every effect runs in its own task. A failing or slow collaborator only
/// affects its own task; failures are logged and dropped.
#[derive(Clone)]
pub struct EffectRunner {
    notifier: Arc<dyn Notifier>,
    webhook: Arc<dyn WebhookCaller>,
    telemetry: Arc<dyn TelemetryPublisher>,
}

impl EffectRunner {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        webhook: Arc<dyn WebhookCaller>,
        telemetry: Arc<dyn TelemetryPublisher>,
    ) -> Self {
        Self {
            notifier,
            webhook,
            telemetry,
        }
    }

    /// Spawn one task per effect and return immediately.
    ///
    /// The handles are only for callers that want to wait (tests, shutdown);
    /// the connection loop drops them.
    pub fn run(&self, effects: Vec<OutboundEffect>) -> Vec<JoinHandle<()>> {
        effects
            .into_iter()
            .map(|effect| {
                let runner = self.clone();
                tokio::spawn(async move { runner.execute(effect).await })
            })
            .collect()
    }

    async fn execute(&self, effect: OutboundEffect) {
        match effect {
            OutboundEffect::Notify {
                priority,
                title,
                body,
            } => {
                debug!("Sending {:?} notification: {}", priority, body);
                if let Err(e) = self.notifier.send(priority, &title, &body).await {
                    error!("Error while sending notification: {}", e);
                }
            }
            OutboundEffect::WebhookCall { url } => {
                debug!("Calling webhook");
                if let Err(e) = self.webhook.invoke(&url).await {
                    error!("Failed to send command: {}", e);
                }
            }
            OutboundEffect::TelemetryPublish { topic, value } => {
                let payload = match mqtt::telemetry_json(value, mqtt::now_epoch_ms()) {
                    Ok(p) => p,
                    Err(e) => {
                        error!("Failed to serialize telemetry payload: {}", e);
                        return;
                    }
                };
                if let Err(e) = self.telemetry.publish(&topic, payload).await {
                    error!("Failed to publish to {}: {}", topic, e);
                }
            }
        }
    }
}
