// MIT License - Copyright (c) 2026 Peter Wright
// Contact ID -> Pushover / webhook / MQTT bridge

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::Duration;
use tracing::{info, warn};

use contact_id_bridge::config::parse_mqtt_url;
use contact_id_bridge::effects::mqtt::MqttPublisher;
use contact_id_bridge::effects::pushover::PushoverNotifier;
use contact_id_bridge::effects::webhook::HttpWebhook;
use contact_id_bridge::{CidReceiver, CodeTable, Config, EffectRunner, stop_serving};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "cid2mqtt")]
#[command(about = "Contact ID receiver for alarm panels, bridging events to Pushover, webhooks and MQTT")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

fn load_config(path: &str) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load config file {path}"))
}

fn load_codes(config: &Config) -> Result<CodeTable> {
    match &config.codes.path {
        Some(path) => CodeTable::from_path(path)
            .with_context(|| format!("Failed to load code table {}", path.display())),
        None => CodeTable::builtin().context("Failed to load built-in code table"),
    }
}

/// Everything that lives for one run of the listener.
struct Running {
    listener_handle: tokio::task::JoinHandle<()>,
    mqtt_handle: tokio::task::JoinHandle<()>,
}

impl Running {
    /// Stop the listener and wait until its port is released.
    async fn stop(self) {
        self.mqtt_handle.abort();
        stop_serving(self.listener_handle).await;
    }
}

async fn start(config: &Config) -> Result<Running> {
    let codes = Arc::new(load_codes(config)?);
    info!("Code table ready with {} entries", codes.len());

    let webhook = HttpWebhook::new(Duration::from_millis(config.webhook.timeout_ms))
        .context("Failed to build HTTP client")?;
    let notifier = PushoverNotifier::new(config.pushover_config());

    // Everything fallible except the bind happens before the MQTT task is spawned
    let (mqtt_host, mqtt_port) = parse_mqtt_url(&config.mqtt.url)?;
    let (mqtt, mqtt_handle) = MqttPublisher::start(&mqtt_host, mqtt_port, &config.mqtt.client_id);

    let runner = EffectRunner::new(Arc::new(notifier), Arc::new(webhook), Arc::new(mqtt));
    let receiver = Arc::new(CidReceiver::new(
        config.receiver_config(),
        codes,
        config.dispatch_targets(),
        runner,
    ));

    let listener = match receiver.bind().await {
        Ok(l) => l,
        Err(e) => {
            mqtt_handle.abort();
            return Err(e).context("Failed to start listener");
        }
    };
    receiver.announce_startup();

    let listener_handle = tokio::spawn(Arc::clone(&receiver).serve(listener));
    Ok(Running {
        listener_handle,
        mqtt_handle,
    })
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=contact_id_bridge=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    info!("---- Server starting up ----");
    let mut config = load_config(&cli.config)?;

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let mut running = start(&config).await?;

    loop {
        info!("Receiver running. Send SIGHUP to reload, SIGINT/SIGTERM to stop.");
        let restart = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down...");
                false
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                false
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, reloading config and restarting listener...");
                true
            }
        };

        running.stop().await;

        if !restart {
            break;
        }

        // Reload config from disk; keep previous config on failure
        let reloaded = match load_config(&cli.config) {
            Ok(new_config) => match start(&new_config).await {
                Ok(r) => {
                    config = new_config;
                    info!("Config reloaded successfully");
                    Some(r)
                }
                Err(e) => {
                    warn!("Failed to start with reloaded config, keeping previous: {e:#}");
                    None
                }
            },
            Err(e) => {
                warn!("Failed to reload config, keeping previous: {e:#}");
                None
            }
        };

        running = match reloaded {
            Some(r) => r,
            None => start(&config)
                .await
                .context("Failed to restart with previous config")?,
        };
    }

    info!("Shutdown complete");
    Ok(())
}
