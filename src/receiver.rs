// MIT License - Copyright (c) 2026 Peter Wright
// Contact ID receiver

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info, warn};

use crate::codes::CodeTable;
use crate::config::ReceiverConfig;
use crate::dispatch::{self, DispatchTargets, OutboundEffect};
use crate::effects::EffectRunner;
use crate::error::{ParseError, Result};
use crate::event::{Classification, classify};
use crate::telegram::{self, Telegram};
use crate::transport::DatagramHandler;
use crate::transport::connection::serve_connection;

/// Outcome of decoding one datagram, before any effect has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub telegram: Telegram,
    pub classification: Classification,
    pub effects: Vec<OutboundEffect>,
}

/// Accepts panel connections and turns their datagrams into effects.
///
/// Holds no per-connection state: the code table is read-only and every
/// connection runs in its own task with its own buffer.
pub struct CidReceiver {
    config: ReceiverConfig,
    codes: Arc<CodeTable>,
    targets: DispatchTargets,
    runner: EffectRunner,
}

impl CidReceiver {
    pub fn new(
        config: ReceiverConfig,
        codes: Arc<CodeTable>,
        targets: DispatchTargets,
        runner: EffectRunner,
    ) -> Self {
        Self {
            config,
            codes,
            targets,
            runner,
        }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Decode, classify and dispatch without running anything.
    pub fn decide(&self, raw: &[u8]) -> std::result::Result<Decision, ParseError> {
        let telegram = telegram::parse(raw)?;
        let classification = classify(&telegram);
        let effects = dispatch::dispatch(classification, &telegram, &self.codes, &self.targets);
        Ok(Decision {
            telegram,
            classification,
            effects,
        })
    }

    /// Handle one datagram: log it, decide, and hand the effects off.
    ///
    /// Decode failures are logged with the raw datagram and dropped. The
    /// returned handles are for callers that want to wait on the effects.
    pub fn handle_datagram(
        &self,
        raw: &[u8],
    ) -> std::result::Result<(Decision, Vec<JoinHandle<()>>), ParseError> {
        let text = String::from_utf8_lossy(raw);
        info!("Got datagram: {}", text);

        match self.decide(raw) {
            Ok(decision) => {
                info!(
                    "Decoded message: {} -> {}",
                    decision.telegram,
                    decision.classification.label()
                );
                let handles = self.runner.run(decision.effects.clone());
                Ok((decision, handles))
            }
            Err(e) => {
                error!("Received malformed message {}. {}", text, e);
                Err(e)
            }
        }
    }

    /// Send the startup notification.
    pub fn announce_startup(&self) -> Vec<JoinHandle<()>> {
        self.runner.run(dispatch::startup(&self.targets))
    }

    /// Bind the configured listening address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            error!("Failed to bind {}: {}", addr, e);
            e
        })?;
        info!("Listening for Contact ID on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Accept connections forever, one task per connection.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Connect from: {}", addr);
                    let receiver = Arc::clone(&self);
                    let max_len = self.config.max_datagram_len;
                    tokio::spawn(async move {
                        let peer = addr.to_string();
                        if let Err(e) = serve_connection(stream, &peer, receiver, max_len).await {
                            warn!("Connection from {} ended with error: {}", peer, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

/// Stop a task running [`CidReceiver::serve`] and wait for it to finish.
///
/// `abort` alone only schedules the cancellation; the listener socket is
/// closed when the task is dropped, so the port can be bound again only
/// once this returns.
pub async fn stop_serving(handle: JoinHandle<()>) {
    handle.abort();
    match handle.await {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => debug!("Listener task stopped"),
        Err(e) => warn!("Listener task ended abnormally: {}", e),
    }
}

impl DatagramHandler for CidReceiver {
    fn handle(&self, raw: &[u8]) {
        // Outcome is already logged; the connection only needs to ACK.
        let _ = self.handle_datagram(raw);
    }
}
