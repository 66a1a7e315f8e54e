//! relayq demo
//!
//! Runs an in-process worker behind the local transport and drives the client
//! through its lifecycle:
//! - submit before any connection exists (backlog)
//! - cancel one request before it is ever sent
//! - connect and flush the backlog, then submit while connected
//! - log routed responses and pressure crossings, print metrics, tear down
//!
//! Usage: `relayq-demo [config.yaml]`

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing_subscriber::{fmt, EnvFilter};

use relayq_core::error::Result;
use relayq_core::protocol::{encode_response_frame, ResponseStatus, WorkerMessage};
use relayq_client::config::{self, ClientConfig};
use relayq_client::pressure::PressureEvent;
use relayq_client::router::{run_deliveries, Delivery, ResponseHandler};
use relayq_client::transport::{LocalListener, LocalTransport, WorkerLink};
use relayq_client::RelayClient;

struct LogHandler;

#[async_trait]
impl ResponseHandler for LogHandler {
    async fn handle(&self, delivery: Delivery) {
        let body = String::from_utf8_lossy(&delivery.payload);
        match &delivery.request {
            Some(req) => {
                tracing::info!(
                    correlation_id = %delivery.correlation_id,
                    status = delivery.status.as_str(),
                    request = %String::from_utf8_lossy(req.payload()),
                    response = %body,
                    "response"
                );
            }
            None => {
                tracing::info!(correlation_id = %delivery.correlation_id, "discarding unmatched response");
            }
        }
    }
}

async fn run_worker(mut listener: LocalListener) {
    while let Some(link) = listener.accept().await {
        tokio::spawn(serve_link(link));
    }
}

/// Upper-cases payloads; anything starting with "fail" is answered as failed.
async fn serve_link(mut link: WorkerLink) {
    let mut cancelled = HashSet::new();
    while let Some(msg) = link.requests.recv().await {
        match msg {
            WorkerMessage::Cancel(id) => {
                cancelled.insert(id);
            }
            WorkerMessage::Perform(env) => {
                if cancelled.remove(env.correlation_id()) {
                    continue;
                }
                let body = env.payload();
                let (status, out) = if body.starts_with(b"fail") {
                    (ResponseStatus::Failed, b"refused".to_vec())
                } else {
                    (ResponseStatus::Completed, body.to_ascii_uppercase())
                };
                link.responder
                    .deliver(encode_response_frame(env.correlation_id(), status, &out));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => config::load_from_file(&path)?,
        None => ClientConfig::default(),
    };

    let (pressure_tx, mut pressure_rx) = mpsc::unbounded_channel::<PressureEvent>();
    let (client, deliveries) = RelayClient::new(cfg, Arc::new(pressure_tx))?;
    let (transport, listener) = LocalTransport::from_config(&client.cfg().transport);

    tokio::spawn(run_worker(listener));
    tokio::spawn(async move {
        while let Some(ev) = pressure_rx.recv().await {
            tracing::warn!(state = ev.state.as_str(), outstanding = ev.outstanding, "queue pressure");
        }
    });
    let handler_task = tokio::spawn(run_deliveries(deliveries, Arc::new(LogHandler)));

    for p in ["hello", "fail on purpose", "world"] {
        client.submit(Bytes::from_static(p.as_bytes()));
    }
    let dropped = client.submit("never sent");
    client.cancel(&dropped);

    client.connect(&transport).await?;
    client.submit("after connect");

    let deadline = Instant::now() + Duration::from_secs(5);
    while client.snapshot().outstanding() > 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    println!("{}", client.metrics_text());

    client.shutdown();
    drop(client);
    drop(transport);
    let _ = tokio::time::timeout(Duration::from_secs(1), handler_task).await;

    tracing::info!("relayq demo finished");
    Ok(())
}
