use crate::call_desk::{CallDesk, TickerLease};
use crate::call_session::SessionSnapshot;
use crate::error::{AppError, CallError};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

pub type SharedDesk = Arc<Mutex<CallDesk>>;

/// Start the selected call and, if it was idle, spawn the ticker that drives it.  The ticker is
/// spawned while the desk is still locked, so it can never observe the call before it started.
pub async fn start_call(desk: &SharedDesk, period: Duration) -> Result<SessionSnapshot, CallError> {
    let mut guard = desk.lock().await;
    let start = guard.start_call()?;
    if let Some(lease) = start.lease {
        tokio::spawn(run_call_ticker(desk.clone(), lease, period));
    }
    Ok(start.snapshot)
}

/// Task that advances the active call once per `period` until it is cancelled or the desk
/// rejects its epoch.
pub async fn run_call_ticker(desk: SharedDesk, lease: TickerLease, period: Duration) {
    let mut interval = interval_at(Instant::now() + period, period);
    debug!(epoch = lease.epoch, "call ticker started");
    loop {
        tokio::select! {
            _ = lease.cancel.cancelled() => break,
            _ = interval.tick() => {
                if !desk.lock().await.tick(lease.epoch) {
                    break;
                }
            }
        }
    }
    debug!(epoch = lease.epoch, "call ticker stopped");
}

/// Task that pushes every session snapshot to a live-feed websocket client.
pub async fn stream_snapshots(
    mut client_sink: SplitSink<WebSocket, Message>,
    mut updates: watch::Receiver<Option<SessionSnapshot>>,
) -> Result<(), AppError> {
    loop {
        let snapshot = updates.borrow_and_update().clone();
        let json = serde_json::to_string(&snapshot).map_err(|e| {
            error!(error=%e, "failed to serialize session snapshot");
            AppError("Failed to serialize session snapshot")
        })?;
        client_sink.send(Message::Text(json)).await.map_err(|e| {
            warn!(error=%e, "failed to send snapshot to live client");
            AppError("Failed to send snapshot to live client")
        })?;
        if updates.changed().await.is_err() {
            break Ok(());
        }
    }
}

/// Task that drains the client side of a live-feed websocket until it closes.
pub async fn drain_client(mut client_stream: SplitStream<WebSocket>) -> Result<(), AppError> {
    loop {
        match client_stream.next().await {
            Some(Ok(Message::Close(_))) | None => {
                info!("live client closed");
                break Ok(());
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                warn!(error=%e, "failed to receive message from live client");
                break Err(AppError("Failed to receive message from live client"));
            }
        }
    }
}
