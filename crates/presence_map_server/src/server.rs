//! warp routes: the WebSocket endpoint and optional static files.
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{debug, info};
use warp::filters::BoxedFilter;
use warp::ws::{Message, WebSocket, Ws};
use warp::{Filter, Reply};

use crate::config::ServerConfig;
use crate::counter::PresenceCounter;
use crate::error::{Result, ServerError};

/// Counter shared by all connections. Sends only enqueue, so the lock is never held
/// across socket I/O.
pub type SharedCounter = Arc<Mutex<PresenceCounter<UnboundedSender<String>>>>;

/// WebSocket upgrades on any path; other requests fall through to `static_dir`.
pub fn routes(counter: SharedCounter, static_dir: Option<PathBuf>) -> BoxedFilter<(Box<dyn Reply>,)> {
    let counter = warp::any().map(move || counter.clone());
    let socket = warp::ws()
        .and(counter)
        .map(|ws: Ws, counter: SharedCounter| -> Box<dyn Reply> {
            Box::new(ws.on_upgrade(move |socket| handle_socket(socket, counter)))
        });

    match static_dir {
        Some(dir) => socket
            .or(warp::fs::dir(dir).map(|file: warp::fs::File| -> Box<dyn Reply> { Box::new(file) }))
            .unify()
            .boxed(),
        None => socket.boxed(),
    }
}

async fn handle_socket(socket: WebSocket, counter: SharedCounter) {
    let (mut outgoing, mut incoming) = socket.split();
    let (tx, mut rx) = unbounded_channel::<String>();

    let forward = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(err) = outgoing.send(Message::text(payload)).await {
                debug!(%err, "websocket send failed");
                break;
            }
        }
    });

    let id = counter.lock().connect(tx);

    // Client messages carry no meaning; read until the peer goes away.
    while let Some(message) = incoming.next().await {
        match message {
            Ok(message) if message.is_close() => break,
            Ok(_) => {}
            Err(err) => {
                debug!(id, %err, "websocket receive failed");
                break;
            }
        }
    }

    let online = counter.lock().disconnect(id);
    debug!(id, online, "connection closed");
    forward.abort();
}

/// Serves the presence service until `shutdown` resolves.
pub async fn serve<F>(config: ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;
    let counter = SharedCounter::default();
    let (addr, server) = warp::serve(routes(counter, config.static_dir.clone()))
        .try_bind_with_graceful_shutdown(config.addr(), shutdown)
        .map_err(|err| ServerError::Bind {
            addr: config.addr().to_string(),
            reason: err.to_string(),
        })?;

    info!(%addr, static_dir = ?config.static_dir, "presence server listening");
    server.await;
    info!("presence server stopped");
    Ok(())
}
