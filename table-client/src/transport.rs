//! Real-time channel transports
//!
//! `Transport` abstracts one inbound text-frame channel. `read_text`
//! follows stream semantics: `Some(Ok)` is a frame, `Some(Err)` is a
//! recoverable channel error, `None` means the channel closed and will
//! not produce more frames.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, broadcast};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One inbound text-frame channel
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Next text frame, a recoverable error, or `None` on close
    async fn read_text(&self) -> Option<ClientResult<String>>;

    /// Close the channel; best-effort
    async fn close(&self);
}

/// Produces a connected [`Transport`] for a session's event channel
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(&self, session_id: &str) -> ClientResult<Arc<dyn Transport>>;
}

/// WebSocket transport
#[derive(Debug)]
pub struct WsTransport {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> ClientResult<Self> {
        let (ws, _resp) = connect_async(url)
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        tracing::debug!(url, "WebSocket connected");

        let (sink, stream) = ws.split();
        Ok(Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn read_text(&self) -> Option<ClientResult<String>> {
        loop {
            let msg = self.stream.lock().await.next().await;
            match msg {
                Some(Ok(Message::Text(text))) => return Some(Ok(text.to_string())),
                Some(Ok(Message::Ping(data))) => {
                    let _ = self.sink.lock().await.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(_)) => {} // Binary/Pong frames carry nothing for us
                Some(Err(e)) => return Some(Err(ClientError::Connection(e.to_string()))),
            }
        }
    }

    async fn close(&self) {
        let _ = self.sink.lock().await.close().await;
    }
}

/// Connects [`WsTransport`]s to the configured table event channel
pub struct WsConnector {
    config: ClientConfig,
}

impl WsConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for WsConnector {
    async fn connect(&self, session_id: &str) -> ClientResult<Arc<dyn Transport>> {
        let url = self.config.table_ws_url(session_id);
        Ok(Arc::new(WsTransport::connect(&url).await?))
    }
}

/// In-process transport over a broadcast channel, used in tests and demos
#[derive(Debug)]
pub struct MemoryTransport {
    rx: Mutex<broadcast::Receiver<String>>,
}

impl MemoryTransport {
    pub fn new(tx: &broadcast::Sender<String>) -> Self {
        Self {
            rx: Mutex::new(tx.subscribe()),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_text(&self) -> Option<ClientResult<String>> {
        let mut rx = self.rx.lock().await;
        match rx.recv().await {
            Ok(text) => Some(Ok(text)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => Some(Err(
                ClientError::Connection(format!("lagged behind by {skipped} frames")),
            )),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    async fn close(&self) {}
}

/// Connects [`MemoryTransport`]s fed by one broadcast sender
pub struct MemoryConnector {
    tx: broadcast::Sender<String>,
}

impl MemoryConnector {
    pub fn new(tx: broadcast::Sender<String>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl TransportFactory for MemoryConnector {
    async fn connect(&self, _session_id: &str) -> ClientResult<Arc<dyn Transport>> {
        Ok(Arc::new(MemoryTransport::new(&self.tx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_transport_delivers_frames_in_order() {
        let (tx, _keep) = broadcast::channel(16);
        let transport = MemoryTransport::new(&tx);

        tx.send("one".to_string()).unwrap();
        tx.send("two".to_string()).unwrap();

        assert_eq!(transport.read_text().await.unwrap().unwrap(), "one");
        assert_eq!(transport.read_text().await.unwrap().unwrap(), "two");
    }

    #[tokio::test]
    async fn test_memory_transport_reports_close() {
        let (tx, _) = broadcast::channel::<String>(16);
        let transport = MemoryTransport::new(&tx);
        drop(tx);

        assert!(transport.read_text().await.is_none());
    }
}
