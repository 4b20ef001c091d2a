//! Session event channel lifecycle
//!
//! Wraps one [`Transport`] in a spawned read task that forwards parsed
//! events over an mpsc channel. The cancellation token is cancelled
//! before the transport closes on intentional disconnect, so a `Dropped`
//! signal is only ever emitted for closures the caller did not request.

use std::sync::Arc;

use shared::TableEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::transport::Transport;

/// Signals produced by the read task
#[derive(Debug)]
pub enum ConnectionSignal {
    /// A recognized event arrived on the channel
    Event(TableEvent),
    /// The channel closed without a matching `disconnect` call
    Dropped,
}

/// A live connection to a session's event channel
pub struct SessionConnection {
    session_id: String,
    cancel: CancellationToken,
    transport: Arc<dyn Transport>,
}

impl SessionConnection {
    /// Spawn the read task and return the connection handle plus the
    /// signal receiver.
    pub fn start(
        session_id: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> (Self, mpsc::UnboundedReceiver<ConnectionSignal>) {
        let session_id = session_id.into();
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let task_cancel = cancel.clone();
        let task_transport = transport.clone();
        let task_session = session_id.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => return,
                    read = task_transport.read_text() => match read {
                        Some(Ok(text)) => {
                            if let Some(event) = TableEvent::parse(&text) {
                                if tx.send(ConnectionSignal::Event(event)).is_err() {
                                    return;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            // Recoverable channel error; keep reading
                            tracing::debug!(session_id = %task_session, "table channel error: {e}");
                        }
                        None => {
                            if !task_cancel.is_cancelled() {
                                tracing::debug!(session_id = %task_session, "table channel closed");
                                let _ = tx.send(ConnectionSignal::Dropped);
                            }
                            return;
                        }
                    }
                }
            }
        });

        (
            Self {
                session_id,
                cancel,
                transport,
            },
            rx,
        )
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Intentional close. Cancels the read task first so the closure is
    /// never reported as a drop.
    pub async fn disconnect(&self) {
        self.cancel.cancel();
        self.transport.close().await;
    }
}

impl Drop for SessionConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
