//! Live update listener
//!
//! One WebSocket connection per page session:
//!
//! ```text
//! Connecting ──open──▶ Open ──error / close / unmount──▶ Closed
//!      │                                                   ▲
//!      └───────────────── connect failed ──────────────────┘
//! ```
//!
//! On open the listener asks for a snapshot (`get_bookings`), then merges
//! every inbound frame into the page's view model. Closed is terminal; there
//! is no reconnect. Outbound commands go through an unbounded channel to the
//! session task, so callers can enqueue or fail without awaiting.

pub mod handler;

use futures::{SinkExt, StreamExt};
use shared::BookingCommand;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::session::PageScope;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Cheap handle for sending commands over the page's stream
#[derive(Debug, Clone)]
pub struct LiveHandle {
    state: watch::Receiver<ConnectionState>,
    outbound: mpsc::UnboundedSender<BookingCommand>,
}

impl LiveHandle {
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Queue a command on the open stream.
    ///
    /// Fails immediately with [`ClientError::NotConnected`] unless the
    /// stream is open; nothing is queued in that case. Delivery is
    /// at-most-once.
    pub fn send(&self, command: BookingCommand) -> ClientResult<()> {
        if !self.is_open() {
            return Err(ClientError::NotConnected);
        }
        self.outbound
            .send(command)
            .map_err(|_| ClientError::NotConnected)
    }
}

pub struct LiveUpdateListener {
    handle: LiveHandle,
    session: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LiveUpdateListener {
    /// Start connecting to `url` for the given page.
    ///
    /// Returns immediately in [`ConnectionState::Connecting`]; must be called
    /// inside a tokio runtime.
    pub fn spawn(url: impl Into<String>, scope: &PageScope) -> Self {
        let url = url.into();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let session = scope.child_token();

        let task = tokio::spawn(run_session(
            url,
            scope.clone(),
            session.clone(),
            state_tx,
            outbound_rx,
        ));

        Self {
            handle: LiveHandle {
                state: state_rx,
                outbound: outbound_tx,
            },
            session,
            task: Some(task),
        }
    }

    pub fn handle(&self) -> LiveHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.handle.state()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }

    /// Wait until the connection attempt settles. Returns `true` if open.
    pub async fn opened(&self) -> bool {
        self.wait_for(|s| s != ConnectionState::Connecting).await == ConnectionState::Open
    }

    /// Wait until the connection is closed
    pub async fn closed(&self) {
        self.wait_for(|s| s == ConnectionState::Closed).await;
    }

    async fn wait_for(&self, done: impl Fn(ConnectionState) -> bool) -> ConnectionState {
        let mut rx = self.handle.state.clone();
        match rx.wait_for(|s| done(*s)).await {
            Ok(state) => *state,
            // Sender gone means the session task has ended
            Err(_) => ConnectionState::Closed,
        }
    }

    /// Close the stream and wait for the session task to finish.
    pub async fn close(mut self) {
        self.session.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!("Booking stream task ended abnormally: {e}");
        }
    }
}

impl Drop for LiveUpdateListener {
    fn drop(&mut self) {
        self.session.cancel();
    }
}

async fn run_session(
    url: String,
    scope: PageScope,
    session: CancellationToken,
    state_tx: watch::Sender<ConnectionState>,
    mut outbound_rx: mpsc::UnboundedReceiver<BookingCommand>,
) {
    let connected = tokio::select! {
        _ = session.cancelled() => {
            state_tx.send_replace(ConnectionState::Closed);
            return;
        }
        result = tokio_tungstenite::connect_async(url.as_str()) => result,
    };

    let ws = match connected {
        Ok((ws, _response)) => ws,
        Err(e) => {
            tracing::warn!(url = %url, "Booking stream connection failed: {e}");
            state_tx.send_replace(ConnectionState::Closed);
            return;
        }
    };

    let (mut ws_sink, mut ws_stream) = ws.split();
    state_tx.send_replace(ConnectionState::Open);
    tracing::info!(url = %url, "Booking stream connected");

    if let Err(e) = send_command(&mut ws_sink, &BookingCommand::GetBookings).await {
        tracing::warn!("Failed to request booking snapshot: {e}");
        state_tx.send_replace(ConnectionState::Closed);
        return;
    }

    loop {
        tokio::select! {
            _ = session.cancelled() => {
                tracing::debug!("Closing booking stream");
                let _ = ws_sink.send(Message::Close(None)).await;
                let _ = ws_sink.close().await;
                break;
            }

            Some(command) = outbound_rx.recv() => {
                if let Err(e) = send_command(&mut ws_sink, &command).await {
                    tracing::warn!("Booking stream send failed, disconnecting: {e}");
                    break;
                }
            }

            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        scope.update(|view| handler::apply_text(view, text.as_str()));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = ws_sink.send(Message::Pong(data)).await {
                            tracing::warn!("Booking stream pong failed, disconnecting: {e}");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Booking stream closed by server");
                        // Flushes the queued close reply
                        let _ = ws_sink.close().await;
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Booking stream error: {e}");
                        break;
                    }
                    None => {
                        tracing::info!("Booking stream ended");
                        break;
                    }
                    _ => {} // Binary, Pong, Frame: ignore
                }
            }
        }
    }

    state_tx.send_replace(ConnectionState::Closed);
}

async fn send_command<S>(ws_sink: &mut S, command: &BookingCommand) -> ClientResult<()>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let json = command.to_json()?;
    ws_sink.send(Message::Text(json.into())).await?;
    Ok(())
}
