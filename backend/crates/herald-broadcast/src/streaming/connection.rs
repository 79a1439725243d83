use crate::{BroadcastError, Result};

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use futures::SinkExt;
use futures::StreamExt;
use futures::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::publish_frame::ConnectionInit;
use super::{RealtimeEndpoint, SUBPROTOCOL};

pub(crate) type RealtimeStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type RealtimeSink = SplitSink<RealtimeStream, Message>;
pub(crate) type RealtimeSource = SplitStream<RealtimeStream>;

/// Lifecycle of the realtime socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free mirror of [`ConnectionState`] for status reads.
pub(crate) struct AtomicConnectionState(AtomicU8);

impl AtomicConnectionState {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub(crate) fn load(&self) -> ConnectionState {
        match self.0.load(Ordering::Acquire) {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    pub(crate) fn store(&self, state: ConnectionState) {
        let raw = match state {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
        };
        self.0.store(raw, Ordering::Release);
    }
}

/// Everything guarded by the connection lock.
#[derive(Default)]
pub(crate) struct ConnectionSlot {
    pub(crate) sink: Option<RealtimeSink>,
    /// Bumped on every successful connect; readers only tear down their own generation
    pub(crate) generation: u64,
    pub(crate) reader_task: Option<JoinHandle<()>>,
}

impl ConnectionSlot {
    /// Close and forget the current socket, if any.
    pub(crate) async fn close(&mut self) {
        if let Some(mut sink) = self.sink.take()
            && let Err(e) = sink.close().await
        {
            log::debug!("Error closing realtime socket: {}", e);
        }
    }
}

/// Open the socket, authenticate through the sub-protocol header and send
/// `connection_init`. Bounded by `connect_timeout`.
pub(crate) async fn open_socket(
    endpoint: &RealtimeEndpoint,
    api_key: &str,
    connect_timeout: Duration,
) -> Result<(RealtimeSink, RealtimeSource)> {
    let mut request = endpoint.realtime_url().into_client_request()?;
    let protocols = format!("{}, {}", SUBPROTOCOL, endpoint.auth_protocol(api_key));
    let header = HeaderValue::from_str(&protocols)
        .map_err(|e| BroadcastError::configuration(format!("invalid auth header: {}", e)))?;
    request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, header);

    let handshake = async {
        let (stream, response) = connect_async(request).await?;
        log::debug!(
            "Realtime handshake completed with status {}",
            response.status()
        );

        let (mut sink, source) = stream.split();
        let init = serde_json::to_string(&ConnectionInit::new())?;
        sink.send(Message::Text(init.into())).await?;
        Ok::<_, BroadcastError>((sink, source))
    };

    tokio::time::timeout(connect_timeout, handshake)
        .await
        .map_err(|_| BroadcastError::timeout("realtime connect", connect_timeout))?
}
