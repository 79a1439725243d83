use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;

/// How the server answers each publish frame.
#[derive(Clone)]
pub enum Reply {
    Success,
    /// `publish_success` listing every event as failed
    PartialFailure,
    /// `publish_error` with the given type and message
    Error(&'static str, &'static str),
    /// `publish_error` carrying only a top-level `message`
    ErrorMessage(&'static str),
    /// Record the publish and never answer it
    Silent,
    /// Record the publish, then drop the socket without a close frame
    Disconnect,
}

#[derive(Default)]
struct Recorded {
    publishes: Vec<Value>,
    protocols: Vec<String>,
    connections: usize,
}

/// Minimal realtime events endpoint for tests.
pub struct RealtimeServer {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
    handle: JoinHandle<()>,
}

impl RealtimeServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Recorded::default()));

        let accept_recorded = Arc::clone(&recorded);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&accept_recorded);
                let reply = reply.clone();
                tokio::spawn(serve_connection(stream, recorded, reply));
            }
        });

        Self {
            addr,
            recorded,
            handle,
        }
    }

    /// HTTP form of the endpoint, as an operator would configure it.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn publishes(&self) -> Vec<Value> {
        self.recorded.lock().unwrap().publishes.clone()
    }

    pub fn protocols(&self) -> Vec<String> {
        self.recorded.lock().unwrap().protocols.clone()
    }

    pub fn connections(&self) -> usize {
        self.recorded.lock().unwrap().connections
    }
}

impl Drop for RealtimeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(stream: TcpStream, recorded: Arc<Mutex<Recorded>>, reply: Reply) {
    let handshake_recorded = Arc::clone(&recorded);
    let callback = move |request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
        if let Some(offered) = request
            .headers()
            .get("Sec-WebSocket-Protocol")
            .and_then(|v| v.to_str().ok())
        {
            let mut recorded = handshake_recorded.lock().unwrap();
            recorded
                .protocols
                .extend(offered.split(',').map(|p| p.trim().to_string()));
            response.headers_mut().insert(
                "Sec-WebSocket-Protocol",
                HeaderValue::from_static("aws-appsync-event-ws"),
            );
        }
        Ok(response)
    };

    let Ok(socket) = accept_hdr_async(stream, callback).await else {
        return;
    };
    recorded.lock().unwrap().connections += 1;

    let (mut sink, mut source) = socket.split();

    while let Some(Ok(message)) = source.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let Ok(frame) = serde_json::from_str::<Value>(text.as_str()) else {
            continue;
        };

        let answer = match frame["type"].as_str() {
            Some("connection_init") => json!({"type": "connection_ack", "connectionTimeoutMs": 300000}),
            Some("publish") => {
                let id = frame["id"].clone();
                let events = frame["events"].as_array().cloned().unwrap_or_default();
                recorded.lock().unwrap().publishes.push(frame);
                match &reply {
                    Reply::Success => json!({
                        "type": "publish_success",
                        "id": id,
                        "successful": events.iter().enumerate().map(|(i, _)| json!({"identifier": i, "index": i})).collect::<Vec<_>>(),
                        "failed": [],
                    }),
                    Reply::PartialFailure => json!({
                        "type": "publish_success",
                        "id": id,
                        "successful": [],
                        "failed": events.iter().enumerate().map(|(i, _)| json!({"identifier": i, "index": i})).collect::<Vec<_>>(),
                    }),
                    Reply::Error(kind, message) => json!({
                        "type": "publish_error",
                        "id": id,
                        "errors": [{"errorType": kind, "message": message}],
                    }),
                    Reply::ErrorMessage(message) => json!({
                        "type": "publish_error",
                        "id": id,
                        "message": message,
                    }),
                    Reply::Silent => continue,
                    Reply::Disconnect => return,
                }
            }
            _ => continue,
        };

        if sink.send(Message::Text(answer.to_string().into())).await.is_err() {
            break;
        }
    }
}
