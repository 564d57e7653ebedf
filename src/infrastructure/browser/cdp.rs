//! Minimal Chrome DevTools Protocol client over a WebSocket.
//!
//! Commands are JSON messages with a monotonically increasing `id`; the
//! browser answers with the same id. A background reader task routes each
//! response to the oneshot channel registered for its id. Events (messages
//! without an id) are dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::error::{SessionError, SessionResult};

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;

pub struct CdpConnection {
    next_id: AtomicU64,
    pending: Pending,
    outgoing: mpsc::UnboundedSender<Message>,
}

impl CdpConnection {
    /// Connect to a page target's debugger WebSocket and spawn the reader
    /// and writer tasks.
    pub async fn connect(ws_url: &str) -> SessionResult<Self> {
        let (stream, _) = connect_async(ws_url).await?;
        let (mut sink, mut source) = stream.split();

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();

        tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                if sink.send(message).await.is_err() {
                    break;
                }
            }
        });

        let reader_pending = Arc::clone(&pending);
        tokio::spawn(async move {
            Self::read_loop(&mut source, reader_pending).await;
        });

        Ok(Self {
            next_id: AtomicU64::new(1),
            pending,
            outgoing,
        })
    }

    async fn read_loop(
        source: &mut futures_util::stream::SplitStream<
            WebSocketStream<MaybeTlsStream<TcpStream>>,
        >,
        pending: Pending,
    ) {
        while let Some(message) = source.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) | Err(_) => break,
                _ => continue,
            };
            let Ok(value) = serde_json::from_str::<Value>(&text) else {
                continue;
            };
            let Some(id) = value["id"].as_u64() else {
                continue; // event, not a command response
            };
            let sender = pending.lock().expect("pending map poisoned").remove(&id);
            if let Some(sender) = sender {
                let _ = sender.send(value);
            }
        }
        // Connection gone; wake every waiter with an error by dropping senders.
        pending.lock().expect("pending map poisoned").clear();
    }

    /// Send a CDP command and wait for its result object.
    pub async fn send(&self, method: &str, params: Value) -> SessionResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("pending map poisoned")
            .insert(id, tx);

        let payload = json!({ "id": id, "method": method, "params": params });
        self.outgoing
            .send(Message::Text(payload.to_string()))
            .map_err(|_| SessionError::Cdp(format!("{method}: connection closed")))?;

        let response = tokio::time::timeout(COMMAND_TIMEOUT, rx)
            .await
            .map_err(|_| SessionError::Cdp(format!("{method}: no response within 30s")))?
            .map_err(|_| SessionError::Cdp(format!("{method}: connection closed")))?;

        if let Some(error) = response.get("error") {
            let text = error["message"].as_str().unwrap_or("unknown CDP error");
            return Err(SessionError::Cdp(format!("{method}: {text}")));
        }
        Ok(response["result"].clone())
    }

    /// Evaluate a JavaScript expression in the page, awaiting promises, and
    /// return its JSON value. Expressions that throw map to `Cdp` errors.
    pub async fn eval(&self, expression: &str) -> SessionResult<Value> {
        let result = self
            .send(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let text = details["exception"]["description"]
                .as_str()
                .or_else(|| details["text"].as_str())
                .unwrap_or("script threw");
            return Err(SessionError::Cdp(text.to_string()));
        }
        Ok(result["result"]["value"].clone())
    }

    /// Dispatch a key press (down then up) to the focused element.
    pub async fn press_key(&self, key: &str, code: &str, key_code: u32) -> SessionResult<()> {
        for event_type in ["keyDown", "keyUp"] {
            self.send(
                "Input.dispatchKeyEvent",
                json!({
                    "type": event_type,
                    "key": key,
                    "code": code,
                    "windowsVirtualKeyCode": key_code,
                    "nativeVirtualKeyCode": key_code,
                }),
            )
            .await?;
        }
        Ok(())
    }
}
