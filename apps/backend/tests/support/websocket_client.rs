// WebSocket client utilities for testing

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// What the socket produced next, as far as game tests care.
#[derive(Debug)]
pub enum Received {
    Json(Value),
    Closed(Option<CloseCode>),
}

/// WebSocket test client
pub struct WebSocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketClient {
    /// Connect to a WebSocket endpoint, retrying until success or timeout.
    pub async fn connect_retry(
        url: &str,
        timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let start = tokio::time::Instant::now();
        loop {
            match connect_async(url).await {
                Ok((stream, _)) => return Ok(Self { stream }),
                Err(err) => {
                    if start.elapsed() >= timeout {
                        return Err(Box::new(err));
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
        }
    }

    /// Send a raw text frame
    pub async fn send_text(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Send an `{action, data}` envelope
    pub async fn act(&mut self, action: &str, data: &str) -> Result<(), Box<dyn std::error::Error>> {
        let frame = json!({ "action": action, "data": data }).to_string();
        self.send_text(&frame).await
    }

    pub async fn send_binary(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.send(Message::Binary(bytes.to_vec().into())).await?;
        Ok(())
    }

    /// Close the connection
    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.close(None).await?;
        Ok(())
    }

    /// Next JSON message or close, skipping pings and pongs.
    pub async fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Received, Box<dyn std::error::Error>> {
        loop {
            let next = tokio::time::timeout(timeout, self.stream.next())
                .await
                .map_err(|_| "Timeout waiting for message")?;
            match next {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Received::Json(serde_json::from_str(text.as_str())?))
                }
                Some(Ok(Message::Close(frame))) => {
                    return Ok(Received::Closed(frame.map(|f| f.code)))
                }
                Some(Ok(_)) => continue,
                Some(Err(_)) | None => return Ok(Received::Closed(None)),
            }
        }
    }

    /// Next JSON message; anything else is an error.
    pub async fn recv_json(&mut self, timeout: Duration) -> Result<Value, Box<dyn std::error::Error>> {
        match self.recv_timeout(timeout).await? {
            Received::Json(value) => Ok(value),
            Received::Closed(code) => Err(format!("connection closed: {code:?}").into()),
        }
    }

    /// Read until a message with `msgType == kind` arrives.
    pub async fn recv_kind(
        &mut self,
        kind: &str,
        timeout: Duration,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        loop {
            let value = self.recv_json(timeout).await?;
            if value["msgType"] == kind {
                return Ok(value);
            }
        }
    }

    /// True if nothing arrives within `wait`.
    pub async fn is_quiet(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.stream.next()).await.is_err()
    }
}
