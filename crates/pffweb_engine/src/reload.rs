use client_logging::{client_debug, client_trace};
use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReloadError {
    #[error("invalid reload endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("reload socket connect failed: {0}")]
    Connect(String),
}

/// A server-to-client message on the reload socket. Its content is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignal {
    pub payload_len: usize,
}

#[async_trait::async_trait]
pub trait ReloadTransport: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn ReloadConnection>, ReloadError>;
}

#[async_trait::async_trait]
pub trait ReloadConnection: Send {
    /// Waits for the next signal; `None` once the socket is closed or broken.
    async fn next_signal(&mut self) -> Option<ReloadSignal>;

    async fn close(&mut self);
}

/// WebSocket transport backed by `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteTransport;

#[async_trait::async_trait]
impl ReloadTransport for TungsteniteTransport {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn ReloadConnection>, ReloadError> {
        let (stream, response) = tokio_tungstenite::connect_async(endpoint.as_str())
            .await
            .map_err(|err| ReloadError::Connect(err.to_string()))?;
        client_trace!("Reload socket upgraded with status {}", response.status());
        Ok(Box::new(TungsteniteConnection { stream }))
    }
}

struct TungsteniteConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait::async_trait]
impl ReloadConnection for TungsteniteConnection {
    async fn next_signal(&mut self) -> Option<ReloadSignal> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(ReloadSignal {
                        payload_len: text.len(),
                    })
                }
                Ok(Message::Binary(data)) => {
                    return Some(ReloadSignal {
                        payload_len: data.len(),
                    })
                }
                Ok(Message::Close(frame)) => {
                    client_debug!("Reload socket closed by server: {:?}", frame);
                    return None;
                }
                // Control frames are not reload signals.
                Ok(_) => continue,
                Err(err) => {
                    client_debug!("Reload socket error: {}", err);
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            client_trace!("Closing reload socket: {}", err);
        }
    }
}
