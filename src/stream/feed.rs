use async_trait::async_trait;
use tokio_tungstenite::{connect_async, tungstenite::Message, WebSocketStream};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::MaybeTlsStream;
use tokio::net::TcpStream;
use futures_util::StreamExt;
use crate::error::{Error, Result};

/// What the feed handed back on one read.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedFrame {
    Text(String),
    /// The connection ended. `clean` is true only for an orderly close.
    Closed { clean: bool },
}

/// A persistent connection yielding text frames of asset -> price.
#[async_trait]
pub trait PriceFeed: Send {
    async fn connect(&mut self) -> Result<()>;
    /// Next text frame or close notification. An `Err` is a transport
    /// failure and counts as an unclean close.
    async fn next_frame(&mut self) -> Result<FeedFrame>;
    async fn close(&mut self);
    fn source_id(&self) -> &str;
}

/// CoinCap price websocket: frames look like `{"bitcoin":"6929.82"}`.
pub struct CoinCapFeed {
    source_id: String,
    ws_url: String,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl CoinCapFeed {
    pub fn new(base_url: &str, assets: &[String]) -> Self {
        CoinCapFeed {
            source_id: "coincap".to_string(),
            ws_url: feed_url(base_url, assets),
            stream: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.ws_url
    }
}

/// `base?assets=a,b,c`
pub fn feed_url(base_url: &str, assets: &[String]) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}assets={}", base_url, separator, assets.join(","))
}

/// Only a close frame carrying 1000 (Normal) is an orderly shutdown.
pub(crate) fn is_clean_close(frame: Option<&CloseFrame<'_>>) -> bool {
    frame.is_some_and(|f| f.code == CloseCode::Normal)
}

#[async_trait]
impl PriceFeed for CoinCapFeed {
    async fn connect(&mut self) -> Result<()> {
        let (ws_stream, _) = connect_async(&self.ws_url)
            .await
            .map_err(|e| Error::ConnectionFailed(format!("WebSocket connection failed: {}", e)))?;
        self.stream = Some(ws_stream);
        tracing::info!("Connected to CoinCap: {}", self.ws_url);
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<FeedFrame> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(FeedFrame::Text(text)),
                Some(Ok(Message::Binary(data))) => {
                    if let Ok(text) = String::from_utf8(data) {
                        return Ok(FeedFrame::Text(text));
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let clean = is_clean_close(frame.as_ref());
                    tracing::info!("CoinCap closed the connection: {:?}", frame);
                    self.stream = None;
                    return Ok(FeedFrame::Closed { clean });
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(Error::ConnectionFailed(e.to_string()));
                }
                None => {
                    self.stream = None;
                    return Ok(FeedFrame::Closed { clean: false });
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                tracing::debug!("Error while closing CoinCap stream: {}", e);
            }
        }
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }
}
