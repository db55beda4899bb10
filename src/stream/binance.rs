//! Binance combined-stream endpoint and wire format.

use crate::errors::Result;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Envelope wrapping every combined-stream record. Either field may be
/// absent on unexpected frames; such frames are ignored upstream.
#[derive(Debug, Deserialize)]
pub struct StreamEnvelope {
    pub stream: Option<String>,
    pub data: Option<TickerMsg>,
}

/// Subset of the ticker payload this client consumes.
#[derive(Debug, Deserialize)]
pub struct TickerMsg {
    #[serde(rename = "s")]
    pub symbol: String,
    /// Current price, reported as a string on the wire.
    #[serde(rename = "c")]
    pub last_price: String,
}

/// Build the multiplexed stream path for a fixed symbol set, e.g.
/// `wss://host/stream?streams=btcusdt@ticker/ethusdt@ticker`.
pub fn combined_stream_url(base: &str, symbols: &[String]) -> String {
    let streams: Vec<String> = symbols
        .iter()
        .map(|symbol| format!("{}@ticker", symbol.to_lowercase()))
        .collect();
    format!(
        "{}/stream?streams={}",
        base.trim_end_matches('/'),
        streams.join("/")
    )
}

/// Open one socket carrying ticker updates for all subscribed symbols.
pub async fn connect_combined_stream(base: &str, symbols: &[String]) -> Result<WsStream> {
    let url = Url::parse(&combined_stream_url(base, symbols))?;
    let (ws_stream, _resp) = connect_async(url).await?;
    Ok(ws_stream)
}
