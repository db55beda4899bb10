//! Live price-feed connection manager.
//!
//! Responsibilities:
//! • Maintain at most one socket to the exchange combined stream.
//! • Feed each inbound frame through tick processing and alerting.
//! • Reconnect with exponential backoff; give up once the retry budget is
//!   spent and tell the user to reload.

pub mod binance;

use crate::alerts::AlertDispatcher;
use crate::config::StreamConfig;
use crate::models::NotificationSink;
use crate::retry::RetryState;
use crate::ticker::TickerProcessor;
use crate::utils::now_unix_ms;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Handle to a running price stream.
///
/// Learned prices and the retry counter live inside the manager task, so
/// they survive reconnects but not [`PriceStream::disconnect`], which tears
/// the whole task down. A stream opened afterwards starts from a clean
/// slate.
pub struct PriceStream {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PriceStream {
    /// Spawn the connection manager for the configured symbol set. Alerts
    /// and their removals are pushed into `sink`.
    pub fn connect(config: StreamConfig, sink: NotificationSink) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(config, sink, cancel.clone()));
        Self { cancel, task }
    }

    /// Tear the stream down: close any open socket with a normal closure
    /// frame and cancel any pending reconnect or toast timer. Unconditional
    /// and immediate.
    pub async fn disconnect(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

async fn run(config: StreamConfig, sink: NotificationSink, cancel: CancellationToken) {
    let mut tickers = TickerProcessor::new(config.price_change_threshold);
    let mut alerts = AlertDispatcher::new(sink, config.toast_auto_dismiss);
    let mut retries = RetryState::new(config.max_retries, config.base_reconnect_delay);

    'session: loop {
        // The handshake is raced against cancellation so disconnect() stays
        // immediate while the stream is still connecting.
        let connected = tokio::select! {
            _ = cancel.cancelled() => {
                info!("[WS] disconnected by caller");
                break 'session;
            }
            result = binance::connect_combined_stream(&config.ws_url, &config.symbols) => result,
        };
        match connected {
            Ok(mut ws) => {
                retries.reset();
                info!(symbols = ?config.symbols, "[WS] connected");

                loop {
                    let deadline = alerts.next_deadline();
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            let _ = ws
                                .close(Some(CloseFrame {
                                    code: CloseCode::Normal,
                                    reason: "client disconnect".into(),
                                }))
                                .await;
                            info!("[WS] disconnected by caller");
                            break 'session;
                        }
                        _ = sleep_until_deadline(deadline), if deadline.is_some() => {
                            alerts.expire_due(Instant::now());
                        }
                        frame = ws.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                handle_frame(&text, &mut tickers, &mut alerts);
                            }
                            Some(Ok(Message::Close(close_frame))) => {
                                warn!(frame = ?close_frame, "[WS] closed by server");
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                warn!(error = %e, "[WS] transport error");
                                break;
                            }
                            None => {
                                warn!("[WS] stream ended");
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "[WS] connect failed"),
        }

        // Failure path: learned prices and active toasts are preserved
        // across the reconnect.
        match retries.next_delay() {
            Some(delay) => {
                warn!(
                    attempt = retries.attempt(),
                    delay_ms = delay.as_millis() as u64,
                    "[WS] reconnecting after delay"
                );
                let wake = Instant::now() + delay;
                loop {
                    // Toasts raised just before the drop still auto-close on
                    // schedule while we wait.
                    let next = match alerts.next_deadline() {
                        Some(deadline) if deadline < wake => deadline,
                        _ => wake,
                    };
                    tokio::select! {
                        _ = cancel.cancelled() => break 'session,
                        _ = tokio::time::sleep_until(next) => {
                            alerts.expire_due(Instant::now());
                            if Instant::now() >= wake {
                                break;
                            }
                        }
                    }
                }
            }
            None => {
                error!("[WS] retries exhausted, giving up");
                alerts.raise_connection_lost(now_unix_ms());
                break;
            }
        }
    }
}

/// Feed one text frame through parsing, tick processing, and alerting.
///
/// Frames that are not valid JSON are logged and dropped; envelopes missing
/// `stream` or `data` are ignored silently. Neither touches price, retry,
/// or alert state.
fn handle_frame(text: &str, tickers: &mut TickerProcessor, alerts: &mut AlertDispatcher) {
    let envelope: binance::StreamEnvelope = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "[TICKER] frame parse failed");
            return;
        }
    };
    let (Some(_), Some(ticker)) = (envelope.stream, envelope.data) else {
        return;
    };
    if let Some(price_move) = tickers.observe(&ticker.symbol, &ticker.last_price) {
        info!(
            symbol = %price_move.symbol,
            price = price_move.price,
            change = price_move.change,
            "[TICKER] significant move"
        );
        alerts.raise(&price_move, now_unix_ms(), Instant::now());
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
