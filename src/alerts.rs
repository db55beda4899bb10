//! De-duplicated, auto-expiring price alerts.

use crate::models::{Notification, NotificationAction, NotificationSink, PriceMove};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A toast currently visible for one symbol.
#[derive(Debug)]
struct ActiveToast {
    /// Id of the notification the toast was raised with; removed from
    /// notification state when the toast closes.
    notification_id: String,
    expires_at: Instant,
}

/// Surfaces price moves as user notifications and tracks which symbols
/// already have a visible toast.
///
/// Every qualifying move lands in notification state through the sink; the
/// transient toast itself is suppressed per symbol while one is on screen.
/// Toast lifetimes are plain deadlines, so tests can drive expiry without a
/// real timer.
#[derive(Debug)]
pub struct AlertDispatcher {
    sink: NotificationSink,
    auto_dismiss: Duration,
    active: HashMap<String, ActiveToast>,
}

impl AlertDispatcher {
    pub fn new(sink: NotificationSink, auto_dismiss: Duration) -> Self {
        Self {
            sink,
            auto_dismiss,
            active: HashMap::new(),
        }
    }

    /// Surface one price move. The notification push happens unconditionally;
    /// a toast entry is only created when the symbol has none on screen.
    pub fn raise(&mut self, price_move: &PriceMove, now_ms: i64, now: Instant) {
        let symbol = price_move.symbol.to_uppercase();
        let id = format!("price-alert-{symbol}-{now_ms}");
        let message = format!("{symbol}: ${:.2}", price_move.price);

        let _ = self.sink.send(NotificationAction::Add(Notification {
            id: id.clone(),
            message,
            timestamp: now_ms,
        }));

        if self.active.contains_key(&symbol) {
            debug!(symbol = %symbol, "[ALERT] toast suppressed, one already visible");
            return;
        }
        self.active.insert(
            symbol,
            ActiveToast {
                notification_id: id,
                expires_at: now + self.auto_dismiss,
            },
        );
    }

    /// Terminal notification after the retry budget is spent. Never removed,
    /// so it does not auto-dismiss.
    pub fn raise_connection_lost(&mut self, now_ms: i64) {
        let _ = self.sink.send(NotificationAction::Add(Notification {
            id: format!("connection-lost-{now_ms}"),
            message: "Connection lost. Please refresh the page.".into(),
            timestamp: now_ms,
        }));
    }

    /// Earliest pending toast expiry, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.values().map(|toast| toast.expires_at).min()
    }

    /// Close every toast whose visible lifetime has elapsed.
    pub fn expire_due(&mut self, now: Instant) {
        let due: Vec<String> = self
            .active
            .iter()
            .filter(|(_, toast)| toast.expires_at <= now)
            .map(|(symbol, _)| symbol.clone())
            .collect();
        for symbol in due {
            self.close(&symbol);
        }
    }

    /// Close one symbol's toast early (user dismissal).
    pub fn dismiss(&mut self, symbol: &str) {
        self.close(&symbol.to_uppercase());
    }

    fn close(&mut self, symbol: &str) {
        if let Some(toast) = self.active.remove(symbol) {
            debug!(symbol = %symbol, "[ALERT] toast closed");
            let _ = self.sink.send(NotificationAction::Remove {
                id: toast.notification_id,
            });
        }
    }

    /// Symbols with a toast currently on screen.
    pub fn active_toasts(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, symbol: &str) -> bool {
        self.active.contains_key(&symbol.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    const DISMISS: Duration = Duration::from_millis(3000);

    fn dispatcher() -> (AlertDispatcher, UnboundedReceiver<NotificationAction>) {
        let (sink, rx) = mpsc::unbounded_channel();
        (AlertDispatcher::new(sink, DISMISS), rx)
    }

    fn btc_move(price: f64) -> PriceMove {
        PriceMove {
            symbol: "btcusdt".into(),
            price,
            change: 0.02,
        }
    }

    fn drain(rx: &mut UnboundedReceiver<NotificationAction>) -> Vec<NotificationAction> {
        let mut actions = Vec::new();
        while let Ok(action) = rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    #[test]
    fn raises_formatted_notification_and_toast() {
        let (mut alerts, mut rx) = dispatcher();
        alerts.raise(&btc_move(42123.456), 1_700_000_000_000, Instant::now());

        let actions = drain(&mut rx);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            NotificationAction::Add(n) => {
                assert_eq!(n.id, "price-alert-BTCUSDT-1700000000000");
                assert_eq!(n.message, "BTCUSDT: $42123.46");
                assert_eq!(n.timestamp, 1_700_000_000_000);
            }
            other => panic!("expected Add, got {other:?}"),
        }
        assert!(alerts.is_active("btcusdt"));
    }

    #[test]
    fn duplicate_alert_pushes_twice_but_shows_one_toast() {
        let (mut alerts, mut rx) = dispatcher();
        let now = Instant::now();
        alerts.raise(&btc_move(100.0), 1, now);
        alerts.raise(&btc_move(103.0), 2, now + Duration::from_millis(500));

        assert_eq!(alerts.active_toasts(), 1);
        let actions = drain(&mut rx);
        assert_eq!(actions.len(), 2);
        assert!(actions
            .iter()
            .all(|a| matches!(a, NotificationAction::Add(_))));
    }

    #[test]
    fn expiry_removes_the_first_notification_only() {
        let (mut alerts, mut rx) = dispatcher();
        let now = Instant::now();
        alerts.raise(&btc_move(100.0), 1, now);
        alerts.raise(&btc_move(103.0), 2, now + Duration::from_millis(500));
        drain(&mut rx);

        // Not due yet.
        alerts.expire_due(now + DISMISS - Duration::from_millis(1));
        assert_eq!(alerts.active_toasts(), 1);
        assert!(drain(&mut rx).is_empty());

        alerts.expire_due(now + DISMISS);
        assert_eq!(alerts.active_toasts(), 0);
        let actions = drain(&mut rx);
        assert_eq!(
            actions,
            vec![NotificationAction::Remove {
                id: "price-alert-BTCUSDT-1".into()
            }]
        );
    }

    #[test]
    fn symbols_expire_independently() {
        let (mut alerts, mut rx) = dispatcher();
        let now = Instant::now();
        alerts.raise(&btc_move(100.0), 1, now);
        alerts.raise(
            &PriceMove {
                symbol: "ethusdt".into(),
                price: 2000.0,
                change: 0.05,
            },
            2,
            now + Duration::from_millis(1000),
        );
        drain(&mut rx);

        assert_eq!(alerts.next_deadline(), Some(now + DISMISS));
        alerts.expire_due(now + DISMISS);
        assert!(!alerts.is_active("btcusdt"));
        assert!(alerts.is_active("ethusdt"));
        assert_eq!(
            alerts.next_deadline(),
            Some(now + Duration::from_millis(1000) + DISMISS)
        );
    }

    #[test]
    fn dismiss_closes_early_and_allows_a_new_toast() {
        let (mut alerts, mut rx) = dispatcher();
        let now = Instant::now();
        alerts.raise(&btc_move(100.0), 1, now);
        drain(&mut rx);

        alerts.dismiss("btcusdt");
        assert_eq!(alerts.active_toasts(), 0);
        assert_eq!(
            drain(&mut rx),
            vec![NotificationAction::Remove {
                id: "price-alert-BTCUSDT-1".into()
            }]
        );

        alerts.raise(&btc_move(103.0), 2, now + Duration::from_millis(100));
        assert!(alerts.is_active("btcusdt"));
    }

    #[test]
    fn connection_lost_notification_is_persistent() {
        let (mut alerts, mut rx) = dispatcher();
        alerts.raise_connection_lost(7);

        let actions = drain(&mut rx);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            NotificationAction::Add(n) => {
                assert_eq!(n.message, "Connection lost. Please refresh the page.");
                assert_eq!(n.id, "connection-lost-7");
            }
            other => panic!("expected Add, got {other:?}"),
        }
        // No toast entry, so nothing ever expires it.
        assert_eq!(alerts.active_toasts(), 0);
        assert_eq!(alerts.next_deadline(), None);
    }

    #[test]
    fn closed_sink_does_not_panic() {
        let (mut alerts, rx) = dispatcher();
        drop(rx);
        alerts.raise(&btc_move(100.0), 1, Instant::now());
        alerts.raise_connection_lost(2);
        assert!(alerts.is_active("btcusdt"));
    }
}
