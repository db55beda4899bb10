//! Shared data structures used throughout the application.

use serde::Serialize;

/// One entry in process-wide notification state, consumed by a
/// notification-panel collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Action routed into notification state by the stream manager.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationAction {
    Add(Notification),
    Remove { id: String },
}

/// Channel end the stream manager pushes notification actions into.
pub type NotificationSink = tokio::sync::mpsc::UnboundedSender<NotificationAction>;

/// A relative price change at or above the alert threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMove {
    /// Market symbol, canonical lowercase form.
    pub symbol: String,
    pub price: f64,
    /// `|new - previous| / previous`.
    pub change: f64,
}
