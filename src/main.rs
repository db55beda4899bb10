use anyhow::Result;
use ticker_alerts::{
    config::StreamConfig, models::NotificationAction, stream::PriceStream, utils,
};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = StreamConfig::from_env()?;
    tracing::info!(symbols = ?config.symbols, "[INIT] price feed starting");

    let (sink, mut notifications) = mpsc::unbounded_channel();

    // Stand-in for the notification panel: log every state change.
    let panel_task = tokio::spawn(async move {
        while let Some(action) = notifications.recv().await {
            match action {
                NotificationAction::Add(notification) => {
                    tracing::info!(
                        id = %notification.id,
                        message = %notification.message,
                        "[PANEL] notification added"
                    );
                }
                NotificationAction::Remove { id } => {
                    tracing::info!(id = %id, "[PANEL] notification removed");
                }
            }
        }
    });

    let stream = PriceStream::connect(config, sink);

    tokio::signal::ctrl_c().await?;
    tracing::info!("[INIT] shutting down");
    stream.disconnect().await;
    panel_task.abort();
    Ok(())
}
