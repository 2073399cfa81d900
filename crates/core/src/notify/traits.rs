use async_trait::async_trait;
use tokio::sync::broadcast;

use super::types::{ChangeNotification, Channel};
use super::Result;

/// Trait for live change fan-out.
///
/// Delivery is fire-and-forget: publishing to a channel with no connected
/// subscriber drops the notification, and there is no retry or outbox.
/// Within a single channel, delivery order follows publish order.
#[async_trait]
pub trait Fanout: Send + Sync {
    /// Publishes a notification to every given channel.
    async fn publish(&self, channels: &[Channel], notification: &ChangeNotification)
        -> Result<()>;

    /// Subscribes to a channel's live notification stream.
    async fn subscribe(&self, channel: Channel) -> Result<broadcast::Receiver<ChangeNotification>>;
}
