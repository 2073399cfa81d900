//! In-memory fan-out over tokio broadcast channels.
//!
//! One broadcast channel per routing key, created lazily on first use.
//! Delivery is fire-and-forget: publishing to a channel nobody listens to
//! drops the notification, and within one channel subscribers see
//! notifications in publish order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use gather_core::notify::{ChangeNotification, Channel, Fanout, Result};

/// Capacity of each per-channel broadcast buffer.
const CHANNEL_CAPACITY: usize = 100;

/// In-memory [`Fanout`] backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryFanout {
    channels: Arc<RwLock<HashMap<Channel, broadcast::Sender<ChangeNotification>>>>,
}

impl MemoryFanout {
    /// Creates a new fan-out hub with no channels yet.
    pub fn new() -> Self {
        Self::default()
    }

    async fn sender(&self, channel: Channel) -> broadcast::Sender<ChangeNotification> {
        // Fast path under the read lock.
        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(&channel) {
                return sender.clone();
            }
        }

        let mut channels = self.channels.write().await;
        // Re-check: another task may have created it between the locks.
        if let Some(sender) = channels.get(&channel) {
            return sender.clone();
        }
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        channels.insert(channel, sender.clone());
        sender
    }
}

#[async_trait]
impl Fanout for MemoryFanout {
    async fn publish(
        &self,
        channels: &[Channel],
        notification: &ChangeNotification,
    ) -> Result<()> {
        for &channel in channels {
            let sender = self.sender(channel).await;
            // A send error only means nobody is connected to this channel.
            let _ = sender.send(notification.clone());
        }
        Ok(())
    }

    async fn subscribe(&self, channel: Channel) -> Result<broadcast::Receiver<ChangeNotification>> {
        Ok(self.sender(channel).await.subscribe())
    }
}
