//! Redis pub/sub fan-out.
//!
//! Publishing maps each routing key to its Redis channel name; subscribing
//! spawns a forwarding task that bridges the Redis subscription into a
//! local broadcast channel, so engine-side subscribers keep the same
//! `broadcast::Receiver` interface as the in-memory backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use tokio::sync::{broadcast, RwLock};

use gather_core::notify::{ChangeNotification, Channel, Fanout, FanoutError, Result};

/// Capacity of each local forwarding buffer.
const CHANNEL_CAPACITY: usize = 100;

fn map_redis_error(err: redis::RedisError) -> FanoutError {
    if err.is_connection_refusal() || err.is_io_error() || err.is_connection_dropped() {
        FanoutError::ConnectionFailed(err.to_string())
    } else {
        FanoutError::PublishFailed(err.to_string())
    }
}

/// Redis-backed [`Fanout`] for cross-instance notification delivery.
pub struct RedisFanout {
    client: redis::Client,
    subscriptions: Arc<RwLock<HashMap<Channel, broadcast::Sender<ChangeNotification>>>>,
}

impl RedisFanout {
    /// Creates a new Redis fan-out connection.
    ///
    /// # Errors
    ///
    /// Returns `FanoutError::ConnectionFailed` if the connection cannot be
    /// established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;

        // Verify connectivity up front rather than on first publish.
        client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)?;

        Ok(Self {
            client,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
        })
    }
}

#[async_trait]
impl Fanout for RedisFanout {
    async fn publish(
        &self,
        channels: &[Channel],
        notification: &ChangeNotification,
    ) -> Result<()> {
        let payload = serde_json::to_string(notification)
            .map_err(|e| FanoutError::Serialization(e.to_string()))?;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)?;

        for channel in channels {
            conn.publish::<_, _, ()>(channel.name(), &payload)
                .await
                .map_err(|e| FanoutError::PublishFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn subscribe(&self, channel: Channel) -> Result<broadcast::Receiver<ChangeNotification>> {
        {
            let subscriptions = self.subscriptions.read().await;
            if let Some(sender) = subscriptions.get(&channel) {
                return Ok(sender.subscribe());
            }
        }

        let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);

        {
            let mut subscriptions = self.subscriptions.write().await;
            // Another task may have won the race for this channel.
            if let Some(sender) = subscriptions.get(&channel) {
                return Ok(sender.subscribe());
            }
            subscriptions.insert(channel, tx.clone());
        }

        let client = self.client.clone();
        let subscriptions = Arc::clone(&self.subscriptions);

        tokio::spawn(async move {
            if let Err(err) = forward_messages(client, channel, tx, subscriptions).await {
                tracing::error!(channel = %channel.name(), error = %err, "Redis subscription failed");
            }
        });

        Ok(rx)
    }
}

/// Forwards messages from a Redis subscription into the local broadcast
/// channel until the stream ends.
async fn forward_messages(
    client: redis::Client,
    channel: Channel,
    tx: broadcast::Sender<ChangeNotification>,
    subscriptions: Arc<RwLock<HashMap<Channel, broadcast::Sender<ChangeNotification>>>>,
) -> Result<()> {
    let mut pubsub = client
        .get_async_pubsub()
        .await
        .map_err(|e| FanoutError::SubscribeFailed(e.to_string()))?;

    pubsub
        .subscribe(channel.name())
        .await
        .map_err(|e| FanoutError::SubscribeFailed(e.to_string()))?;

    let mut stream = pubsub.on_message();
    while let Some(msg) = stream.next().await {
        let payload: String = msg
            .get_payload()
            .map_err(|e| FanoutError::SubscribeFailed(e.to_string()))?;

        match serde_json::from_str::<ChangeNotification>(&payload) {
            // Ignore send errors: they only mean no local receivers.
            Ok(notification) => {
                let _ = tx.send(notification);
            }
            Err(err) => {
                tracing::warn!(
                    channel = %channel.name(),
                    error = %err,
                    "Dropping undecodable notification payload"
                );
            }
        }
    }

    tracing::info!(channel = %channel.name(), "Redis subscription stream ended");
    let mut subscriptions = subscriptions.write().await;
    subscriptions.remove(&channel);
    Ok(())
}
