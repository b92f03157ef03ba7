//! Message broker port
//!
//! Publish/subscribe boundary for council events. The application layer
//! serializes its events to JSON values and hands them to a broker
//! adapter; size policy (reject oversized outbound, drop oversized
//! inbound) is part of the contract so every adapter enforces it the
//! same way.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;

/// Hard limit on a serialized message. Publishing anything larger fails
/// without sending; inbound messages over the limit are dropped before
/// the handler sees them.
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Soft limit. Messages above it are still delivered but logged.
pub const WARN_MESSAGE_BYTES: usize = 512 * 1024;

/// Errors surfaced by broker adapters.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Broker not connected")]
    NotConnected,

    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Message of {size} bytes exceeds the {max} byte limit")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Subscription failed: {0}")]
    SubscriptionFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),
}

/// One delivered message, as handed to a subscription handler.
#[derive(Debug, Clone)]
pub struct BrokerMessage {
    pub topic: String,
    pub payload: serde_json::Value,
    pub partition_key: Option<String>,
}

/// Per-message callback registered with [`MessageBroker::subscribe`].
pub type MessageHandler = Arc<dyn Fn(BrokerMessage) -> BoxFuture<'static, ()> + Send + Sync>;

/// Abstraction over the event transport.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Establish the connection and make sure every council topic
    /// exists. Safe to call more than once.
    async fn connect(&self) -> Result<(), BrokerError>;

    /// Serialize `payload` and send it to `topic`.
    ///
    /// Fails with [`BrokerError::MessageTooLarge`] above
    /// [`MAX_MESSAGE_BYTES`] without sending anything; logs a warning
    /// above [`WARN_MESSAGE_BYTES`] but still sends.
    async fn publish(
        &self,
        topic: &str,
        payload: &serde_json::Value,
        partition_key: Option<&str>,
    ) -> Result<(), BrokerError>;

    /// Register `handler` to be invoked once per message arriving on
    /// `topic`. Oversized inbound messages are dropped (and logged)
    /// before the handler runs.
    async fn subscribe(&self, topic: &str, handler: MessageHandler) -> Result<(), BrokerError>;
}
