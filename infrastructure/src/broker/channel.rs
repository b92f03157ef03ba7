//! In-process message broker
//!
//! [`ChannelBroker`] implements the [`MessageBroker`] port over tokio
//! channels: one unbounded mpsc channel per subscription, fed by a
//! routing table keyed on topic name. Each subscription gets its own
//! background reader task that invokes the handler one message at a
//! time, so per-topic ordering matches publish order.
//!
//! The size policy of the port is enforced on both sides of the channel:
//! oversized outbound payloads fail the publish without sending, and an
//! oversized inbound payload is dropped (and logged) before the handler
//! ever sees it.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use council_application::ports::broker::{
    BrokerError, BrokerMessage, MAX_MESSAGE_BYTES, MessageBroker, MessageHandler,
    WARN_MESSAGE_BYTES,
};

/// Serialized size of a payload, as counted against the message limits.
fn serialized_size(payload: &serde_json::Value) -> usize {
    serde_json::to_string(payload).map(|s| s.len()).unwrap_or(0)
}

/// Delivery-side size gate. Returns `false` (and logs) for messages
/// that must not reach a handler.
fn admit_inbound(message: &BrokerMessage) -> bool {
    let size = serialized_size(&message.payload);
    if size > MAX_MESSAGE_BYTES {
        warn!(
            topic = %message.topic,
            size,
            max = MAX_MESSAGE_BYTES,
            "Dropping oversized inbound message"
        );
        return false;
    }
    true
}

/// Broker over in-process channels.
pub struct ChannelBroker {
    topics: HashSet<String>,
    connected: AtomicBool,
    /// topic -> subscription senders. `std::sync::RwLock` because the
    /// lock is only held for map reads and inserts, never across an
    /// await.
    routes: RwLock<HashMap<String, Vec<mpsc::UnboundedSender<BrokerMessage>>>>,
    /// Reader tasks, aborted when the broker is dropped.
    readers: Mutex<Vec<JoinHandle<()>>>,
}

impl ChannelBroker {
    /// Build a broker serving exactly the given topics.
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
            connected: AtomicBool::new(false),
            routes: RwLock::new(HashMap::new()),
            readers: Mutex::new(Vec::new()),
        }
    }

    fn ensure_connected(&self) -> Result<(), BrokerError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(BrokerError::NotConnected)
        }
    }

    fn ensure_topic(&self, topic: &str) -> Result<(), BrokerError> {
        if self.topics.contains(topic) {
            Ok(())
        } else {
            Err(BrokerError::UnknownTopic(topic.to_string()))
        }
    }
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn connect(&self) -> Result<(), BrokerError> {
        if self.connected.swap(true, Ordering::AcqRel) {
            debug!("Broker already connected");
            return Ok(());
        }
        info!(topics = self.topics.len(), "In-process broker connected");
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        payload: &serde_json::Value,
        partition_key: Option<&str>,
    ) -> Result<(), BrokerError> {
        self.ensure_connected()?;
        self.ensure_topic(topic)?;

        let size = serialized_size(payload);
        if size > MAX_MESSAGE_BYTES {
            warn!(
                topic,
                size,
                max = MAX_MESSAGE_BYTES,
                "Refusing to publish oversized message"
            );
            return Err(BrokerError::MessageTooLarge {
                size,
                max: MAX_MESSAGE_BYTES,
            });
        }
        if size > WARN_MESSAGE_BYTES {
            warn!(topic, size, "Publishing large message");
        }

        let message = BrokerMessage {
            topic: topic.to_string(),
            payload: payload.clone(),
            partition_key: partition_key.map(|k| k.to_string()),
        };

        let routes = self
            .routes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match routes.get(topic) {
            Some(senders) => {
                for sender in senders {
                    // A dead subscription just stops receiving.
                    let _ = sender.send(message.clone());
                }
                trace!(topic, size, subscribers = senders.len(), "Message published");
            }
            None => trace!(topic, size, "No subscribers, message dropped"),
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str, handler: MessageHandler) -> Result<(), BrokerError> {
        self.ensure_connected()?;
        self.ensure_topic(topic)?;

        let (tx, mut rx) = mpsc::unbounded_channel::<BrokerMessage>();
        {
            let mut routes = self
                .routes
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            routes.entry(topic.to_string()).or_default().push(tx);
        }

        let topic_name = topic.to_string();
        let reader = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if !admit_inbound(&message) {
                    continue;
                }
                handler(message).await;
            }
            debug!(topic = %topic_name, "Subscription reader ended");
        });
        self.readers.lock().await.push(reader);

        info!(topic, "Subscribed");
        Ok(())
    }
}

impl Drop for ChannelBroker {
    fn drop(&mut self) {
        for reader in self.readers.get_mut().drain(..) {
            reader.abort();
        }
    }
}
