//! [`PubSub`] — component (C): topic and pattern subscriptions over
//! durable channels, delivering JSON-encoded events to async iterators.
//!
//! Built on `tokio::sync::broadcast`: each channel gets its own sender
//! created lazily on first publish or subscribe; a pattern subscription
//! gets its own sender fed by every publish whose channel name matches.
//! There is no persistence — a subscriber that attaches after a publish
//! never sees it (spec.md I7); the job service (4.H) compensates with
//! its own result cache.

use crate::error::Result;
use crate::pattern;
use async_stream::stream;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::Mutex;
use tracing::warn;

const CHANNEL_CAPACITY: usize = 256;

struct PatternSub {
    pattern: String,
    sender: broadcast::Sender<(String, Value)>,
}

struct Inner {
    channels: Mutex<HashMap<String, broadcast::Sender<Value>>>,
    patterns: Mutex<HashMap<u64, PatternSub>>,
    next_pattern_id: AtomicU64,
}

/// A topic/pattern pub/sub bus carrying messages of type `T`.
///
/// `T` must round-trip through JSON; the bus itself only ever handles
/// `serde_json::Value` internally so cloning a broadcast message doesn't
/// require `T: Clone`.
pub struct PubSub<T> {
    inner: Arc<Inner>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PubSub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for PubSub<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PubSub<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                channels: Mutex::new(HashMap::new()),
                patterns: Mutex::new(HashMap::new()),
                next_pattern_id: AtomicU64::new(1),
            }),
            _marker: PhantomData,
        }
    }

    async fn channel_sender(&self, channel: &str) -> broadcast::Sender<Value> {
        let mut channels = self.inner.channels.lock().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Serialize `message` and hand it to the transport. Delivery to zero
    /// subscribers is not an error — there is simply no one to receive it.
    pub async fn publish(&self, channel: &str, message: &T) -> Result<()> {
        let value = serde_json::to_value(message)?;

        let sender = self.channel_sender(channel).await;
        let _ = sender.send(value.clone());

        let patterns = self.inner.patterns.lock().await;
        for sub in patterns.values() {
            if pattern::matches(&sub.pattern, channel) {
                let _ = sub.sender.send((channel.to_string(), value.clone()));
            }
        }
        Ok(())
    }

    /// Subscribe to `channel`, optionally filtering with `type_guard`.
    /// Messages failing the guard are dropped with a warning, not
    /// delivered. Dropping the returned stream releases the subscription.
    pub async fn subscribe(
        &self,
        channel: &str,
        type_guard: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
    ) -> BoxStream<'static, T> {
        let sender = self.channel_sender(channel).await;
        let mut rx = sender.subscribe();
        let channel = channel.to_string();

        Box::pin(stream! {
            loop {
                match rx.recv().await {
                    Ok(value) => match serde_json::from_value::<T>(value) {
                        Ok(msg) => {
                            if type_guard.as_ref().map_or(true, |g| g(&msg)) {
                                yield msg;
                            } else {
                                warn!(channel = %channel, "dropped message failing type guard");
                            }
                        }
                        Err(e) => warn!(channel = %channel, error = %e, "dropped undecodable message"),
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(channel = %channel, skipped = n, "subscriber lagged, messages dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Subscribe to every channel matching `pattern` (glob, see
    /// [`crate::pattern`]). Yields `(channel, message)` pairs.
    pub async fn psubscribe(&self, pattern: &str) -> BoxStream<'static, (String, T)> {
        let id = self.inner.next_pattern_id.fetch_add(1, Ordering::SeqCst);
        let (tx, mut rx) = broadcast::channel(CHANNEL_CAPACITY);
        {
            let mut patterns = self.inner.patterns.lock().await;
            patterns.insert(
                id,
                PatternSub {
                    pattern: pattern.to_string(),
                    sender: tx,
                },
            );
        }
        let inner = self.inner.clone();
        let pattern_owned = pattern.to_string();

        Box::pin(stream! {
            loop {
                match rx.recv().await {
                    Ok((channel, value)) => match serde_json::from_value::<T>(value) {
                        Ok(msg) => yield (channel, msg),
                        Err(e) => warn!(pattern = %pattern_owned, error = %e, "dropped undecodable message"),
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(pattern = %pattern_owned, skipped = n, "pattern subscriber lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            inner.patterns.lock().await.remove(&id);
        })
    }

    /// Drop the channel's sender, closing every current and future
    /// subscriber's stream once they've drained pending messages.
    pub async fn unsubscribe(&self, channel: &str) {
        self.inner.channels.lock().await.remove(channel);
    }

    pub async fn punsubscribe_all(&self) {
        self.inner.patterns.lock().await.clear();
    }

    pub async fn get_subscriber_count(&self, channel: &str) -> usize {
        self.inner
            .channels
            .lock()
            .await
            .get(channel)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    pub async fn get_active_channels(&self) -> Vec<String> {
        self.inner
            .channels
            .lock()
            .await
            .iter()
            .filter(|(_, s)| s.receiver_count() > 0)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Tear down every channel and pattern subscription.
    pub async fn close(&self) {
        self.inner.channels.lock().await.clear();
        self.inner.patterns.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde::Deserialize;
    use tokio::time::{timeout, Duration};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Event {
        kind: String,
    }

    #[tokio::test]
    async fn subscriber_before_publish_receives_message() {
        let bus: PubSub<Event> = PubSub::new();
        let mut sub = bus.subscribe("chan", None).await;
        bus.publish("chan", &Event { kind: "hi".into() }).await.unwrap();
        let msg = timeout(Duration::from_millis(200), sub.next()).await.unwrap();
        assert_eq!(msg, Some(Event { kind: "hi".into() }));
    }

    #[tokio::test]
    async fn subscriber_after_publish_does_not_see_it() {
        let bus: PubSub<Event> = PubSub::new();
        bus.publish("chan", &Event { kind: "hi".into() }).await.unwrap();
        let mut sub = bus.subscribe("chan", None).await;
        bus.publish("chan", &Event { kind: "bye".into() }).await.unwrap();
        let msg = timeout(Duration::from_millis(200), sub.next()).await.unwrap();
        assert_eq!(msg, Some(Event { kind: "bye".into() }));
    }

    #[tokio::test]
    async fn type_guard_drops_non_matching_messages() {
        let bus: PubSub<Event> = PubSub::new();
        let guard: Arc<dyn Fn(&Event) -> bool + Send + Sync> =
            Arc::new(|e: &Event| e.kind == "keep");
        let mut sub = bus.subscribe("chan", Some(guard)).await;
        bus.publish("chan", &Event { kind: "drop".into() }).await.unwrap();
        bus.publish("chan", &Event { kind: "keep".into() }).await.unwrap();
        let msg = timeout(Duration::from_millis(200), sub.next()).await.unwrap();
        assert_eq!(msg, Some(Event { kind: "keep".into() }));
    }

    #[tokio::test]
    async fn psubscribe_matches_pattern_and_yields_channel() {
        let bus: PubSub<Event> = PubSub::new();
        let mut sub = bus.psubscribe("jobs:*").await;
        bus.publish("jobs:1", &Event { kind: "a".into() }).await.unwrap();
        bus.publish("other:1", &Event { kind: "b".into() }).await.unwrap();
        let (channel, msg) = timeout(Duration::from_millis(200), sub.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(channel, "jobs:1");
        assert_eq!(msg.kind, "a");
    }

    #[tokio::test]
    async fn subscriber_count_reflects_active_subscriptions() {
        let bus: PubSub<Event> = PubSub::new();
        assert_eq!(bus.get_subscriber_count("chan").await, 0);
        let sub = bus.subscribe("chan", None).await;
        assert_eq!(bus.get_subscriber_count("chan").await, 1);
        drop(sub);
        // receiver_count updates synchronously on drop.
        assert_eq!(bus.get_subscriber_count("chan").await, 0);
    }
}
