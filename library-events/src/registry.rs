//! Shared subscriptions keyed by purpose
//!
//! Several consumers often need the same feed (every screen that shows the
//! current profile wants session changes). The registry holds at most one
//! live bus subscription per purpose and fans its events out to every
//! [`SubscriptionLease`]. The bus subscription is released when the last
//! lease for that purpose drops.

use crate::bus::{EventBus, EventBusError, EventBusResult, Subscription};
use crate::types::Event;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A named feed and the topic pattern it subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionPurpose {
    /// Registry key
    pub name: String,
    /// Bus topic pattern
    pub pattern: String,
}

impl SubscriptionPurpose {
    /// Create a purpose.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Sign-in state and profile changes published by the backend.
    pub fn session_changes() -> Self {
        Self::new("session-changes", "backend.#")
    }

    /// User activity published by the browsing client.
    pub fn analytics() -> Self {
        Self::new("analytics", "web.#")
    }
}

struct Entry {
    subscription_id: String,
    fanout: broadcast::Sender<Event>,
    forwarder: JoinHandle<()>,
    leases: usize,
}

type Entries = Mutex<HashMap<String, Entry>>;

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, Entry>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registry of shared bus subscriptions.
pub struct SubscriptionRegistry {
    bus: Arc<dyn EventBus>,
    entries: Arc<Entries>,
    capacity: usize,
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("live", &self.live_subscriptions())
            .finish()
    }
}

impl SubscriptionRegistry {
    /// Create a registry over a bus.
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self::with_capacity(bus, 256)
    }

    /// Create with a custom per-purpose fan-out capacity.
    pub fn with_capacity(bus: Arc<dyn EventBus>, capacity: usize) -> Self {
        Self {
            bus,
            entries: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Acquire a lease on the feed for `purpose`.
    ///
    /// The first lease subscribes on the bus; later leases share that
    /// subscription.
    pub async fn acquire(&self, purpose: &SubscriptionPurpose) -> EventBusResult<SubscriptionLease> {
        let existing = {
            let mut entries = lock(&self.entries);
            entries
                .get_mut(&purpose.name)
                .map(|entry| self.lease(&purpose.name, entry))
        };
        if let Some(lease) = existing {
            return Ok(lease);
        }

        let subscription = self.bus.subscribe(&purpose.pattern).await?;

        // Another caller may have subscribed while we awaited
        let (lease, duplicate_id) = {
            let mut entries = lock(&self.entries);
            match entries.get_mut(&purpose.name) {
                Some(entry) => (self.lease(&purpose.name, entry), Some(subscription.id.clone())),
                None => {
                    let (fanout, _) = broadcast::channel(self.capacity);
                    let subscription_id = subscription.id.clone();
                    let forwarder = tokio::spawn(forward(subscription, fanout.clone()));
                    let entry = entries.entry(purpose.name.clone()).or_insert(Entry {
                        subscription_id,
                        fanout,
                        forwarder,
                        leases: 0,
                    });
                    debug!(purpose = %purpose.name, pattern = %purpose.pattern, "Opened shared subscription");
                    (self.lease(&purpose.name, entry), None)
                }
            }
        };

        if let Some(id) = duplicate_id {
            if let Err(e) = self.bus.unsubscribe(&id).await {
                warn!(error = %e, "Failed to release duplicate subscription");
            }
        }

        Ok(lease)
    }

    /// Take a lease on `entry`. Callers hold the entries lock.
    fn lease(&self, name: &str, entry: &mut Entry) -> SubscriptionLease {
        entry.leases += 1;
        SubscriptionLease {
            purpose: name.to_string(),
            receiver: entry.fanout.subscribe(),
            entries: Arc::downgrade(&self.entries),
            bus: self.bus.clone(),
        }
    }

    /// Number of live leases for a purpose.
    pub fn lease_count(&self, name: &str) -> usize {
        lock(&self.entries).get(name).map(|e| e.leases).unwrap_or(0)
    }

    /// Number of purposes with a live bus subscription.
    pub fn live_subscriptions(&self) -> usize {
        lock(&self.entries).len()
    }
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        for (_, entry) in lock(&self.entries).drain() {
            entry.forwarder.abort();
        }
    }
}

async fn forward(mut subscription: Subscription, fanout: broadcast::Sender<Event>) {
    loop {
        match subscription.recv().await {
            Ok(event) => {
                // Err only means every lease is between recv calls
                let _ = fanout.send(event);
            }
            Err(EventBusError::Lagged(skipped)) => {
                warn!(topic = %subscription.topic, skipped, "Shared subscription lagged");
            }
            Err(_) => break,
        }
    }
}

/// A reference-counted handle on a shared feed.
pub struct SubscriptionLease {
    purpose: String,
    receiver: broadcast::Receiver<Event>,
    entries: Weak<Entries>,
    bus: Arc<dyn EventBus>,
}

impl std::fmt::Debug for SubscriptionLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionLease")
            .field("purpose", &self.purpose)
            .finish()
    }
}

impl SubscriptionLease {
    /// Purpose this lease belongs to.
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// Receive the next event on the shared feed.
    pub async fn recv(&mut self) -> EventBusResult<Event> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Lagged(skipped) => EventBusError::Lagged(skipped),
            broadcast::error::RecvError::Closed => EventBusError::ChannelClosed,
        })
    }
}

impl Drop for SubscriptionLease {
    fn drop(&mut self) {
        let Some(entries) = self.entries.upgrade() else {
            return;
        };

        let released = {
            let mut entries = lock(&entries);
            let remaining = match entries.get_mut(&self.purpose) {
                Some(entry) => {
                    entry.leases = entry.leases.saturating_sub(1);
                    entry.leases
                }
                None => return,
            };
            if remaining == 0 {
                entries.remove(&self.purpose)
            } else {
                None
            }
        };

        if let Some(entry) = released {
            entry.forwarder.abort();
            debug!(purpose = %self.purpose, "Released shared subscription");

            let bus = self.bus.clone();
            let id = entry.subscription_id;
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = bus.unsubscribe(&id).await {
                        warn!(error = %e, "Failed to unsubscribe released feed");
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MemoryEventBus;
    use crate::types::SessionEvent;
    use std::time::Duration;

    fn registry() -> (Arc<MemoryEventBus>, SubscriptionRegistry) {
        let bus = Arc::new(MemoryEventBus::new());
        let registry = SubscriptionRegistry::new(bus.clone());
        (bus, registry)
    }

    fn signed_out() -> Event {
        SessionEvent::SignedOut {
            user_id: "user-1".to_string(),
        }
        .to_event()
    }

    #[tokio::test]
    async fn test_single_bus_subscription_per_purpose() {
        let (bus, registry) = registry();
        let purpose = SubscriptionPurpose::session_changes();

        let _first = registry.acquire(&purpose).await.unwrap();
        let _second = registry.acquire(&purpose).await.unwrap();

        assert_eq!(registry.lease_count(&purpose.name), 2);
        assert_eq!(registry.live_subscriptions(), 1);
        assert_eq!(bus.stats().await.active_subscriptions, 1);
    }

    #[tokio::test]
    async fn test_events_multiplexed_to_every_lease() {
        let (bus, registry) = registry();
        let purpose = SubscriptionPurpose::session_changes();

        let mut first = registry.acquire(&purpose).await.unwrap();
        let mut second = registry.acquire(&purpose).await.unwrap();

        bus.publish(signed_out()).await.unwrap();

        for lease in [&mut first, &mut second] {
            let event = tokio::time::timeout(Duration::from_millis(200), lease.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(event.event_type, "session.signed_out");
        }
    }

    #[tokio::test]
    async fn test_released_on_last_drop() {
        let (bus, registry) = registry();
        let purpose = SubscriptionPurpose::session_changes();

        let first = registry.acquire(&purpose).await.unwrap();
        let second = registry.acquire(&purpose).await.unwrap();

        drop(first);
        assert_eq!(registry.live_subscriptions(), 1);
        assert_eq!(registry.lease_count(&purpose.name), 1);

        drop(second);
        assert_eq!(registry.live_subscriptions(), 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(bus.stats().await.active_subscriptions, 0);
    }

    #[tokio::test]
    async fn test_reacquire_after_release() {
        let (bus, registry) = registry();
        let purpose = SubscriptionPurpose::session_changes();

        drop(registry.acquire(&purpose).await.unwrap());
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut lease = registry.acquire(&purpose).await.unwrap();
        bus.publish(signed_out()).await.unwrap();

        let event = tokio::time::timeout(Duration::from_millis(200), lease.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.user_id.as_deref(), Some("user-1"));
        assert_eq!(bus.stats().await.active_subscriptions, 1);
    }

    #[tokio::test]
    async fn test_purposes_are_independent() {
        let (bus, registry) = registry();

        let mut session = registry
            .acquire(&SubscriptionPurpose::session_changes())
            .await
            .unwrap();
        let _analytics = registry
            .acquire(&SubscriptionPurpose::analytics())
            .await
            .unwrap();

        assert_eq!(registry.live_subscriptions(), 2);
        assert_eq!(session.purpose(), "session-changes");

        bus.publish(signed_out()).await.unwrap();
        assert!(tokio::time::timeout(Duration::from_millis(200), session.recv())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_acquire_and_release() {
        let (bus, registry) = registry();
        let registry = Arc::new(registry);
        let purpose = SubscriptionPurpose::session_changes();

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            let purpose = purpose.clone();
            tasks.push(tokio::spawn(async move {
                let lease = registry.acquire(&purpose).await;
                tokio::task::yield_now().await;
                lease.map(drop)
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), Ok(()));
        }

        let mut lease = registry.acquire(&purpose).await.unwrap();
        assert_eq!(registry.lease_count(&purpose.name), 1);

        bus.publish(signed_out()).await.unwrap();
        assert!(tokio::time::timeout(Duration::from_millis(200), lease.recv())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_lease_outliving_registry() {
        let (_bus, registry) = registry();
        let lease = registry
            .acquire(&SubscriptionPurpose::analytics())
            .await
            .unwrap();

        drop(registry);
        drop(lease);
    }
}
