//! Subscriber-based notifications for configuration reloads.

use arc_swap::ArcSwap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Handle for a subscription that can be dropped to unsubscribe.
///
/// When the handle is dropped, the subscription is removed. Call
/// [`SubscriptionHandle::detach`] to keep the callback registered for the
/// lifetime of the registry instead.
#[must_use = "dropping the handle unsubscribes immediately"]
pub struct SubscriptionHandle {
    id: usize,
    registry: Option<Arc<SubscriberRegistryInner>>,
}

impl SubscriptionHandle {
    /// Keep the subscription registered after the handle is gone.
    pub fn detach(mut self) {
        self.registry = None;
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take() {
            let id = self.id;
            registry.subscribers.rcu(|subscribers| {
                subscribers
                    .iter()
                    .filter(|(sub_id, _)| *sub_id != id)
                    .cloned()
                    .collect::<Vec<_>>()
            });
        }
    }
}

/// Internal subscriber registry state.
struct SubscriberRegistryInner {
    subscribers: ArcSwap<Vec<(usize, Callback)>>,
    next_id: AtomicUsize,
}

/// Registry for managing configuration reload subscribers.
///
/// The subscriber list is itself published through `arc-swap`: subscribing
/// and unsubscribing swap in a new list, and [`notify_all`](Self::notify_all)
/// walks the list it loaded without holding any lock, so a slow callback
/// never blocks registration.
///
/// # Examples
///
/// ```rust
/// use hotswap_json::notify::SubscriberRegistry;
///
/// let registry = SubscriberRegistry::new();
///
/// let handle = registry.subscribe(|| {
///     println!("Config changed!");
/// });
///
/// // Notify all subscribers
/// registry.notify_all();
///
/// // Unsubscribe by dropping the handle
/// drop(handle);
/// assert_eq!(registry.subscriber_count(), 0);
/// ```
pub struct SubscriberRegistry {
    inner: Arc<SubscriberRegistryInner>,
}

impl SubscriberRegistry {
    /// Create a new subscriber registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubscriberRegistryInner {
                subscribers: ArcSwap::from_pointee(Vec::new()),
                next_id: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to configuration reloads.
    ///
    /// Returns a handle that can be dropped to unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: Callback = Arc::new(callback);

        self.inner.subscribers.rcu(|subscribers| {
            let mut next = Vec::with_capacity(subscribers.len() + 1);
            next.extend(subscribers.iter().cloned());
            next.push((id, Arc::clone(&callback)));
            next
        });

        SubscriptionHandle {
            id,
            registry: Some(Arc::clone(&self.inner)),
        }
    }

    /// Call every subscriber in the order they were subscribed.
    pub fn notify_all(&self) {
        let subscribers = self.inner.subscribers.load_full();
        for (_id, callback) in subscribers.iter() {
            callback();
        }
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.load().len()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SubscriberRegistry {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_notify() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let _handle = registry.subscribe(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.notify_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        registry.notify_all();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_multiple_subscribers() {
        let registry = SubscriberRegistry::new();
        let counter1 = Arc::new(AtomicUsize::new(0));
        let counter2 = Arc::new(AtomicUsize::new(0));

        let counter1_clone = Arc::clone(&counter1);
        let _handle1 = registry.subscribe(move || {
            counter1_clone.fetch_add(1, Ordering::SeqCst);
        });

        let counter2_clone = Arc::clone(&counter2);
        let _handle2 = registry.subscribe(move || {
            counter2_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.notify_all();
        assert_eq!(counter1.load(Ordering::SeqCst), 1);
        assert_eq!(counter2.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let handle = registry.subscribe(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.notify_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        drop(handle);

        registry.notify_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detach_keeps_subscription() {
        let registry = SubscriberRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        registry
            .subscribe(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            })
            .detach();

        assert_eq!(registry.subscriber_count(), 1);
        registry.notify_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscriber_count() {
        let registry = SubscriberRegistry::new();
        assert_eq!(registry.subscriber_count(), 0);

        let handle1 = registry.subscribe(|| {});
        assert_eq!(registry.subscriber_count(), 1);

        let _handle2 = registry.subscribe(|| {});
        assert_eq!(registry.subscriber_count(), 2);

        drop(handle1);
        assert_eq!(registry.subscriber_count(), 1);
    }

    #[test]
    fn test_clone_registry() {
        let registry = SubscriberRegistry::new();
        let registry2 = registry.clone();

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let _handle = registry.subscribe(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Notify via clone
        registry2.notify_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
