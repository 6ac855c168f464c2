use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::{ChangeCallback, SettingChange, Subscription};

/// Callback bookkeeping shared by the store implementations.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<(Subscription, ChangeCallback)>>,
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscriptions", &self.entries.lock().len())
            .finish()
    }
}

impl SubscriberRegistry {
    pub(crate) fn register(
        &self,
        key: &str,
        callback: ChangeCallback,
    ) -> Subscription {
        let subscription = Subscription {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            key: key.to_string(),
        };
        self.entries.lock().push((subscription.clone(), callback));
        subscription
    }

    pub(crate) fn remove(&self, subscription: &Subscription) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(s, _)| s != subscription);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Invoke every callback registered for the changed keys.
    ///
    /// Callbacks run after the registry lock is released, so they may
    /// connect or disconnect freely.
    pub(crate) fn notify(&self, changes: &[SettingChange]) {
        for change in changes {
            let callbacks: Vec<ChangeCallback> = self
                .entries
                .lock()
                .iter()
                .filter(|(s, _)| s.key == change.key)
                .map(|(_, cb)| cb.clone())
                .collect();
            for callback in callbacks {
                callback(change);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, atomic::AtomicUsize};

    fn change(key: &str) -> SettingChange {
        SettingChange {
            key: key.into(),
            value: Some("v".into()),
        }
    }

    #[test]
    fn callbacks_fire_per_key_until_removed() {
        let registry = SubscriberRegistry::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let sub = registry.register(
            "region",
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        registry.notify(&[change("region"), change("resolution")]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(registry.remove(&sub));
        assert!(!registry.remove(&sub));
        registry.notify(&[change("region")]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn subscription_ids_are_distinct() {
        let registry = SubscriberRegistry::default();
        let a = registry.register("region", Arc::new(|_| {}));
        let b = registry.register("region", Arc::new(|_| {}));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
