use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{
    ChangeCallback, SettingChange, SettingsStore, SubscriberRegistry,
    Subscription,
};
use crate::error::Result;

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RwLock<BTreeMap<String, String>>,
    subscribers: SubscriberRegistry,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::default();
        *store.values.write() = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        store
    }

    pub fn subscription_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        {
            let mut values = self.values.write();
            if values.get(key).map(String::as_str) == Some(value) {
                return Ok(());
            }
            values.insert(key.to_string(), value.to_string());
        }
        self.subscribers.notify(&[SettingChange {
            key: key.to_string(),
            value: Some(value.to_string()),
        }]);
        Ok(())
    }

    fn connect(&self, key: &str, callback: ChangeCallback) -> Subscription {
        self.subscribers.register(key, callback)
    }

    fn disconnect(&self, subscription: &Subscription) -> bool {
        self.subscribers.remove(subscription)
    }
}
