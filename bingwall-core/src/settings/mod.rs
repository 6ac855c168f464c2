//! Durable key/value settings with change notification.
//!
//! The store holds both the user preferences (`region`, `resolution`) and
//! the update state keys written by [`crate::state::StateRecorder`].
//! Subscriptions are explicit records: whoever calls
//! [`SettingsStore::connect`] owns the returned [`Subscription`] and is
//! expected to hand it back to [`SettingsStore::disconnect`].

mod file;
mod memory;
mod registry;
#[cfg(feature = "fs-watch")]
mod watch;

use std::{fmt, sync::Arc};

use bingwall_model::{Preferences, Region, Resolution, UpdateState, keys};
use tracing::warn;

use crate::error::Result;

pub use file::FileSettingsStore;
pub use memory::MemorySettingsStore;
pub(crate) use registry::SubscriberRegistry;
#[cfg(feature = "fs-watch")]
pub use watch::SettingsWatch;

/// A key whose value changed. `value` is `None` when the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: String,
    pub value: Option<String>,
}

pub type ChangeCallback = Arc<dyn Fn(&SettingChange) + Send + Sync>;

/// Handle for one registered change callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    key: String,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "changed::{}#{}", self.key, self.id)
    }
}

pub trait SettingsStore: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key`. Subscribers of `key` are notified only
    /// when the stored value actually changes.
    fn set_string(&self, key: &str, value: &str) -> Result<()>;

    fn connect(&self, key: &str, callback: ChangeCallback) -> Subscription;

    /// Returns `false` if the subscription was already gone.
    fn disconnect(&self, subscription: &Subscription) -> bool;
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Read the preferences, falling back to `en-US` / `UHD` when a key is
/// absent or holds a token outside the catalogs.
pub fn read_preferences(store: &dyn SettingsStore) -> Preferences {
    let region = match non_empty(store.get_string(keys::REGION)) {
        None => Region::default(),
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!(target: "bingwall::settings", error = %err, "using default region");
            Region::default()
        }),
    };
    let resolution = match non_empty(store.get_string(keys::RESOLUTION)) {
        None => Resolution::default(),
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!(target: "bingwall::settings", error = %err, "using default resolution");
            Resolution::default()
        }),
    };
    Preferences { region, resolution }
}

/// Read the persisted update state; empty strings count as absent.
pub fn read_update_state(store: &dyn SettingsStore) -> UpdateState {
    UpdateState {
        last_update_timestamp: non_empty(
            store.get_string(keys::LAST_UPDATE_TIMESTAMP),
        ),
        last_wallpaper_url: non_empty(
            store.get_string(keys::LAST_WALLPAPER_URL),
        ),
        last_wallpaper_copyright: non_empty(
            store.get_string(keys::LAST_WALLPAPER_COPYRIGHT),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_default_when_absent_or_unknown() {
        let store = MemorySettingsStore::new();
        assert_eq!(read_preferences(&store), Preferences::default());

        store.set_string(keys::REGION, "xx-XX").unwrap();
        store.set_string(keys::RESOLUTION, "").unwrap();
        assert_eq!(read_preferences(&store), Preferences::default());

        store.set_string(keys::REGION, "ja-JP").unwrap();
        store.set_string(keys::RESOLUTION, "1366x768").unwrap();
        let prefs = read_preferences(&store);
        assert_eq!(prefs.region.code(), "ja-JP");
        assert_eq!(prefs.resolution, Resolution::W1366H768);
    }

    #[test]
    fn empty_state_keys_read_as_absent() {
        let store = MemorySettingsStore::new();
        store.set_string(keys::LAST_WALLPAPER_URL, "").unwrap();
        store
            .set_string(keys::LAST_WALLPAPER_COPYRIGHT, "C1")
            .unwrap();

        let state = read_update_state(&store);
        assert_eq!(state.last_wallpaper_url, None);
        assert_eq!(state.last_update_timestamp, None);
        assert_eq!(state.last_wallpaper_copyright.as_deref(), Some("C1"));
    }
}
