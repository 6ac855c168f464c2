use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{
    ChangeCallback, SettingChange, SettingsStore, SubscriberRegistry,
    Subscription,
};
use crate::{
    error::{Result, UpdateError},
    fs::replace_file_blocking,
};

/// Settings persisted as a flat JSON object of strings.
///
/// Every write replaces the whole file through a staged rename, so a crash
/// mid-write leaves the previous settings intact.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
    subscribers: SubscriberRegistry,
}

impl FileSettingsStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or corrupt file is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(err) => {
                warn!(
                    target: "bingwall::settings",
                    path = %path.display(),
                    error = %err,
                    "ignoring unreadable settings file"
                );
                BTreeMap::new()
            }
        };
        Self {
            path,
            values: Mutex::new(values),
            subscribers: SubscriberRegistry::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn subscription_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Re-read the file and notify subscribers of every key whose value
    /// differs from what this process last saw.
    ///
    /// A file that fails to parse (for example mid-edit by hand) is ignored
    /// and the in-memory values are kept.
    pub fn reload(&self) -> Vec<SettingChange> {
        let fresh = match read_values(&self.path) {
            Ok(values) => values,
            Err(err) => {
                debug!(
                    target: "bingwall::settings",
                    path = %self.path.display(),
                    error = %err,
                    "settings reload skipped"
                );
                return Vec::new();
            }
        };

        let changes = {
            let mut values = self.values.lock();
            let changes = diff(&values, &fresh);
            *values = fresh;
            changes
        };

        if !changes.is_empty() {
            debug!(
                target: "bingwall::settings",
                keys = ?changes.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
                "settings changed on disk"
            );
            self.subscribers.notify(&changes);
        }
        changes
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Write one key on top of what is currently on disk, so keys another
    /// process wrote since the last reload are kept. Those keys are
    /// reported to subscribers along with `key` itself.
    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let changes = {
            let mut values = self.values.lock();
            let mut next = match read_values(&self.path) {
                Ok(on_disk) => on_disk,
                Err(err) => {
                    debug!(
                        target: "bingwall::settings",
                        path = %self.path.display(),
                        error = %err,
                        "unreadable settings file; writing from memory"
                    );
                    values.clone()
                }
            };

            if next.get(key).map(String::as_str) != Some(value) {
                next.insert(key.to_string(), value.to_string());
                write_values(&self.path, &next)?;
            }

            let changes = diff(&values, &next);
            *values = next;
            changes
        };

        if !changes.is_empty() {
            self.subscribers.notify(&changes);
        }
        Ok(())
    }

    fn connect(&self, key: &str, callback: ChangeCallback) -> Subscription {
        self.subscribers.register(key, callback)
    }

    fn disconnect(&self, subscription: &Subscription) -> bool {
        self.subscribers.remove(subscription)
    }
}

fn read_values(path: &Path) -> io::Result<BTreeMap<String, String>> {
    match std::fs::read(path) {
        Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => {
            Ok(BTreeMap::new())
        }
        Ok(raw) => serde_json::from_slice(&raw).map_err(io::Error::other),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Ok(BTreeMap::new())
        }
        Err(err) => Err(err),
    }
}

fn write_values(path: &Path, values: &BTreeMap<String, String>) -> Result<()> {
    let mut encoded = serde_json::to_vec_pretty(values)
        .map_err(|err| UpdateError::persist(path.display(), err.into()))?;
    encoded.push(b'\n');
    replace_file_blocking(path, &encoded)
        .map_err(|err| UpdateError::persist(path.display(), err))
}

fn diff(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> Vec<SettingChange> {
    let mut changes: Vec<SettingChange> = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| SettingChange {
            key: k.clone(),
            value: Some(v.clone()),
        })
        .collect();
    changes.extend(old.keys().filter(|k| !new.contains_key(*k)).map(|k| {
        SettingChange {
            key: k.clone(),
            value: None,
        }
    }));
    changes
}
