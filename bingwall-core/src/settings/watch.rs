use std::{
    fs,
    sync::{Arc, Weak},
};

use notify::{
    Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use tracing::{debug, error, info};

use super::FileSettingsStore;

/// Keeps a [`FileSettingsStore`] in sync with edits made by other
/// processes (for example `bingwall set region de-DE` while the daemon
/// runs). Watching stops when this value is dropped.
pub struct SettingsWatch {
    _watcher: RecommendedWatcher,
}

impl std::fmt::Debug for SettingsWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsWatch").finish_non_exhaustive()
    }
}

impl FileSettingsStore {
    /// Start watching the settings file. The watcher holds only a weak
    /// reference, so it never keeps the store alive.
    pub fn watch(self: &Arc<Self>) -> Result<SettingsWatch, notify::Error> {
        let dir = self
            .path()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ".".into());
        fs::create_dir_all(&dir).map_err(notify::Error::io)?;

        let file_name = self.path().file_name().map(|n| n.to_os_string());
        let store: Weak<FileSettingsStore> = Arc::downgrade(self);

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if !matches!(
                        event.kind,
                        EventKind::Create(_)
                            | EventKind::Modify(_)
                            | EventKind::Remove(_)
                    ) {
                        return;
                    }
                    let touches_settings = event.paths.iter().any(|p| {
                        p.file_name().map(|n| n.to_os_string()) == file_name
                    });
                    if !touches_settings {
                        return;
                    }
                    if let Some(store) = store.upgrade() {
                        debug!(
                            target: "bingwall::settings",
                            kind = ?event.kind,
                            "settings file event"
                        );
                        store.reload();
                    }
                }
                Err(err) => {
                    error!(target: "bingwall::settings", error = %err, "settings watch error")
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!(
            target: "bingwall::settings",
            path = %self.path().display(),
            "watching settings file"
        );

        Ok(SettingsWatch { _watcher: watcher })
    }
}
