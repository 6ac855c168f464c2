//! Commits the update state once the side effects it describes are done.

use std::sync::Arc;

use bingwall_model::{format_timestamp, keys};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    error::Result,
    settings::{SettingsStore, read_update_state},
};

/// The only writer of the `last-*` keys.
#[derive(Clone)]
pub struct StateRecorder {
    store: Arc<dyn SettingsStore>,
}

impl std::fmt::Debug for StateRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateRecorder").finish_non_exhaustive()
    }
}

impl StateRecorder {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Record a completed run.
    ///
    /// When `changed` is set the URL and copyright are written first and the
    /// timestamp last, so an interrupted commit leaves the gate open and the
    /// next run repeats the work instead of skipping it. A `None` URL or
    /// copyright on a changed commit is stored as the empty string.
    ///
    /// The stored timestamp never moves backwards: if `now` is earlier than
    /// the recorded one (the wall clock was stepped back) the recorded one
    /// is kept.
    pub fn commit(
        &self,
        now: DateTime<Utc>,
        changed: bool,
        url: Option<&str>,
        copyright: Option<&str>,
    ) -> Result<()> {
        if changed {
            self.store
                .set_string(keys::LAST_WALLPAPER_URL, url.unwrap_or_default())?;
            self.store.set_string(
                keys::LAST_WALLPAPER_COPYRIGHT,
                copyright.unwrap_or_default(),
            )?;
        }

        let previous = read_update_state(self.store.as_ref()).last_update_at();
        let stamped = match previous {
            Some(previous) if previous > now => {
                warn!(
                    target: "bingwall::state",
                    %previous,
                    %now,
                    "clock is behind the last update; keeping the later timestamp"
                );
                previous
            }
            _ => now,
        };

        let stamp = format_timestamp(stamped);
        self.store.set_string(keys::LAST_UPDATE_TIMESTAMP, &stamp)?;
        debug!(target: "bingwall::state", changed, timestamp = %stamp, "update state committed");
        Ok(())
    }
}
