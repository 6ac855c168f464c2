use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Region, Resolution};

/// User-facing configuration read at the start of every update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub region: Region,
    pub resolution: Resolution,
}

/// Persisted update state, as read from the settings store.
///
/// Values are kept raw: an unparsable timestamp is still "present" here and
/// only collapses to `None` through [`UpdateState::last_update_at`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateState {
    pub last_update_timestamp: Option<String>,
    pub last_wallpaper_url: Option<String>,
    pub last_wallpaper_copyright: Option<String>,
}

impl UpdateState {
    pub fn last_update_at(&self) -> Option<DateTime<Utc>> {
        self.last_update_timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Render a timestamp the way it is persisted (RFC 3339, UTC, milliseconds).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn persisted_timestamp_round_trips() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 15, 0).unwrap();
        let state = UpdateState {
            last_update_timestamp: Some(format_timestamp(at)),
            ..Default::default()
        };
        assert_eq!(
            state.last_update_timestamp.as_deref(),
            Some("2024-03-09T07:15:00.000Z")
        );
        assert_eq!(state.last_update_at(), Some(at));
    }

    #[test]
    fn garbage_timestamp_reads_as_absent() {
        let state = UpdateState {
            last_update_timestamp: Some("yesterday-ish".into()),
            ..Default::default()
        };
        assert_eq!(state.last_update_at(), None);
    }
}
