//! Settings store key names.
//!
//! `REGION` and `RESOLUTION` belong to the preferences surface; the
//! `LAST_*` keys are written only by the update state recorder.

pub const REGION: &str = "region";
pub const RESOLUTION: &str = "resolution";

pub const LAST_UPDATE_TIMESTAMP: &str = "last-update-timestamp";
pub const LAST_WALLPAPER_URL: &str = "last-wallpaper-url";
pub const LAST_WALLPAPER_COPYRIGHT: &str = "last-wallpaper-copyright";

/// Keys whose change should force an immediate update run.
pub const PREFERENCE_KEYS: [&str; 2] = [REGION, RESOLUTION];
