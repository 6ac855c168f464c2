//! Configuration loading for bingwall.
//!
//! Both the daemon and the one-shot CLI commands resolve their file paths,
//! schedule, HTTP client settings, and gsettings target through
//! [`DaemonConfig::load_from_env`], so they always agree on where the
//! wallpaper and the settings file live.
#![allow(missing_docs)]

pub mod duration;
pub mod loader;
pub mod models;

pub use loader::{
    CONFIG_JSON_VAR, CONFIG_PATH_VAR, SETTINGS_PATH_VAR, WALLPAPER_PATH_VAR,
};
pub use models::{
    BackgroundConfig, ConfigSource, DaemonConfig, HttpConfig, PathsConfig,
    ScheduleConfig,
};
