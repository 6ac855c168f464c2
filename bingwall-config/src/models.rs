use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default => f.write_str("built-in defaults"),
            ConfigSource::EnvPath(path) => {
                write!(f, "$BINGWALL_CONFIG_PATH ({})", path.display())
            }
            ConfigSource::EnvInline => f.write_str("$BINGWALL_CONFIG_JSON"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Daemon and CLI configuration. Every section is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DaemonConfig {
    pub paths: PathsConfig,
    pub schedule: ScheduleConfig,
    pub http: HttpConfig,
    pub background: BackgroundConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// The cached wallpaper; replaced in place on every new image.
    pub wallpaper: PathBuf,
    /// JSON file backing the settings store.
    pub settings: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            wallpaper: user_cache_dir().join("bing_wallpaper.jpg"),
            settings: user_config_dir().join("bingwall").join("settings.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// How often the timer asks for an update. The two-hour throttle still
    /// applies, so a short period only makes the daemon notice a new day's
    /// image sooner after wake-up or login.
    #[serde(with = "crate::duration")]
    pub poll_interval: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(with = "crate::duration")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("bingwall/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

/// gsettings target for the light and dark background variants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub program: String,
    pub schema: String,
    pub light_key: String,
    pub dark_key: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            program: "gsettings".into(),
            schema: "org.gnome.desktop.background".into(),
            light_key: "picture-uri".into(),
            dark_key: "picture-uri-dark".into(),
        }
    }
}

impl DaemonConfig {
    pub fn wallpaper_path(&self) -> &Path {
        &self.paths.wallpaper
    }

    pub fn settings_path(&self) -> &Path {
        &self.paths.settings
    }

    /// Create the parent directories of the wallpaper and settings files.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for path in [&self.paths.wallpaper, &self.paths.settings] {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create {}", parent.display())
                })?;
            }
        }
        Ok(())
    }

    /// Expand a leading `~/` and anchor relative paths at the current
    /// directory. The desktop background needs an absolute file URI.
    pub fn normalize_paths(&mut self) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        for path in [&mut self.paths.wallpaper, &mut self.paths.settings] {
            *path = normalize(path, &cwd);
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("failed to render config")
    }
}

fn normalize(path: &Path, cwd: &Path) -> PathBuf {
    let expanded = match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}

fn user_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"))
}

pub(crate) fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_fixed_file_names() {
        let config = DaemonConfig::default();
        assert!(config.wallpaper_path().ends_with("bing_wallpaper.jpg"));
        assert!(config.settings_path().ends_with("bingwall/settings.json"));
        assert_eq!(config.schedule.poll_interval, Duration::from_secs(900));
        assert_eq!(config.background.dark_key, "picture-uri-dark");
    }

    #[test]
    fn relative_paths_are_anchored() {
        let cwd = Path::new("/srv/work");
        assert_eq!(
            normalize(Path::new("cache/w.jpg"), cwd),
            PathBuf::from("/srv/work/cache/w.jpg")
        );
        assert_eq!(
            normalize(Path::new("/abs/w.jpg"), cwd),
            PathBuf::from("/abs/w.jpg")
        );
    }

    #[test]
    fn ensure_directories_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DaemonConfig::default();
        config.paths.wallpaper = dir.path().join("a/b/w.jpg");
        config.paths.settings = dir.path().join("c/settings.json");

        config.ensure_directories().unwrap();
        assert!(dir.path().join("a/b").is_dir());
        assert!(dir.path().join("c").is_dir());
    }

    #[test]
    fn ensure_directories_keeps_the_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut config = DaemonConfig::default();
        config.paths.wallpaper = dir.path().join("w.jpg");
        config.paths.settings = blocker.join("settings.json");

        let err = config.ensure_directories().unwrap_err();
        assert!(err.to_string().contains("taken"), "{err:#}");
        assert!(
            err.root_cause().downcast_ref::<std::io::Error>().is_some(),
            "{err:?}"
        );
    }

    #[test]
    fn renders_durations_in_human_form() {
        let rendered = DaemonConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("poll_interval = \"15m\""), "{rendered}");
        assert!(rendered.contains("timeout = \"30s\""), "{rendered}");
    }
}
