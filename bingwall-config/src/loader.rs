use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use tracing::{debug, warn};

use crate::models::{ConfigSource, DaemonConfig, user_config_dir};

pub const CONFIG_PATH_VAR: &str = "BINGWALL_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "BINGWALL_CONFIG_JSON";
pub const WALLPAPER_PATH_VAR: &str = "BINGWALL_WALLPAPER_PATH";
pub const SETTINGS_PATH_VAR: &str = "BINGWALL_SETTINGS_PATH";

impl DaemonConfig {
    /// Load configuration for this process.
    ///
    /// Evaluation order:
    /// 1) `$BINGWALL_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$BINGWALL_CONFIG_JSON` (inline JSON),
    /// 3) `bingwall.toml` / `bingwall.json` in the user config directory,
    /// 4) defaults.
    ///
    /// A `.env` file in the working directory is applied first. Path
    /// overrides from the environment are applied last and all paths are
    /// made absolute.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => warn!(error = %err, "ignoring unreadable .env"),
        }

        let config_dir = user_config_dir().join("bingwall");
        Self::resolve(|key| env::var(key).ok(), &config_dir)
    }

    /// [`load_from_env`](Self::load_from_env) with the environment and the
    /// config directory supplied by the caller.
    pub fn resolve<F>(
        lookup: F,
        config_dir: &Path,
    ) -> anyhow::Result<(Self, ConfigSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (mut config, source) = if let Some(path_str) =
            non_empty(CONFIG_PATH_VAR)
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            (config, ConfigSource::EnvPath(path))
        } else if let Some(raw) = non_empty(CONFIG_JSON_VAR) {
            let config = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))?;
            (config, ConfigSource::EnvInline)
        } else if let Some(path) = Self::find_default_file(config_dir) {
            let config = Self::load_from_file(&path)?;
            (config, ConfigSource::File(path))
        } else {
            (Self::default(), ConfigSource::Default)
        };

        if let Some(path) = non_empty(WALLPAPER_PATH_VAR) {
            config.paths.wallpaper = PathBuf::from(path);
        }
        if let Some(path) = non_empty(SETTINGS_PATH_VAR) {
            config.paths.settings = PathBuf::from(path);
        }
        config.normalize_paths()?;

        Ok((config, source))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents)
                .with_context(|| format!("invalid config {}", path.display())),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|err| {
                    anyhow!("invalid config {}: {}", path.display(), err)
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    /// Try TOML, then JSON.
    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid config json: {err}"))
    }

    fn find_default_file(config_dir: &Path) -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &["bingwall.toml", "bingwall.json"];

        CANDIDATES
            .iter()
            .map(|name| config_dir.join(name))
            .find(|path| path.exists())
    }
}
