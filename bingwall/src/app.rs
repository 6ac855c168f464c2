use std::sync::Arc;

use anyhow::Context;
use bingwall_config::{ConfigSource, DaemonConfig};
use bingwall_core::{
    FileSettingsStore, GsettingsBackground, ReqwestHttpClient,
    UpdateOrchestrator,
};
use tracing::info;

/// Everything a command needs, wired from one configuration.
pub struct App {
    pub config: DaemonConfig,
    pub source: ConfigSource,
    pub store: Arc<FileSettingsStore>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("source", &self.source)
            .field("settings", &self.store.path())
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn load() -> anyhow::Result<Self> {
        let (config, source) = DaemonConfig::load_from_env()
            .context("failed to load configuration")?;
        config.ensure_directories()?;
        info!(%source, "configuration loaded");

        let store = Arc::new(FileSettingsStore::open(config.settings_path()));
        Ok(Self {
            config,
            source,
            store,
        })
    }

    pub fn orchestrator(&self) -> anyhow::Result<UpdateOrchestrator> {
        let http = ReqwestHttpClient::new(
            self.config.http.timeout,
            &self.config.http.user_agent,
        )
        .context("failed to build HTTP client")?;

        let bg = &self.config.background;
        let background = GsettingsBackground::new(
            bg.program.clone(),
            bg.schema.clone(),
            bg.light_key.clone(),
            bg.dark_key.clone(),
        );

        Ok(UpdateOrchestrator::new(
            self.store.clone(),
            Arc::new(http),
            Arc::new(background),
            self.config.wallpaper_path().to_path_buf(),
        ))
    }
}
