//! Desktop background service adapters.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::error::{Result, UpdateError};

/// Applies a file reference as the desktop wallpaper, light and dark.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DesktopBackground: Send + Sync {
    async fn apply(&self, uri: &str) -> Result<()>;
}

/// `file://` reference for an absolute path, percent-encoded.
pub fn file_uri(path: &Path) -> Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| UpdateError::BackgroundService {
            key: "uri".into(),
            message: format!(
                "cannot build a file uri for non-absolute path {}",
                path.display()
            ),
        })
}

/// GNOME (and GNOME-schema compatible) desktops via the `gsettings` CLI.
#[derive(Debug, Clone)]
pub struct GsettingsBackground {
    program: String,
    schema: String,
    light_key: String,
    dark_key: String,
}

impl Default for GsettingsBackground {
    fn default() -> Self {
        Self {
            program: "gsettings".into(),
            schema: "org.gnome.desktop.background".into(),
            light_key: "picture-uri".into(),
            dark_key: "picture-uri-dark".into(),
        }
    }
}

impl GsettingsBackground {
    pub fn new(
        program: impl Into<String>,
        schema: impl Into<String>,
        light_key: impl Into<String>,
        dark_key: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            schema: schema.into(),
            light_key: light_key.into(),
            dark_key: dark_key.into(),
        }
    }

    async fn set(&self, key: &str, uri: &str) -> Result<()> {
        debug!(target: "bingwall::background", schema = %self.schema, key, uri, "gsettings set");

        let output = Command::new(&self.program)
            .arg("set")
            .arg(&self.schema)
            .arg(key)
            .arg(uri)
            .output()
            .await
            .map_err(|err| UpdateError::BackgroundService {
                key: key.to_string(),
                message: format!("failed to run {}: {err}", self.program),
            })?;

        if !output.status.success() {
            return Err(UpdateError::BackgroundService {
                key: key.to_string(),
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DesktopBackground for GsettingsBackground {
    async fn apply(&self, uri: &str) -> Result<()> {
        self.set(&self.light_key, uri).await?;
        self.set(&self.dark_key, uri).await
    }
}
