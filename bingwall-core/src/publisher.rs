//! Download, stage, and atomically swap the cached wallpaper file.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{info, warn};

use crate::{
    background::{DesktopBackground, file_uri},
    error::{Result, UpdateError},
    fs::replace_file_blocking,
    http::HttpClient,
};

/// Async wrapper around [`replace_file_blocking`]; the staging write and
/// rename run on the blocking pool.
pub async fn replace_file(path: &Path, bytes: Vec<u8>) -> Result<()> {
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        replace_file_blocking(&target, &bytes)
            .map_err(|err| UpdateError::persist(target.display(), err))
    })
    .await
    .map_err(|err| {
        UpdateError::persist(path.display(), std::io::Error::other(err))
    })?
}

/// What a successful publish did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub bytes_written: usize,
    pub file_uri: String,
    /// `false` when the file was replaced but the background service
    /// rejected the new reference.
    pub background_applied: bool,
}

/// Downloads the wallpaper, swaps it into the cache path, and points the
/// desktop background at it.
#[derive(Clone)]
pub struct AtomicPublisher {
    http: Arc<dyn HttpClient>,
    background: Arc<dyn DesktopBackground>,
    cache_path: PathBuf,
}

impl fmt::Debug for AtomicPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicPublisher")
            .field("cache_path", &self.cache_path)
            .finish_non_exhaustive()
    }
}

impl AtomicPublisher {
    pub fn new(
        http: Arc<dyn HttpClient>,
        background: Arc<dyn DesktopBackground>,
        cache_path: PathBuf,
    ) -> Self {
        Self {
            http,
            background,
            cache_path,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Fetch the image bytes. Nothing on disk is touched.
    pub async fn download(&self, image_url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(image_url).await.map_err(|err| {
            UpdateError::ImageFetch(format!(
                "request to {image_url} failed: {err}"
            ))
        })?;

        if !response.is_success() {
            return Err(UpdateError::ImageFetch(format!(
                "image request failed with status {}",
                response.status
            )));
        }
        Ok(response.body)
    }

    /// Replace the cache file with `bytes` and apply it as the background.
    ///
    /// A background-service failure after the replace is logged and
    /// reported through [`PublishReport::background_applied`]; the file
    /// write is never rolled back.
    pub async fn install(&self, bytes: Vec<u8>) -> Result<PublishReport> {
        let bytes_written = bytes.len();
        let uri = file_uri(&self.cache_path)?;
        replace_file(&self.cache_path, bytes).await?;

        let background_applied = match self.background.apply(&uri).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    target: "bingwall::publisher",
                    error = %err,
                    path = %self.cache_path.display(),
                    "wallpaper file replaced but the background service rejected it"
                );
                false
            }
        };

        info!(
            target: "bingwall::publisher",
            bytes = bytes_written,
            %uri,
            background_applied,
            "wallpaper published"
        );

        Ok(PublishReport {
            bytes_written,
            file_uri: uri,
            background_applied,
        })
    }

    /// [`download`](Self::download) followed by [`install`](Self::install).
    pub async fn publish(&self, image_url: &str) -> Result<PublishReport> {
        let bytes = self.download(image_url).await?;
        self.install(bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::MockDesktopBackground;
    use crate::http::{HttpResponse, TransportError};
    use async_trait::async_trait;

    struct StaticHttp(HttpResponse);

    #[async_trait]
    impl HttpClient for StaticHttp {
        async fn get(
            &self,
            _url: &str,
        ) -> std::result::Result<HttpResponse, TransportError> {
            Ok(self.0.clone())
        }
    }

    fn http(status: u16, body: &[u8]) -> Arc<dyn HttpClient> {
        Arc::new(StaticHttp(HttpResponse {
            status,
            body: body.to_vec(),
        }))
    }

    #[tokio::test]
    async fn replace_file_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bing_wallpaper.jpg");

        replace_file(&path, b"old image".to_vec()).await.unwrap();
        replace_file(&path, b"brand new image".to_vec()).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"brand new image");
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("bing_wallpaper.jpg")]);
    }

    #[tokio::test]
    async fn replace_file_creates_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/cache/bing_wallpaper.jpg");
        replace_file(&path, b"jpeg".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn publish_applies_file_uri_to_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bing_wallpaper.jpg");
        let expected_uri = file_uri(&path).unwrap();

        let mut background = MockDesktopBackground::new();
        let uri = expected_uri.clone();
        background
            .expect_apply()
            .withf(move |u| *u == uri)
            .times(1)
            .returning(|_| Ok(()));

        let publisher =
            AtomicPublisher::new(http(200, b"jpeg"), Arc::new(background), path.clone());
        let report = publisher.publish("https://img/x_UHD.jpg").await.unwrap();

        assert!(report.background_applied);
        assert_eq!(report.bytes_written, 4);
        assert_eq!(report.file_uri, expected_uri);
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn background_failure_keeps_the_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bing_wallpaper.jpg");
        std::fs::write(&path, b"previous").unwrap();

        let mut background = MockDesktopBackground::new();
        background.expect_apply().times(1).returning(|_| {
            Err(UpdateError::BackgroundService {
                key: "picture-uri".into(),
                message: "dconf unavailable".into(),
            })
        });

        let publisher =
            AtomicPublisher::new(http(200, b"next"), Arc::new(background), path.clone());
        let report = publisher.publish("https://img/x_UHD.jpg").await.unwrap();

        assert!(!report.background_applied);
        assert_eq!(std::fs::read(&path).unwrap(), b"next");
    }

    #[tokio::test]
    async fn bad_status_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bing_wallpaper.jpg");
        std::fs::write(&path, b"previous").unwrap();

        let mut background = MockDesktopBackground::new();
        background.expect_apply().never();

        let publisher =
            AtomicPublisher::new(http(404, b"nope"), Arc::new(background), path.clone());
        let err = publisher.publish("https://img/x_UHD.jpg").await.unwrap_err();

        assert!(matches!(err, UpdateError::ImageFetch(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"previous");
    }
}
