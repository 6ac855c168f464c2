#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bingwall_core::{
    DesktopBackground, HttpClient, HttpResponse, Result, TransportError,
    UpdateError,
};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// Scripted stand-in for the Bing endpoints.
///
/// Metadata answers are keyed by market; any other URL is treated as an
/// image request and answered with `jpeg:<url>`.
#[derive(Default)]
pub struct FakeBing {
    markets: Mutex<HashMap<String, (String, String)>>,
    metadata_status: Mutex<Option<u16>>,
    image_status: Mutex<Option<u16>>,
    requests: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeBing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every metadata request waits for one permit on `gate`.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn with_image(self, market: &str, copyright: &str, path: &str) -> Self {
        self.set_image(market, copyright, path);
        self
    }

    pub fn set_image(&self, market: &str, copyright: &str, path: &str) {
        self.markets
            .lock()
            .insert(market.into(), (copyright.into(), path.into()));
    }

    pub fn fail_metadata(&self, status: u16) {
        *self.metadata_status.lock() = Some(status);
    }

    pub fn fail_images(&self, status: u16) {
        *self.image_status.lock() = Some(status);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn metadata_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|u| u.contains("HPImageArchive"))
            .collect()
    }

    pub fn image_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|u| !u.contains("HPImageArchive"))
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn metadata(&self, url: &str) -> HttpResponse {
        if let Some(status) = *self.metadata_status.lock() {
            return HttpResponse {
                status,
                body: b"{}".to_vec(),
            };
        }
        let market = url.rsplit("mkt=").next().unwrap_or_default();
        let markets = self.markets.lock();
        let Some((copyright, path)) = markets.get(market) else {
            return HttpResponse {
                status: 200,
                body: br#"{"images":[]}"#.to_vec(),
            };
        };
        let body = serde_json::json!({
            "images": [{ "copyright": copyright, "url": path }]
        });
        HttpResponse {
            status: 200,
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    fn image(&self, url: &str) -> HttpResponse {
        match *self.image_status.lock() {
            Some(status) => HttpResponse {
                status,
                body: Vec::new(),
            },
            None => HttpResponse {
                status: 200,
                body: image_bytes(url),
            },
        }
    }
}

pub fn image_bytes(url: &str) -> Vec<u8> {
    format!("jpeg:{url}").into_bytes()
}

#[async_trait]
impl HttpClient for FakeBing {
    async fn get(
        &self,
        url: &str,
    ) -> std::result::Result<HttpResponse, TransportError> {
        self.requests.lock().push(url.to_string());
        let is_metadata = url.contains("HPImageArchive");

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if is_metadata && let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| TransportError(e.to_string()))?
                .forget();
        }

        let response = if is_metadata {
            self.metadata(url)
        } else {
            self.image(url)
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(response)
    }
}

/// Records every uri it is asked to apply; optionally refuses them.
#[derive(Default)]
pub struct RecordingBackground {
    applied: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingBackground {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().clone()
    }
}

#[async_trait]
impl DesktopBackground for RecordingBackground {
    async fn apply(&self, uri: &str) -> Result<()> {
        self.applied.lock().push(uri.to_string());
        if self.fail {
            return Err(UpdateError::BackgroundService {
                key: "picture-uri".into(),
                message: "no session bus".into(),
            });
        }
        Ok(())
    }
}
