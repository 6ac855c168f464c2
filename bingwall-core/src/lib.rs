//! # Bingwall Core
//!
//! Keeps the desktop background in sync with Bing's image of the day.
//!
//! ## Overview
//!
//! A run is triggered either by a timer or by a change to the `region` /
//! `resolution` preferences, and goes through:
//!
//! - **Throttle gate**: unforced runs proceed at most every two hours
//! - **Metadata lookup**: one request to the `HPImageArchive` endpoint
//! - **URL materialization**: swap the `WxH.jpg` segment for the chosen resolution
//! - **Change detection**: skip the download when the URL is already applied
//! - **Atomic publish**: stage, rename over the cache file, point the background at it
//! - **State commit**: record URL, copyright, and timestamp only after success
//!
//! ## Feature Flags
//!
//! - `fs-watch`: reload the settings file when another process edits it
//!
//! ## Architecture
//!
//! - [`gate`]: throttle gate and change detector
//! - [`provider`]: metadata lookup and URL materialization
//! - [`publisher`]: download and atomic file replacement
//! - [`background`]: desktop background adapters
//! - [`settings`]: persisted key/value store with change notification
//! - [`state`]: update state recorder
//! - [`orchestrator`]: one end-to-end run
//! - [`runtime`]: timer, subscriptions, and the serialized worker
//!
//! ## Examples
//!
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use bingwall_core::{
//!     GsettingsBackground, MemorySettingsStore, ReqwestHttpClient,
//!     UpdateOrchestrator, UpdateRuntime,
//! };
//!
//! async fn serve() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = ReqwestHttpClient::new(Duration::from_secs(30), "bingwall")?;
//!     let orchestrator = UpdateOrchestrator::new(
//!         Arc::new(MemorySettingsStore::new()),
//!         Arc::new(http),
//!         Arc::new(GsettingsBackground::default()),
//!         "/tmp/bing_wallpaper.jpg".into(),
//!     );
//!
//!     let runtime =
//!         UpdateRuntime::start(orchestrator, Duration::from_secs(15 * 60));
//!     tokio::signal::ctrl_c().await?;
//!     runtime.stop().await;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Desktop background adapters (gsettings)
pub mod background;

/// Error types and run stages
pub mod error;

/// Staged file replacement
pub mod fs;

/// Throttle gate and change detector
pub mod gate;

/// HTTP client seam
pub mod http;

pub mod orchestrator;

/// Image-of-the-day provider
pub mod provider;

pub mod publisher;

pub mod runtime;

/// Persisted settings with change notification
pub mod settings;

pub mod state;

pub use background::{DesktopBackground, GsettingsBackground, file_uri};
pub use error::{Result, RunStage, UpdateError};
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient, TransportError};
pub use orchestrator::{RunOutcome, UpdateOrchestrator};
pub use publisher::{AtomicPublisher, PublishReport};
pub use runtime::{TriggerQueue, UpdateRuntime};
#[cfg(feature = "fs-watch")]
pub use settings::SettingsWatch;
pub use settings::{
    FileSettingsStore, MemorySettingsStore, SettingChange, SettingsStore,
    Subscription,
};
pub use state::StateRecorder;
