//! Core data model definitions shared across bingwall crates.
#![allow(missing_docs)]

pub mod error;
pub mod image;
pub mod keys;
pub mod region;
pub mod resolution;
pub mod state;

pub use error::{ModelError, Result as ModelResult};
pub use image::ImageOfTheDay;
pub use region::{MARKETS, Market, Region};
pub use resolution::Resolution;
pub use state::{Preferences, UpdateState, format_timestamp};
