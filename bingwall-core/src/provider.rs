//! Image-of-the-day provider: metadata lookup and URL materialization.

use bingwall_model::{ImageOfTheDay, Region, Resolution};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{Result, UpdateError},
    http::HttpClient,
};

pub const PROVIDER_HOST: &str = "https://www.bing.com";

static SIZE_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+x\d+\.jpg").expect("size segment pattern is valid")
});

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    images: Vec<ArchiveImage>,
}

#[derive(Debug, Deserialize)]
struct ArchiveImage {
    copyright: Option<String>,
    url: Option<String>,
}

/// Metadata endpoint for one region, asking for exactly today's image.
pub fn metadata_url(region: Region) -> String {
    format!(
        "{PROVIDER_HOST}/HPImageArchive.aspx?format=js&idx=0&n=1&mkt={}",
        region.code()
    )
}

/// Fetch and parse the current image metadata for `region`.
///
/// Single attempt. Transport failures, non-2xx statuses, and malformed
/// payloads all surface as [`UpdateError::MetadataFetch`].
pub async fn fetch_image_of_the_day(
    http: &dyn HttpClient,
    region: Region,
) -> Result<ImageOfTheDay> {
    let url = metadata_url(region);
    debug!(target: "bingwall::provider", %url, "fetching image metadata");

    let response = http.get(&url).await.map_err(|err| {
        UpdateError::MetadataFetch(format!("request to {url} failed: {err}"))
    })?;

    if !response.is_success() {
        return Err(UpdateError::MetadataFetch(format!(
            "metadata request failed with status {}",
            response.status
        )));
    }

    parse_image_of_the_day(&response.body)
}

/// Parse a metadata payload, requiring `images[0].copyright` and
/// `images[0].url`.
pub fn parse_image_of_the_day(body: &[u8]) -> Result<ImageOfTheDay> {
    let parsed: ArchiveResponse =
        serde_json::from_slice(body).map_err(|err| {
            UpdateError::MetadataFetch(format!("unparsable payload: {err}"))
        })?;

    let first = parsed.images.into_iter().next().ok_or_else(|| {
        UpdateError::MetadataFetch("payload contained no images".into())
    })?;

    let copyright = first.copyright.ok_or_else(|| {
        UpdateError::MetadataFetch("images[0].copyright is missing".into())
    })?;
    let path = first.url.filter(|u| !u.is_empty()).ok_or_else(|| {
        UpdateError::MetadataFetch("images[0].url is missing".into())
    })?;

    Ok(ImageOfTheDay {
        copyright,
        url_template: absolutize(&path),
    })
}

fn absolutize(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{PROVIDER_HOST}{path}")
    }
}

/// Substitute the first `<width>x<height>.jpg` segment of `url_template`
/// with `<resolution>.jpg`; every other byte is left untouched.
pub fn materialize(url_template: &str, resolution: Resolution) -> Result<String> {
    let segment = SIZE_SEGMENT.find(url_template).ok_or_else(|| {
        UpdateError::MetadataFetch(format!(
            "image url has no <width>x<height>.jpg segment: {url_template}"
        ))
    })?;

    Ok(format!(
        "{}{}.jpg{}",
        &url_template[..segment.start()],
        resolution.as_str(),
        &url_template[segment.end()..]
    ))
}
