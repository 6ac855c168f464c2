use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Image size tokens understood by the provider's image endpoint.
///
/// Every token except [`Resolution::Uhd`] is a literal `<width>x<height>`;
/// `UHD` asks the provider for its largest rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Resolution {
    W800H600,
    W1024H768,
    W1280H720,
    W1280H768,
    W1366H768,
    W1920H1080,
    W1920H1200,
    #[default]
    Uhd,
}

impl Resolution {
    pub const ALL: [Resolution; 8] = [
        Self::W800H600,
        Self::W1024H768,
        Self::W1280H720,
        Self::W1280H768,
        Self::W1366H768,
        Self::W1920H1080,
        Self::W1920H1200,
        Self::Uhd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::W800H600 => "800x600",
            Resolution::W1024H768 => "1024x768",
            Resolution::W1280H720 => "1280x720",
            Resolution::W1280H768 => "1280x768",
            Resolution::W1366H768 => "1366x768",
            Resolution::W1920H1080 => "1920x1080",
            Resolution::W1920H1200 => "1920x1200",
            Resolution::Uhd => "UHD",
        }
    }

    /// Pixel dimensions, or `None` for the non-dimensional `UHD` sentinel.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Resolution::W800H600 => Some((800, 600)),
            Resolution::W1024H768 => Some((1024, 768)),
            Resolution::W1280H720 => Some((1280, 720)),
            Resolution::W1280H768 => Some((1280, 768)),
            Resolution::W1366H768 => Some((1366, 768)),
            Resolution::W1920H1080 => Some((1920, 1080)),
            Resolution::W1920H1200 => Some((1920, 1200)),
            Resolution::Uhd => None,
        }
    }
}

impl FromStr for Resolution {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| ModelError::UnknownResolution(token.to_string()))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
