use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// A provider market: the `mkt` code plus a human readable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Market {
    pub code: &'static str,
    pub name: &'static str,
}

const fn market(code: &'static str, name: &'static str) -> Market {
    Market { code, name }
}

/// Markets offered by the preferences surface, ordered by display name.
pub static MARKETS: [Market; 34] = [
    market("es-AR", "Argentina"),
    market("en-AU", "Australia"),
    market("de-AT", "Austria"),
    market("nl-BE", "Belgium"),
    market("pt-BR", "Brazil"),
    market("en-CA", "Canada"),
    market("es-CL", "Chile"),
    market("zh-CN", "China"),
    market("da-DK", "Denmark"),
    market("fi-FI", "Finland"),
    market("fr-FR", "France"),
    market("de-DE", "Germany"),
    market("zh-HK", "Hong Kong"),
    market("en-IN", "India"),
    market("en-ID", "Indonesia"),
    market("it-IT", "Italy"),
    market("ja-JP", "Japan"),
    market("ko-KR", "Korea"),
    market("en-MY", "Malaysia"),
    market("es-MX", "Mexico"),
    market("nl-NL", "Netherlands"),
    market("en-NZ", "New Zealand"),
    market("no-NO", "Norway"),
    market("pl-PL", "Poland"),
    market("en-PH", "Philippines"),
    market("ru-RU", "Russia"),
    market("en-ZA", "South Africa"),
    market("es-ES", "Spain"),
    market("sv-SE", "Sweden"),
    market("de-CH", "Switzerland"),
    market("zh-TW", "Taiwan"),
    market("tr-TR", "Türkiye"),
    market("en-GB", "United Kingdom"),
    market("en-US", "United States"),
];

const DEFAULT_CODE: &str = "en-US";

/// A validated region, always backed by an entry of [`MARKETS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region(&'static Market);

impl Region {
    pub fn all() -> impl Iterator<Item = Region> {
        MARKETS.iter().map(Region)
    }

    /// Look up a market code. Matching is exact; provider codes are
    /// case-sensitive on the wire.
    pub fn from_code(code: &str) -> Result<Self> {
        MARKETS
            .iter()
            .find(|m| m.code == code)
            .map(Region)
            .ok_or_else(|| ModelError::UnknownRegion(code.to_string()))
    }

    pub fn code(&self) -> &'static str {
        self.0.code
    }

    pub fn display_name(&self) -> &'static str {
        self.0.name
    }
}

impl Default for Region {
    fn default() -> Self {
        // DEFAULT_CODE is part of MARKETS.
        Region::all()
            .find(|r| r.code() == DEFAULT_CODE)
            .unwrap_or(Region(&MARKETS[MARKETS.len() - 1]))
    }
}

impl FromStr for Region {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Region::from_code(s.trim())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
