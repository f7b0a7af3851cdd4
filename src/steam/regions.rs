//! Steam store regions and their currency configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two storefront markets being compared.
///
/// `Ua` is the source market (prices converted from UAH), `Id` is the
/// target market whose currency the report is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Ua,
    Id,
}

impl Region {
    /// Returns the `cc` country code the store API expects.
    pub fn country_code(&self) -> &'static str {
        match self {
            Region::Ua => "ua",
            Region::Id => "id",
        }
    }

    /// Returns the ISO currency code for this region.
    pub fn currency(&self) -> &'static str {
        match self {
            Region::Ua => "UAH",
            Region::Id => "IDR",
        }
    }

    /// Returns the symbol used when printing amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Region::Ua => "₴",
            Region::Id => "Rp",
        }
    }

    /// Short uppercase label used in report headers.
    pub fn label(&self) -> &'static str {
        match self {
            Region::Ua => "UA",
            Region::Id => "ID",
        }
    }

    /// Returns all supported regions.
    pub fn all() -> &'static [Region] {
        &[Region::Ua, Region::Id]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.country_code())
    }
}

impl FromStr for Region {
    type Err = RegionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ua" | "ukraine" => Ok(Region::Ua),
            "id" | "indonesia" => Ok(Region::Id),
            _ => Err(RegionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegionParseError(String);

impl fmt::Display for RegionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown region '{}'. Valid regions: ua, id", self.0)
    }
}

impl std::error::Error for RegionParseError {}
