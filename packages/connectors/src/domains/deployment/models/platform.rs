use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Advertising platform an asset can be deployed to.
///
/// Inbound events carry platform names as free-form strings; anything that
/// does not parse into a variant here is skipped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GoogleAds,
    Meta,
}

impl Platform {
    /// Every variant, in declaration order
    pub const ALL: [Platform; 2] = [Platform::GoogleAds, Platform::Meta];

    /// Position of this variant in [`Platform::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GoogleAds => "google_ads",
            Platform::Meta => "meta",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported platform: {0}")]
pub struct UnsupportedPlatform(pub String);

impl FromStr for Platform {
    type Err = UnsupportedPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google_ads" => Ok(Platform::GoogleAds),
            "meta" => Ok(Platform::Meta),
            other => Err(UnsupportedPlatform(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_platforms() {
        assert_eq!("google_ads".parse::<Platform>(), Ok(Platform::GoogleAds));
        assert_eq!("meta".parse::<Platform>(), Ok(Platform::Meta));
    }

    #[test]
    fn test_parse_unknown_platform() {
        let err = "tiktok".parse::<Platform>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported platform: tiktok");
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Platform::GoogleAds).unwrap();
        assert_eq!(json, "\"google_ads\"");
        for platform in Platform::ALL {
            assert_eq!(platform.to_string(), platform.as_str());
        }
    }

    #[test]
    fn test_index_matches_all() {
        for platform in Platform::ALL {
            assert_eq!(Platform::ALL[platform.index()], platform);
        }
    }
}
