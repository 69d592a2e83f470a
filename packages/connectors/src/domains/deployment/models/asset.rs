//! Asset types shared by inbound and outbound events.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::platform::Platform;

/// Lifecycle status of a marketing asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Draft,
    Review,
    Approved,
    Rejected,
    Deployed,
    Failed,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Draft => "draft",
            AssetStatus::Review => "review",
            AssetStatus::Approved => "approved",
            AssetStatus::Rejected => "rejected",
            AssetStatus::Deployed => "deployed",
            AssetStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    BlogPost,
    SocialMedia,
    EmailCampaign,
    VideoScript,
    Infographic,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::BlogPost => "blog_post",
            ContentType::SocialMedia => "social_media",
            ContentType::EmailCampaign => "email_campaign",
            ContentType::VideoScript => "video_script",
            ContentType::Infographic => "infographic",
        };
        f.write_str(s)
    }
}

/// Targeting and creative information attached to an asset.
///
/// `platforms` keeps the raw names from the producer so the metadata can be
/// republished untouched; use [`Metadata::requested_platforms`] for the typed view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(deserialize_with = "null_as_default")]
    pub platforms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub target_audience: String,
    pub budget: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub campaign_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub demographics: Demographics,
    #[serde(deserialize_with = "null_as_default")]
    pub creative_specs: CreativeSpecs,
}

impl Metadata {
    /// Distinct supported platforms, in first-mention order.
    pub fn requested_platforms(&self) -> Vec<Platform> {
        let mut platforms = Vec::with_capacity(self.platforms.len());
        for name in &self.platforms {
            if let Ok(platform) = name.parse::<Platform>() {
                if !platforms.contains(&platform) {
                    platforms.push(platform);
                }
            }
        }
        platforms
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Demographics {
    pub age_min: u32,
    pub age_max: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub genders: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub interests: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub behaviors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreativeSpecs {
    pub image_url: String,
    pub video_url: String,
    pub headline: String,
    pub description: String,
    pub call_to_action: String,
    pub landing_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dimensions: HashMap<String, String>,
}

/// Producers encode empty slices and maps as `null`; read those as empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_with(platforms: &[&str]) -> Metadata {
        Metadata {
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requested_platforms_drops_unknown_names() {
        let metadata = metadata_with(&["meta", "tiktok", "linkedin"]);
        assert_eq!(metadata.requested_platforms(), vec![Platform::Meta]);
    }

    #[test]
    fn test_requested_platforms_collapses_duplicates() {
        let metadata = metadata_with(&["google_ads", "meta", "google_ads"]);
        assert_eq!(
            metadata.requested_platforms(),
            vec![Platform::GoogleAds, Platform::Meta]
        );
    }

    #[test]
    fn test_requested_platforms_empty() {
        assert!(Metadata::default().requested_platforms().is_empty());
    }

    #[test]
    fn test_metadata_tolerates_missing_fields() {
        let metadata: Metadata =
            serde_json::from_str(r#"{"platforms":["meta"],"budget":250.5}"#).unwrap();
        assert_eq!(metadata.platforms, vec!["meta".to_string()]);
        assert_eq!(metadata.budget, 250.5);
        assert!(metadata.keywords.is_empty());
        assert_eq!(metadata.demographics, Demographics::default());
    }

    #[test]
    fn test_metadata_reads_null_collections_as_empty() {
        let metadata: Metadata = serde_json::from_str(
            r#"{
                "platforms": ["meta"],
                "keywords": null,
                "demographics": {"age_min": 18, "genders": null, "locations": null,
                                 "interests": null, "behaviors": null},
                "creative_specs": {"headline": "Hi", "dimensions": null}
            }"#,
        )
        .unwrap();

        assert_eq!(metadata.requested_platforms(), vec![Platform::Meta]);
        assert!(metadata.keywords.is_empty());
        assert_eq!(metadata.demographics.age_min, 18);
        assert!(metadata.demographics.genders.is_empty());
        assert!(metadata.creative_specs.dimensions.is_empty());

        let metadata: Metadata = serde_json::from_str(r#"{"platforms": null}"#).unwrap();
        assert!(metadata.requested_platforms().is_empty());
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        let result = serde_json::from_str::<AssetStatus>("\"archived\"");
        assert!(result.is_err());
    }
}
