//! Test fixtures for inbound approval events.

use chrono::Utc;
use connectors_core::domains::deployment::events::{AssetStatusChangedEvent, ASSET_STATUS_CHANGED};
use connectors_core::domains::deployment::models::{
    AssetStatus, ContentType, CreativeSpecs, Demographics, Metadata,
};
use uuid::Uuid;

/// An approved social media asset targeting `platforms`
pub fn approved_asset(platforms: &[&str]) -> AssetStatusChangedEvent {
    asset_with_status(AssetStatus::Approved, platforms)
}

pub fn asset_with_status(status: AssetStatus, platforms: &[&str]) -> AssetStatusChangedEvent {
    AssetStatusChangedEvent {
        event_type: ASSET_STATUS_CHANGED.to_string(),
        asset_id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        strategy_id: Uuid::new_v4(),
        status,
        prev_status: AssetStatus::Review,
        content_type: ContentType::SocialMedia,
        title: "Autumn trail running".to_string(),
        content: "New grip, same lightweight feel.".to_string(),
        metadata: Metadata {
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            target_audience: "trail runners".to_string(),
            budget: 2500.0,
            campaign_type: "conversion".to_string(),
            keywords: vec!["trail".to_string(), "running shoes".to_string()],
            demographics: Demographics {
                age_min: 21,
                age_max: 50,
                locations: vec!["US".to_string()],
                ..Default::default()
            },
            creative_specs: CreativeSpecs {
                headline: "Run further".to_string(),
                landing_url: "https://shop.example.com/trail".to_string(),
                ..Default::default()
            },
        },
        timestamp: Utc::now(),
    }
}
