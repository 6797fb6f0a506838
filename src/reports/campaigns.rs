//! Campaign lister

use crate::client::gaql::CAMPAIGNS_QUERY;
use crate::client::{execute, ClientHandle};
use crate::core::error::QueryError;
use crate::core::traits::Row;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Campaign serving status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Enabled,
    Paused,
    Removed,
    Unknown,
}

impl CampaignStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "ENABLED" => Self::Enabled,
            "PAUSED" => Self::Paused,
            "REMOVED" => Self::Removed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Paused => "PAUSED",
            Self::Removed => "REMOVED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary serving network of a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvertisingChannelType {
    Search,
    Display,
    Shopping,
    Hotel,
    Video,
    MultiChannel,
    Local,
    Smart,
    PerformanceMax,
    LocalServices,
    Travel,
    DemandGen,
    Unknown,
}

impl AdvertisingChannelType {
    pub fn parse(value: &str) -> Self {
        match value {
            "SEARCH" => Self::Search,
            "DISPLAY" => Self::Display,
            "SHOPPING" => Self::Shopping,
            "HOTEL" => Self::Hotel,
            "VIDEO" => Self::Video,
            "MULTI_CHANNEL" => Self::MultiChannel,
            "LOCAL" => Self::Local,
            "SMART" => Self::Smart,
            "PERFORMANCE_MAX" => Self::PerformanceMax,
            "LOCAL_SERVICES" => Self::LocalServices,
            "TRAVEL" => Self::Travel,
            "DEMAND_GEN" => Self::DemandGen,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "SEARCH",
            Self::Display => "DISPLAY",
            Self::Shopping => "SHOPPING",
            Self::Hotel => "HOTEL",
            Self::Video => "VIDEO",
            Self::MultiChannel => "MULTI_CHANNEL",
            Self::Local => "LOCAL",
            Self::Smart => "SMART",
            Self::PerformanceMax => "PERFORMANCE_MAX",
            Self::LocalServices => "LOCAL_SERVICES",
            Self::Travel => "TRAVEL",
            Self::DemandGen => "DEMAND_GEN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for AdvertisingChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub status: CampaignStatus,
    pub channel_type: AdvertisingChannelType,
}

impl Campaign {
    /// Map one result row; a row without an id is a malformed response
    pub fn from_row(row: &Row) -> Result<Self, QueryError> {
        let id = row
            .get_i64("campaign.id")
            .ok_or_else(|| QueryError::MalformedResponse("campaign row without id".to_string()))?;

        Ok(Self {
            id,
            name: row.get_str("campaign.name").unwrap_or_default().to_string(),
            status: CampaignStatus::parse(row.get_str("campaign.status").unwrap_or_default()),
            channel_type: AdvertisingChannelType::parse(
                row.get_str("campaign.advertising_channel_type")
                    .unwrap_or_default(),
            ),
        })
    }
}

/// Every non-removed campaign, in the order the API returned them
pub async fn try_list_campaigns(
    client: &ClientHandle,
    account_id: &str,
) -> Result<Vec<Campaign>, QueryError> {
    let mut rows = execute(client, account_id, CAMPAIGNS_QUERY).await?;

    let mut campaigns = Vec::new();
    while let Some(row) = rows.try_next().await? {
        campaigns.push(Campaign::from_row(&row)?);
    }
    Ok(campaigns)
}

/// Like [`try_list_campaigns`], but a failure is logged and yields an empty list
pub async fn list_campaigns(client: &ClientHandle, account_id: &str) -> Vec<Campaign> {
    match try_list_campaigns(client, account_id).await {
        Ok(campaigns) => campaigns,
        Err(err) => {
            tracing::warn!(account_id, error = %err, "failed to fetch campaigns");
            Vec::new()
        }
    }
}
