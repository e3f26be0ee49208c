//! Tenant records as they are persisted

use super::{ArtistId, TenantOwned};
use crate::access::MemberId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Social platforms an artist can connect
pub const PLATFORMS: [&str; 5] = ["facebook", "instagram", "tiktok", "x", "youtube"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConnections {
    pub facebook: bool,
    pub instagram: bool,
    pub tiktok: bool,
    pub x: bool,
    pub youtube: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub avatar_url: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default = "default_true")]
    pub is_setup_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub platform_connections: PlatformConnections,
}

impl Artist {
    pub fn new(id: ArtistId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            avatar_url: format!("https://picsum.photos/seed/artist{}/100/100", id),
            is_archived: false,
            is_setup_complete: true,
            genre: None,
            verification_status: VerificationStatus::Unverified,
            platform_connections: PlatformConnections::default(),
        }
    }
}

impl TenantOwned for Artist {
    fn artist_id(&self) -> ArtistId {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseType {
    Single,
    #[serde(rename = "EP")]
    Ep,
    Album,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: i64,
    pub artist_id: ArtistId,
    pub title: String,
    #[serde(rename = "type")]
    pub release_type: ReleaseType,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub cover_art_url: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl TenantOwned for Release {
    fn artist_id(&self) -> ArtistId {
        self.artist_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialPlatform {
    Instagram,
    TikTok,
    YouTube,
    Facebook,
    X,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialPostStatus {
    Draft,
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Posted,
    #[serde(rename = "Changes Requested")]
    ChangesRequested,
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    pub id: i64,
    pub artist_id: ArtistId,
    pub release_id: i64,
    pub platform: SocialPlatform,
    pub content: String,
    pub scheduled_time: DateTime<Utc>,
    pub status: SocialPostStatus,
}

impl TenantOwned for SocialPost {
    fn artist_id(&self) -> ArtistId {
        self.artist_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachContact {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachCampaign {
    pub id: i64,
    pub artist_id: ArtistId,
    pub release_id: i64,
    #[serde(default)]
    pub contacts: Vec<OutreachContact>,
}

impl TenantOwned for OutreachCampaign {
    fn artist_id(&self) -> ArtistId {
        self.artist_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Release,
    Task,
    Campaign,
}

/// One line of the team activity feed
///
/// `team_member_id` may outlive the member it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub team_member_id: MemberId,
    pub artist_id: ArtistId,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<ReferenceType>,
}

impl TenantOwned for ActivityLogEntry {
    fn artist_id(&self) -> ArtistId {
        self.artist_id
    }
}

fn default_true() -> bool {
    true
}
