//! Roles and their preset permission sets
//!
//! A preset only seeds a member's permissions when the member is created or
//! assigned a new role. After that the member's own set is authoritative.

use super::catalog::{all_permissions, Permission};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Marketing,
    #[serde(rename = "A&R")]
    ArtistsAndRepertoire,
    Finance,
    Publicist,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Manager,
        Role::Marketing,
        Role::ArtistsAndRepertoire,
        Role::Finance,
        Role::Publicist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Marketing => "Marketing",
            Role::ArtistsAndRepertoire => "A&R",
            Role::Finance => "Finance",
            Role::Publicist => "Publicist",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown role '{}'", s)))
    }
}

use Permission::*;

const CREATIVE_AI: &[Permission] = &[
    CreativeStudio,
    PromoGenerator,
    VideoTeaser,
    PromoVideo,
    CoverArtDesigner,
    LyricStoryboard,
    FullLyricVideo,
    CreativePromptAssistant,
    HypeReel,
    AlbumVisualSuite,
    ReelSync,
    LyricLab,
    SoundLab,
    IdeaLocker,
];

const GROWTH: &[Permission] = &[
    Outreach,
    SmartLink,
    FanPersona,
    MarketingCampaign,
    FanAppreciation,
    AdvertisingGuru,
    CollaborationFinder,
    SpotifyPitchBuilder,
    MediaTraining,
];

const MANAGER_OWN: &[Permission] = &[
    Dashboard,
    Releases,
    Analytics,
    Playlists,
    Calendar,
    Timeline,
    Branding,
    BrandBrain,
    VisualIdentity,
    ReportingSuite,
    TourSupport,
    StageDesigner,
    Settings,
];

const MARKETING: &[Permission] = &[
    Dashboard,
    Releases,
    Analytics,
    Playlists,
    CreativeStudio,
    PromoGenerator,
    VideoTeaser,
    PromoVideo,
    CoverArtDesigner,
    LyricStoryboard,
    CreativePromptAssistant,
    HypeReel,
    LyricLab,
    SoundLab,
    BrandBrain,
    VisualIdentity,
    Outreach,
    SmartLink,
    FanPersona,
    MarketingCampaign,
    FanAppreciation,
    AdvertisingGuru,
    SpotifyPitchBuilder,
];

const ARTISTS_AND_REPERTOIRE: &[Permission] = &[
    Dashboard,
    Releases,
    Analytics,
    Playlists,
    CreativeStudio,
    CollaborationFinder,
    SongSimilarityMap,
    RosterHealth,
    LyricLab,
    SoundLab,
    IdeaLocker,
];

const FINANCE: &[Permission] = &[Dashboard, Analytics, ReportingSuite];

const PUBLICIST: &[Permission] = &[
    Dashboard,
    Releases,
    Outreach,
    EpkBuilder,
    PressPageBuilder,
    PromoGenerator,
    SmartLink,
    SpotifyPitchBuilder,
    MediaTraining,
];

/// Initial permission set for a member assigned `role`
///
/// Admin receives every permission currently in the catalog.
pub fn preset_for(role: Role) -> BTreeSet<Permission> {
    match role {
        Role::Admin => all_permissions(),
        Role::Manager => MANAGER_OWN
            .iter()
            .chain(CREATIVE_AI)
            .chain(GROWTH)
            .copied()
            .collect(),
        Role::Marketing => MARKETING.iter().copied().collect(),
        Role::ArtistsAndRepertoire => ARTISTS_AND_REPERTOIRE.iter().copied().collect(),
        Role::Finance => FINANCE.iter().copied().collect(),
        Role::Publicist => PUBLICIST.iter().copied().collect(),
    }
}
