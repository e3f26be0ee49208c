//! Permission catalog
//!
//! Every permission the dashboard knows about is declared exactly once in
//! the table below, grouped into display categories. The `Permission` enum,
//! its wire identifiers and labels, and [`all_permissions`] are all generated
//! from that table, so there is no second list to keep in sync.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

macro_rules! permission_catalog {
    (
        $(
            $category:ident => $category_label:literal {
                $( $variant:ident = $id:literal => $label:literal ),+ $(,)?
            }
        )+
    ) => {
        /// A single grantable capability
        ///
        /// Serialized as its kebab-case identifier, e.g. `"team-management"`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Permission {
            $( $( #[serde(rename = $id)] $variant, )+ )+
        }

        /// Display grouping of permissions; has no effect on access decisions
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Category {
            $( $category, )+
        }

        /// All categories in display order
        pub const CATEGORIES: &[Category] = &[ $( Category::$category ),+ ];

        impl Permission {
            /// Stable identifier used in stored data and URLs
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $( Permission::$variant => $id, )+ )+
                }
            }

            /// Human-readable label
            pub fn label(self) -> &'static str {
                match self {
                    $( $( Permission::$variant => $label, )+ )+
                }
            }

            pub fn category(self) -> Category {
                match self {
                    $( $( Permission::$variant => Category::$category, )+ )+
                }
            }
        }

        impl Category {
            pub fn label(self) -> &'static str {
                match self {
                    $( Category::$category => $category_label, )+
                }
            }

            /// Permissions of this category in display order
            pub fn permissions(self) -> &'static [Permission] {
                match self {
                    $( Category::$category => &[ $( Permission::$variant ),+ ], )+
                }
            }
        }
    };
}

permission_catalog! {
    Core => "Core" {
        Dashboard = "dashboard" => "View Dashboard",
        Releases = "releases" => "View & Manage Releases",
        Analytics = "analytics" => "View Analytics",
        Playlists = "playlists" => "Manage Playlists",
    }
    CreativeAi => "Creative AI" {
        CreativeStudio = "creative-studio" => "Access A&R Studio",
        PromoGenerator = "promo-generator" => "Generate Promo Posts",
        VideoTeaser = "video-teaser" => "Generate Video Teasers",
        PromoVideo = "promo-video" => "Generate Promo Clips",
        CoverArtDesigner = "cover-art-designer" => "Use Cover Art Prompt Generator",
        LyricStoryboard = "lyric-storyboard" => "Use Lyric Storyboard & VJ Kit",
        FullLyricVideo = "full-lyric-video" => "Generate Full Lyric Videos",
        CreativePromptAssistant = "creative-prompt-assistant" => "Use Creative Prompt Assistant",
        HypeReel = "hype-reel" => "Generate Hype Reels",
        AlbumVisualSuite = "album-visual-suite" => "Generate Album Visual Suites",
        ReelSync = "reelsync" => "Use ReelSync",
        LyricLab = "lyric-lab" => "Use Lyric Lab",
        SoundLab = "sound-lab" => "Use Sound Lab",
        IdeaLocker = "idea-locker" => "Use Idea Locker",
    }
    BrandingAndPersona => "Branding & Persona" {
        Branding = "branding" => "Manage Branding Kit",
        BrandBrain = "brand-brain" => "Use Brand Brain",
        VisualIdentity = "visual-identity" => "Generate Visual Identities",
    }
    GrowthAndMarketing => "Growth & Marketing" {
        Outreach = "outreach" => "Manage Outreach Campaigns",
        SmartLink = "smart-link" => "Manage Smart Links",
        FanPersona = "fan-persona" => "Generate Fan Personas",
        MarketingCampaign = "marketing-campaign" => "Build Marketing Campaigns",
        FanAppreciation = "fan-appreciation" => "Use Fan Appreciation Tools",
        AdvertisingGuru = "advertising-guru" => "Use AI Ad Builder",
        CollaborationFinder = "collaboration-finder" => "Use Collaboration Finder",
        SpotifyPitchBuilder = "spotify-pitch-builder" => "Use Spotify Pitch Builder",
        MediaTraining = "media-training" => "Use Media Training",
    }
    LabelTools => "Label Tools" {
        TourSupport = "tour-support" => "Manage Tour Support",
        StageDesigner = "stage-designer" => "Use Stage Designer",
        RosterHealth = "roster-health" => "View Roster Health",
        ReportingSuite = "reporting-suite" => "Use AI Reporting Suite",
        SongSimilarityMap = "song-similarity-map" => "Use Song Similarity Map",
        PressPageBuilder = "press-page-builder" => "Use Press Page Builder",
        EpkBuilder = "epk-builder" => "Use EPK Builder",
        Circles = "circles" => "Access Artist Circles",
        Calendar = "calendar" => "View Team Calendar",
        Timeline = "timeline" => "View Multi-Artist Timeline",
        ActivityLog = "activity-log" => "View Activity Log",
    }
    AccountAdministration => "Account Administration" {
        Settings = "settings" => "Manage Artist Settings",
        TeamManagement = "team-management" => "Manage Team Members & Permissions",
    }
}

/// Every permission in the catalog
///
/// Derived by flattening the categories on each call; the Admin role is
/// defined in terms of this set.
pub fn all_permissions() -> BTreeSet<Permission> {
    CATEGORIES
        .iter()
        .flat_map(|category| category.permissions().iter().copied())
        .collect()
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        all_permissions()
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown permission '{}'", s)))
    }
}

/// Wire identifiers of every permission, for shape declarations
pub fn permission_ids() -> Vec<&'static str> {
    all_permissions().into_iter().map(Permission::as_str).collect()
}
