//! Dashboard views and what it takes to open them

use super::catalog::Permission;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a member needs before a view may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRequirement {
    /// Anyone signed in
    Open,
    /// Every listed permission
    Permissions(&'static [Permission]),
    /// The Admin role itself; permissions alone are not enough
    AdminRole,
}

macro_rules! requirement {
    (open) => {
        ViewRequirement::Open
    };
    (admin) => {
        ViewRequirement::AdminRole
    };
    ([ $( $p:ident ),+ ]) => {
        ViewRequirement::Permissions(&[ $( Permission::$p ),+ ])
    };
}

macro_rules! view_table {
    ( $( $variant:ident = $id:literal => $req:tt ),+ $(,)? ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ViewId {
            $( #[serde(rename = $id)] $variant, )+
        }

        impl ViewId {
            pub const ALL: &'static [ViewId] = &[ $( ViewId::$variant ),+ ];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( ViewId::$variant => $id, )+
                }
            }

            pub fn requirement(self) -> ViewRequirement {
                match self {
                    $( ViewId::$variant => requirement!($req), )+
                }
            }
        }
    };
}

view_table! {
    Dashboard = "dashboard" => [Dashboard],
    Releases = "releases" => [Releases],
    Analytics = "analytics" => [Analytics],
    Playlists = "playlists" => [Playlists],
    PromoGenerator = "promo-generator" => [PromoGenerator],
    ReleaseDetails = "release-details" => [Releases],
    PlaylistDetails = "playlist-details" => [Playlists],
    Settings = "settings" => [Settings],
    TeamManagement = "team-management" => [TeamManagement],
    Calendar = "calendar" => [Calendar],
    VideoTeaser = "video-teaser" => [VideoTeaser],
    SmartLink = "smart-link" => [SmartLink],
    Artists = "artists" => open,
    Outreach = "outreach" => [Outreach],
    VisualIdentity = "visual-identity" => [VisualIdentity],
    TourPlanner = "tour-planner" => [TourSupport],
    PromoVideo = "promo-video" => [PromoVideo],
    FanPersona = "fan-persona" => [FanPersona],
    MarketingCampaign = "marketing-campaign" => [MarketingCampaign],
    FanAppreciation = "fan-appreciation" => [FanAppreciation],
    CoverArtDesigner = "cover-art-designer" => [CoverArtDesigner],
    ArtistSubmission = "artist-submission" => open,
    ArtistApproval = "artist-approval" => open,
    Publishing = "publishing" => open,
    Website = "website" => open,
    FanHub = "fan-hub" => open,
    BrandBrain = "brand-brain" => [BrandBrain],
    Branding = "branding" => [Branding],
    LyricStoryboard = "lyric-storyboard" => [LyricStoryboard],
    CreativeStudio = "creative-studio" => [CreativeStudio],
    CreativePromptAssistant = "creative-prompt-assistant" => [CreativePromptAssistant],
    FullLyricVideo = "full-lyric-video" => [FullLyricVideo],
    HypeReel = "hype-reel" => [HypeReel],
    ReelSync = "reelsync" => [ReelSync],
    AlbumVisualSuite = "album-visual-suite" => [AlbumVisualSuite],
    ContentPackBuilder = "content-pack-builder" => open,
    ActivityLog = "activity-log" => [ActivityLog],
    Timeline = "timeline" => [Timeline],
    Help = "help" => open,
    KnowledgeHub = "knowledge-hub" => open,
    EpkBuilder = "epk-builder" => [EpkBuilder],
    CampaignPerformance = "campaign-performance" => [Analytics],
    CollaborationFinder = "collaboration-finder" => [CollaborationFinder],
    SongSimilarityMap = "song-similarity-map" => [SongSimilarityMap],
    PressPageBuilder = "press-page-builder" => [PressPageBuilder],
    EventsCalendar = "events-calendar" => [Calendar],
    CampaignCoach = "campaign-coach" => [MarketingCampaign],
    ArtistKnowledgeGraph = "artist-knowledge-graph" => open,
    BrandCollabKit = "brand-collab-kit" => open,
    ContractHub = "contract-hub" => open,
    LivePerformance = "live-performance" => open,
    AiWorkforce = "ai-workforce" => open,
    AdvertisingGuru = "advertising-guru" => [AdvertisingGuru],
    SyncOpportunities = "sync-opportunities" => open,
    ReportingSuite = "reporting-suite" => [ReportingSuite],
    ApiIntegrations = "api-integrations" => [Settings],
    RosterHealth = "roster-health" => [RosterHealth],
    WorkDetails = "work-details" => open,
    Circles = "circles" => [Circles],
    CircleDetails = "circle-details" => [Circles],
    LyricCards = "lyric-cards" => open,
    SongwritingAssistant = "songwriting-assistant" => open,
    ReleaseWizard = "release-wizard" => [Releases],
    ReleaseAmplifier = "release-amplifier" => [Releases],
    Sustainability = "sustainability" => open,
    BusinessToolkit = "business-toolkit" => open,
    Admin = "admin" => admin,
    EventPage = "event-page" => open,
    FanReactionWall = "fan-reaction-wall" => open,
    Billing = "billing" => [Settings],
    LyricLab = "lyric-lab" => [LyricLab],
    SoundLab = "sound-lab" => [SoundLab],
    MediaTraining = "media-training" => [MediaTraining],
    StageDesigner = "stage-designer" => [StageDesigner],
    IdeaLocker = "idea-locker" => [IdeaLocker],
    SpotifyPitchBuilder = "spotify-pitch-builder" => [SpotifyPitchBuilder],
    ContractScanner = "contract-scanner" => open,
    ListeningPanel = "listening-panel" => open,
    SpotifyCanvas = "spotify-canvas" => open,
    TourProfitCalculator = "tour-profit-calculator" => [TourSupport],
    RemixContestBuilder = "remix-contest-builder" => open,
    VoiceoverStudio = "voiceover-studio" => open,
    VenueScout = "venue-scout" => [TourSupport],
    ReleaseDayWarRoom = "release-day-war-room" => [Releases],
    ContentMultiplier = "content-multiplier" => open,
}

impl ViewId {
    /// List view to fall back to when the entity a detail view shows is gone
    pub fn detail_parent(self) -> Option<ViewId> {
        match self {
            ViewId::ReleaseDetails => Some(ViewId::Releases),
            ViewId::PlaylistDetails => Some(ViewId::Playlists),
            ViewId::CircleDetails => Some(ViewId::Circles),
            ViewId::WorkDetails => Some(ViewId::Publishing),
            _ => None,
        }
    }
}

impl Default for ViewId {
    fn default() -> Self {
        ViewId::Dashboard
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ViewId::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown view '{}'", s)))
    }
}

/// Wire identifiers of every view, for shape declarations
pub fn view_ids() -> Vec<&'static str> {
    ViewId::ALL.iter().map(|v| v.as_str()).collect()
}
