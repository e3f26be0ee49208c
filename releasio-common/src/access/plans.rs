//! Subscription plans and the feature limits they carry

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlanName {
    #[default]
    Free,
    Pro,
    Agency,
}

/// Limits of a plan; `None` means unlimited
///
/// Seats and the release count are enforced by the team and release actions.
/// The feature flags are offered to clients with the plan itself, which use
/// them to decide which tools to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    pub releases: Option<u32>,
    pub promo_generations: Option<u32>,
    pub advanced_analytics: bool,
    pub social_scheduling: bool,
    pub team_management: bool,
    /// Seats including the account owner
    pub team_members: usize,
    pub tour_support: bool,
    pub lyric_syncing: bool,
    pub release_amplifier: bool,
}

impl PlanName {
    pub const ALL: [PlanName; 3] = [PlanName::Free, PlanName::Pro, PlanName::Agency];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanName::Free => "Free",
            PlanName::Pro => "Pro",
            PlanName::Agency => "Agency",
        }
    }

    pub const fn features(self) -> PlanFeatures {
        match self {
            PlanName::Free => PlanFeatures {
                releases: Some(1),
                promo_generations: Some(5),
                advanced_analytics: false,
                social_scheduling: false,
                team_management: false,
                team_members: 1,
                tour_support: false,
                lyric_syncing: false,
                release_amplifier: false,
            },
            PlanName::Pro => PlanFeatures {
                releases: None,
                promo_generations: None,
                advanced_analytics: true,
                social_scheduling: true,
                team_management: false,
                team_members: 1,
                tour_support: true,
                lyric_syncing: true,
                release_amplifier: true,
            },
            PlanName::Agency => PlanFeatures {
                releases: None,
                promo_generations: None,
                advanced_analytics: true,
                social_scheduling: true,
                team_management: true,
                team_members: 5,
                tour_support: true,
                lyric_syncing: true,
                release_amplifier: true,
            },
        }
    }
}

impl fmt::Display for PlanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
