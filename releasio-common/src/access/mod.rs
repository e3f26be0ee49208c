//! Role and permission model
//!
//! Members carry their own permission set (seeded from a role preset) and
//! the set of artists they may act on. [`gate::can_access`] is the single
//! decision point; everything that mutates state or changes the view asks it
//! first.

pub mod catalog;
pub mod gate;
pub mod grant;
pub mod member;
pub mod plans;
pub mod roles;
pub mod views;

pub use catalog::{all_permissions, Category, Permission, CATEGORIES};
pub use gate::{authorize, can_access, Capability};
pub use grant::{CapabilityGrant, GrantProbe, GrantStatus};
pub use member::{Invitation, TeamMember, TeamRoster, UNKNOWN_MEMBER};
pub use plans::{PlanFeatures, PlanName};
pub use roles::{preset_for, Role};
pub use views::{ViewId, ViewRequirement};

use crate::tenancy::ArtistId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A refused capability check
///
/// Rendered to the user as the "Access Denied" notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDenied {
    pub member_id: MemberId,
    /// Identifier of the permission or view that was requested
    pub capability: String,
    pub artist_id: Option<ArtistId>,
    pub reason: DenialReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    MissingPermission,
    AdminOnly,
    ArtistNotAssigned,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Access Denied: ")?;
        match self.reason {
            DenialReason::MissingPermission => write!(
                f,
                "you do not have permission to use {}",
                self.capability
            ),
            DenialReason::AdminOnly => {
                write!(f, "{} is available to administrators only", self.capability)
            }
            DenialReason::ArtistNotAssigned => match self.artist_id {
                Some(artist) => write!(f, "you are not assigned to artist {}", artist),
                None => write!(f, "you are not assigned to this artist"),
            },
        }
    }
}

impl std::error::Error for AccessDenied {}
