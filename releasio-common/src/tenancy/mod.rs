//! Artists (tenants) and the records they own
//!
//! Every tenant-owned record carries its artist id. Nothing reaches a view
//! without first being narrowed to one artist, either with [`scope_to`] or,
//! when a member is involved, with [`ScopedCollection::for_member`].

pub mod records;

pub use records::{
    ActivityLogEntry, Artist, OutreachCampaign, OutreachContact, PlatformConnections, Release,
    ReleaseType, ReferenceType, SocialPlatform, SocialPost, SocialPostStatus,
    VerificationStatus, PLATFORMS,
};

use crate::access::{authorize, AccessDenied, Capability, TeamMember};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown wherever a record refers to an artist that no longer exists
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub i64);

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record that belongs to exactly one artist
pub trait TenantOwned {
    fn artist_id(&self) -> ArtistId;
}

/// The records of `items` that belong to `artist`
pub fn scope_to<T: TenantOwned + Clone>(items: &[T], artist: ArtistId) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.artist_id() == artist)
        .cloned()
        .collect()
}

/// Records of one artist that a particular member is allowed to see
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedCollection<T> {
    artist: ArtistId,
    items: Vec<T>,
}

impl<T: TenantOwned + Clone> ScopedCollection<T> {
    /// Narrow `items` to `artist`, provided `member` may use `capability`
    /// for that artist
    pub fn for_member(
        member: &TeamMember,
        capability: impl Into<Capability>,
        artist: ArtistId,
        items: &[T],
    ) -> Result<Self, AccessDenied> {
        authorize(member, capability, Some(artist))?;
        Ok(Self {
            artist,
            items: scope_to(items, artist),
        })
    }

    pub fn artist(&self) -> ArtistId {
        self.artist
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of resolving the persisted artist selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArtistSelection<'a> {
    /// The selected artist exists
    Current(&'a Artist),
    /// The selection was missing or dangling; this artist replaces it and the
    /// stored selection should be rewritten
    Replaced(&'a Artist),
    /// There are no artists at all
    Empty,
}

impl<'a> ArtistSelection<'a> {
    pub fn artist(self) -> Option<&'a Artist> {
        match self {
            ArtistSelection::Current(a) | ArtistSelection::Replaced(a) => Some(a),
            ArtistSelection::Empty => None,
        }
    }
}

/// Find the selected artist, falling back to the first active one
pub fn resolve_selected_artist(artists: &[Artist], selected: Option<ArtistId>) -> ArtistSelection<'_> {
    if let Some(artist) = selected.and_then(|id| artists.iter().find(|a| a.id == id)) {
        return ArtistSelection::Current(artist);
    }

    artists
        .iter()
        .find(|a| !a.is_archived)
        .or_else(|| artists.first())
        .map_or(ArtistSelection::Empty, ArtistSelection::Replaced)
}

/// Like [`resolve_selected_artist`], but a replacement is taken from the
/// artists `member` is assigned to whenever there is one
///
/// An existing selection is returned as is, even when the member may not
/// access it; the gate decides that.
pub fn resolve_selected_artist_for<'a>(
    artists: &'a [Artist],
    selected: Option<ArtistId>,
    member: &TeamMember,
) -> ArtistSelection<'a> {
    match resolve_selected_artist(artists, selected) {
        ArtistSelection::Replaced(fallback) if !member.role.is_admin() => {
            let assigned = |a: &&Artist| member.artist_ids.contains(&a.id);
            artists
                .iter()
                .filter(assigned)
                .find(|a| !a.is_archived)
                .or_else(|| artists.iter().find(assigned))
                .map_or(ArtistSelection::Replaced(fallback), ArtistSelection::Replaced)
        }
        selection => selection,
    }
}

/// Name to show for `id`, tolerating artists that no longer exist
pub fn artist_display_name(artists: &[Artist], id: ArtistId) -> &str {
    artists
        .iter()
        .find(|a| a.id == id)
        .map_or(UNKNOWN_ARTIST, |a| a.name.as_str())
}
