//! Dashboard actions that mutate stored state
//!
//! Each action authorizes first and writes afterwards. An action touching
//! several cells writes them one by one; there is no transaction spanning
//! cells, so a failure part way leaves the earlier writes in place.

use crate::access::{
    authorize, Invitation, MemberId, Permission, Role, TeamMember, TeamRoster, ViewId,
};
use crate::cells;
use crate::store::Store;
use crate::tenancy::{
    artist_display_name, ActivityLogEntry, Artist, ArtistId, ReferenceType, Release,
};
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

fn roster(store: &Store) -> TeamRoster {
    TeamRoster::new(cells::team_members(store).get())
}

/// Run `f` on the team and save the result, all under the store's write lock
///
/// Nothing is saved when `f` fails, and two concurrent mutations cannot
/// overwrite each other.
fn with_roster<R, F>(store: &Store, f: F) -> Result<R>
where
    F: FnOnce(&mut TeamRoster) -> Result<R>,
{
    cells::team_members(store).try_update(|members| {
        let mut roster = TeamRoster::new(members);
        let out = f(&mut roster)?;
        Ok((roster.into_members(), out))
    })
}

/// Register the account owner and sign them in
pub fn register_owner(store: &Store, name: &str, email: &str) -> Result<TeamMember> {
    let owner = with_roster(store, |roster| Ok(roster.register_owner(name, email)?.clone()))?;
    cells::current_user(store).set(&Some(owner.clone()))?;
    Ok(owner)
}

/// Sign in as the member with `email`
pub fn sign_in(store: &Store, email: &str) -> Result<TeamMember> {
    let member = roster(store)
        .find_by_email(email)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("no team member with email {}", email.trim())))?;
    cells::current_user(store).set(&Some(member.clone()))?;
    Ok(member)
}

pub fn sign_out(store: &Store) {
    cells::current_user(store).clear();
}

/// Look up the acting member by id
pub fn member(store: &Store, id: MemberId) -> Result<TeamMember> {
    roster(store)
        .find(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("team member {}", id)))
}

pub fn invite_member(store: &Store, actor: &TeamMember, invitation: Invitation) -> Result<TeamMember> {
    let plan = cells::plan(store).get();
    with_roster(store, |roster| Ok(roster.invite(actor, plan, invitation)?.clone()))
}

pub fn remove_member(store: &Store, actor: &TeamMember, id: MemberId) -> Result<TeamMember> {
    with_roster(store, |roster| roster.remove(actor, id))
}

pub fn change_member_role(
    store: &Store,
    actor: &TeamMember,
    id: MemberId,
    role: Role,
) -> Result<TeamMember> {
    with_roster(store, |roster| Ok(roster.change_role(actor, id, role)?.clone()))
}

pub fn toggle_member_permission(
    store: &Store,
    actor: &TeamMember,
    id: MemberId,
    permission: Permission,
) -> Result<TeamMember> {
    with_roster(store, |roster| {
        Ok(roster.toggle_permission(actor, id, permission)?.clone())
    })
}

pub fn toggle_member_artist(
    store: &Store,
    actor: &TeamMember,
    id: MemberId,
    artist: ArtistId,
) -> Result<TeamMember> {
    with_roster(store, |roster| Ok(roster.toggle_artist(actor, id, artist)?.clone()))
}

/// Create an artist with the default platform connections and select it
pub fn add_artist(store: &Store, actor: &TeamMember, name: &str) -> Result<Artist> {
    authorize(actor, Permission::Settings, None)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("artist name is required".to_string()));
    }

    let connections = cells::platform_connections(store).get();
    let artists = cells::artists(store).update(|mut artists| {
        let id = ArtistId(artists.iter().map(|a| a.id.0).max().unwrap_or(0) + 1);
        let mut artist = Artist::new(id, name);
        artist.platform_connections = connections;
        artists.push(artist);
        artists
    })?;
    let artist = artists
        .last()
        .cloned()
        .ok_or_else(|| Error::Internal("artist list empty after insert".to_string()))?;
    cells::selected_artist_id(store).set(&Some(artist.id))?;
    cells::view(store).set(&ViewId::Dashboard)?;

    info!(artist = %artist.id, "Added artist {}", artist.name);
    Ok(artist)
}

/// Add a release and note it in the activity log
///
/// A release id of 0 is replaced by the next free id. The plan's release
/// limit, the id check and the insert happen in one locked update.
pub fn add_release(store: &Store, actor: &TeamMember, mut release: Release) -> Result<Release> {
    authorize(actor, Permission::Releases, Some(release.artist_id))?;
    if release.title.trim().is_empty() {
        return Err(Error::InvalidInput("release title is required".to_string()));
    }
    let plan = cells::plan(store).get();

    let release = cells::releases(store).try_update(|mut releases| {
        if let Some(limit) = plan.features().releases {
            if releases.len() >= limit as usize {
                return Err(Error::PlanLimit(format!(
                    "the {} plan allows {} release(s)",
                    plan, limit
                )));
            }
        }
        if release.id == 0 {
            release.id = releases.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        } else if releases.iter().any(|r| r.id == release.id) {
            return Err(Error::InvalidInput(format!("release {} already exists", release.id)));
        }
        releases.push(release.clone());
        Ok((releases, release))
    })?;
    record_activity(
        store,
        actor.id,
        release.artist_id,
        "created release",
        Some(release.title.clone()),
        Some((release.id, ReferenceType::Release)),
    )?;
    Ok(release)
}

/// Append an entry to the activity log
pub fn record_activity(
    store: &Store,
    member: MemberId,
    artist: ArtistId,
    action: &str,
    details: Option<String>,
    reference: Option<(i64, ReferenceType)>,
) -> Result<ActivityLogEntry> {
    let mut entry = ActivityLogEntry {
        id: 0,
        timestamp: Utc::now(),
        team_member_id: member,
        artist_id: artist,
        action: action.to_string(),
        details,
        reference_id: reference.map(|(id, _)| id),
        reference_type: reference.map(|(_, kind)| kind),
    };
    let log = cells::activity_log(store).update(|mut log| {
        entry.id = log.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        log.push(entry);
        log
    })?;
    log.last()
        .cloned()
        .ok_or_else(|| Error::Internal("activity log empty after append".to_string()))
}

/// An activity entry with its references resolved for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    #[serde(flatten)]
    pub entry: ActivityLogEntry,
    pub member_name: String,
    pub artist_name: String,
}

/// The activity log, newest first, for the artists `viewer` may see
pub fn activity_feed(store: &Store, viewer: &TeamMember) -> Result<Vec<ActivityItem>> {
    authorize(viewer, Permission::ActivityLog, None)?;

    let roster = roster(store);
    let artists = cells::artists(store).get();
    let mut items: Vec<_> = cells::activity_log(store)
        .get()
        .into_iter()
        .filter(|e| viewer.role.is_admin() || viewer.artist_ids.contains(&e.artist_id))
        .map(|entry| ActivityItem {
            member_name: roster.display_name(entry.team_member_id).to_string(),
            artist_name: artist_display_name(&artists, entry.artist_id).to_string(),
            entry,
        })
        .collect();
    items.sort_by(|a, b| b.entry.timestamp.cmp(&a.entry.timestamp));
    Ok(items)
}
