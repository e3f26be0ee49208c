//! Team members and the roster that manages them

use super::catalog::Permission;
use super::gate::authorize;
use super::plans::PlanName;
use super::roles::{preset_for, Role};
use super::MemberId;
use crate::tenancy::ArtistId;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Shown wherever a record refers to a member who has since been removed
pub const UNKNOWN_MEMBER: &str = "Unknown member";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Effective permissions; only seeded from the role preset
    pub permissions: BTreeSet<Permission>,
    pub avatar_url: String,
    /// Artists this member may act on (ignored for Admin)
    pub artist_ids: BTreeSet<ArtistId>,
}

/// Generated avatar for a display name
pub fn avatar_url_for(name: &str) -> String {
    let seed: String = name.split_whitespace().collect();
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", seed)
}

impl TeamMember {
    /// New member holding exactly the preset of `role` and no artists
    pub fn new(id: MemberId, name: &str, email: &str, role: Role) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            permissions: preset_for(role),
            avatar_url: avatar_url_for(name),
            artist_ids: BTreeSet::new(),
        }
    }

    pub fn with_artists<I: IntoIterator<Item = ArtistId>>(mut self, artists: I) -> Self {
        self.artist_ids.extend(artists);
        self
    }

    /// Assign a new role, replacing every permission with its preset
    pub fn change_role(&mut self, role: Role) {
        self.role = role;
        self.permissions = preset_for(role);
    }

    /// Grant or revoke one permission; returns whether it is now held
    pub fn toggle_permission(&mut self, permission: Permission) -> bool {
        if self.permissions.remove(&permission) {
            false
        } else {
            self.permissions.insert(permission);
            true
        }
    }

    /// Assign or unassign one artist; returns whether it is now assigned
    pub fn toggle_artist(&mut self, artist: ArtistId) -> bool {
        if self.artist_ids.remove(&artist) {
            false
        } else {
            self.artist_ids.insert(artist);
            true
        }
    }

    /// Whether the permissions differ from the role preset
    pub fn is_customized(&self) -> bool {
        self.permissions != preset_for(self.role)
    }
}

/// Request to add someone to the team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub artist_ids: BTreeSet<ArtistId>,
    /// Explicit permissions; the role preset when absent
    #[serde(default)]
    pub permissions: Option<BTreeSet<Permission>>,
}

/// The team, with every mutation gated on `team-management`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRoster {
    members: Vec<TeamMember>,
}

impl TeamRoster {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn into_members(self) -> Vec<TeamMember> {
        self.members
    }

    pub fn find(&self, id: MemberId) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Name to show for `id`, tolerating members that no longer exist
    pub fn display_name(&self, id: MemberId) -> &str {
        self.find(id).map_or(UNKNOWN_MEMBER, |m| m.name.as_str())
    }

    /// Sign-in lookup; emails compare case-insensitively
    pub fn find_by_email(&self, email: &str) -> Option<&TeamMember> {
        let email = email.trim();
        self.members.iter().find(|m| m.email.eq_ignore_ascii_case(email))
    }

    /// Add the account owner as an Admin; ungated since it creates the team
    pub fn register_owner(&mut self, name: &str, email: &str) -> Result<&TeamMember> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() {
            return Err(Error::InvalidInput("name and email are required".to_string()));
        }
        if self.find_by_email(email).is_some() {
            return Err(Error::InvalidInput(format!("{} is already on the team", email)));
        }

        let owner = TeamMember::new(self.next_id(), name, email, Role::Admin);
        info!(member = %owner.id, "Registered account owner {}", owner.name);
        self.members.push(owner);
        Ok(&self.members[self.members.len() - 1])
    }

    fn next_id(&self) -> MemberId {
        MemberId(self.members.iter().map(|m| m.id.0).max().unwrap_or(0) + 1)
    }

    fn member_mut(&mut self, id: MemberId) -> Result<&mut TeamMember> {
        self.members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::NotFound(format!("team member {}", id)))
    }

    /// Add a member, subject to the plan's seat limit
    pub fn invite(
        &mut self,
        actor: &TeamMember,
        plan: PlanName,
        invitation: Invitation,
    ) -> Result<&TeamMember> {
        authorize(actor, Permission::TeamManagement, None)?;

        let limit = plan.features().team_members;
        if self.members.len() >= limit {
            return Err(Error::PlanLimit(format!(
                "the {} plan allows {} team member(s)",
                plan, limit
            )));
        }

        let name = invitation.name.trim();
        let email = invitation.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(Error::InvalidInput("name and email are required".to_string()));
        }
        if self.find_by_email(email).is_some() {
            return Err(Error::InvalidInput(format!("{} is already on the team", email)));
        }

        let mut member = TeamMember::new(self.next_id(), name, email, invitation.role)
            .with_artists(invitation.artist_ids);
        if let Some(permissions) = invitation.permissions {
            member.permissions = permissions;
        }

        info!(member = %member.id, role = %member.role, "Invited team member {}", member.name);
        self.members.push(member);
        Ok(&self.members[self.members.len() - 1])
    }

    pub fn remove(&mut self, actor: &TeamMember, id: MemberId) -> Result<TeamMember> {
        authorize(actor, Permission::TeamManagement, None)?;

        let index = self
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::NotFound(format!("team member {}", id)))?;

        let removed = self.members.remove(index);
        info!(member = %removed.id, "Removed team member {}", removed.name);
        Ok(removed)
    }

    /// Reassign a role; the member's permissions reset to the new preset
    pub fn change_role(
        &mut self,
        actor: &TeamMember,
        id: MemberId,
        role: Role,
    ) -> Result<&TeamMember> {
        authorize(actor, Permission::TeamManagement, None)?;

        let member = self.member_mut(id)?;
        member.change_role(role);
        info!(member = %id, role = %role, "Role changed; permissions reset to preset");
        Ok(&*member)
    }

    pub fn toggle_permission(
        &mut self,
        actor: &TeamMember,
        id: MemberId,
        permission: Permission,
    ) -> Result<&TeamMember> {
        authorize(actor, Permission::TeamManagement, None)?;

        let member = self.member_mut(id)?;
        member.toggle_permission(permission);
        Ok(&*member)
    }

    pub fn toggle_artist(
        &mut self,
        actor: &TeamMember,
        id: MemberId,
        artist: ArtistId,
    ) -> Result<&TeamMember> {
        authorize(actor, Permission::TeamManagement, None)?;

        let member = self.member_mut(id)?;
        member.toggle_artist(artist);
        Ok(&*member)
    }
}
