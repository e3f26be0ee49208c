//! Authorization gate
//!
//! Pure decision functions. Callers check before they act: a denied check
//! must leave every piece of state untouched.

use super::catalog::Permission;
use super::member::TeamMember;
use super::views::{ViewId, ViewRequirement};
use super::{AccessDenied, DenialReason};
use crate::tenancy::ArtistId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something a member may be allowed to do or see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Capability {
    Permission(Permission),
    View(ViewId),
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Permission(p) => p.as_str(),
            Capability::View(v) => v.as_str(),
        }
    }
}

impl From<Permission> for Capability {
    fn from(p: Permission) -> Self {
        Capability::Permission(p)
    }
}

impl From<ViewId> for Capability {
    fn from(v: ViewId) -> Self {
        Capability::View(v)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check(
    member: &TeamMember,
    capability: Capability,
    tenant: Option<ArtistId>,
) -> Result<(), DenialReason> {
    // Admin holds every permission and every tenant, whatever its stored sets say
    let admin = member.role.is_admin();
    let holds = |p: &Permission| admin || member.permissions.contains(p);

    match capability {
        Capability::Permission(p) => {
            if !holds(&p) {
                return Err(DenialReason::MissingPermission);
            }
        }
        Capability::View(view) => match view.requirement() {
            ViewRequirement::Open => {}
            ViewRequirement::AdminRole => {
                if !admin {
                    return Err(DenialReason::AdminOnly);
                }
            }
            ViewRequirement::Permissions(required) => {
                if !required.iter().all(holds) {
                    return Err(DenialReason::MissingPermission);
                }
            }
        },
    }

    if let Some(artist) = tenant {
        if !admin && !member.artist_ids.contains(&artist) {
            return Err(DenialReason::ArtistNotAssigned);
        }
    }

    Ok(())
}

/// Whether `member` may use `capability`, optionally on behalf of `tenant`
pub fn can_access(
    member: &TeamMember,
    capability: impl Into<Capability>,
    tenant: Option<ArtistId>,
) -> bool {
    check(member, capability.into(), tenant).is_ok()
}

/// Like [`can_access`], but explains a refusal
pub fn authorize(
    member: &TeamMember,
    capability: impl Into<Capability>,
    tenant: Option<ArtistId>,
) -> Result<(), AccessDenied> {
    let capability = capability.into();
    check(member, capability, tenant).map_err(|reason| AccessDenied {
        member_id: member.id,
        capability: capability.as_str().to_string(),
        artist_id: tenant,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::catalog::all_permissions;
    use crate::access::roles::{preset_for, Role};
    use crate::access::MemberId;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn member(role: Role, artists: &[i64]) -> TeamMember {
        TeamMember::new(MemberId(1), "Sam Rivera", "sam@label.test", role)
            .with_artists(artists.iter().copied().map(ArtistId))
    }

    #[test]
    fn test_finance_member_gets_preset_and_no_settings() {
        let finance = member(Role::Finance, &[1]);
        assert_eq!(finance.permissions, preset_for(Role::Finance));
        assert!(can_access(&finance, Permission::ReportingSuite, None));
        assert!(!can_access(&finance, Permission::Settings, None));
    }

    #[test]
    fn test_empty_tenant_scope_denies_even_with_permission() {
        let manager = member(Role::Manager, &[]);
        assert!(manager.permissions.contains(&Permission::Releases));
        assert!(!can_access(&manager, Permission::Releases, Some(ArtistId(42))));

        let denial = authorize(&manager, Permission::Releases, Some(ArtistId(42))).unwrap_err();
        assert_eq!(denial.reason, DenialReason::ArtistNotAssigned);
        assert_eq!(denial.capability, "releases");
    }

    #[test]
    fn test_admin_has_every_permission_even_if_stored_set_is_stale() {
        let mut admin = member(Role::Admin, &[]);
        admin.permissions = BTreeSet::new();

        for permission in all_permissions() {
            assert!(can_access(&admin, permission, None), "{}", permission);
            assert!(can_access(&admin, permission, Some(ArtistId(99))));
        }
        for view in ViewId::ALL {
            assert!(can_access(&admin, *view, None), "{}", view);
        }
    }

    #[test]
    fn test_admin_console_needs_role_not_permissions() {
        let mut manager = member(Role::Manager, &[1]);
        manager.permissions = all_permissions();
        let denial = authorize(&manager, ViewId::Admin, None).unwrap_err();
        assert_eq!(denial.reason, DenialReason::AdminOnly);
        assert!(denial.to_string().starts_with("Access Denied"));
    }

    #[test]
    fn test_view_maps_to_permissions() {
        let publicist = member(Role::Publicist, &[1]);
        assert!(can_access(&publicist, ViewId::EpkBuilder, Some(ArtistId(1))));
        assert!(can_access(&publicist, ViewId::ReleaseDetails, None));
        assert!(!can_access(&publicist, ViewId::Analytics, None));
        assert!(can_access(&publicist, ViewId::Help, None));
    }

    #[test]
    fn test_toggled_permission_takes_effect() {
        let mut finance = member(Role::Finance, &[1]);
        finance.toggle_permission(Permission::Settings);
        assert!(can_access(&finance, Permission::Settings, None));
        finance.toggle_permission(Permission::Settings);
        assert!(!can_access(&finance, Permission::Settings, None));
    }

    fn any_permission() -> impl Strategy<Value = Permission> {
        let all: Vec<Permission> = all_permissions().into_iter().collect();
        proptest::sample::select(all)
    }

    fn any_non_admin_role() -> impl Strategy<Value = Role> {
        proptest::sample::select(
            Role::ALL
                .into_iter()
                .filter(|r| !r.is_admin())
                .collect::<Vec<_>>(),
        )
    }

    proptest! {
        #[test]
        fn prop_non_admin_scoped_to_assigned_artist(
            role in any_non_admin_role(),
            permission in any_permission(),
            assigned in any::<i64>(),
            other in any::<i64>(),
        ) {
            prop_assume!(assigned != other);
            let mut m = member(role, &[assigned]);
            m.permissions = all_permissions();
            prop_assert!(!can_access(&m, permission, Some(ArtistId(other))));
            prop_assert!(can_access(&m, permission, Some(ArtistId(assigned))));
        }

        #[test]
        fn prop_role_change_resets_to_preset(
            from in proptest::sample::select(Role::ALL.to_vec()),
            to in proptest::sample::select(Role::ALL.to_vec()),
            toggles in proptest::collection::vec(any_permission(), 0..10),
        ) {
            let mut m = member(from, &[1]);
            for p in toggles {
                m.toggle_permission(p);
            }
            m.change_role(to);
            prop_assert_eq!(&m.permissions, &preset_for(to));
            prop_assert_eq!(m.role, to);
        }
    }
}
