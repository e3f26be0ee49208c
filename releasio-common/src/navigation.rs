//! View transitions
//!
//! Every change of the current view is decided here, whether it comes from
//! [`Navigator::navigate`] or a direct write of the `view` cell: the gate is
//! checked first, then the entity a detail view depends on, and
//! only then is the `view` cell written. A refusal changes nothing and is
//! published on the event bus so the acting tab can show the notice.

use crate::access::{authorize, AccessDenied, TeamMember, ViewId, ViewRequirement};
use crate::cells;
use crate::events::{DashboardEvent, EventBus};
use crate::store::Store;
use crate::tenancy::{resolve_selected_artist_for, Artist, ArtistId, ArtistSelection};
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Where a navigation ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Shown { view: ViewId },
    /// The requested detail view referenced a missing entity
    Redirected { requested: ViewId, view: ViewId },
}

impl NavigationOutcome {
    pub fn view(self) -> ViewId {
        match self {
            NavigationOutcome::Shown { view } | NavigationOutcome::Redirected { view, .. } => view,
        }
    }
}

/// The artist a member's views are scoped to, resolved without writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tenant {
    artist: Option<ArtistId>,
    /// The stored selection is missing or dangling and should become `artist`
    stale: bool,
}

fn resolve_tenant(store: &Store, member: &TeamMember) -> Tenant {
    let artists = cells::artists(store).get();
    let selected = cells::selected_artist_id(store).get();
    match resolve_selected_artist_for(&artists, selected, member) {
        ArtistSelection::Current(artist) => Tenant {
            artist: Some(artist.id),
            stale: false,
        },
        ArtistSelection::Replaced(artist) => Tenant {
            artist: Some(artist.id),
            stale: true,
        },
        ArtistSelection::Empty => Tenant {
            artist: None,
            stale: false,
        },
    }
}

fn gate_view(
    member: &TeamMember,
    view: ViewId,
    artist: Option<ArtistId>,
) -> std::result::Result<(), AccessDenied> {
    let tenant = match view.requirement() {
        ViewRequirement::Permissions(_) => artist,
        ViewRequirement::Open | ViewRequirement::AdminRole => None,
    };
    authorize(member, view, tenant)
}

/// Whether the entity `view` displays is there for `artist`
///
/// `release` stands in for the stored release selection when given.
fn detail_target_exists(
    store: &Store,
    view: ViewId,
    artist: Option<ArtistId>,
    release: Option<i64>,
) -> bool {
    match view {
        ViewId::ReleaseDetails => {
            let Some(release_id) = release.or_else(|| cells::view_release_id(store).get()) else {
                return false;
            };
            cells::releases(store)
                .get()
                .iter()
                .any(|r| r.id == release_id && Some(r.artist_id) == artist)
        }
        // Other detail views keep their selection in the page itself
        _ => true,
    }
}

/// Decide where a navigation to `view` lands; writes nothing
fn plan(
    store: &Store,
    member: &TeamMember,
    view: ViewId,
    artist: Option<ArtistId>,
    release: Option<i64>,
) -> std::result::Result<NavigationOutcome, AccessDenied> {
    gate_view(member, view, artist)?;

    match view.detail_parent() {
        Some(parent) if !detail_target_exists(store, view, artist, release) => {
            gate_view(member, parent, artist)?;
            Ok(NavigationOutcome::Redirected {
                requested: view,
                view: parent,
            })
        }
        _ => Ok(NavigationOutcome::Shown { view }),
    }
}

/// Where a direct write of `view` by `member` may land, if anywhere
///
/// Applies the same gate and detail checks as [`Navigator::navigate`].
pub(crate) fn plan_view_write(
    store: &Store,
    member: &TeamMember,
    view: ViewId,
) -> std::result::Result<NavigationOutcome, AccessDenied> {
    let tenant = resolve_tenant(store, member);
    plan(store, member, view, tenant.artist, None)
}

#[derive(Clone)]
pub struct Navigator {
    store: Store,
    events: EventBus,
}

impl Navigator {
    pub fn new(store: Store, events: EventBus) -> Self {
        Self { store, events }
    }

    /// The artist `member`'s views are scoped to
    ///
    /// A selection that is missing or points at a deleted artist is replaced
    /// by the first active artist the member is assigned to (any active
    /// artist for admins), and the stored selection rewritten.
    pub fn current_artist(&self, member: &TeamMember) -> Option<Artist> {
        let tenant = resolve_tenant(&self.store, member);
        self.persist_tenant(tenant);
        let id = tenant.artist?;
        cells::artists(&self.store).get().into_iter().find(|a| a.id == id)
    }

    /// Make `artist` the current tenant, if `member` is assigned to it
    pub fn select_artist(&self, member: &TeamMember, artist: ArtistId) -> Result<()> {
        let artists = cells::artists(&self.store).get();
        if !artists.iter().any(|a| a.id == artist) {
            return Err(Error::NotFound(format!("artist {}", artist)));
        }

        let view = cells::view(&self.store).get();
        gate_view(member, view, Some(artist)).map_err(|denied| self.deny(denied))?;
        cells::selected_artist_id(&self.store).set(&Some(artist))
    }

    /// Switch the current view
    ///
    /// Nothing is written unless the gate lets the member through.
    pub fn navigate(&self, member: &TeamMember, view: ViewId) -> Result<NavigationOutcome> {
        let tenant = resolve_tenant(&self.store, member);
        let outcome = plan(&self.store, member, view, tenant.artist, None)
            .map_err(|denied| self.deny(denied))?;

        self.persist_tenant(tenant);
        self.show(member, outcome)
    }

    /// Select a release and show its details
    ///
    /// A release that is missing or belongs to another artist leaves the
    /// stored release selection alone and lands on the releases list.
    pub fn open_release(&self, member: &TeamMember, release_id: i64) -> Result<NavigationOutcome> {
        let tenant = resolve_tenant(&self.store, member);
        let outcome = plan(
            &self.store,
            member,
            ViewId::ReleaseDetails,
            tenant.artist,
            Some(release_id),
        )
        .map_err(|denied| self.deny(denied))?;

        self.persist_tenant(tenant);
        if let NavigationOutcome::Shown { .. } = outcome {
            cells::view_release_id(&self.store).set(&Some(release_id))?;
        }
        self.show(member, outcome)
    }

    fn show(&self, member: &TeamMember, outcome: NavigationOutcome) -> Result<NavigationOutcome> {
        if let NavigationOutcome::Redirected { requested, view } = outcome {
            info!("{} has nothing to show; redirecting to {}", requested, view);
        }
        cells::view(&self.store).set(&outcome.view())?;
        debug!(member = %member.id, "Navigated to {}", outcome.view());
        Ok(outcome)
    }

    fn persist_tenant(&self, tenant: Tenant) {
        let Some(artist) = tenant.artist.filter(|_| tenant.stale) else {
            return;
        };
        info!("Artist selection is stale; switching to {}", artist);
        if let Err(e) = cells::selected_artist_id(&self.store).set(&Some(artist)) {
            warn!("Failed to rewrite artist selection: {}", e);
        }
    }

    /// Publish a refusal and turn it into the error callers see
    fn deny(&self, denied: AccessDenied) -> Error {
        info!(member = %denied.member_id, "{}", denied);
        self.events.emit_lossy(DashboardEvent::AccessDenied {
            member_id: denied.member_id,
            capability: denied.capability.clone(),
            artist_id: denied.artist_id,
            timestamp: Utc::now(),
        });
        Error::AccessDenied(denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{MemberId, Role};
    use crate::cells::standard_registry;
    use crate::tenancy::{Release, ReleaseType};
    use chrono::NaiveDate;

    async fn setup() -> (Navigator, Store, EventBus) {
        let store = Store::open_local(standard_registry().unwrap()).await.unwrap();
        let bus = EventBus::new(16);
        let mut archived = Artist::new(ArtistId(1), "Old Band");
        archived.is_archived = true;
        cells::artists(&store)
            .set(&vec![
                archived,
                Artist::new(ArtistId(2), "Nova"),
                Artist::new(ArtistId(3), "Echo"),
            ])
            .unwrap();
        cells::releases(&store)
            .set(&vec![Release {
                id: 10,
                artist_id: ArtistId(2),
                title: "Night Drive".to_string(),
                release_type: ReleaseType::Single,
                release_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                cover_art_url: String::new(),
                genre: "Synthpop".to_string(),
                is_favorite: false,
            }])
            .unwrap();
        (Navigator::new(store.clone(), bus.clone()), store, bus)
    }

    fn marketer() -> TeamMember {
        TeamMember::new(MemberId(2), "Mo", "mo@label.test", Role::Marketing)
            .with_artists([ArtistId(2)])
    }

    #[tokio::test]
    async fn test_stale_selection_falls_back_and_is_rewritten() {
        let (nav, store, _) = setup().await;
        cells::selected_artist_id(&store).set(&Some(ArtistId(99))).unwrap();
        let admin = TeamMember::new(MemberId(1), "Ada", "ada@label.test", Role::Admin);

        assert_eq!(nav.current_artist(&admin).map(|a| a.id), Some(ArtistId(2)));
        assert_eq!(cells::selected_artist_id(&store).get(), Some(ArtistId(2)));
    }

    #[tokio::test]
    async fn test_stale_selection_prefers_an_assigned_artist() {
        let (nav, store, _) = setup().await;
        let member = TeamMember::new(MemberId(4), "Pat", "pat@label.test", Role::Marketing)
            .with_artists([ArtistId(3)]);

        nav.navigate(&member, ViewId::Releases).unwrap();
        assert_eq!(cells::selected_artist_id(&store).get(), Some(ArtistId(3)));
    }

    #[tokio::test]
    async fn test_denied_navigation_changes_no_cell() {
        let (nav, store, _) = setup().await;
        cells::selected_artist_id(&store).set(&Some(ArtistId(99))).unwrap();
        cells::view_release_id(&store).set(&Some(10)).unwrap();
        let finance = TeamMember::new(MemberId(3), "Fin", "fin@label.test", Role::Finance)
            .with_artists([ArtistId(2)]);

        let keys = [cells::SELECTED_ARTIST_ID, cells::VIEW, cells::VIEW_RELEASE_ID];
        let before: Vec<_> = keys.iter().map(|k| store.read_value(k)).collect();

        assert!(nav.navigate(&finance, ViewId::Admin).is_err());
        assert!(nav.navigate(&finance, ViewId::TeamManagement).is_err());
        assert!(nav.open_release(&finance, 10).is_err());

        let after: Vec<_> = keys.iter().map(|k| store.read_value(k)).collect();
        assert_eq!(before, after);
        assert_eq!(cells::selected_artist_id(&store).get(), Some(ArtistId(99)));
    }

    #[tokio::test]
    async fn test_missing_release_keeps_previous_selection() {
        let (nav, store, _) = setup().await;
        let member = marketer();
        nav.select_artist(&member, ArtistId(2)).unwrap();
        nav.open_release(&member, 10).unwrap();

        assert_eq!(
            nav.open_release(&member, 77).unwrap(),
            NavigationOutcome::Redirected {
                requested: ViewId::ReleaseDetails,
                view: ViewId::Releases,
            }
        );
        assert_eq!(cells::view_release_id(&store).get(), Some(10));
    }

    #[tokio::test]
    async fn test_denied_navigation_leaves_view_and_publishes() {
        let (nav, store, bus) = setup().await;
        let mut rx = bus.subscribe();
        let finance = TeamMember::new(MemberId(3), "Fin", "fin@label.test", Role::Finance)
            .with_artists([ArtistId(2)]);

        let err = nav.navigate(&finance, ViewId::Admin).unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
        assert_eq!(cells::view(&store).get(), ViewId::Dashboard);

        match rx.try_recv().unwrap() {
            DashboardEvent::AccessDenied { member_id, capability, .. } => {
                assert_eq!(member_id, MemberId(3));
                assert_eq!(capability, "admin");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unassigned_artist_blocks_scoped_views() {
        let (nav, store, _) = setup().await;
        cells::selected_artist_id(&store).set(&Some(ArtistId(3))).unwrap();

        assert!(nav.navigate(&marketer(), ViewId::Releases).is_err());
        assert!(nav.select_artist(&marketer(), ArtistId(3)).is_err());

        nav.select_artist(&marketer(), ArtistId(2)).unwrap();
        assert_eq!(
            nav.navigate(&marketer(), ViewId::Releases).unwrap(),
            NavigationOutcome::Shown { view: ViewId::Releases }
        );
    }

    #[tokio::test]
    async fn test_release_details_fail_closed() {
        let (nav, store, _) = setup().await;
        let member = marketer();
        nav.select_artist(&member, ArtistId(2)).unwrap();

        assert_eq!(
            nav.open_release(&member, 10).unwrap(),
            NavigationOutcome::Shown { view: ViewId::ReleaseDetails }
        );

        cells::releases(&store).set(&Vec::new()).unwrap();
        assert_eq!(
            nav.navigate(&member, ViewId::ReleaseDetails).unwrap(),
            NavigationOutcome::Redirected {
                requested: ViewId::ReleaseDetails,
                view: ViewId::Releases,
            }
        );
        assert_eq!(cells::view(&store).get(), ViewId::Releases);
    }

    #[tokio::test]
    async fn test_admin_reaches_console_without_assignments() {
        let (nav, store, _) = setup().await;
        let admin = TeamMember::new(MemberId(1), "Ada", "ada@label.test", Role::Admin);
        assert_eq!(nav.navigate(&admin, ViewId::Admin).unwrap().view(), ViewId::Admin);
        assert_eq!(cells::view(&store).get(), ViewId::Admin);
    }
}
