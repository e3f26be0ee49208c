//! The dashboard's named cells
//!
//! Each persisted cell is declared here once: its key, the shape stored
//! values are migrated to, its default, any older keys it replaced, and the
//! permission needed to overwrite it wholesale.

use crate::access::catalog::permission_ids;
use crate::access::views::view_ids;
use crate::access::{authorize, Capability, Permission, PlanName, Role, TeamMember, ViewId};
use crate::navigation::plan_view_write;
use crate::store::{CellRegistry, CellSpec, Field, PersistentCell, Shape, Store};
use crate::tenancy::{
    ActivityLogEntry, Artist, ArtistId, OutreachCampaign, PlatformConnections, Release,
    SocialPost, PLATFORMS,
};
use crate::{Error, Result};
use serde_json::{json, Value};

pub const CURRENT_USER: &str = "releasio-current-user";
pub const TEAM_MEMBERS: &str = "releasio-team-members";
pub const PLAN: &str = "releasio-plan";
pub const VIEW: &str = "releasio-view";
pub const ARTISTS: &str = "releasio-artists";
pub const SELECTED_ARTIST_ID: &str = "releasio-selected-artist-id";
pub const RELEASES: &str = "releasio-releases";
pub const SOCIAL_POSTS: &str = "releasio-social-posts";
pub const CAMPAIGNS: &str = "releasio-campaigns";
pub const ACTIVITY_LOG: &str = "releasio-activity-log";
pub const VIEW_RELEASE_ID: &str = "releasio-view-release-id";
/// Connections new artists start with
pub const PLATFORM_CONNECTIONS: &str = "releasio-platform-connections";

const EPOCH: &str = "1970-01-01T00:00:00Z";

fn role_ids() -> Vec<&'static str> {
    Role::ALL.iter().map(|r| r.as_str()).collect()
}

fn member_shape() -> Shape {
    Shape::Record(vec![
        Field::required("id", Shape::Number, json!(0)),
        Field::required("name", Shape::Text, json!("")),
        Field::required("email", Shape::Text, json!("")),
        Field::required("role", Shape::OneOf(role_ids()), json!("Marketing")),
        Field::required("permissions", Shape::list(Shape::OneOf(permission_ids())), json!([])),
        Field::required("avatarUrl", Shape::Text, json!("")),
        Field::required("artistIds", Shape::list(Shape::Number), json!([])),
    ])
}

fn platform_shape() -> Shape {
    Shape::flags(&PLATFORMS)
}

fn no_platforms() -> Value {
    json!({"facebook": false, "instagram": false, "tiktok": false, "x": false, "youtube": false})
}

fn artist_shape() -> Shape {
    Shape::Record(vec![
        Field::required("id", Shape::Number, json!(0)),
        Field::required("name", Shape::Text, json!("")),
        Field::required("avatarUrl", Shape::Text, json!("")),
        Field::required("isArchived", Shape::Bool, json!(false)),
        Field::required("isSetupComplete", Shape::Bool, json!(true)),
        Field::optional("genre", Shape::Text),
        Field::required(
            "verificationStatus",
            Shape::OneOf(vec!["unverified", "pending", "verified"]),
            json!("unverified"),
        ),
        Field::required("platformConnections", platform_shape(), no_platforms()),
    ])
}

fn release_shape() -> Shape {
    Shape::Record(vec![
        Field::required("id", Shape::Number, json!(0)),
        Field::required("artistId", Shape::Number, json!(0)),
        Field::required("title", Shape::Text, json!("")),
        Field::required("type", Shape::OneOf(vec!["Single", "EP", "Album"]), json!("Single")),
        Field::required("releaseDate", Shape::Text, json!("1970-01-01")),
        Field::required("coverArtUrl", Shape::Text, json!("")),
        Field::required("genre", Shape::Text, json!("")),
        Field::required("isFavorite", Shape::Bool, json!(false)),
    ])
}

fn social_post_shape() -> Shape {
    Shape::Record(vec![
        Field::required("id", Shape::Number, json!(0)),
        Field::required("artistId", Shape::Number, json!(0)),
        Field::required("releaseId", Shape::Number, json!(0)),
        Field::required(
            "platform",
            Shape::OneOf(vec!["Instagram", "TikTok", "YouTube", "Facebook", "X"]),
            json!("Instagram"),
        ),
        Field::required("content", Shape::Text, json!("")),
        Field::required("scheduledTime", Shape::Text, json!(EPOCH)),
        Field::required(
            "status",
            Shape::OneOf(vec![
                "Draft",
                "Pending Approval",
                "Approved",
                "Posted",
                "Changes Requested",
                "Scheduled",
            ]),
            json!("Draft"),
        ),
    ])
}

fn campaign_shape() -> Shape {
    let contact = Shape::Record(vec![
        Field::required("id", Shape::Number, json!(0)),
        Field::required("name", Shape::Text, json!("")),
        Field::required("email", Shape::Text, json!("")),
        Field::optional("outlet", Shape::Text),
    ]);
    Shape::Record(vec![
        Field::required("id", Shape::Number, json!(0)),
        Field::required("artistId", Shape::Number, json!(0)),
        Field::required("releaseId", Shape::Number, json!(0)),
        Field::required("contacts", Shape::list(contact), json!([])),
    ])
}

fn activity_shape() -> Shape {
    Shape::Record(vec![
        Field::required("id", Shape::Number, json!(0)),
        Field::required("timestamp", Shape::Text, json!(EPOCH)),
        Field::required("teamMemberId", Shape::Number, json!(0)),
        Field::required("artistId", Shape::Number, json!(0)),
        Field::required("action", Shape::Text, json!("")),
        Field::optional("details", Shape::Text),
        Field::optional("referenceId", Shape::Number),
        Field::optional(
            "referenceType",
            Shape::OneOf(vec!["release", "task", "campaign"]),
        ),
    ])
}

/// Every cell the dashboard persists
pub fn standard_registry() -> Result<CellRegistry> {
    let mut registry = CellRegistry::new();

    registry.register(
        CellSpec::new(CURRENT_USER, Shape::nullable(member_shape()), Value::Null)
            .with_legacy_key("app-current-user"),
    )?;
    registry.register(
        CellSpec::new(TEAM_MEMBERS, Shape::list(member_shape()), json!([]))
            .with_legacy_key("app-team-members"),
    )?;
    registry.register(CellSpec::new(
        PLAN,
        Shape::OneOf(PlanName::ALL.iter().map(|p| p.as_str()).collect()),
        json!("Pro"),
    ))?;
    registry.register(CellSpec::new(VIEW, Shape::OneOf(view_ids()), json!("dashboard")))?;
    registry.register(CellSpec::new(ARTISTS, Shape::list(artist_shape()), json!([])))?;
    registry.register(
        CellSpec::new(SELECTED_ARTIST_ID, Shape::nullable(Shape::Number), Value::Null)
            .with_legacy_key("app-selected-artist-id"),
    )?;
    registry.register(CellSpec::new(RELEASES, Shape::list(release_shape()), json!([])))?;
    registry.register(CellSpec::new(
        SOCIAL_POSTS,
        Shape::list(social_post_shape()),
        json!([]),
    ))?;
    registry.register(CellSpec::new(CAMPAIGNS, Shape::list(campaign_shape()), json!([])))?;
    registry.register(CellSpec::new(
        ACTIVITY_LOG,
        Shape::list(activity_shape()),
        json!([]),
    ))?;
    registry.register(CellSpec::new(
        VIEW_RELEASE_ID,
        Shape::nullable(Shape::Number),
        Value::Null,
    ))?;
    registry.register(CellSpec::new(
        PLATFORM_CONNECTIONS,
        platform_shape(),
        no_platforms(),
    ))?;

    Ok(registry)
}

/// What a member needs to overwrite `key` directly
///
/// `None` means any member may write it. Unregistered keys are unrestricted.
pub fn write_capability(key: &str) -> Option<Capability> {
    let permission = match key {
        TEAM_MEMBERS | ACTIVITY_LOG => Permission::TeamManagement,
        PLAN | ARTISTS | PLATFORM_CONNECTIONS => Permission::Settings,
        RELEASES | VIEW_RELEASE_ID => Permission::Releases,
        SOCIAL_POSTS => Permission::PromoGenerator,
        CAMPAIGNS => Permission::Outreach,
        _ => return None,
    };
    Some(Capability::Permission(permission))
}

/// Cells holding records of several artists
///
/// Artists are keyed by their own `id`; every other record carries an
/// `artistId`.
const TENANT_COLLECTIONS: [&str; 5] = [ARTISTS, RELEASES, SOCIAL_POSTS, CAMPAIGNS, ACTIVITY_LOG];

pub fn is_tenant_collection(key: &str) -> bool {
    TENANT_COLLECTIONS.contains(&key)
}

fn record_artist(key: &str, item: &Value) -> Option<ArtistId> {
    let field = if key == ARTISTS { "id" } else { "artistId" };
    item.get(field).and_then(Value::as_i64).map(ArtistId)
}

fn may_see(member: &TeamMember, key: &str, item: &Value) -> bool {
    member.role.is_admin()
        || record_artist(key, item).is_some_and(|a| member.artist_ids.contains(&a))
}

/// `value` of `key` narrowed to what `member` may see
///
/// Tenant collections keep only the records of the member's artists; every
/// other value passes through.
pub fn narrow(member: &TeamMember, key: &str, value: Value) -> Value {
    match value {
        Value::Array(items) if is_tenant_collection(key) && !member.role.is_admin() => Value::Array(
            items
                .into_iter()
                .filter(|i| may_see(member, key, i))
                .collect(),
        ),
        value => value,
    }
}

/// Value of `key` as `member` may see it
pub fn read_as(store: &Store, member: &TeamMember, key: &str) -> Value {
    narrow(member, key, store.read_value(key))
}

/// Overwrite `key` on behalf of `member`
///
/// Checked before anything is written:
/// - the cell's write capability
/// - for a tenant collection, that every submitted record belongs to an
///   artist the member is assigned to; records the member cannot see are kept
/// - a selected artist must be one the member is assigned to
/// - the view goes through the same gate and detail checks as navigation
/// - a selected release must belong to an artist the member may see
/// - the current user can only be set to the member itself
pub fn write_as(store: &Store, member: &TeamMember, key: &str, value: Value) -> Result<()> {
    let capability = write_capability(key);
    if let Some(capability) = capability {
        authorize(member, capability, None)?;
    }

    match key {
        SELECTED_ARTIST_ID => {
            if let Some(id) = value.as_i64() {
                authorize(member, Permission::Dashboard, Some(ArtistId(id)))?;
            }
        }
        VIEW => {
            let view: ViewId = serde_json::from_value(value)
                .map_err(|_| Error::InvalidInput(format!("{} must name a known view", key)))?;
            let outcome = plan_view_write(store, member, view)?;
            return store.write(VIEW, &outcome.view());
        }
        VIEW_RELEASE_ID => {
            if let Some(id) = value.as_i64() {
                let release = releases(store)
                    .get()
                    .into_iter()
                    .find(|r| r.id == id)
                    .ok_or_else(|| Error::NotFound(format!("release {}", id)))?;
                authorize(member, Permission::Releases, Some(release.artist_id))?;
            }
        }
        CURRENT_USER => {
            if !value.is_null() && value.get("id").and_then(Value::as_i64) != Some(member.id.0) {
                return Err(Error::InvalidInput(
                    "the current user can only be set to yourself".to_string(),
                ));
            }
        }
        _ if is_tenant_collection(key) && !member.role.is_admin() => {
            let Value::Array(items) = value else {
                return Err(Error::InvalidInput(format!("{} must be a list", key)));
            };
            let capability = capability.unwrap_or(Capability::Permission(Permission::Dashboard));
            for item in &items {
                let artist = record_artist(key, item).ok_or_else(|| {
                    Error::InvalidInput(format!("every record in {} needs an artist", key))
                })?;
                authorize(member, capability, Some(artist))?;
            }

            store.update(key, Value::Array(Vec::new()), |current| {
                let hidden = match current {
                    Value::Array(current) => current,
                    _ => Vec::new(),
                };
                Value::Array(
                    hidden
                        .into_iter()
                        .filter(|i| !may_see(member, key, i))
                        .chain(items)
                        .collect(),
                )
            })?;
            return Ok(());
        }
        _ => {}
    }

    store.write_value(key, value)
}

pub fn current_user(store: &Store) -> PersistentCell<Option<TeamMember>> {
    store.cell(CURRENT_USER, None)
}

pub fn team_members(store: &Store) -> PersistentCell<Vec<TeamMember>> {
    store.cell(TEAM_MEMBERS, Vec::new())
}

pub fn plan(store: &Store) -> PersistentCell<PlanName> {
    store.cell(PLAN, PlanName::Pro)
}

pub fn view(store: &Store) -> PersistentCell<ViewId> {
    store.cell(VIEW, ViewId::Dashboard)
}

pub fn artists(store: &Store) -> PersistentCell<Vec<Artist>> {
    store.cell(ARTISTS, Vec::new())
}

pub fn selected_artist_id(store: &Store) -> PersistentCell<Option<ArtistId>> {
    store.cell(SELECTED_ARTIST_ID, None)
}

pub fn releases(store: &Store) -> PersistentCell<Vec<Release>> {
    store.cell(RELEASES, Vec::new())
}

pub fn social_posts(store: &Store) -> PersistentCell<Vec<SocialPost>> {
    store.cell(SOCIAL_POSTS, Vec::new())
}

pub fn campaigns(store: &Store) -> PersistentCell<Vec<OutreachCampaign>> {
    store.cell(CAMPAIGNS, Vec::new())
}

pub fn activity_log(store: &Store) -> PersistentCell<Vec<ActivityLogEntry>> {
    store.cell(ACTIVITY_LOG, Vec::new())
}

pub fn view_release_id(store: &Store) -> PersistentCell<Option<i64>> {
    store.cell(VIEW_RELEASE_ID, None)
}

pub fn platform_connections(store: &Store) -> PersistentCell<PlatformConnections> {
    store.cell(PLATFORM_CONNECTIONS, PlatformConnections::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::MemberId;
    use crate::store::{Detached, MemoryBackend};
    use crate::tenancy::{
        OutreachContact, ReferenceType, ReleaseType, SocialPlatform, SocialPostStatus,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::Arc;

    async fn store() -> Store {
        Store::open_local(standard_registry().unwrap()).await.unwrap()
    }

    #[test]
    fn test_registry_declares_every_cell() {
        let registry = standard_registry().unwrap();
        assert_eq!(registry.len(), 12);
        for key in registry.keys() {
            assert!(key.starts_with("releasio-"), "{}", key);
        }
    }

    #[tokio::test]
    async fn test_typed_values_survive_canonicalization() {
        let store = store().await;

        let member = TeamMember::new(MemberId(2), "Mo Ali", "mo@label.test", Role::Marketing)
            .with_artists([ArtistId(1)]);
        team_members(&store).set(&vec![member.clone()]).unwrap();
        current_user(&store).set(&Some(member.clone())).unwrap();

        let mut artist = Artist::new(ArtistId(1), "Nova");
        artist.genre = Some("Synthpop".to_string());
        artist.platform_connections.tiktok = true;
        artists(&store).set(&vec![artist.clone()]).unwrap();

        let release = Release {
            id: 10,
            artist_id: ArtistId(1),
            title: "Night Drive".to_string(),
            release_type: ReleaseType::Album,
            release_date: NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            cover_art_url: "https://cdn.test/cover.png".to_string(),
            genre: "Synthpop".to_string(),
            is_favorite: true,
        };
        releases(&store).set(&vec![release.clone()]).unwrap();

        let post = SocialPost {
            id: 1,
            artist_id: ArtistId(1),
            release_id: 10,
            platform: SocialPlatform::TikTok,
            content: "Out now".to_string(),
            scheduled_time: Utc.with_ymd_and_hms(2025, 2, 14, 9, 0, 0).unwrap(),
            status: SocialPostStatus::PendingApproval,
        };
        social_posts(&store).set(&vec![post.clone()]).unwrap();

        let campaign = OutreachCampaign {
            id: 3,
            artist_id: ArtistId(1),
            release_id: 10,
            contacts: vec![OutreachContact {
                id: 1,
                name: "Blog".to_string(),
                email: "tips@blog.test".to_string(),
                outlet: Some("Blog Weekly".to_string()),
            }],
        };
        campaigns(&store).set(&vec![campaign.clone()]).unwrap();

        let entry = ActivityLogEntry {
            id: 5,
            timestamp: Utc.with_ymd_and_hms(2025, 2, 1, 12, 30, 0).unwrap(),
            team_member_id: MemberId(2),
            artist_id: ArtistId(1),
            action: "added release".to_string(),
            details: None,
            reference_id: Some(10),
            reference_type: Some(ReferenceType::Release),
        };
        activity_log(&store).set(&vec![entry.clone()]).unwrap();

        plan(&store).set(&PlanName::Agency).unwrap();
        view(&store).set(&ViewId::ReleaseDetails).unwrap();
        selected_artist_id(&store).set(&Some(ArtistId(1))).unwrap();
        view_release_id(&store).set(&Some(10)).unwrap();

        assert_eq!(team_members(&store).get(), vec![member.clone()]);
        assert_eq!(current_user(&store).get(), Some(member));
        assert_eq!(artists(&store).get(), vec![artist]);
        assert_eq!(releases(&store).get(), vec![release]);
        assert_eq!(social_posts(&store).get(), vec![post]);
        assert_eq!(campaigns(&store).get(), vec![campaign]);
        assert_eq!(activity_log(&store).get(), vec![entry]);
        assert_eq!(plan(&store).get(), PlanName::Agency);
        assert_eq!(view(&store).get(), ViewId::ReleaseDetails);
        assert_eq!(selected_artist_id(&store).get(), Some(ArtistId(1)));
        assert_eq!(view_release_id(&store).get(), Some(10));
    }

    #[tokio::test]
    async fn test_stored_artist_connections_pruned_on_load() {
        let backend = Arc::new(MemoryBackend::with_cells([(
            ARTISTS,
            r#"[{"id":1,"name":"Nova","avatarUrl":"a.png","verificationStatus":"verified",
                "platformConnections":{"facebook":true,"myspace":true}}]"#,
        )]));
        let store = Store::open(backend, Arc::new(Detached), standard_registry().unwrap())
            .await
            .unwrap();

        let loaded = artists(&store).get();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].platform_connections.facebook);
        assert!(!loaded[0].platform_connections.youtube);
        assert!(!store.read_value(ARTISTS).to_string().contains("myspace"));
    }

    #[tokio::test]
    async fn test_unknown_permissions_pruned_from_team() {
        let backend = Arc::new(MemoryBackend::with_cells([(
            "app-team-members",
            r#"[{"id":1,"name":"Ada","email":"ada@label.test","role":"Finance",
                "permissions":["analytics","legacy-export"],"avatarUrl":"","artistIds":[1]}]"#,
        )]));
        let store = Store::open(backend, Arc::new(Detached), standard_registry().unwrap())
            .await
            .unwrap();

        let team = team_members(&store).get();
        assert_eq!(team.len(), 1);
        assert_eq!(
            team[0].permissions.iter().copied().collect::<Vec<_>>(),
            vec![Permission::Analytics]
        );
    }

    #[tokio::test]
    async fn test_unknown_view_falls_back_to_dashboard() {
        let backend = Arc::new(MemoryBackend::with_cells([(VIEW, r#""myspace-feed""#)]));
        let store = Store::open(backend, Arc::new(Detached), standard_registry().unwrap())
            .await
            .unwrap();
        assert_eq!(view(&store).get(), ViewId::Dashboard);
    }

    #[tokio::test]
    async fn test_tenant_collections_narrowed_for_members() {
        let store = store().await;
        store
            .write_value(
                RELEASES,
                json!([
                    {"id": 1, "artistId": 1, "title": "Mine", "type": "Single", "releaseDate": "2025-01-01"},
                    {"id": 2, "artistId": 2, "title": "Theirs", "type": "EP", "releaseDate": "2025-02-01"}
                ]),
            )
            .unwrap();

        let member = TeamMember::new(MemberId(2), "Mo", "mo@label.test", Role::Marketing)
            .with_artists([ArtistId(1)]);
        let admin = TeamMember::new(MemberId(1), "Ada", "ada@label.test", Role::Admin);

        let visible = read_as(&store, &member, RELEASES);
        assert_eq!(visible.as_array().map(Vec::len), Some(1));
        assert_eq!(visible[0]["title"], json!("Mine"));
        assert_eq!(read_as(&store, &admin, RELEASES).as_array().map(Vec::len), Some(2));

        // rewriting its own slice keeps the other artist's records
        write_as(
            &store,
            &member,
            RELEASES,
            json!([{"id": 3, "artistId": 1, "title": "New", "type": "Album", "releaseDate": "2025-03-01"}]),
        )
        .unwrap();
        let all = releases(&store).get();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3]);

        let err = write_as(
            &store,
            &member,
            RELEASES,
            json!([{"id": 4, "artistId": 2, "title": "Sneaky", "type": "Single", "releaseDate": "2025-04-01"}]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
        assert_eq!(releases(&store).get().len(), 2);
    }

    #[tokio::test]
    async fn test_write_as_checks_selection_and_current_user() {
        let store = store().await;
        let member = TeamMember::new(MemberId(2), "Mo", "mo@label.test", Role::Marketing)
            .with_artists([ArtistId(1)]);

        write_as(&store, &member, SELECTED_ARTIST_ID, json!(1)).unwrap();
        assert!(write_as(&store, &member, SELECTED_ARTIST_ID, json!(2)).is_err());
        assert_eq!(selected_artist_id(&store).get(), Some(ArtistId(1)));

        let someone_else = serde_json::to_value(TeamMember::new(
            MemberId(9),
            "Eve",
            "eve@label.test",
            Role::Admin,
        ))
        .unwrap();
        assert!(matches!(
            write_as(&store, &member, CURRENT_USER, someone_else),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            write_as(&store, &member, PLAN, json!("Agency")),
            Err(Error::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_direct_view_write_goes_through_the_gate() {
        let store = store().await;
        artists(&store)
            .set(&vec![Artist::new(ArtistId(1), "Nova")])
            .unwrap();
        let finance = TeamMember::new(MemberId(3), "Fin", "fin@label.test", Role::Finance)
            .with_artists([ArtistId(1)]);

        for refused in ["admin", "team-management", "releases"] {
            assert!(matches!(
                write_as(&store, &finance, VIEW, json!(refused)),
                Err(Error::AccessDenied(_))
            ));
            assert_eq!(view(&store).get(), ViewId::Dashboard);
        }
        assert!(matches!(
            write_as(&store, &finance, VIEW, json!("myspace-feed")),
            Err(Error::InvalidInput(_))
        ));

        write_as(&store, &finance, VIEW, json!("analytics")).unwrap();
        assert_eq!(view(&store).get(), ViewId::Analytics);

        // a detail view with nothing to show lands on its list view
        let marketer = TeamMember::new(MemberId(2), "Mo", "mo@label.test", Role::Marketing)
            .with_artists([ArtistId(1)]);
        write_as(&store, &marketer, VIEW, json!("release-details")).unwrap();
        assert_eq!(view(&store).get(), ViewId::Releases);
    }

    #[tokio::test]
    async fn test_release_selection_checks_the_release_artist() {
        let store = store().await;
        store
            .write_value(
                RELEASES,
                json!([
                    {"id": 1, "artistId": 1, "title": "Mine", "type": "Single", "releaseDate": "2025-01-01"},
                    {"id": 2, "artistId": 2, "title": "Theirs", "type": "EP", "releaseDate": "2025-02-01"}
                ]),
            )
            .unwrap();
        let member = TeamMember::new(MemberId(2), "Mo", "mo@label.test", Role::Marketing)
            .with_artists([ArtistId(1)]);

        write_as(&store, &member, VIEW_RELEASE_ID, json!(1)).unwrap();
        assert!(matches!(
            write_as(&store, &member, VIEW_RELEASE_ID, json!(2)),
            Err(Error::AccessDenied(_))
        ));
        assert!(matches!(
            write_as(&store, &member, VIEW_RELEASE_ID, json!(99)),
            Err(Error::NotFound(_))
        ));
        assert_eq!(view_release_id(&store).get(), Some(1));
    }

    #[tokio::test]
    async fn test_artists_narrowed_and_merged_for_members() {
        let store = store().await;
        artists(&store)
            .set(&vec![
                Artist::new(ArtistId(1), "Mine"),
                Artist::new(ArtistId(2), "Theirs"),
            ])
            .unwrap();
        let mut member = TeamMember::new(MemberId(2), "Mo", "mo@label.test", Role::Manager)
            .with_artists([ArtistId(1)]);
        member.permissions.insert(Permission::Settings);

        let visible = read_as(&store, &member, ARTISTS);
        assert_eq!(visible.as_array().map(Vec::len), Some(1));
        assert_eq!(visible[0]["name"], json!("Mine"));

        let mut renamed = Artist::new(ArtistId(1), "Mine (Deluxe)");
        renamed.genre = Some("Pop".to_string());
        write_as(&store, &member, ARTISTS, json!([renamed])).unwrap();
        let names: Vec<_> = artists(&store).get().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Theirs", "Mine (Deluxe)"]);

        let err = write_as(
            &store,
            &member,
            ARTISTS,
            json!([Artist::new(ArtistId(2), "Taken over")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
        assert_eq!(artists(&store).get().len(), 2);
    }

    #[test]
    fn test_write_capabilities() {
        assert_eq!(
            write_capability(TEAM_MEMBERS),
            Some(Capability::Permission(Permission::TeamManagement))
        );
        assert_eq!(write_capability(VIEW), None);
        assert_eq!(write_capability("releasio-prefs"), None);
    }
}
