//! HTTP API handlers for releasio-ui

pub mod activity;
pub mod artists;
pub mod buildinfo;
pub mod cells;
pub mod health;
pub mod member;
pub mod navigate;
pub mod plan;
pub mod sse;
pub mod team;

pub use activity::activity;
pub use artists::{add_artist, add_release, list_artists, list_releases};
pub use buildinfo::get_build_info;
pub use cells::{clear_cell, get_cell, put_cell};
pub use health::health_routes;
pub use member::{member_middleware, permission_catalog, register, sign_in, whoami, Acting};
pub use navigate::{navigate, open_release, select_artist};
pub use plan::current_plan;
pub use sse::event_stream;
pub use team::{change_role, invite, list_team, remove, toggle_artist, toggle_permission};
