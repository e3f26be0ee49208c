//! # Releasio Common Library
//!
//! Shared state and access-control core of the Releasio dashboard:
//! - Persistent, migrated, cross-context key-value store
//! - Registry of the dashboard's named cells
//! - Permission catalog, role presets, team members and the authorization gate
//! - Artist (tenant) scoping of records
//! - Gated view navigation and dashboard actions
//! - Event bus, configuration loading and SQLite setup

pub mod access;
pub mod actions;
pub mod cells;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod navigation;
pub mod store;
pub mod tenancy;

pub use error::{Error, Result};
pub use navigation::{NavigationOutcome, Navigator};
pub use store::{PersistentCell, Store};
