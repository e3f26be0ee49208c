//! Event types for the Releasio event system
//!
//! Provides the shared event definitions and the EventBus used both as the
//! in-process cross-context hub for the store and as the source of the
//! dashboard's SSE stream.

use crate::access::MemberId;
use crate::tenancy::ArtistId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Identity of one execution context (one open tab, one process) sharing a
/// durable store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(Uuid);

impl ContextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dashboard event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DashboardEvent {
    /// A cell was written by some context
    ///
    /// Triggers:
    /// - Sibling stores: replace their in-memory value, notify subscribers
    /// - SSE: push the new value to open browser tabs
    CellChanged {
        /// Store key of the cell
        key: String,
        /// Canonical serialized value (already migrated)
        value: String,
        /// Context that performed the write
        origin: ContextId,
        timestamp: DateTime<Utc>,
    },

    /// A cell was cleared and falls back to its default
    CellCleared {
        key: String,
        origin: ContextId,
        timestamp: DateTime<Utc>,
    },

    /// The authorization gate refused a navigation or action
    ///
    /// Triggers:
    /// - SSE: show the "Access Denied" notice in the acting tab
    AccessDenied {
        member_id: MemberId,
        /// Permission or view identifier that was requested
        capability: String,
        artist_id: Option<ArtistId>,
        timestamp: DateTime<Utc>,
    },
}

impl DashboardEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::CellChanged { .. } => "CellChanged",
            DashboardEvent::CellCleared { .. } => "CellCleared",
            DashboardEvent::AccessDenied { .. } => "AccessDenied",
        }
    }

    /// Store key the event refers to, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            DashboardEvent::CellChanged { key, .. } | DashboardEvent::CellCleared { key, .. } => {
                Some(key)
            }
            DashboardEvent::AccessDenied { .. } => None,
        }
    }

    /// Context that produced the event, if it came from a store
    pub fn origin(&self) -> Option<ContextId> {
        match self {
            DashboardEvent::CellChanged { origin, .. }
            | DashboardEvent::CellCleared { origin, .. } => Some(*origin),
            DashboardEvent::AccessDenied { .. } => None,
        }
    }
}

/// Central event distribution
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged subscribers lose the oldest events, never block writers
///
/// # Examples
///
/// ```
/// use releasio_common::events::{ContextId, DashboardEvent, EventBus};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(DashboardEvent::CellCleared {
///     key: "releasio-view".to_string(),
///     origin: ContextId::new(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert_eq!(rx.try_recv().unwrap().event_type(), "CellCleared");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DashboardEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: DashboardEvent,
    ) -> Result<usize, broadcast::error::SendError<DashboardEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: DashboardEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
