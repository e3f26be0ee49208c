//! Cross-context change propagation
//!
//! A store publishes every local write and clear to its broadcaster and
//! applies events published by sibling stores. The in-process hub is the
//! [`EventBus`]; browser tabs receive the same events over SSE.

use crate::events::{DashboardEvent, EventBus};
use tokio::sync::broadcast;
use tracing::debug;

pub trait CrossContextBroadcaster: Send + Sync {
    /// Deliver an event to sibling contexts; never fails
    fn publish(&self, event: DashboardEvent);

    /// Receive events from sibling contexts
    ///
    /// `None` means the transport is unavailable and the store runs
    /// local-only.
    fn subscribe(&self) -> Option<broadcast::Receiver<DashboardEvent>>;
}

impl CrossContextBroadcaster for EventBus {
    fn publish(&self, event: DashboardEvent) {
        self.emit_lossy(event);
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<DashboardEvent>> {
        Some(EventBus::subscribe(self))
    }
}

/// Transport for a store with no siblings (CLI tools, tests, restricted
/// environments)
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl CrossContextBroadcaster for Detached {
    fn publish(&self, event: DashboardEvent) {
        debug!("Detached store: dropping {} event", event.event_type());
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<DashboardEvent>> {
        None
    }
}
