//! Server-Sent Events stream of dashboard events
//!
//! This is how browser tabs learn about cell changes made in other tabs, and
//! about access denials they should show a notice for. Each tab only sees
//! what its member could read through `GET /api/cells/:key`.

use super::Acting;
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{Stream, StreamExt};
use releasio_common::access::MemberId;
use releasio_common::events::DashboardEvent;
use releasio_common::{actions, cells, Store};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// `event` as member `member_id` may receive it, if at all
///
/// The member is looked up per event, so role and assignment changes apply
/// to open streams straight away and a removed member receives nothing.
pub fn scoped_event(
    store: &Store,
    member_id: MemberId,
    event: DashboardEvent,
) -> Option<DashboardEvent> {
    let member = actions::member(store, member_id).ok()?;

    match event {
        DashboardEvent::CellChanged {
            key,
            value,
            origin,
            timestamp,
        } if cells::is_tenant_collection(&key) && !member.role.is_admin() => {
            let parsed = match serde_json::from_str(&value) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Dropping undecodable change of {}: {}", key, e);
                    return None;
                }
            };
            let value = serde_json::to_string(&cells::narrow(&member, &key, parsed)).ok()?;
            Some(DashboardEvent::CellChanged {
                key,
                value,
                origin,
                timestamp,
            })
        }
        DashboardEvent::AccessDenied { member_id, .. } if member_id != member.id => None,
        event => Some(event),
    }
}

/// GET /api/events
///
/// One SSE event per `DashboardEvent`, named after its variant, with the
/// event as JSON data.
pub async fn event_stream(
    State(state): State<AppState>,
    Extension(Acting(member)): Extension<Acting>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(member = %member.id, "New SSE client connected");

    let store = state.store.clone();
    let member_id = member.id;
    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |result| {
        let store = store.clone();
        async move {
            match result {
                Ok(event) => {
                    let event = scoped_event(&store, member_id, event)?;
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            debug!("Broadcasting SSE event: {}", event.event_type());
                            Some(Ok(Event::default().event(event.event_type()).data(json)))
                        }
                        Err(e) => {
                            warn!("Failed to serialize event: {}", e);
                            None
                        }
                    }
                }
                Err(e) => {
                    // Lagged clients skip what they missed and resync from cells
                    warn!("SSE stream error: {:?}", e);
                    None
                }
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
