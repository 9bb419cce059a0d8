// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The spectator stream endpoint: wires an HTTP SSE response to
//! `drafthub_hub::Hub`. Required headers and keep-alive cadence per
//! spec.md §6.

use crate::error::ApiResult;
use crate::handlers::sessions::shape_row;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use drafthub_hub::{ClientId, Hub};
use drafthub_proto::StreamEvent;
use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Keep-alive comment cadence (spec.md §6).
const KEEP_ALIVE_SECONDS: u64 = 25;

fn extra_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    headers
}

fn to_sse_event(event: StreamEvent) -> Result<Event, Infallible> {
    let data = event.data_json().to_string();
    Ok(Event::default().event(event.name()).data(data))
}

/// Drops its subscription from the hub once the stream is no longer polled
/// (client disconnect or response body drop). `unsubscribe` is async, so the
/// teardown is spawned rather than run in `Drop` directly.
struct Subscription {
    rx: mpsc::Receiver<StreamEvent>,
    hub: Arc<Hub>,
    session_key: String,
    client_id: ClientId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let hub = self.hub.clone();
        let session_key = std::mem::take(&mut self.session_key);
        let client_id = self.client_id;
        tokio::spawn(async move {
            hub.unsubscribe(&session_key, client_id).await;
        });
    }
}

fn subscription_stream(sub: Subscription) -> impl Stream<Item = StreamEvent> {
    stream::unfold(sub, |mut sub| async move {
        let event = sub.rx.recv().await?;
        Some((event, sub))
    })
}

/// GET `/sessions/:id/stream`.
pub async fn stream_session(
    State(state): State<AppState>,
    Path(session_key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let row = state.sessions.find_by_id(&session_key).await?;

    let events: std::pin::Pin<Box<dyn Stream<Item = StreamEvent> + Send>> = match row {
        None => Box::pin(stream::once(async { StreamEvent::NotFound })),
        Some(row) => {
            // Joins the cost preset the same way `shape_row` does for
            // `update` events, so a spectator's first `snapshot` and every
            // later `update` carry `costProfile` consistently.
            let snapshot = shape_row(&state, &row, false).await?;
            let ticking_state = row.state_document()?;
            let (client_id, rx) = state.hub.subscribe(&session_key, snapshot, ticking_state).await;
            let sub = Subscription {
                rx,
                hub: state.hub.clone(),
                session_key: session_key.clone(),
                client_id,
            };
            Box::pin(subscription_stream(sub))
        }
    };

    let sse = Sse::new(events.map(to_sse_event)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECONDS))
            .text("keep-alive"),
    );
    Ok((extra_headers(), sse))
}
