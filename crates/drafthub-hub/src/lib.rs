// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The Session Broadcast Hub (spec.md §4.3): per-session spectator client
//! set, last-known shaped snapshot, and a 250 ms ticker that burns the
//! timer forward and emits minimal timer deltas.

use dashmap::DashMap;
use drafthub_proto::{ShapedSession, StateDocument, StreamEvent, TimerEvent};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Ticker cadence (spec.md §4.2, "implementation hint, not a contract").
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Per-client outbox. A bounded channel: a slow subscriber's backlog is
/// capped rather than buffered without limit (spec.md §4.3, "Backpressure").
const CLIENT_BUFFER: usize = 32;

pub type ClientId = u64;

struct SessionHub {
    /// Insertion order is preserved because ids are strictly increasing and
    /// `BTreeMap` iterates by key (spec.md §4.3, "Fairness").
    clients: BTreeMap<ClientId, mpsc::Sender<StreamEvent>>,
    next_client_id: ClientId,
    snapshot: ShapedSession,
    /// A private copy of the state document the ticker burns forward
    /// in-memory; never persisted (spec.md §4.2, "Exposure to spectators").
    ticking_state: StateDocument,
    ticker: Option<JoinHandle<()>>,
}

impl SessionHub {
    fn new(snapshot: ShapedSession, ticking_state: StateDocument) -> Self {
        Self {
            clients: BTreeMap::new(),
            next_client_id: 0,
            snapshot,
            ticking_state,
            ticker: None,
        }
    }

    fn timer_event(&self) -> TimerEvent {
        let timer = self
            .ticking_state
            .timer
            .clone()
            .unwrap_or_else(|| drafthub_proto::TimerFields::disabled(0));
        TimerEvent {
            timer_enabled: timer.timer_enabled,
            paused: timer.paused,
            reserve_left: timer.reserve_left,
            grace_left: timer.grace_left,
            timer_updated_at: timer.timer_updated_at,
            current_turn: self.ticking_state.current_turn,
        }
    }

    /// Best-effort fan-out; a full or closed channel drops that client
    /// (spec.md §4.3, "Backpressure").
    fn broadcast(&mut self, event: StreamEvent) {
        self.clients.retain(|_, tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("dropping slow spectator channel");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}

/// The process-wide hub (spec.md §9, "Global singletons"), keyed by session id.
#[derive(Default)]
pub struct Hub {
    sessions: DashMap<String, Arc<Mutex<SessionHub>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Subscribe a new spectator. Spawns the session's ticker if this is its
    /// first client. The returned receiver's first item is always the
    /// current snapshot (spec.md §5, "`snapshot` precedes every `update`/`timer`").
    pub async fn subscribe(
        &self,
        session_key: &str,
        snapshot: ShapedSession,
        ticking_state: StateDocument,
    ) -> (ClientId, mpsc::Receiver<StreamEvent>) {
        let entry = self
            .sessions
            .entry(session_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionHub::new(snapshot.clone(), ticking_state))))
            .clone();

        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        let mut hub = entry.lock().await;
        let id = hub.next_client_id;
        hub.next_client_id += 1;
        let _ = tx.try_send(StreamEvent::Snapshot(Box::new(hub.snapshot.clone())));
        hub.clients.insert(id, tx);

        if hub.ticker.is_none() {
            let session_key = session_key.to_string();
            let session_ref = entry.clone();
            hub.ticker = Some(tokio::spawn(run_ticker(session_key, session_ref)));
        }
        (id, rx)
    }

    /// Publish a persisted state change (spec.md §4.3, "`update`").
    pub async fn publish_update(
        &self,
        session_key: &str,
        snapshot: ShapedSession,
        state: StateDocument,
    ) {
        if let Some(entry) = self.sessions.get(session_key) {
            let mut hub = entry.lock().await;
            hub.snapshot = snapshot.clone();
            hub.ticking_state = state;
            hub.broadcast(StreamEvent::Update(Box::new(snapshot)));
        }
    }

    /// Notify subscribers the session was removed and tear down its hub
    /// state (spec.md §4.3, "`deleted`").
    pub async fn publish_deleted(&self, session_key: &str) {
        if let Some((_, entry)) = self.sessions.remove(session_key) {
            let mut hub = entry.lock().await;
            hub.broadcast(StreamEvent::Deleted);
            if let Some(t) = hub.ticker.take() {
                t.abort();
            }
        }
    }

    /// `true` while at least one stream is open for `session_key`.
    pub fn is_active(&self, session_key: &str) -> bool {
        self.sessions.contains_key(session_key)
    }

    /// Active session count, exposed for `/api/metrics` (SPEC_FULL.md §2).
    pub fn active_session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Total open spectator streams across all sessions, for `/api/metrics`.
    pub async fn open_stream_count(&self) -> usize {
        let mut total = 0;
        for entry in self.sessions.iter() {
            total += entry.value().lock().await.clients.len();
        }
        total
    }

    /// Drop `client_id`'s channel from `session_key`'s set. The hub reclaims
    /// a disconnected client's entry within one ticker period regardless
    /// (its next `try_send` fails and `broadcast` prunes it), but callers
    /// that detect disconnect promptly (stream close) should call this
    /// directly (spec.md §5, "reclaim its entry within one ticker period").
    pub async fn unsubscribe(&self, session_key: &str, client_id: ClientId) {
        if let Some(entry) = self.sessions.get(session_key) {
            let mut hub = entry.lock().await;
            hub.clients.remove(&client_id);
            if hub.clients.is_empty() {
                if let Some(t) = hub.ticker.take() {
                    t.abort();
                }
            }
        }
    }
}

async fn run_ticker(session_key: String, hub: Arc<Mutex<SessionHub>>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    loop {
        interval.tick().await;
        let mut guard = hub.lock().await;
        if guard.clients.is_empty() {
            guard.ticker = None;
            debug!(session = %session_key, "stopping ticker, no subscribers left");
            return;
        }
        let now_ms = chrono::Utc::now().timestamp_millis();
        drafthub_reducer::timer::burn(&mut guard.ticking_state, now_ms);
        let event = StreamEvent::Timer(guard.timer_event());
        guard.broadcast(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drafthub_proto::{ShapedState, Side, TimerFields};

    fn sample_state() -> StateDocument {
        StateDocument {
            draft_sequence: vec!["BB".into(), "RR".into(), "B".into(), "R".into()],
            current_turn: 2,
            picks: vec![None, None, None, None],
            blue_scores: vec![],
            red_scores: vec![],
            blue_locked: false,
            red_locked: false,
            timer: Some(TimerFields::enabled(180.0, 0)),
        }
    }

    fn sample_snapshot(state: &StateDocument) -> ShapedSession {
        ShapedSession {
            id: "s1".into(),
            owner_id: "owner1".into(),
            mode: "2ban".into(),
            team1: "Blue".into(),
            team2: "Red".into(),
            state: ShapedState::from(state),
            featured: vec![],
            is_complete: false,
            completed_at: None,
            last_activity_at: chrono::Utc::now(),
            cost_limit: 6.0,
            penalty_per_point: 2500,
            cost_profile: None,
            blue_token: None,
            red_token: None,
        }
    }

    #[tokio::test]
    async fn new_subscriber_receives_a_snapshot_first() {
        let hub = Hub::new();
        let state = sample_state();
        let snapshot = sample_snapshot(&state);
        let (_id, mut rx) = hub.subscribe("s1", snapshot, state).await;
        let first = rx.recv().await.expect("snapshot event");
        assert_eq!(first.name(), "snapshot");
    }

    #[tokio::test]
    async fn update_is_broadcast_to_every_subscriber() {
        let hub = Hub::new();
        let state = sample_state();
        let snapshot = sample_snapshot(&state);
        let (_id1, mut rx1) = hub.subscribe("s1", snapshot.clone(), state.clone()).await;
        let (_id2, mut rx2) = hub.subscribe("s1", snapshot.clone(), state.clone()).await;
        let _ = rx1.recv().await;
        let _ = rx2.recv().await;

        let mut updated_state = state.clone();
        updated_state.current_turn = 3;
        let mut updated_snapshot = snapshot.clone();
        updated_snapshot.state.current_turn = 3;
        hub.publish_update("s1", updated_snapshot.clone(), updated_state)
            .await;

        let e1 = rx1.recv().await.expect("update for rx1");
        let e2 = rx2.recv().await.expect("update for rx2");
        assert_eq!(e1.name(), "update");
        assert_eq!(e2.name(), "update");
    }

    #[tokio::test]
    async fn deleted_is_terminal_and_tears_down_hub_state() {
        let hub = Hub::new();
        let state = sample_state();
        let snapshot = sample_snapshot(&state);
        let (_id, mut rx) = hub.subscribe("s1", snapshot, state).await;
        let _ = rx.recv().await;

        hub.publish_deleted("s1").await;
        let event = rx.recv().await.expect("deleted event");
        assert!(event.is_terminal());
        assert!(!hub.is_active("s1"));
    }

    #[tokio::test]
    async fn unsubscribing_the_last_client_stops_the_ticker() {
        let hub = Hub::new();
        let state = sample_state();
        let snapshot = sample_snapshot(&state);
        let (_id, mut rx) = hub.subscribe("s1", snapshot, state).await;
        let _ = rx.recv().await;
        hub.unsubscribe("s1", 0).await;
        let entry = hub.sessions.get("s1").unwrap().clone();
        let guard = entry.lock().await;
        assert!(guard.clients.is_empty());
        assert!(guard.ticker.is_none());
    }

    #[tokio::test]
    async fn ticker_emits_timer_events_on_its_own_cadence() {
        let hub = Hub::new();
        let state = StateDocument {
            draft_sequence: vec!["B".into(), "R".into()],
            current_turn: 0,
            picks: vec![None, None],
            blue_scores: vec![],
            red_scores: vec![],
            blue_locked: false,
            red_locked: false,
            timer: Some(TimerFields::enabled(180.0, 0)),
        };
        assert_eq!(Side::of_token(&state.draft_sequence[0]), Some(Side::Blue));
        let snapshot = sample_snapshot(&state);
        let (_id, mut rx) = hub.subscribe("s1", snapshot, state).await;
        let _ = rx.recv().await; // snapshot

        let event = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("a timer tick within one extra period")
            .expect("channel open");
        assert_eq!(event.name(), "timer");
    }
}
