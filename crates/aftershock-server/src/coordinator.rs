//! The coordinator: routes typed client events to the engine, the
//! pathfinder, the registry, and the session log, and fans results out.
//!
//! Lock discipline: the engine lock (inside [`SharedDisaster`]), the
//! registry lock, the outbox lock, and the active-session lock are each
//! taken on their own and released before the next is taken. None is
//! held across a [`SessionLog`] call. The start lock is the exception:
//! it is held for a whole [`Coordinator::start_simulation`] so that the
//! engine and the active session always describe the same drill.
//!
//! Broadcasts reach every open channel, joined or not.
//!
//! Persistence is best-effort. A failing [`SessionLog`] is logged at
//! `warn` and gameplay continues.

use std::sync::Arc;
use std::time::Duration;

use aftershock_core::{SharedDisaster, TickCallback, TickerControl, run_ticker};
use aftershock_db::SessionLog;
use aftershock_types::{
    ClientEvent, ConnectionId, DecisionResult, DisasterState, DisasterType, GridCoordinate,
    PathReply, PathRequest, PlayerInfo, PlayerLeft, ServerEvent, SessionId, StatusPayload,
    Transform, WELCOME_MESSAGE,
};
use aftershock_world::Pathfinder;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::outbox::{OutboxSender, Outboxes};
use crate::registry::SessionRegistry;

/// The training session currently being scored.
#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    id: SessionId,
    started: Instant,
    score: i64,
}

/// Point-in-time summary for the status page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorStatus {
    /// Disaster currently running.
    pub disaster_type: DisasterType,
    /// Current severity.
    pub severity: f64,
    /// Number of hazards in play.
    pub hazards: usize,
    /// Joined participants.
    pub participants: usize,
    /// Open channels, joined or not.
    pub connections: usize,
    /// Session being scored, if any.
    pub active_session: Option<SessionId>,
}

/// Central event router. Shared behind an [`Arc`] by every connection
/// task and the ticker.
#[derive(Debug)]
pub struct Coordinator<L> {
    engine: SharedDisaster,
    pathfinder: Pathfinder,
    registry: SessionRegistry,
    outboxes: Outboxes,
    session_log: L,
    active: Mutex<Option<ActiveSession>>,
    start_lock: Mutex<()>,
    default_disaster: DisasterType,
}

impl<L: SessionLog> Coordinator<L> {
    /// Assemble a coordinator. `pathfinder` must already hold the full
    /// obstacle set.
    pub fn new(
        engine: SharedDisaster,
        pathfinder: Pathfinder,
        session_log: L,
        default_disaster: DisasterType,
    ) -> Self {
        Self {
            engine,
            pathfinder,
            registry: SessionRegistry::new(),
            outboxes: Outboxes::new(),
            session_log,
            active: Mutex::new(None),
            start_lock: Mutex::new(()),
            default_disaster,
        }
    }

    /// The shared engine handle.
    pub const fn engine(&self) -> &SharedDisaster {
        &self.engine
    }

    /// The participant registry.
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The session log.
    pub const fn session_log(&self) -> &L {
        &self.session_log
    }

    /// Open a channel for `id` and greet it.
    ///
    /// Connecting an id that already has a channel changes nothing and
    /// sends no second greeting. Returns whether the channel was new.
    pub async fn connect(&self, id: ConnectionId, sender: OutboxSender) -> bool {
        if !self.outboxes.register(id, sender).await {
            debug!(conn = %id, "duplicate connect ignored");
            return false;
        }
        let welcome = ServerEvent::StatusUpdate(StatusPayload::Welcome {
            data: WELCOME_MESSAGE.to_owned(),
            id,
        });
        self.outboxes.send_to(id, welcome).await;
        info!(conn = %id, "client connected");
        true
    }

    /// Register `id` as a participant.
    ///
    /// The joiner gets the full registry (itself included); everyone
    /// else gets `new_player`.
    pub async fn join(&self, id: ConnectionId) {
        let entry = self.registry.join(id).await;
        let players = self.registry.snapshot().await;
        let others = self.outboxes.recipients(Some(id)).await;

        self.outboxes
            .send_to(id, ServerEvent::CurrentPlayers(players))
            .await;
        let announced = ServerEvent::NewPlayer(PlayerInfo {
            id,
            data: entry.transform,
        });
        let receivers = self.outboxes.deliver(&others, &announced).await;
        info!(conn = %id, receivers, "participant joined");
    }

    /// Record a new transform for `id` and tell everyone else.
    ///
    /// Updates from ids that are not registered are dropped.
    pub async fn update_transform(&self, id: ConnectionId, transform: Transform) {
        if !self.registry.update(id, transform).await {
            debug!(conn = %id, "update from unregistered connection dropped");
            return;
        }
        let others = self.outboxes.recipients(Some(id)).await;
        let moved = ServerEvent::PlayerMoved(PlayerInfo {
            id,
            data: transform,
        });
        self.outboxes.deliver(&others, &moved).await;
    }

    /// Plan a path and reply to the requester only.
    pub async fn request_path(&self, id: ConnectionId, request: PathRequest) {
        let cells = self.pathfinder.find_path(request.start, request.goal);
        debug!(
            conn = %id,
            agent = %request.agent_id,
            waypoints = cells.len(),
            "path planned"
        );
        let reply = PathReply {
            agent_id: request.agent_id,
            path: cells.into_iter().map(GridCoordinate::to_waypoint).collect(),
        };
        self.outboxes
            .send_to(id, ServerEvent::PathResult(reply))
            .await;
    }

    /// Start `kind` (or the configured default) and reply with the
    /// initial state.
    ///
    /// Any session still being scored is closed out first. Starting
    /// [`DisasterType::None`] stops the drill without opening a session.
    /// Overlapping starts run one after the other.
    pub async fn start_simulation(&self, id: ConnectionId, kind: Option<DisasterType>) {
        let kind = kind.unwrap_or(self.default_disaster);
        let _starting = self.start_lock.lock().await;

        self.finish_active_session().await;
        let state = self.engine.start_disaster(kind).await;
        info!(conn = %id, disaster = ?kind, hazards = state.hazards.len(), "simulation started");

        if kind.is_active() {
            match self.session_log.log_session_start(kind).await {
                Ok(session) => {
                    *self.active.lock().await = Some(ActiveSession {
                        id: session,
                        started: Instant::now(),
                        score: 0,
                    });
                }
                Err(e) => warn!(error = %e, "failed to log session start"),
            }
        }

        self.outboxes
            .send_to(id, ServerEvent::SimulationStarted(state))
            .await;
    }

    /// Score `action` and reply to the requester only.
    ///
    /// The decision is recorded against the active session, if there is
    /// one.
    pub async fn submit_decision(&self, id: ConnectionId, action: &str) -> DecisionResult {
        let result = self.engine.evaluate_decision(action).await;

        let session = {
            let mut active = self.active.lock().await;
            active.as_mut().map(|session| {
                session.score = session.score.saturating_add(i64::from(result.score));
                session.id
            })
        };
        if let Some(session) = session {
            if let Err(e) = self
                .session_log
                .log_decision(session, action, &result.feedback, result.score)
                .await
            {
                warn!(error = %e, %session, "failed to log decision");
            }
        }

        debug!(conn = %id, action, score = result.score, "decision scored");
        self.outboxes
            .send_to(id, ServerEvent::DecisionFeedback(result.clone()))
            .await;
        result
    }

    /// Close the channel for `id`.
    ///
    /// If `id` had joined, every remaining channel is told.
    pub async fn disconnect(&self, id: ConnectionId) {
        self.outboxes.remove(id).await;
        if !self.registry.leave(id).await {
            debug!(conn = %id, "client disconnected before joining");
            return;
        }
        let remaining = self.outboxes.recipients(None).await;
        let left = ServerEvent::PlayerDisconnected(PlayerLeft { id });
        let receivers = self.outboxes.deliver(&remaining, &left).await;
        info!(conn = %id, receivers, "participant left");
    }

    /// Route one parsed client event.
    pub async fn dispatch(&self, id: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::JoinGame => self.join(id).await,
            ClientEvent::PlayerUpdate(transform) => self.update_transform(id, transform).await,
            ClientEvent::RequestPath(request) => self.request_path(id, request).await,
            ClientEvent::StartSimulation(start) => self.start_simulation(id, start.kind).await,
            ClientEvent::SubmitDecision(decision) => {
                self.submit_decision(id, &decision.action).await;
            }
        }
    }

    /// Send a state snapshot to every open channel. Returns how many
    /// received it.
    pub async fn publish_state(&self, state: &DisasterState) -> usize {
        let recipients = self.outboxes.recipients(None).await;
        let update = ServerEvent::StatusUpdate(StatusPayload::State(state.clone()));
        self.outboxes.deliver(&recipients, &update).await
    }

    /// Record the duration and score of the active session and clear it.
    ///
    /// Returns the session that was closed, if any.
    pub async fn finish_active_session(&self) -> Option<SessionId> {
        let finished = self.active.lock().await.take()?;
        let duration = finished.started.elapsed().as_secs_f64();
        if let Err(e) = self
            .session_log
            .log_session_end(finished.id, duration, finished.score)
            .await
        {
            warn!(error = %e, session = %finished.id, "failed to log session end");
        }
        info!(
            session = %finished.id,
            duration_secs = duration,
            score = finished.score,
            "session finished"
        );
        Some(finished.id)
    }

    /// Summary for the status page.
    pub async fn status(&self) -> CoordinatorStatus {
        let state = self.engine.snapshot().await;
        let active_session = self.active.lock().await.map(|session| session.id);
        CoordinatorStatus {
            disaster_type: state.disaster_type,
            severity: state.severity,
            hazards: state.hazards.len(),
            participants: self.registry.len().await,
            connections: self.outboxes.len().await,
            active_session,
        }
    }
}

/// Adapts a coordinator to the ticker's callback.
#[derive(Debug)]
pub struct CoordinatorTicks<L>(Arc<Coordinator<L>>);

impl<L> CoordinatorTicks<L> {
    /// Publish every tick of `coordinator`'s engine to its participants.
    pub const fn new(coordinator: Arc<Coordinator<L>>) -> Self {
        Self(coordinator)
    }
}

impl<L: SessionLog> TickCallback for CoordinatorTicks<L> {
    async fn on_tick(&mut self, state: &DisasterState) {
        let receivers = self.0.publish_state(state).await;
        debug!(severity = state.severity, receivers, "state published");
    }
}

/// Run the ticker for `coordinator` on a background task until
/// `control` asks it to stop.
pub fn spawn_ticker<L: SessionLog>(
    coordinator: Arc<Coordinator<L>>,
    period: Duration,
    control: Arc<TickerControl>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let engine = coordinator.engine().clone();
        let mut callback = CoordinatorTicks::new(coordinator);
        run_ticker(engine, period, &control, &mut callback).await
    })
}
