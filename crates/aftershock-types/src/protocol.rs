//! Typed wire protocol for the participant event channel.
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Inbound frames are parsed into [`ClientEvent`] at the connection
//! boundary so the coordinator only ever sees typed requests. Outbound
//! messages are built as [`ServerEvent`] values and serialized once per
//! delivery.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DisasterType;
use crate::ids::ConnectionId;
use crate::structs::{DecisionResult, DisasterState, PlanarPoint, Transform, Vec3};

/// Greeting sent in the connect-time `status_update`.
pub const WELCOME_MESSAGE: &str = "Connected to AI Backend";

/// Errors raised while decoding or encoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame was not a valid event envelope.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Payload of `request_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PathRequest {
    /// Client-side agent that asked; echoed back in the reply.
    pub agent_id: String,
    /// Where the agent is.
    pub start: PlanarPoint,
    /// Where the agent wants to go.
    pub goal: PlanarPoint,
}

/// Payload of `start_simulation`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StartSimulation {
    /// Disaster to start. The server default applies when omitted.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub kind: Option<DisasterType>,
}

/// Payload of `submit_decision`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubmitDecision {
    /// Free-form action name, e.g. `evacuate`.
    pub action: String,
}

/// Everything a client may send. Disconnects are signalled by the
/// channel closing, not by a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientEvent {
    /// Register as a participant.
    JoinGame,
    /// Report a new avatar transform.
    PlayerUpdate(Transform),
    /// Ask for a grid path for an AI agent.
    RequestPath(PathRequest),
    /// Start (or restart) a disaster.
    StartSimulation(StartSimulation),
    /// Submit an action for scoring.
    SubmitDecision(SubmitDecision),
}

impl ClientEvent {
    /// Parse one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] for unknown event names or
    /// payloads that do not match the event's shape.
    pub fn parse(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Event name as it appears on the wire.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JoinGame => "join_game",
            Self::PlayerUpdate(_) => "player_update",
            Self::RequestPath(_) => "request_path",
            Self::StartSimulation(_) => "start_simulation",
            Self::SubmitDecision(_) => "submit_decision",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Body of `status_update`: either the connect greeting or a state tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum StatusPayload {
    /// Sent once when a channel opens.
    Welcome {
        /// Greeting text.
        data: String,
        /// The id the server assigned to this connection.
        id: ConnectionId,
    },
    /// Periodic disaster snapshot.
    State(DisasterState),
}

/// A participant and its transform, as announced to others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerInfo {
    /// Connection the participant belongs to.
    pub id: ConnectionId,
    /// Current transform.
    pub data: Transform,
}

/// Body of `player_disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerLeft {
    /// Connection that went away.
    pub id: ConnectionId,
}

/// Body of `path_result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PathReply {
    /// Echo of the requesting agent id.
    pub agent_id: String,
    /// World-space waypoints, start to goal. Empty when unreachable.
    pub path: Vec<Vec3>,
}

/// Everything the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ServerEvent {
    /// Connect greeting or periodic state.
    StatusUpdate(StatusPayload),
    /// Registry snapshot for a newly joined participant.
    CurrentPlayers(BTreeMap<ConnectionId, Transform>),
    /// Someone else joined.
    NewPlayer(PlayerInfo),
    /// Someone else moved.
    PlayerMoved(PlayerInfo),
    /// Someone left.
    PlayerDisconnected(PlayerLeft),
    /// Reply to `request_path`.
    PathResult(PathReply),
    /// Reply to `start_simulation`.
    SimulationStarted(DisasterState),
    /// Reply to `submit_decision`.
    DecisionFeedback(DecisionResult),
}

impl ServerEvent {
    /// Serialize to a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if serialization fails.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Event name as it appears on the wire.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StatusUpdate(_) => "status_update",
            Self::CurrentPlayers(_) => "current_players",
            Self::NewPlayer(_) => "new_player",
            Self::PlayerMoved(_) => "player_moved",
            Self::PlayerDisconnected(_) => "player_disconnected",
            Self::PathResult(_) => "path_result",
            Self::SimulationStarted(_) => "simulation_started",
            Self::DecisionFeedback(_) => "decision_feedback",
        }
    }
}
