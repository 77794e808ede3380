//! Shared type definitions for the Aftershock disaster trainer.
//!
//! This crate is the single source of truth for the data model and the
//! event-channel protocol. Types flow to the browser client as
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for connections and sessions
//! - [`enums`] -- Disaster, hazard kind, and hazard state enumerations
//! - [`structs`] -- Grid coordinates, transforms, hazards, disaster state
//! - [`protocol`] -- Typed inbound/outbound events for the channel

pub mod enums;
pub mod ids;
pub mod protocol;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DisasterType, HazardKind, HazardState};
pub use ids::{ConnectionId, SessionId};
pub use protocol::{
    ClientEvent, PathReply, PathRequest, PlayerInfo, PlayerLeft, ProtocolError, ServerEvent,
    StartSimulation, StatusPayload, SubmitDecision, WELCOME_MESSAGE,
};
pub use structs::{
    DecisionResult, DisasterState, GridCoordinate, Hazard, HazardLocation, ParticipantSession,
    PlanarPoint, Transform, Vec3,
};
