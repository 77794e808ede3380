//! Aftershock training server.
//!
//! Hosts the participant event channel (`GET /ws`) and a small HTTP
//! surface around the disaster engine:
//!
//! - [`registry::SessionRegistry`] tracks joined participants and their
//!   transforms behind its own lock
//! - [`outbox::Outboxes`] holds one unbounded queue per open channel
//! - [`coordinator::Coordinator`] routes typed client events to the
//!   engine, pathfinder, and session log, and fans results out
//! - [`handlers`] serve the status page, the session dashboard, and the
//!   JSON session API
//!
//! The `aftershock-server` binary wires these together with the ticker
//! from `aftershock-core`.

pub mod coordinator;
pub mod error;
pub mod handlers;
pub mod outbox;
pub mod registry;
pub mod router;
pub mod server;
pub mod startup;
pub mod ws;

pub use coordinator::{Coordinator, CoordinatorStatus, CoordinatorTicks, spawn_ticker};
pub use error::ApiError;
pub use registry::SessionRegistry;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{
    AnySessionLog, StartupError, build_coordinator, build_pathfinder, connect_session_log,
};
