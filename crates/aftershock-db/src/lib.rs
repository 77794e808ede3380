//! Session and decision history for the Aftershock disaster trainer.
//!
//! The coordinator records each started disaster as a session and each
//! scored action as a decision. Recording is best-effort: the live
//! drill never waits on or fails because of this crate.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool, configuration, and
//!   migrations
//! - [`session_store`] -- Insert, finish, and list sessions
//! - [`decision_store`] -- Insert and list decisions
//! - [`session_log`] -- The [`SessionLog`] contract with `PostgreSQL`
//!   and in-memory implementations
//! - [`error`] -- Shared error types

pub mod decision_store;
pub mod error;
pub mod postgres;
pub mod session_log;
pub mod session_store;

// Re-export primary types for convenience.
pub use decision_store::{DecisionRow, DecisionStore};
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use session_log::{MemorySessionLog, PgSessionLog, SessionLog};
pub use session_store::{SessionRow, SessionStore};
