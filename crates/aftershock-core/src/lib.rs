//! Disaster engine, tick loop, and configuration for the Aftershock
//! disaster trainer.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `aftershock-config.yaml`.
//! - [`disaster`] -- [`DisasterEngine`]: the disaster state machine.
//! - [`engine`] -- [`SharedDisaster`]: the locked handle shared by the
//!   ticker and command handlers.
//! - [`rules`] -- [`DecisionRules`] trait and the fire drill table.
//! - [`ticker`] -- The fixed-period background tick loop.
//!
//! [`DisasterEngine`]: disaster::DisasterEngine
//! [`SharedDisaster`]: engine::SharedDisaster
//! [`DecisionRules`]: rules::DecisionRules

pub mod config;
pub mod disaster;
pub mod engine;
pub mod rules;
pub mod ticker;

pub use config::{ConfigError, TrainerConfig};
pub use disaster::DisasterEngine;
pub use engine::SharedDisaster;
pub use rules::{DecisionRules, FireDrillRules};
pub use ticker::{TickCallback, TickerControl, run_ticker};
