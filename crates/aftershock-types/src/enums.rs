//! Enumeration types for the disaster trainer.
//!
//! String forms (`as_str`) match the `snake_case` serde names so the same
//! text is used on the wire and in the session store.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The disaster currently driving the simulation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DisasterType {
    /// No disaster is active; ticks are no-ops.
    #[default]
    None,
    /// A single structure fire that burns down and collapses.
    Fire,
    /// Several structures burn on a short timer before collapsing.
    Earthquake,
    /// Rising water.
    Flood,
}

impl DisasterType {
    /// Stable string form used on the wire and in persisted records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fire => "fire",
            Self::Earthquake => "earthquake",
            Self::Flood => "flood",
        }
    }

    /// Whether this value represents an active disaster.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl core::fmt::Display for DisasterType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a hazard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum HazardKind {
    /// A burning building with a countdown timer.
    StructureFire,
    /// A building that has burned down. Terminal.
    Collapse,
    /// Standing water with a level that rises every tick.
    Flood,
}

/// Lifecycle state of a single hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum HazardState {
    /// Fire is active.
    Burning,
    /// Structure has collapsed. Never reverts.
    Collapsed,
    /// Water is rising.
    Rising,
}
