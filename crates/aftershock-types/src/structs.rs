//! Core entity structs shared by the engine, pathfinder, and server.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DisasterType, HazardKind, HazardState};
use crate::ids::ConnectionId;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Address of a single cell on the integer pathfinding grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct GridCoordinate {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridCoordinate {
    /// Create a coordinate from its components.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (4-directional) distance to `other`.
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }

    /// Whether `other` is exactly one axis-aligned step away.
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// The four axis-aligned neighbours in +x, -x, +y, -y order.
    pub const fn neighbors(self) -> [Self; 4] {
        [
            Self::new(self.x.saturating_add(1), self.y),
            Self::new(self.x.saturating_sub(1), self.y),
            Self::new(self.x, self.y.saturating_add(1)),
            Self::new(self.x, self.y.saturating_sub(1)),
        ]
    }

    /// Lift the cell into world space on the ground plane.
    ///
    /// The grid's `y` axis is the world's `z` axis.
    pub fn to_waypoint(self) -> Vec3 {
        Vec3 {
            x: f64::from(self.x),
            y: 0.0,
            z: f64::from(self.y),
        }
    }
}

/// A point on the ground plane, as sent by clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlanarPoint {
    /// World `x`.
    pub x: f64,
    /// World `z`.
    pub z: f64,
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// Three-component vector used for positions, rotations, and waypoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

/// Position and rotation of a participant's avatar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Transform {
    /// World position.
    #[serde(alias = "position")]
    pub pos: Vec3,
    /// Euler rotation.
    #[serde(alias = "rotation")]
    pub rot: Vec3,
}

/// One registry entry: a live connection and its last known transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParticipantSession {
    /// Connection that owns this participant.
    pub id: ConnectionId,
    /// Last reported transform.
    pub transform: Transform,
}

// ---------------------------------------------------------------------------
// Disaster state
// ---------------------------------------------------------------------------

/// Ground-plane lattice cell a hazard is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HazardLocation {
    /// World `x`.
    pub x: i32,
    /// World `z`.
    pub z: i32,
}

/// A discrete in-simulation effect with its own small state machine.
///
/// Fire hazards carry `location` and `timer`; flood hazards carry only
/// `water_level`. Absent fields are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Hazard {
    /// What the hazard currently is.
    #[serde(rename = "type")]
    pub kind: HazardKind,
    /// Anchor cell (fire and collapse only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub location: Option<HazardLocation>,
    /// Seconds of burn left before collapse (fire and collapse only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub timer: Option<f64>,
    /// Current water level (flood only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub water_level: Option<f64>,
    /// Lifecycle state.
    pub state: HazardState,
}

impl Hazard {
    /// A burning structure at `location` that collapses after `timer`.
    pub const fn structure_fire(location: HazardLocation, timer: f64) -> Self {
        Self {
            kind: HazardKind::StructureFire,
            location: Some(location),
            timer: Some(timer),
            water_level: None,
            state: HazardState::Burning,
        }
    }

    /// Rising water starting at `water_level`.
    pub const fn flood(water_level: f64) -> Self {
        Self {
            kind: HazardKind::Flood,
            location: None,
            timer: None,
            water_level: Some(water_level),
            state: HazardState::Rising,
        }
    }
}

/// Snapshot of the whole disaster simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DisasterState {
    /// The active disaster.
    pub disaster_type: DisasterType,
    /// Overall intensity. Non-decreasing while a disaster is active.
    pub severity: f64,
    /// Hazards in seeding order.
    pub hazards: Vec<Hazard>,
}

/// Score and feedback for one submitted action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionResult {
    /// Score awarded for the action.
    pub score: i32,
    /// Human-readable feedback. Empty when no rule applies.
    pub feedback: String,
}

impl DecisionResult {
    /// Build a result from a score and feedback text.
    pub fn new(score: i32, feedback: impl Into<String>) -> Self {
        Self {
            score,
            feedback: feedback.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_adjacent() {
        let c = GridCoordinate::new(3, -2);
        for n in c.neighbors() {
            assert!(c.is_adjacent(n));
        }
        assert!(!c.is_adjacent(c));
        assert_eq!(c.manhattan_distance(GridCoordinate::new(-1, 1)), 7);
    }

    #[test]
    fn waypoint_maps_grid_y_to_world_z() {
        let w = GridCoordinate::new(2, 5).to_waypoint();
        assert_eq!(w, Vec3 { x: 2.0, y: 0.0, z: 5.0 });
    }

    #[test]
    fn fire_hazard_omits_water_level() {
        let hazard = Hazard::structure_fire(HazardLocation { x: -10, z: 20 }, 10.0);
        let json = serde_json::to_value(&hazard).unwrap();
        assert_eq!(json["type"], "structure_fire");
        assert_eq!(json["state"], "burning");
        assert_eq!(json["location"]["z"], 20);
        assert!(json.get("water_level").is_none());
    }

    #[test]
    fn flood_hazard_omits_location_and_timer() {
        let json = serde_json::to_value(Hazard::flood(0.5)).unwrap();
        assert_eq!(json["type"], "flood");
        assert_eq!(json["state"], "rising");
        assert!(json.get("location").is_none());
        assert!(json.get("timer").is_none());
    }

    #[test]
    fn transform_accepts_long_field_names() {
        let t: Transform = serde_json::from_str(
            r#"{"position":{"x":1.0,"y":2.0,"z":3.0},"rotation":{"x":0.0,"y":1.5,"z":0.0}}"#,
        )
        .unwrap();
        assert!((t.pos.z - 3.0).abs() < f64::EPSILON);
        assert!((t.rot.y - 1.5).abs() < f64::EPSILON);
    }
}
