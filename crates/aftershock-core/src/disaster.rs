//! The disaster state machine.
//!
//! [`DisasterEngine`] owns the single [`DisasterState`] and advances it
//! one discrete step per [`tick`](DisasterEngine::tick). It is plain
//! synchronous data; concurrent access goes through
//! [`SharedDisaster`](crate::engine::SharedDisaster).
//!
//! # Hazard lifecycle
//!
//! ```text
//! structure_fire/burning --timer <= 0--> collapse/collapsed   (terminal)
//! flood/rising           --every tick--> water_level += 0.05
//! ```

use aftershock_types::{
    DecisionResult, DisasterState, DisasterType, Hazard, HazardKind, HazardLocation, HazardState,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::rules::{DecisionRules, FireDrillRules};

/// Severity every disaster starts at.
pub const INITIAL_SEVERITY: f64 = 10.0;

/// Severity added on each tick while a disaster is active.
pub const SEVERITY_PER_TICK: f64 = 0.5;

/// Burn timer for the single structure in a fire.
pub const FIRE_BURN_TIMER: f64 = 10.0;

/// Burn timer for each structure hit by an earthquake.
pub const EARTHQUAKE_BURN_TIMER: f64 = 5.0;

/// Number of structures an earthquake sets burning.
pub const EARTHQUAKE_STRUCTURES: usize = 3;

/// Burn timer consumed per tick.
pub const BURN_PER_TICK: f64 = 0.1;

/// Water level a flood starts at.
pub const INITIAL_WATER_LEVEL: f64 = 0.5;

/// Water level gained per tick.
pub const WATER_RISE_PER_TICK: f64 = 0.05;

/// Lowest lattice coordinate a hazard may be placed on.
const LATTICE_MIN: i32 = -50;

/// Distance between adjacent lattice coordinates.
const LATTICE_SPACING: i32 = 10;

/// Number of lattice coordinates per axis (`-50, -40, ..., 40`).
const LATTICE_STEPS: i32 = 10;

/// The disaster simulation: current state, rule table, and placement RNG.
pub struct DisasterEngine {
    state: DisasterState,
    rules: Box<dyn DecisionRules>,
    rng: StdRng,
}

impl core::fmt::Debug for DisasterEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DisasterEngine")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl DisasterEngine {
    /// Create an idle engine with the fire drill rules.
    ///
    /// With `seed` set, hazard placement is reproducible; otherwise the
    /// RNG is seeded from the operating system.
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_rules(seed, Box::new(FireDrillRules::new()))
    }

    /// Create an idle engine with a custom rule table.
    pub fn with_rules(seed: Option<u64>, rules: Box<dyn DecisionRules>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            state: DisasterState::default(),
            rules,
            rng,
        }
    }

    /// Start `kind`, replacing whatever was running.
    ///
    /// Severity resets to [`INITIAL_SEVERITY`] and hazards are reseeded.
    /// Starting [`DisasterType::None`] clears all hazards and leaves the
    /// engine idle.
    pub fn start_disaster(&mut self, kind: DisasterType) -> DisasterState {
        let hazards = match kind {
            DisasterType::Fire => vec![self.burning_structure(FIRE_BURN_TIMER)],
            DisasterType::Earthquake => (0..EARTHQUAKE_STRUCTURES)
                .map(|_| self.burning_structure(EARTHQUAKE_BURN_TIMER))
                .collect(),
            DisasterType::Flood => vec![Hazard::flood(INITIAL_WATER_LEVEL)],
            DisasterType::None => Vec::new(),
        };

        self.state = DisasterState {
            disaster_type: kind,
            severity: INITIAL_SEVERITY,
            hazards,
        };
        info!(
            disaster = %kind,
            hazards = self.state.hazards.len(),
            "disaster started"
        );
        self.state.clone()
    }

    /// Advance one step.
    ///
    /// Returns `None` without touching state when no disaster is active.
    pub fn tick(&mut self) -> Option<DisasterState> {
        let kind = self.state.disaster_type;
        if !kind.is_active() {
            return None;
        }

        self.state.severity += SEVERITY_PER_TICK;

        match kind {
            DisasterType::Fire | DisasterType::Earthquake => {
                for hazard in &mut self.state.hazards {
                    if hazard.kind == HazardKind::StructureFire {
                        burn(hazard);
                    }
                }
            }
            DisasterType::Flood => {
                for hazard in &mut self.state.hazards {
                    if hazard.kind == HazardKind::Flood {
                        let level = hazard.water_level.unwrap_or(INITIAL_WATER_LEVEL);
                        hazard.water_level = Some(level + WATER_RISE_PER_TICK);
                    }
                }
            }
            DisasterType::None => {}
        }

        Some(self.state.clone())
    }

    /// Score `action` against the active disaster.
    pub fn evaluate_decision(&self, action: &str) -> DecisionResult {
        self.rules.evaluate(self.state.disaster_type, action)
    }

    /// The current state.
    pub const fn state(&self) -> &DisasterState {
        &self.state
    }

    /// Build a burning structure on a random lattice cell.
    fn burning_structure(&mut self, timer: f64) -> Hazard {
        let location = HazardLocation {
            x: self.lattice_coordinate(),
            z: self.lattice_coordinate(),
        };
        Hazard::structure_fire(location, timer)
    }

    fn lattice_coordinate(&mut self) -> i32 {
        let step = self.rng.random_range(0..LATTICE_STEPS);
        LATTICE_MIN.saturating_add(step.saturating_mul(LATTICE_SPACING))
    }
}

/// Burn one structure for a tick, collapsing it once the timer runs out.
fn burn(hazard: &mut Hazard) {
    let timer = hazard.timer.unwrap_or(0.0) - BURN_PER_TICK;
    hazard.timer = Some(timer);
    if timer <= 0.0 {
        hazard.kind = HazardKind::Collapse;
        hazard.state = HazardState::Collapsed;
        debug!(location = ?hazard.location, "structure collapsed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn idle_engine_does_not_tick() {
        let mut engine = DisasterEngine::new(Some(1));
        assert!(engine.tick().is_none());
        assert_eq!(engine.state(), &DisasterState::default());
    }

    #[test]
    fn fire_seeds_one_burning_structure() {
        let mut engine = DisasterEngine::new(Some(7));
        let state = engine.start_disaster(DisasterType::Fire);
        assert_eq!(state.disaster_type, DisasterType::Fire);
        assert!(approx(state.severity, 10.0));
        assert_eq!(state.hazards.len(), 1);
        let hazard = &state.hazards[0];
        assert_eq!(hazard.kind, HazardKind::StructureFire);
        assert_eq!(hazard.state, HazardState::Burning);
        assert!(approx(hazard.timer.unwrap(), 10.0));
    }

    #[test]
    fn hazards_land_on_the_coarse_lattice() {
        let mut engine = DisasterEngine::new(Some(42));
        for _ in 0..20 {
            let state = engine.start_disaster(DisasterType::Earthquake);
            for hazard in &state.hazards {
                let loc = hazard.location.unwrap();
                for v in [loc.x, loc.z] {
                    assert!((-50..50).contains(&v));
                    assert_eq!(v % 10, 0);
                }
            }
        }
    }

    #[test]
    fn earthquake_seeds_three_short_fuses() {
        let mut engine = DisasterEngine::new(Some(7));
        let state = engine.start_disaster(DisasterType::Earthquake);
        assert_eq!(state.hazards.len(), 3);
        for hazard in &state.hazards {
            assert!(approx(hazard.timer.unwrap(), 5.0));
            assert_eq!(hazard.state, HazardState::Burning);
        }
    }

    #[test]
    fn flood_seeds_rising_water() {
        let mut engine = DisasterEngine::new(Some(7));
        let state = engine.start_disaster(DisasterType::Flood);
        assert_eq!(state.hazards, vec![Hazard::flood(0.5)]);
    }

    #[test]
    fn fire_ticks_accumulate_linearly() {
        let mut engine = DisasterEngine::new(Some(3));
        engine.start_disaster(DisasterType::Fire);
        let mut last = None;
        for _ in 0..30 {
            last = engine.tick();
        }
        let state = last.unwrap();
        assert!(approx(state.severity, 10.0 + 0.5 * 30.0));
        assert!(approx(state.hazards[0].timer.unwrap(), 10.0 - 0.1 * 30.0));
        assert_eq!(state.hazards[0].kind, HazardKind::StructureFire);
    }

    #[test]
    fn structure_collapses_once_and_stays_collapsed() {
        let mut engine = DisasterEngine::new(Some(3));
        engine.start_disaster(DisasterType::Earthquake);

        let mut collapsed_at = None;
        for n in 1..=80 {
            let state = engine.tick().unwrap();
            let all_collapsed = state
                .hazards
                .iter()
                .all(|h| h.kind == HazardKind::Collapse && h.state == HazardState::Collapsed);
            if all_collapsed && collapsed_at.is_none() {
                collapsed_at = Some(n);
            }
            if collapsed_at.is_some() {
                assert!(all_collapsed, "hazard reverted at tick {n}");
            }
        }
        // 5.0 / 0.1 = 50 ticks, give or take one for float drift.
        let at = collapsed_at.unwrap();
        assert!((50..=51).contains(&at), "collapsed at tick {at}");
    }

    #[test]
    fn collapsed_timer_stops_counting() {
        let mut engine = DisasterEngine::new(Some(3));
        engine.start_disaster(DisasterType::Earthquake);
        for _ in 0..60 {
            engine.tick();
        }
        let before = engine.state().hazards[0].timer.unwrap();
        engine.tick();
        assert!(approx(engine.state().hazards[0].timer.unwrap(), before));
    }

    #[test]
    fn flood_water_rises() {
        let mut engine = DisasterEngine::new(None);
        engine.start_disaster(DisasterType::Flood);
        for _ in 0..10 {
            engine.tick();
        }
        let level = engine.state().hazards[0].water_level.unwrap();
        assert!(approx(level, 0.5 + 0.05 * 10.0));
        assert!(approx(engine.state().severity, 15.0));
    }

    #[test]
    fn severity_never_decreases_while_active() {
        let mut engine = DisasterEngine::new(Some(9));
        engine.start_disaster(DisasterType::Fire);
        let mut previous = engine.state().severity;
        for _ in 0..200 {
            let severity = engine.tick().unwrap().severity;
            assert!(severity >= previous);
            previous = severity;
        }
    }

    #[test]
    fn restart_resets_severity() {
        let mut engine = DisasterEngine::new(Some(9));
        engine.start_disaster(DisasterType::Fire);
        for _ in 0..5 {
            engine.tick();
        }
        let state = engine.start_disaster(DisasterType::Flood);
        assert!(approx(state.severity, 10.0));
        assert_eq!(state.hazards.len(), 1);
    }

    #[test]
    fn starting_none_goes_idle() {
        let mut engine = DisasterEngine::new(Some(9));
        engine.start_disaster(DisasterType::Fire);
        let state = engine.start_disaster(DisasterType::None);
        assert!(state.hazards.is_empty());
        assert!(engine.tick().is_none());
    }

    #[test]
    fn decisions_follow_active_disaster() {
        let mut engine = DisasterEngine::new(Some(1));
        assert_eq!(engine.evaluate_decision("evacuate").score, 0);
        engine.start_disaster(DisasterType::Fire);
        assert_eq!(engine.evaluate_decision("evacuate").score, 90);
        assert_eq!(engine.evaluate_decision("wait").score, 10);
        assert_eq!(engine.evaluate_decision("call for help").score, 50);
        engine.start_disaster(DisasterType::Flood);
        let flood = engine.evaluate_decision("evacuate");
        assert_eq!(flood.score, 0);
        assert!(flood.feedback.is_empty());
    }

    #[test]
    fn custom_rules_replace_the_table() {
        struct AlwaysTen;
        impl DecisionRules for AlwaysTen {
            fn evaluate(&self, _: DisasterType, _: &str) -> DecisionResult {
                DecisionResult::new(10, "ten")
            }
        }
        let mut engine = DisasterEngine::with_rules(Some(1), Box::new(AlwaysTen));
        engine.start_disaster(DisasterType::Flood);
        assert_eq!(engine.evaluate_decision("swim").feedback, "ten");
    }

    #[test]
    fn same_seed_same_placement() {
        let mut a = DisasterEngine::new(Some(11));
        let mut b = DisasterEngine::new(Some(11));
        assert_eq!(
            a.start_disaster(DisasterType::Earthquake),
            b.start_disaster(DisasterType::Earthquake)
        );
    }
}
