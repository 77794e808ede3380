//! Decision scoring rules.
//!
//! A [`DecisionRules`] implementation maps `(disaster, action)` to a
//! [`DecisionResult`]. The engine owns one boxed rule table and calls it
//! under the same lock as the tick, so rules always see a consistent
//! disaster type. Swapping the table never touches start or tick logic.
//!
//! [`FireDrillRules`] is the shipped table. It only knows about fires;
//! every other disaster yields the neutral zero result.

use aftershock_types::{DecisionResult, DisasterType};

/// A table that scores participant actions.
pub trait DecisionRules: Send + Sync {
    /// Score `action` taken while `disaster` is active.
    ///
    /// Must not fail: unknown actions fall through to some default.
    fn evaluate(&self, disaster: DisasterType, action: &str) -> DecisionResult;
}

/// The fire evacuation drill rule table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireDrillRules;

impl FireDrillRules {
    /// Create the rule table.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionRules for FireDrillRules {
    fn evaluate(&self, disaster: DisasterType, action: &str) -> DecisionResult {
        match disaster {
            DisasterType::Fire => match action {
                "evacuate" => DecisionResult::new(90, "Good decision. Evacuation is priority."),
                "wait" => DecisionResult::new(10, "Poor decision. Fire spreads quickly."),
                _ => DecisionResult::new(50, "Neutral action."),
            },
            // TODO: earthquake and flood scoring once drill designers supply the tables.
            DisasterType::Earthquake | DisasterType::Flood | DisasterType::None => {
                DecisionResult::default()
            }
        }
    }
}
