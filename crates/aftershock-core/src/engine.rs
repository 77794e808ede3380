//! Exclusive-access wrapper around the [`DisasterEngine`].
//!
//! The ticker and every command handler share one [`SharedDisaster`].
//! Each method takes the lock, runs one whole engine operation, and
//! releases the lock before returning an owned snapshot, so no caller
//! can observe severity advanced without the hazards that go with it.
//! Nothing awaits while the lock is held.

use std::sync::Arc;

use aftershock_types::{DecisionResult, DisasterState, DisasterType};
use tokio::sync::Mutex;

use crate::disaster::DisasterEngine;

/// Cloneable handle to the single disaster engine.
#[derive(Debug, Clone)]
pub struct SharedDisaster {
    inner: Arc<Mutex<DisasterEngine>>,
}

impl SharedDisaster {
    /// Wrap `engine` for shared use.
    pub fn new(engine: DisasterEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Start a disaster and return the initial state.
    pub async fn start_disaster(&self, kind: DisasterType) -> DisasterState {
        self.inner.lock().await.start_disaster(kind)
    }

    /// Advance one step. `None` when idle.
    pub async fn tick(&self) -> Option<DisasterState> {
        self.inner.lock().await.tick()
    }

    /// Score an action against the disaster active at the time of the call.
    pub async fn evaluate_decision(&self, action: &str) -> DecisionResult {
        self.inner.lock().await.evaluate_decision(action)
    }

    /// A consistent copy of the whole current state.
    pub async fn snapshot(&self) -> DisasterState {
        self.inner.lock().await.state().clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aftershock_types::HazardKind;

    use super::*;

    #[tokio::test]
    async fn snapshot_reflects_operations() {
        let shared = SharedDisaster::new(DisasterEngine::new(Some(5)));
        assert!(shared.tick().await.is_none());
        shared.start_disaster(DisasterType::Fire).await;
        let ticked = shared.tick().await.unwrap();
        assert_eq!(shared.snapshot().await, ticked);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ticks_and_decisions_see_whole_steps() {
        let shared = SharedDisaster::new(DisasterEngine::new(Some(5)));
        shared.start_disaster(DisasterType::Fire).await;

        let ticker = {
            let shared = shared.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    shared.tick().await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let reader = {
            let shared = shared.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    assert_eq!(shared.evaluate_decision("evacuate").await.score, 90);
                    let state = shared.snapshot().await;
                    // Each tick adds 0.5 severity and burns 0.1 off the timer,
                    // so the two must always agree on the tick count.
                    let ticks_from_severity = (state.severity - 10.0) / 0.5;
                    let hazard = state.hazards.first().unwrap();
                    if hazard.kind == HazardKind::StructureFire {
                        let ticks_from_timer = (10.0 - hazard.timer.unwrap()) / 0.1;
                        assert!((ticks_from_severity - ticks_from_timer).abs() < 1e-6);
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        ticker.await.unwrap();
        reader.await.unwrap();
    }
}
