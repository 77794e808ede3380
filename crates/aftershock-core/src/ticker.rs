//! Background tick loop.
//!
//! [`run_ticker`] fires at a fixed period for the lifetime of the
//! process. Each firing advances the [`SharedDisaster`] under its lock,
//! releases the lock, and only then hands the resulting snapshot to a
//! [`TickCallback`] for fan-out. Idle ticks (no active disaster) produce
//! no callback.
//!
//! The loop stops when [`TickerControl::request_stop`] is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use aftershock_types::DisasterState;
use tokio::sync::Notify;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::engine::SharedDisaster;

/// Receives each state produced by a tick.
pub trait TickCallback: Send {
    /// Called after a tick advanced an active disaster.
    fn on_tick(&mut self, state: &DisasterState) -> impl Future<Output = ()> + Send;
}

/// Stop signal shared between the ticker task and whoever owns shutdown.
#[derive(Debug, Default)]
pub struct TickerControl {
    stop_requested: AtomicBool,
    stop_notify: Notify,
}

impl TickerControl {
    /// Create a control in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the ticker to stop after its current firing.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}

/// Run the tick loop until stopped.
///
/// The first firing happens one `period` after the call. Returns the
/// number of ticks that advanced an active disaster.
pub async fn run_ticker<C: TickCallback>(
    engine: SharedDisaster,
    period: Duration,
    control: &TickerControl,
    callback: &mut C,
) -> u64 {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // `interval` completes its first tick immediately.
    timer.tick().await;

    info!(period_ms = period.as_millis(), "ticker started");
    let mut advanced: u64 = 0;

    loop {
        if control.is_stop_requested() {
            break;
        }

        tokio::select! {
            _ = timer.tick() => {}
            () = control.stop_notify.notified() => break,
        }

        // The engine lock is released before the callback runs.
        let Some(state) = engine.tick().await else {
            continue;
        };
        advanced = advanced.saturating_add(1);
        debug!(
            disaster = %state.disaster_type,
            severity = state.severity,
            "tick"
        );
        callback.on_tick(&state).await;
    }

    info!(advanced, "ticker stopped");
    advanced
}
