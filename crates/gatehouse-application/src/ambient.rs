//! Ambient dashboard simulation.
//!
//! Two independent timers fake sensor/guard activity for the demo: one
//! occasionally appends a flavor entry to the activity feed, the other
//! occasionally pulses a sensor widget. Both only emit while the dashboard
//! is the active view; neither is coordinated with the gate.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use gatehouse_core::view::ActiveView;

use crate::feed::ActivityFeed;
use crate::view_state::ViewState;

/// Static pool of flavor entries for the activity feed.
pub const FLAVOR_EVENTS: [&str; 6] = [
    "motion detected: camera 2 (parking)",
    "authorized vehicle recognized: plate 77-777-77",
    "cleaning crew arrived at the gate",
    "routine system check: all clear",
    "server room temperature: optimal",
    "gardener entered through the side gate",
];

/// Sensor widgets eligible for a cosmetic pulse.
pub const SENSORS: [&str; 4] = ["driveway motion", "perimeter beam", "gate lock", "intercom"];

/// How often a flavor entry is considered.
pub const FLAVOR_PERIOD: Duration = Duration::from_secs(8);
/// A flavor entry is appended when the roll exceeds this.
pub const FLAVOR_THRESHOLD: f64 = 0.7;

/// How often a sensor pulse is considered.
pub const PULSE_PERIOD: Duration = Duration::from_secs(5);
/// A pulse fires when the roll exceeds this.
pub const PULSE_THRESHOLD: f64 = 0.85;

/// A cosmetic sensor pulse; carries no feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorPulse {
    pub sensor: &'static str,
}

/// Ambient activity generator for the dashboard.
pub struct AmbientSimulator {
    feed: ActivityFeed,
    view: ViewState,
    pulses: mpsc::UnboundedSender<SensorPulse>,
}

impl AmbientSimulator {
    /// Creates a simulator and the receiver the console drains pulses from.
    pub fn new(
        feed: ActivityFeed,
        view: ViewState,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SensorPulse>) {
        let (pulses, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { feed, view, pulses }), receiver)
    }

    /// Starts both timers. They run until the returned token is cancelled
    /// or the process exits.
    pub fn spawn(self: &Arc<Self>) -> CancellationToken {
        let cancel = CancellationToken::new();

        let simulator = Arc::clone(self);
        let token = cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(FLAVOR_PERIOD);
            ticker.tick().await; // first tick completes immediately
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let (roll, pick) = {
                            let mut rng = rand::thread_rng();
                            (rng.gen_range(0.0..1.0), rng.gen_range(0..FLAVOR_EVENTS.len()))
                        };
                        simulator.flavor_tick(roll, pick);
                    }
                }
            }
        });

        let simulator = Arc::clone(self);
        let token = cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PULSE_PERIOD);
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let (roll, pick) = {
                            let mut rng = rand::thread_rng();
                            (rng.gen_range(0.0..1.0), rng.gen_range(0..SENSORS.len()))
                        };
                        simulator.pulse_tick(roll, pick);
                    }
                }
            }
        });

        cancel
    }

    /// One flavor-timer firing. Appends the picked entry when the roll
    /// clears the threshold and the dashboard is the active view.
    ///
    /// Returns whether an entry was appended.
    pub fn flavor_tick(&self, roll: f64, pick: usize) -> bool {
        if roll <= FLAVOR_THRESHOLD || self.view.get() != ActiveView::Dashboard {
            return false;
        }
        let message = FLAVOR_EVENTS[pick % FLAVOR_EVENTS.len()];
        self.feed.push(message);
        tracing::debug!(target: "ambient", "flavor event: {message}");
        true
    }

    /// One pulse-timer firing. Emits a pulse when the roll clears the
    /// threshold and the dashboard is the active view.
    pub fn pulse_tick(&self, roll: f64, pick: usize) -> Option<SensorPulse> {
        if roll <= PULSE_THRESHOLD || self.view.get() != ActiveView::Dashboard {
            return None;
        }
        let pulse = SensorPulse {
            sensor: SENSORS[pick % SENSORS.len()],
        };
        // The console may have stopped draining; a closed channel is fine.
        let _ = self.pulses.send(pulse);
        Some(pulse)
    }
}
