//! Gate actuator service.
//!
//! Drives the [`GateState`] machine over wall-clock time: an accepted
//! command moves the gate into its transitional state immediately and
//! schedules a cancellable completion that settles it after the transit
//! interval. Commands arriving while a transition is in flight are
//! ignored by the state machine itself.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use gatehouse_core::gate::{GateCommand, GateState, TRANSIT_DURATION};

use crate::feed::ActivityFeed;

/// Service owning the simulated main gate.
pub struct GateService {
    state: Mutex<GateState>,
    /// Token for the completion currently in flight, if any.
    pending: Mutex<Option<CancellationToken>>,
    feed: ActivityFeed,
    transit: Duration,
}

impl GateService {
    /// Creates a gate service with the standard transit interval.
    pub fn new(feed: ActivityFeed) -> Arc<Self> {
        Self::with_transit(feed, TRANSIT_DURATION)
    }

    /// Creates a gate service with an explicit transit interval.
    pub fn with_transit(feed: ActivityFeed, transit: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(GateState::Closed),
            pending: Mutex::new(None),
            feed,
            transit,
        })
    }

    /// The current actuator state.
    pub fn state(&self) -> GateState {
        *self.state.lock().unwrap()
    }

    /// Seeds the feed with the entries shown right after startup.
    pub fn seed_boot_entries(&self) {
        self.feed.push("system restarted");
        self.feed.push("sensor check completed");
    }

    /// Issues an operator command.
    ///
    /// Returns `true` when the command was accepted and a transition
    /// started; `false` when the current state ignores it. An accepted
    /// command appends a dispatch entry immediately and a settle entry
    /// when the scheduled completion fires.
    pub fn command(self: &Arc<Self>, command: GateCommand) -> bool {
        let next = {
            let mut state = self.state.lock().unwrap();
            match state.begin(command) {
                Some(next) => {
                    *state = next;
                    next
                }
                None => {
                    tracing::debug!(target: "gate", "command {command} ignored in state {state}");
                    return false;
                }
            }
        };

        self.feed.push(command.dispatch_message());
        tracing::info!(target: "gate", "transition started: {next}");

        let token = CancellationToken::new();
        *self.pending.lock().unwrap() = Some(token.clone());

        let service = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(target: "gate", "scheduled completion cancelled");
                }
                _ = tokio::time::sleep(service.transit) => {
                    service.complete();
                }
            }
        });

        true
    }

    /// Cancels the completion currently in flight, if any.
    ///
    /// The gate stays in its transitional state; a cancelled completion
    /// never mutates it.
    pub fn cancel_pending(&self) -> bool {
        match self.pending.lock().unwrap().take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn complete(&self) {
        let message = {
            let mut state = self.state.lock().unwrap();
            let message = state.settle_message();
            *state = state.settle();
            message
        };
        if let Some(message) = message {
            self.feed.push(message);
            tracing::info!(target: "gate", "{message}");
        }
        *self.pending.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (Arc<GateService>, ActivityFeed) {
        let feed = ActivityFeed::new();
        (GateService::new(feed.clone()), feed)
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_settles_after_transit_interval() {
        let (gate, feed) = service();

        assert!(gate.command(GateCommand::Open));
        assert_eq!(gate.state(), GateState::Opening);
        assert_eq!(
            feed.snapshot().first().map(|e| e.message.clone()),
            Some("command sent: open main gate".to_string())
        );

        tokio::time::sleep(TRANSIT_DURATION + Duration::from_millis(100)).await;
        assert_eq!(gate.state(), GateState::Open);
        assert_eq!(
            feed.snapshot().first().map(|e| e.message.clone()),
            Some("main gate opened successfully".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_ignored_during_transition() {
        let (gate, feed) = service();

        assert!(gate.command(GateCommand::Open));
        assert!(!gate.command(GateCommand::Open));
        assert!(!gate.command(GateCommand::Close));
        assert_eq!(feed.len(), 1);

        tokio::time::sleep(TRANSIT_DURATION + Duration::from_millis(100)).await;
        assert_eq!(gate.state(), GateState::Open);
        assert_eq!(feed.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cycle() {
        let (gate, feed) = service();

        gate.command(GateCommand::Open);
        tokio::time::sleep(TRANSIT_DURATION + Duration::from_millis(100)).await;
        gate.command(GateCommand::Close);
        tokio::time::sleep(TRANSIT_DURATION + Duration::from_millis(100)).await;

        assert_eq!(gate.state(), GateState::Closed);
        let messages: Vec<_> = feed.snapshot().iter().map(|e| e.message.clone()).collect();
        assert_eq!(
            messages,
            vec![
                "main gate closed and locked",
                "command sent: close main gate",
                "main gate opened successfully",
                "command sent: open main gate",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_completion_never_mutates() {
        let (gate, feed) = service();

        gate.command(GateCommand::Open);
        assert!(gate.cancel_pending());

        tokio::time::sleep(TRANSIT_DURATION * 2).await;
        assert_eq!(gate.state(), GateState::Opening);
        assert_eq!(feed.len(), 1);

        // Nothing left to cancel.
        assert!(!gate.cancel_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_boot_entries() {
        let (gate, feed) = service();
        gate.seed_boot_entries();

        let messages: Vec<_> = feed.snapshot().iter().map(|e| e.message.clone()).collect();
        assert_eq!(messages, vec!["sensor check completed", "system restarted"]);
    }
}
