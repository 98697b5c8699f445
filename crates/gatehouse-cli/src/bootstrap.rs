//! Console wiring.
//!
//! Builds the backend (hosted or demo), the session controller, the gate
//! service, and the ambient simulator, and hands the bundle to the
//! console loop.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use gatehouse_application::{
    ActivityFeed, AmbientSimulator, GateService, SensorPulse, SessionController, ViewState,
};
use gatehouse_core::account::ProfileRepository;
use gatehouse_core::auth::AuthGateway;
use gatehouse_core::event::EventRepository;
use gatehouse_core::property::PropertyRepository;
use gatehouse_core::subscription::SubscriptionRepository;
use gatehouse_infrastructure::{ConfigService, MemoryBackend, RestBackend};

/// Everything the console loop needs.
pub struct AppServices {
    pub controller: Arc<SessionController>,
    pub gate: Arc<GateService>,
    pub ambient: Arc<AmbientSimulator>,
    pub pulses: mpsc::UnboundedReceiver<SensorPulse>,
    pub feed: ActivityFeed,
    pub view: ViewState,
    pub demo: bool,
}

/// Builds the service bundle over the chosen backend.
pub fn build(demo: bool) -> Result<AppServices> {
    if demo {
        tracing::info!("starting with the in-memory demo backend");
        let backend = Arc::new(MemoryBackend::with_demo_data());
        Ok(wire(backend, demo))
    } else {
        let config = ConfigService::new()?.backend_config()?;
        tracing::info!("connecting to {}", config.url);
        let backend = Arc::new(RestBackend::new(&config));
        Ok(wire(backend, demo))
    }
}

fn wire<B>(backend: Arc<B>, demo: bool) -> AppServices
where
    B: AuthGateway
        + ProfileRepository
        + SubscriptionRepository
        + PropertyRepository
        + EventRepository
        + 'static,
{
    let controller = SessionController::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
    );

    let feed = ActivityFeed::new();
    let view = ViewState::new();
    let gate = GateService::new(feed.clone());
    let (ambient, pulses) = AmbientSimulator::new(feed.clone(), view.clone());

    AppServices {
        controller,
        gate,
        ambient,
        pulses,
        feed,
        view,
        demo,
    }
}
