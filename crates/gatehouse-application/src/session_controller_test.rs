//! Integration-style tests for the session controller over the in-memory
//! backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use gatehouse_core::account::{NewProfile, Profile, ProfileRepository};
use gatehouse_core::auth::{AuthChange, AuthGateway, AuthUser, SignInRequest, SignUpRequest};
use gatehouse_core::error::Result;
use gatehouse_core::subscription::{Plan, SubscriptionStatus};
use gatehouse_infrastructure::MemoryBackend;

use crate::session_controller::SessionController;

fn sign_up_request(email: &str, password: &str) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: password.to_string(),
        full_name: "Dana Levi".to_string(),
        phone: "050-1234567".to_string(),
    }
}

fn sign_in_request(email: &str, password: &str) -> SignInRequest {
    SignInRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn controller_over(backend: &Arc<MemoryBackend>) -> Arc<SessionController> {
    SessionController::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
    )
}

/// Gateway wrapper counting how many requests actually reach the service.
struct CountingGateway {
    inner: Arc<MemoryBackend>,
    sign_up_calls: AtomicUsize,
}

impl CountingGateway {
    fn new(inner: Arc<MemoryBackend>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            sign_up_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AuthGateway for CountingGateway {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthUser> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_up(request).await
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<AuthUser> {
        self.inner.sign_in(request).await
    }

    async fn sign_out(&self) -> Result<()> {
        self.inner.sign_out().await
    }

    async fn current_user(&self) -> Result<Option<AuthUser>> {
        self.inner.current_user().await
    }

    async fn resolve_initial(&self) -> Result<Option<AuthUser>> {
        self.inner.resolve_initial().await
    }

    fn auth_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.inner.auth_changes()
    }
}

/// Profile repository wrapper counting list fetches.
struct CountingProfiles {
    inner: Arc<MemoryBackend>,
    list_calls: AtomicUsize,
}

#[async_trait]
impl ProfileRepository for CountingProfiles {
    async fn insert(&self, profile: &NewProfile) -> Result<()> {
        ProfileRepository::insert(&*self.inner, profile).await
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<Profile>> {
        self.inner.find_by_id(user_id).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Profile>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        ProfileRepository::list_recent(&*self.inner, limit).await
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_short_password_never_reaches_the_service() {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = CountingGateway::new(backend.clone());
    let controller = SessionController::new(
        gateway.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
    );

    let err = controller
        .sign_up(sign_up_request("dana@example.com", "12345"))
        .await
        .expect_err("expected validation error");

    assert!(err.is_validation());
    assert_eq!(gateway.sign_up_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sign_up_provisions_viewer_profile_and_trial() {
    let backend = Arc::new(MemoryBackend::new());
    let controller = controller_over(&backend);
    let before = Utc::now();

    let user = controller
        .sign_up(sign_up_request("Dana@Example.com ", "hunter22"))
        .await
        .expect("sign up");

    // Email reaches the service normalized.
    assert_eq!(user.email, "dana@example.com");

    let session = controller.session().await.expect("session established");
    let profile = session.profile.expect("profile provisioned");
    assert_eq!(profile.full_name, "Dana Levi");
    assert!(!profile.is_admin());

    let subscription = session.subscription.expect("subscription provisioned");
    assert_eq!(subscription.plan, Plan::Core);
    assert_eq!(subscription.status, SubscriptionStatus::Trial);

    let expected_expiry = before + chrono::Duration::days(30);
    let drift = (subscription.expires_at - expected_expiry).num_seconds().abs();
    assert!(drift <= 1, "trial expiry drifted by {drift}s");
}

#[tokio::test]
async fn test_sign_in_and_out_lifecycle() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    let controller = controller_over(&backend);

    assert!(controller.session().await.is_none());

    let session = controller
        .sign_in(sign_in_request("resident@gatehouse.demo", "welcome1"))
        .await
        .expect("sign in");
    assert_eq!(session.display_name(), "Dana Levi");

    // Read-only fetches agree with the cached session.
    let profile = controller
        .profile(&session.user.id)
        .await
        .expect("fetch")
        .expect("profile");
    assert_eq!(profile.full_name, "Dana Levi");
    assert!(
        controller
            .current_user()
            .await
            .expect("current user")
            .is_some()
    );

    controller.sign_out().await.expect("sign out");
    assert!(controller.session().await.is_none());
    assert!(
        controller
            .current_user()
            .await
            .expect("current user")
            .is_none()
    );
}

#[tokio::test]
async fn test_invalid_credentials_surface_as_auth_error() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    let controller = controller_over(&backend);

    let err = controller
        .sign_in(sign_in_request("resident@gatehouse.demo", "wrong"))
        .await
        .expect_err("expected auth error");
    assert!(err.is_auth());
    assert!(controller.session().await.is_none());
}

#[tokio::test]
async fn test_initialize_restores_an_existing_session() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    backend
        .sign_in(&sign_in_request("admin@gatehouse.demo", "sentinel"))
        .await
        .expect("backend sign in");

    let controller = controller_over(&backend);
    let restored = controller.initialize().await.expect("initialize");

    assert_eq!(
        restored.expect("restored session").display_name(),
        "Noa Barak"
    );
}

#[tokio::test]
async fn test_select_plan_requires_a_session() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    let controller = controller_over(&backend);

    let err = controller
        .select_plan(Plan::Signature)
        .await
        .expect_err("expected auth error");
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_select_plan_updates_and_refetches() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    let controller = controller_over(&backend);

    controller
        .sign_in(sign_in_request("resident@gatehouse.demo", "welcome1"))
        .await
        .expect("sign in");

    let updated = controller
        .select_plan(Plan::Signature)
        .await
        .expect("plan update");
    assert_eq!(updated.plan, Plan::Signature);
    assert_eq!(updated.status, SubscriptionStatus::Active);

    // The next read reflects the new plan.
    let session = controller.session().await.expect("session");
    assert_eq!(session.plan_label().as_deref(), Some("SIGNATURE"));
    let fetched = controller
        .subscription(&session.user.id)
        .await
        .expect("fetch")
        .expect("subscription");
    assert_eq!(fetched.plan, Plan::Signature);
}

#[tokio::test]
async fn test_admin_overview_is_gated_on_role() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    let profiles = Arc::new(CountingProfiles {
        inner: backend.clone(),
        list_calls: AtomicUsize::new(0),
    });
    let controller = SessionController::new(
        backend.clone(),
        profiles.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
    );

    controller
        .sign_in(sign_in_request("resident@gatehouse.demo", "welcome1"))
        .await
        .expect("sign in");

    let err = controller
        .admin_overview()
        .await
        .expect_err("expected auth error");
    assert!(err.is_auth());
    // The aggregate load never ran.
    assert_eq!(profiles.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_admin_overview_aggregates_tables() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    let controller = controller_over(&backend);

    controller
        .sign_in(sign_in_request("admin@gatehouse.demo", "sentinel"))
        .await
        .expect("sign in");

    let overview = controller.admin_overview().await.expect("overview");
    assert_eq!(overview.total_users, 2);
    assert_eq!(overview.total_properties, 3);
    assert_eq!(overview.recent_events.len(), 6);
    assert_eq!(overview.plan_counts.count(Plan::Elite), 1);
    assert_eq!(overview.plan_counts.count(Plan::Core), 1);
    assert_eq!(overview.active_subscriptions, 1);
}

#[tokio::test]
async fn test_subscription_delivers_events_until_unsubscribed() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    let controller = controller_over(&backend);

    let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = controller.subscribe(move |change, session| {
        assert_eq!(change.user().is_some(), session.is_some());
        sink.lock().unwrap().push(change.kind());
    });

    controller
        .sign_in(sign_in_request("resident@gatehouse.demo", "welcome1"))
        .await
        .expect("sign in");
    wait_until(|| !seen.lock().unwrap().is_empty()).await;
    assert_eq!(seen.lock().unwrap().as_slice(), ["signed_in"]);

    subscription.unsubscribe();
    // Give the forwarding task a beat to observe the cancellation.
    tokio::time::sleep(Duration::from_millis(20)).await;

    controller.sign_out().await.expect("sign out");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(seen.lock().unwrap().as_slice(), ["signed_in"]);
}

#[tokio::test]
async fn test_token_refresh_keeps_the_session() {
    let backend = Arc::new(MemoryBackend::with_demo_data());
    let controller = controller_over(&backend);

    let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = controller.subscribe(move |change, _session| {
        sink.lock().unwrap().push(change.kind());
    });

    controller
        .sign_in(sign_in_request("resident@gatehouse.demo", "welcome1"))
        .await
        .expect("sign in");
    backend.refresh_session();

    wait_until(|| seen.lock().unwrap().len() >= 2).await;
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["signed_in", "token_refreshed"]
    );
    assert!(controller.session().await.is_some());
}
